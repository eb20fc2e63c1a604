//! 리뷰 관점(lens)과 파이프라인 토폴로지 정의.

use std::fmt;
use std::str::FromStr;

use crate::domain::review::IssueCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lens {
    Generic,
    Security,
    Performance,
    Style,
}

impl Lens {
    pub fn label(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Security => "security",
            Self::Performance => "performance",
            Self::Style => "style",
        }
    }

    /// 배포되는 기본 lens 설정.
    pub fn config(self) -> LensConfig {
        match self {
            Self::Generic => LensConfig {
                lens: self,
                instruction: "You are an expert Code Reviewer. Review the provided Git Patch. \
                    Identify critical bugs, security flaws, and performance issues. \
                    Only comment on changed lines (+)."
                    .to_string(),
                ignore: vec!["style nits".to_string()],
                category: None,
            },
            Self::Security => LensConfig {
                lens: self,
                instruction: "You are a security-focused Code Reviewer. Review the provided Git Patch. \
                    Look for injection flaws (SQL, shell, template), hard-coded secrets or credentials, \
                    insecure or vulnerable dependencies, and exposure of personal data (PII)."
                    .to_string(),
                ignore: vec!["performance".to_string(), "style".to_string()],
                category: Some(IssueCategory::Security),
            },
            Self::Performance => LensConfig {
                lens: self,
                instruction: "You are a performance-focused Code Reviewer. Review the provided Git Patch. \
                    Look for N+1 query patterns, expensive work inside loops, memory or resource leaks, \
                    and poorly chosen data structures."
                    .to_string(),
                ignore: vec!["security".to_string(), "style".to_string()],
                category: Some(IssueCategory::Performance),
            },
            Self::Style => LensConfig {
                lens: self,
                instruction: "You are a Code Reviewer focused on maintainability. Review the provided Git Patch. \
                    Look for unclear naming, missing type annotations, import hygiene, and readability problems. \
                    Report only significant issues."
                    .to_string(),
                ignore: vec!["trivial nits that do not hurt readability".to_string()],
                category: Some(IssueCategory::BestPractice),
            },
        }
    }
}

impl fmt::Display for Lens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 하나의 lens를 실행하는 데 필요한 고정 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LensConfig {
    pub lens: Lens,
    /// 관점/집중 영역을 담은 시스템 지시문
    pub instruction: String,
    /// 명시적으로 무시할 주제
    pub ignore: Vec<String>,
    /// 결과에 강제로 부여할 category (None이면 모델 값을 유지)
    pub category: Option<IssueCategory>,
}

/// 파이프라인 구성. 둘 다 같은 orchestrator 계약의 인스턴스다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    /// generic lens 하나
    #[default]
    Single,
    /// security → performance → style
    Multi,
}

impl Topology {
    /// 병합 순서대로 나열된 lens 목록.
    pub fn lenses(self) -> Vec<Lens> {
        match self {
            Self::Single => vec![Lens::Generic],
            Self::Multi => vec![Lens::Security, Lens::Performance, Lens::Style],
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multi => "multi",
        }
    }
}

impl FromStr for Topology {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "single" | "single-lens" | "generic" => Ok(Self::Single),
            "multi" | "multi-lens" => Ok(Self::Multi),
            other => Err(format!("unknown topology '{other}' (expected single or multi)")),
        }
    }
}
