//! 리뷰 도메인 엔티티/값 객체.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::lens::{Lens, Topology};

/// CLI/라이브러리 실행 옵션.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub target: String,
    pub pr_number: Option<u64>,
    pub dry_run: bool,
    pub json: bool,
    pub topology: Option<Topology>,
    pub provider: Option<String>,
    pub concurrency: Option<usize>,
}

/// PR 안의 파일 하나의 unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub path: String,
    pub patch: String,
}

impl ChangedFile {
    pub fn new(path: impl Into<String>, patch: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            patch: patch.into(),
        }
    }
}

/// Diff Source가 돌려주는 PR 식별/표시 정보.
#[derive(Debug, Clone, Default)]
pub struct PrHandle {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub title: String,
    pub head_sha: String,
    pub html_url: String,
}

impl PrHandle {
    pub fn repo_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueCategory {
    Security,
    Performance,
    #[serde(rename = "Best Practice", alias = "BestPractice")]
    BestPractice,
    Bug,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 4] = [
        IssueCategory::Security,
        IssueCategory::Performance,
        IssueCategory::BestPractice,
        IssueCategory::Bug,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Security => "Security",
            Self::Performance => "Performance",
            Self::BestPractice => "Best Practice",
            Self::Bug => "Bug",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Medium, Severity::Low];

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// 리뷰 결과 하나(finding).
///
/// `file_path`와 `category`는 모델이 아니라 파이프라인이 확정한다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Issue {
    pub file_path: String,
    pub line_number: u32,
    #[serde(alias = "issue_type")]
    pub category: IssueCategory,
    pub severity: Severity,
    pub description: String,
    pub suggestion: String,
}

/// LLM 호출 1회의 구조화 응답 계약.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewResult {
    pub issues: Vec<Issue>,
    pub summary: String,
}

/// (file, lens) 호출 1회가 남긴 summary. 리포트 부록에만 쓰인다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub lens: Lens,
    pub file_path: String,
    pub text: String,
}

/// VCS에 게시된 코멘트.
#[derive(Debug, Clone)]
pub struct PostedComment {
    pub id: String,
    pub html_url: Option<String>,
}

/// 스키마 검증을 통과한 응답 + 사용량.
#[derive(Debug, Clone)]
pub struct StructuredResponse {
    pub result: ReviewResult,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

impl TokenUsage {
    pub fn add_from(&mut self, other: &TokenUsage) {
        self.prompt_tokens = sum_optional(self.prompt_tokens, other.prompt_tokens);
        self.completion_tokens = sum_optional(self.completion_tokens, other.completion_tokens);
        self.total_tokens = sum_optional(self.total_tokens, other.total_tokens);
    }
}

pub(crate) fn sum_optional(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x + y),
        (Some(x), None) => Some(x),
        (None, Some(y)) => Some(y),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_sums_only_reported_fields() {
        let mut total = TokenUsage::default();
        total.add_from(&TokenUsage {
            prompt_tokens: Some(10),
            completion_tokens: None,
            total_tokens: Some(10),
        });
        total.add_from(&TokenUsage {
            prompt_tokens: Some(5),
            completion_tokens: Some(3),
            total_tokens: Some(8),
        });

        assert_eq!(total.prompt_tokens, Some(15));
        assert_eq!(total.completion_tokens, Some(3));
        assert_eq!(total.total_tokens, Some(18));
    }

    #[test]
    fn best_practice_accepts_both_spellings() {
        let spaced: IssueCategory = serde_json::from_str("\"Best Practice\"").unwrap();
        let joined: IssueCategory = serde_json::from_str("\"BestPractice\"").unwrap();
        assert_eq!(spaced, IssueCategory::BestPractice);
        assert_eq!(joined, IssueCategory::BestPractice);
        assert_eq!(
            serde_json::to_string(&IssueCategory::BestPractice).unwrap(),
            "\"Best Practice\""
        );
    }
}
