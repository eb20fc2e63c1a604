//! 애플리케이션 계층이 의존하는 포트(추상 인터페이스) 모음.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::application::config::{Config, HostConfig};
use crate::domain::error::ReviewError;
use crate::domain::lens::Lens;
use crate::domain::review::{
    ChangedFile, FileSummary, Issue, PostedComment, PrHandle, StructuredResponse,
};
use crate::domain::target::ReviewTarget;

/// 설정 로딩/점검을 담당하는 저장소 포트.
pub trait ConfigRepository: Send + Sync {
    fn load(&self) -> Result<Config>;
    fn inspect_pretty_json(&self) -> Result<String>;
}

/// 사용자 입력을 도메인 대상 식별자로 변환하는 포트.
pub trait TargetResolver: Send + Sync {
    fn parse(&self, input: &str, pr_number: Option<u64>) -> Result<ReviewTarget>;
}

/// host 토큰 해석 결과.
#[derive(Debug, Clone, Default)]
pub struct HostTokenResolution {
    pub token: Option<String>,
    pub source: Option<String>,
}

/// VCS 토큰(token/env/cmd)을 런타임 값으로 해석하는 포트.
pub trait HostTokenResolver: Send + Sync {
    fn resolve(&self, host: &str, host_cfg: Option<&HostConfig>) -> Result<HostTokenResolution>;
}

/// 리뷰 가이드 파일처럼 lens 지시문에 덧붙일 텍스트를 읽는 포트.
pub trait SystemPromptResolver: Send + Sync {
    fn review_guide(&self, config: &Config) -> Result<Option<String>>;
}

/// VCS(GitHub) 연동 포트. Diff Source와 코멘트 게시를 함께 담당한다.
#[async_trait]
pub trait VcsGateway: Send + Sync {
    /// 삭제/바이너리 파일을 제외한 변경 파일 목록을 원래 순서대로 돌려준다.
    async fn get_pr_files(&self) -> Result<(PrHandle, Vec<ChangedFile>)>;
    async fn create_comment(&self, body: &str) -> Result<PostedComment>;
}

/// 대상/호스트 설정에 맞는 VCS 게이트웨이를 생성하는 팩토리 포트.
pub trait VcsFactory: Send + Sync {
    fn build(
        &self,
        target: &ReviewTarget,
        host_cfg: Option<&HostConfig>,
        token: Option<String>,
    ) -> Box<dyn VcsGateway>;
}

/// 구조화 응답을 돌려주는 LLM 어댑터 포트.
///
/// 구현체는 반환 전에 `domain::schema`로 응답을 검증해야 한다.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    fn name(&self) -> &str;
    async fn complete(
        &self,
        system: &str,
        human: &str,
        schema: &Value,
    ) -> std::result::Result<StructuredResponse, ReviewError>;
}

/// 설정에서 LLM 어댑터를 구성하는 팩토리 포트.
pub trait LlmFactory: Send + Sync {
    fn build(&self, config: &Config, provider: &str) -> Result<Arc<dyn LlmAdapter>>;
}

/// 리뷰 리포트 마크다운 렌더링 포트.
pub trait MarkdownRenderer: Send + Sync {
    fn render_report(&self, pr: &PrHandle, issues: &[Issue], summaries: &[FileSummary]) -> String;
    fn render_lgtm(&self) -> String;
}

/// 콘솔/로그 출력 추상화 포트.
pub trait Reporter: Send + Sync {
    fn section(&self, name: &str);
    fn kv(&self, key: &str, value: &str);
    fn status(&self, scope: &str, message: &str);
    fn lens_status(&self, lens: Lens, status: &str, extra: Option<&str>);
    fn raw(&self, line: &str);
}
