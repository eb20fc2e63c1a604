//! Reviewer Unit: lens 하나를 파일 하나의 diff에 적용하는 단계.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::application::ports::LlmAdapter;
use crate::domain::error::ReviewError;
use crate::domain::lens::{Lens, LensConfig};
use crate::domain::policy::{build_human_message, build_system_instruction, stamp_issue};
use crate::domain::review::{ChangedFile, Issue, TokenUsage};
use crate::domain::schema;

/// (file, lens) 호출 1회의 결과. 실패해도 빈 결과로 남는다.
#[derive(Debug, Clone, Default)]
pub struct FileReview {
    pub issues: Vec<Issue>,
    pub summary: String,
    pub usage: TokenUsage,
    pub failure: Option<String>,
}

pub struct ReviewerUnit {
    lens: LensConfig,
    system_instruction: String,
    schema: Value,
    llm: Arc<dyn LlmAdapter>,
    timeout: Duration,
}

impl ReviewerUnit {
    /// lens 설정과 어댑터를 주입받아 생성한다. 시스템 지시문은 여기서 한 번만 만든다.
    pub fn new(
        lens: LensConfig,
        llm: Arc<dyn LlmAdapter>,
        review_guide: Option<&str>,
        timeout: Duration,
    ) -> Self {
        let system_instruction = build_system_instruction(&lens, review_guide);
        Self {
            lens,
            system_instruction,
            schema: schema::response_schema(),
            llm,
            timeout,
        }
    }

    pub fn lens(&self) -> Lens {
        self.lens.lens
    }

    /// 파일 하나를 리뷰한다.
    /// 호출 실패/타임아웃/스키마 위반은 로그를 남기고 빈 결과로 흡수한다.
    pub async fn review(&self, file: &ChangedFile) -> FileReview {
        match self.try_review(file).await {
            Ok(review) => review,
            Err(err) => {
                warn!(
                    lens = self.lens().label(),
                    file = %file.path,
                    error = %err,
                    "review call failed; file contributes no issues"
                );
                FileReview {
                    failure: Some(err.to_string()),
                    ..FileReview::default()
                }
            }
        }
    }

    async fn try_review(&self, file: &ChangedFile) -> Result<FileReview, ReviewError> {
        if file.patch.trim().is_empty() {
            return Ok(FileReview::default());
        }

        let human = build_human_message(file);
        let call = self
            .llm
            .complete(&self.system_instruction, &human, &self.schema);

        let response = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ReviewError::Timeout {
                provider: self.llm.name().to_string(),
                secs: self.timeout.as_secs(),
            })??;

        let issues: Vec<Issue> = response
            .result
            .issues
            .into_iter()
            .map(|issue| stamp_issue(issue, file, &self.lens))
            .collect();

        debug!(
            lens = self.lens().label(),
            file = %file.path,
            issues = issues.len(),
            "review call finished"
        );

        Ok(FileReview {
            issues,
            summary: response.result.summary,
            usage: response.usage,
            failure: None,
        })
    }
}
