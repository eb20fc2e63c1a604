//! 리뷰 실행 중 발생하는 도메인 오류 분류.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    /// 모델 출력이 Issue 스키마를 만족하지 않음. 해당 (file, lens)만 버린다.
    #[error("schema validation failed: {0}")]
    SchemaValidation(String),

    /// provider 호출 자체가 실패함(네트워크/인증/rate limit 등).
    #[error("{provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("{provider}: call timed out after {secs}s")]
    Timeout { provider: String, secs: u64 },

    /// 저장소/PR 식별자가 잘못됨. LLM 호출 전에 실행을 중단한다.
    #[error("invalid input: {0}")]
    Input(String),

    /// 리포트 게시 실패. 계산된 리뷰 결과는 유지된다.
    #[error("failed to publish review: {0}")]
    Publish(String),
}

impl ReviewError {
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_names_the_provider() {
        let err = ReviewError::provider("OpenAI", "rate limited");
        assert_eq!(err.to_string(), "OpenAI: rate limited");
    }
}
