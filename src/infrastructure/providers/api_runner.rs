//! Provider HTTP API 호출 공용 유틸리티.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::domain::error::ReviewError;

/// 오류 메시지에 실을 응답 본문 최대 길이.
const ERROR_BODY_LIMIT: usize = 300;

/// Provider API 호출용 기본 HTTP 클라이언트를 생성한다.
/// 호출 전체 타임아웃은 Reviewer Unit이 건다.
pub fn build_api_client() -> Client {
    // TLS 설정 실패 등 예외 상황에서는 기본 클라이언트로 폴백한다.
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// JSON 응답을 기대하는 요청을 전송하고 실패/파싱 오류를 `ReviewError::Provider`로 표준화한다.
pub async fn send_json(
    provider_name: &str,
    action: &str,
    request: RequestBuilder,
) -> Result<Value, ReviewError> {
    let response = request.send().await.map_err(|e| {
        ReviewError::provider(provider_name, format!("failed to {action}: {e}"))
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        ReviewError::provider(
            provider_name,
            format!("failed to read {action} response body: {e}"),
        )
    })?;

    if !status.is_success() {
        return Err(ReviewError::provider(
            provider_name,
            format!("{action} failed ({status}): {}", truncate(body.trim())),
        ));
    }

    serde_json::from_str(&body).map_err(|e| {
        ReviewError::provider(
            provider_name,
            format!("invalid JSON response while {action}: {e}"),
        )
    })
}

/// API 응답 구조에서 텍스트를 재귀적으로 추출한다.
pub fn collect_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.to_string(),
        Value::Array(items) => items
            .iter()
            .map(collect_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(""),
        Value::Object(map) => {
            if let Some(text) = map.get("text").and_then(Value::as_str) {
                return text.to_string();
            }
            if let Some(parts) = map.get("parts") {
                return collect_text(parts);
            }
            if let Some(content) = map.get("content") {
                return collect_text(content);
            }
            String::new()
        }
        _ => String::new(),
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= ERROR_BODY_LIMIT {
        return body.to_string();
    }
    let head: String = body.chars().take(ERROR_BODY_LIMIT).collect();
    format!("{head}...")
}

#[cfg(test)]
pub(crate) fn test_client() -> Client {
    Client::builder()
        .no_proxy()
        .build()
        .expect("test client")
}
