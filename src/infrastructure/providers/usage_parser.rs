//! Provider 응답 JSON에서 토큰 사용량을 추출한다.

use serde_json::Value;

use crate::domain::review::{TokenUsage, sum_optional};

/// JSON pointer 3개(prompt/completion/total)로 사용량을 읽는다.
/// total이 없으면 prompt + completion으로 채운다.
pub(super) fn parse_usage(
    response: &Value,
    prompt_ptr: &str,
    completion_ptr: &str,
    total_ptr: Option<&str>,
) -> TokenUsage {
    let prompt = response.pointer(prompt_ptr).and_then(Value::as_u64);
    let completion = response.pointer(completion_ptr).and_then(Value::as_u64);
    let total = total_ptr
        .and_then(|ptr| response.pointer(ptr))
        .and_then(Value::as_u64)
        .or_else(|| sum_optional(prompt, completion));

    TokenUsage {
        prompt_tokens: prompt,
        completion_tokens: completion,
        total_tokens: total,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn derives_total_when_missing() {
        let response = json!({ "usage": { "input_tokens": 120, "output_tokens": 30 } });
        let usage = parse_usage(&response, "/usage/input_tokens", "/usage/output_tokens", None);
        assert_eq!(usage.total_tokens, Some(150));
    }

    #[test]
    fn absent_usage_is_all_none() {
        let usage = parse_usage(&json!({}), "/a", "/b", Some("/c"));
        assert_eq!(usage, TokenUsage::default());
    }
}
