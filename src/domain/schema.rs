//! Issue 스키마: LLM 응답 검증과 structured decoding용 JSON Schema.

use serde_json::{Value, json};

use crate::domain::error::ReviewError;
use crate::domain::review::{IssueCategory, ReviewResult, Severity};

/// 모델이 돌려준 원문 텍스트를 `ReviewResult`로 검증/변환한다.
/// 코드펜스(```json)로 감싼 응답도 허용한다.
pub fn parse(raw_model_output: &str) -> Result<ReviewResult, ReviewError> {
    let body = strip_code_fence(raw_model_output.trim());
    if body.is_empty() {
        return Err(ReviewError::SchemaValidation(
            "empty model output".to_string(),
        ));
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| ReviewError::SchemaValidation(format!("output is not JSON: {e}")))?;
    parse_value(value)
}

/// 이미 JSON으로 받은 응답(tool input 등)을 검증한다.
pub fn parse_value(value: Value) -> Result<ReviewResult, ReviewError> {
    serde_json::from_value(value).map_err(|e| ReviewError::SchemaValidation(e.to_string()))
}

/// provider에 전달할 응답 스키마(JSON Schema subset).
pub fn response_schema() -> Value {
    let categories: Vec<&str> = IssueCategory::ALL.iter().map(|c| c.label()).collect();
    let severities: Vec<&str> = Severity::ALL.iter().map(|s| s.label()).collect();

    json!({
        "type": "object",
        "properties": {
            "issues": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "file_path": {
                            "type": "string",
                            "description": "The full path of the file being reviewed"
                        },
                        "line_number": {
                            "type": "integer",
                            "description": "The specific line number in the NEW file where the issue exists"
                        },
                        "category": { "type": "string", "enum": categories },
                        "severity": { "type": "string", "enum": severities },
                        "description": {
                            "type": "string",
                            "description": "A concise explanation of the issue"
                        },
                        "suggestion": {
                            "type": "string",
                            "description": "Proposed code fix or actionable advice"
                        }
                    },
                    "required": [
                        "file_path", "line_number", "category",
                        "severity", "description", "suggestion"
                    ],
                    "additionalProperties": false
                }
            },
            "summary": {
                "type": "string",
                "description": "A high-level summary of the change quality"
            }
        },
        "required": ["issues", "summary"],
        "additionalProperties": false
    })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // 첫 줄(언어 태그)을 건너뛴다.
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
