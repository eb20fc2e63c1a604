//! Anthropic/Claude provider 어댑터. 강제 tool 호출로 구조화 응답을 받는다.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::application::ports::LlmAdapter;
use crate::domain::error::ReviewError;
use crate::domain::review::StructuredResponse;
use crate::domain::schema;

use super::api_runner::send_json;
use super::usage_parser::parse_usage;

pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-latest";
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com/v1";

const API_VERSION: &str = "2023-06-01";
const TOOL_NAME: &str = "record_review";
const MAX_TOKENS: u32 = 4096;

pub struct AnthropicAdapter {
    client: Client,
    base_url: String,
    model: String,
    credential: String,
    temperature: f32,
}

impl AnthropicAdapter {
    pub fn new(
        client: Client,
        base_url: String,
        model: String,
        credential: String,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            base_url,
            model,
            credential,
            temperature,
        }
    }
}

#[async_trait]
impl LlmAdapter for AnthropicAdapter {
    fn name(&self) -> &str {
        "Claude"
    }

    async fn complete(
        &self,
        system: &str,
        human: &str,
        schema: &Value,
    ) -> Result<StructuredResponse, ReviewError> {
        let endpoint = format!("{}/messages", self.base_url.trim_end_matches('/'));
        let payload = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": self.temperature,
            "system": system,
            "messages": [
                { "role": "user", "content": human }
            ],
            "tools": [{
                "name": TOOL_NAME,
                "description": "Record the review findings for this file.",
                "input_schema": schema
            }],
            "tool_choice": { "type": "tool", "name": TOOL_NAME }
        });

        // Anthropic API key(sk-ant-...)와 OAuth/Bearer 토큰을 모두 수용한다.
        let request = if self.credential.starts_with("sk-ant-") {
            self.client
                .post(endpoint)
                .header("x-api-key", &self.credential)
        } else {
            self.client.post(endpoint).bearer_auth(&self.credential)
        };
        let request = request.header("anthropic-version", API_VERSION).json(&payload);

        let response = send_json(self.name(), "request Anthropic API", request).await?;

        let input = response
            .get("content")
            .and_then(Value::as_array)
            .and_then(|blocks| {
                blocks.iter().find(|block| {
                    block.get("type").and_then(Value::as_str) == Some("tool_use")
                        && block.get("name").and_then(Value::as_str) == Some(TOOL_NAME)
                })
            })
            .and_then(|block| block.get("input"))
            .cloned()
            .ok_or_else(|| {
                ReviewError::SchemaValidation(format!("response has no {TOOL_NAME} tool call"))
            })?;

        Ok(StructuredResponse {
            result: schema::parse_value(input)?,
            usage: parse_usage(&response, "/usage/input_tokens", "/usage/output_tokens", None),
        })
    }
}
