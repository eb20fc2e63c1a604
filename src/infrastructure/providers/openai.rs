//! OpenAI provider 어댑터(chat/completions + json_schema response_format).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::application::ports::LlmAdapter;
use crate::domain::error::ReviewError;
use crate::domain::review::StructuredResponse;
use crate::domain::schema;

use super::api_runner::send_json;
use super::usage_parser::parse_usage;

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

pub struct OpenAiAdapter {
    client: Client,
    base_url: String,
    model: String,
    credential: String,
    temperature: f32,
}

impl OpenAiAdapter {
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
impl LlmAdapter for OpenAiAdapter {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn complete(
        &self,
        system: &str,
        human: &str,
        schema: &Value,
    ) -> Result<StructuredResponse, ReviewError> {
        let endpoint = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let payload = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": human }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "review_result",
                    "strict": true,
                    "schema": schema
                }
            }
        });

        let response = send_json(
            self.name(),
            "request OpenAI API",
            self.client
                .post(endpoint)
                .bearer_auth(&self.credential)
                .json(&payload),
        )
        .await?;

        let message = response.pointer("/choices/0/message");
        if let Some(refusal) = message
            .and_then(|m| m.get("refusal"))
            .and_then(Value::as_str)
        {
            return Err(ReviewError::provider(
                self.name(),
                format!("model refused: {refusal}"),
            ));
        }

        let content = message
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        Ok(StructuredResponse {
            result: schema::parse(content)?,
            usage: parse_usage(
                &response,
                "/usage/prompt_tokens",
                "/usage/completion_tokens",
                Some("/usage/total_tokens"),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::infrastructure::providers::api_runner::test_client;

    fn adapter(server: &MockServer) -> OpenAiAdapter {
        OpenAiAdapter::new(
            test_client(),
            server.uri(),
            DEFAULT_MODEL.to_string(),
            "sk-test".to_string(),
            0.0,
        )
    }

    #[tokio::test]
    async fn requests_strict_json_schema() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": DEFAULT_MODEL,
                "response_format": { "type": "json_schema", "json_schema": { "strict": true } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "{\"issues\":[],\"summary\":\"clean\"}" } }],
                "usage": { "prompt_tokens": 40, "completion_tokens": 5, "total_tokens": 45 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = adapter(&server)
            .complete("sys", "human", &schema::response_schema())
            .await
            .unwrap();

        assert!(response.result.issues.is_empty());
        assert_eq!(response.result.summary, "clean");
        assert_eq!(response.usage.prompt_tokens, Some(40));
    }

    #[tokio::test]
    async fn refusal_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": null, "refusal": "cannot help" } }]
            })))
            .mount(&server)
            .await;

        let err = adapter(&server)
            .complete("sys", "human", &schema::response_schema())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("cannot help"));
    }

    #[tokio::test]
    async fn off_schema_content_is_schema_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "{\"findings\":[]}" } }]
            })))
            .mount(&server)
            .await;

        let err = adapter(&server)
            .complete("sys", "human", &schema::response_schema())
            .await
            .unwrap_err();

        assert!(matches!(err, ReviewError::SchemaValidation(_)));
    }
}
