//! Google Gemini provider 어댑터(generateContent + responseSchema).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value, json};
use url::Url;

use crate::application::ports::LlmAdapter;
use crate::domain::error::ReviewError;
use crate::domain::review::StructuredResponse;
use crate::domain::schema;

use super::api_runner::{collect_text, send_json};
use super::usage_parser::parse_usage;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiAdapter {
    client: Client,
    base_url: String,
    model: String,
    credential: String,
    temperature: f32,
}

impl GeminiAdapter {
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

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl LlmAdapter for GeminiAdapter {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn complete(
        &self,
        system: &str,
        human: &str,
        schema: &Value,
    ) -> Result<StructuredResponse, ReviewError> {
        let payload = json!({
            "systemInstruction": { "parts": [{ "text": system }] },
            "contents": [
                { "role": "user", "parts": [{ "text": human }] }
            ],
            "generationConfig": {
                "temperature": self.temperature,
                "responseMimeType": "application/json",
                "responseSchema": to_gemini_schema(schema),
            }
        });

        // Gemini는 API key(query) 또는 OAuth(Bearer) 방식 모두 허용한다.
        let request = if self.credential.starts_with("AIza") {
            let mut url = Url::parse(&self.endpoint())
                .map_err(|e| ReviewError::provider(self.name(), format!("invalid endpoint: {e}")))?;
            url.query_pairs_mut().append_pair("key", &self.credential);
            self.client.post(url).json(&payload)
        } else {
            self.client
                .post(self.endpoint())
                .bearer_auth(&self.credential)
                .json(&payload)
        };

        let response = send_json(self.name(), "request Gemini API", request).await?;

        let content = response
            .pointer("/candidates/0/content")
            .map(collect_text)
            .unwrap_or_default();
        if content.trim().is_empty() {
            let reason = response
                .pointer("/promptFeedback/blockReason")
                .or_else(|| response.pointer("/candidates/0/finishReason"))
                .and_then(Value::as_str)
                .unwrap_or("no candidates");
            return Err(ReviewError::provider(
                self.name(),
                format!("empty response content ({reason})"),
            ));
        }

        Ok(StructuredResponse {
            result: schema::parse(&content)?,
            usage: parse_usage(
                &response,
                "/usageMetadata/promptTokenCount",
                "/usageMetadata/candidatesTokenCount",
                Some("/usageMetadata/totalTokenCount"),
            ),
        })
    }
}

/// JSON Schema를 Gemini OpenAPI subset으로 변환한다.
/// 타입 이름은 대문자, `additionalProperties`는 지원하지 않으므로 제거한다.
fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                match key.as_str() {
                    "additionalProperties" => {}
                    "type" => {
                        let upper = value
                            .as_str()
                            .map(|t| Value::String(t.to_ascii_uppercase()))
                            .unwrap_or_else(|| value.clone());
                        out.insert(key.clone(), upper);
                    }
                    "properties" => {
                        let props = value
                            .as_object()
                            .map(|props| {
                                props
                                    .iter()
                                    .map(|(name, prop)| (name.clone(), to_gemini_schema(prop)))
                                    .collect::<Map<_, _>>()
                            })
                            .map(Value::Object)
                            .unwrap_or_else(|| value.clone());
                        out.insert(key.clone(), props);
                    }
                    _ => {
                        out.insert(key.clone(), to_gemini_schema(value));
                    }
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::infrastructure::providers::api_runner::test_client;

    fn adapter(server: &MockServer) -> GeminiAdapter {
        GeminiAdapter::new(
            test_client(),
            server.uri(),
            DEFAULT_MODEL.to_string(),
            "AIza-test".to_string(),
            0.0,
        )
    }

    #[test]
    fn schema_conversion_uppercases_types_and_drops_additional_properties() {
        let converted = to_gemini_schema(&schema::response_schema());

        assert_eq!(converted["type"], "OBJECT");
        assert!(converted.get("additionalProperties").is_none());
        let item = &converted["properties"]["issues"]["items"];
        assert_eq!(item["type"], "OBJECT");
        assert!(item.get("additionalProperties").is_none());
        assert_eq!(item["properties"]["line_number"]["type"], "INTEGER");
        assert_eq!(item["properties"]["severity"]["enum"][0], "Critical");
    }

    #[tokio::test]
    async fn sends_schema_and_parses_structured_reply() {
        let server = MockServer::start().await;
        let reply = json!({
            "candidates": [{
                "content": { "parts": [{ "text":
                    r#"{"issues":[{"file_path":"a.py","line_number":4,"category":"Bug","severity":"Low","description":"d","suggestion":""}],"summary":"ok"}"#
                }]}
            }],
            "usageMetadata": { "promptTokenCount": 50, "candidatesTokenCount": 9, "totalTokenCount": 59 }
        });
        Mock::given(method("POST"))
            .and(path(format!("/models/{DEFAULT_MODEL}:generateContent")))
            .and(query_param("key", "AIza-test"))
            .and(body_partial_json(json!({
                "systemInstruction": { "parts": [{ "text": "sys" }] },
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply))
            .expect(1)
            .mount(&server)
            .await;

        let response = adapter(&server)
            .complete("sys", "File Name: a.py", &schema::response_schema())
            .await
            .unwrap();

        assert_eq!(response.result.issues.len(), 1);
        assert_eq!(response.result.summary, "ok");
        assert_eq!(response.usage.total_tokens, Some(59));
    }

    #[tokio::test]
    async fn http_error_maps_to_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = adapter(&server)
            .complete("sys", "human", &schema::response_schema())
            .await
            .unwrap_err();

        assert!(matches!(err, ReviewError::Provider { .. }));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn blocked_prompt_reports_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "promptFeedback": { "blockReason": "SAFETY" } })),
            )
            .mount(&server)
            .await;

        let err = adapter(&server)
            .complete("sys", "human", &schema::response_schema())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("SAFETY"));
    }
}
