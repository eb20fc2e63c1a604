//! LLM provider 어댑터 모음.
//! 각 provider API의 structured output 기능으로 `ReviewResult` 스키마 응답을 받는다.

pub mod anthropic;
mod api_runner;
pub mod gemini;
pub mod openai;
mod usage_parser;

use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::debug;

use crate::application::config::Config;
use crate::application::ports::LlmAdapter;
use crate::infrastructure::config::resolve_provider_api_key;

pub use api_runner::build_api_client;

pub const PROVIDER_NAMES: [&str; 3] = ["gemini", "openai", "anthropic"];

/// provider 이름별 기본 모델.
pub fn default_model(provider: &str) -> Option<&'static str> {
    match provider {
        "gemini" => Some(gemini::DEFAULT_MODEL),
        "openai" => Some(openai::DEFAULT_MODEL),
        "anthropic" => Some(anthropic::DEFAULT_MODEL),
        _ => None,
    }
}

fn default_api_base(provider: &str) -> &'static str {
    match provider {
        "openai" => openai::DEFAULT_API_BASE,
        "anthropic" => anthropic::DEFAULT_API_BASE,
        _ => gemini::DEFAULT_API_BASE,
    }
}

/// 설정에서 선택된 provider 어댑터를 만든다. 자격증명이 없으면 LLM 호출 전에 실패한다.
pub fn build_adapter(config: &Config, provider: &str) -> Result<Arc<dyn LlmAdapter>> {
    let provider = provider.trim().to_ascii_lowercase();
    let Some(model_default) = default_model(&provider) else {
        bail!(
            "unknown provider '{provider}' (expected one of: {})",
            PROVIDER_NAMES.join(", ")
        );
    };

    let cfg = config.provider_config(&provider);
    if cfg.is_some_and(|c| !c.is_enabled()) {
        bail!("provider '{provider}' is disabled in config");
    }

    let resolution = resolve_provider_api_key(&provider, cfg);
    let Some(credential) = resolution.credential else {
        bail!(
            "missing API key for provider '{provider}' ({})",
            resolution.source.as_deref().unwrap_or("not configured")
        );
    };

    let base_url = cfg
        .and_then(|c| c.api_base.clone())
        .unwrap_or_else(|| default_api_base(&provider).to_string());
    let model = cfg
        .and_then(|c| c.model.clone())
        .unwrap_or_else(|| model_default.to_string());
    let temperature = cfg.map(|c| c.temperature()).unwrap_or(0.0);
    let client = build_api_client();

    debug!(
        provider = %provider,
        model = %model,
        key_source = resolution.source.as_deref().unwrap_or("-"),
        "configured LLM adapter"
    );

    let adapter: Arc<dyn LlmAdapter> = match provider.as_str() {
        "openai" => Arc::new(openai::OpenAiAdapter::new(
            client,
            base_url,
            model,
            credential,
            temperature,
        )),
        "anthropic" => Arc::new(anthropic::AnthropicAdapter::new(
            client,
            base_url,
            model,
            credential,
            temperature,
        )),
        _ => Arc::new(gemini::GeminiAdapter::new(
            client,
            base_url,
            model,
            credential,
            temperature,
        )),
    };
    Ok(adapter)
}
