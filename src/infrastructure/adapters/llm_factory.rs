//! LLM 어댑터 팩토리 포트 구현.

use std::sync::Arc;

use anyhow::Result;

use crate::application::config::Config;
use crate::application::ports::{LlmAdapter, LlmFactory};
use crate::infrastructure::providers;

pub struct LlmFactoryAdapter;

impl LlmFactory for LlmFactoryAdapter {
    fn build(&self, config: &Config, provider: &str) -> Result<Arc<dyn LlmAdapter>> {
        providers::build_adapter(config, provider)
    }
}
