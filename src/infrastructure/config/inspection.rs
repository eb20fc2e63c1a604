//! 적용 설정 진단(inspection) 뷰 모델. 비밀값은 출처만 남긴다.

use std::collections::BTreeMap;

use serde::Serialize;

use super::loader::LoadedConfig;
use super::resolve::{resolve_host_token, resolve_provider_api_key};
use crate::application::config::{Config, DefaultsConfig, HostConfig};
use crate::domain::target::DEFAULT_HOST;
use crate::infrastructure::providers::{PROVIDER_NAMES, default_model};

const REDACTED: &str = "***";

#[derive(Debug, Clone, Serialize)]
pub struct ConfigInspection {
    pub searched_paths: Vec<String>,
    pub loaded_paths: Vec<String>,
    pub defaults: DefaultsConfig,
    pub effective_defaults: EffectiveDefaults,
    pub hosts: BTreeMap<String, HostInspection>,
    pub providers: BTreeMap<String, ProviderInspection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveDefaults {
    pub topology: String,
    pub provider: String,
    pub max_concurrency: usize,
    pub call_timeout_secs: u64,
    pub review_guide_path: Option<String>,
    pub include_summary: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostInspection {
    pub token: Option<String>,
    pub token_source: Option<String>,
    pub token_resolved: bool,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderInspection {
    pub enabled: bool,
    pub selected: bool,
    pub model: String,
    pub api_base: Option<String>,
    pub api_key: Option<String>,
    pub api_key_source: Option<String>,
    pub api_key_resolved: bool,
    pub temperature: f32,
}

impl ConfigInspection {
    pub(crate) fn from_loaded(loaded: LoadedConfig) -> Self {
        let config = &loaded.config;

        let mut hosts = BTreeMap::new();
        hosts.insert(
            DEFAULT_HOST.to_string(),
            host_inspection(DEFAULT_HOST, config.host_config(DEFAULT_HOST)),
        );
        for (host, cfg) in &config.hosts {
            hosts.insert(host.clone(), host_inspection(host, Some(cfg)));
        }

        let selected = config.provider_name();
        let providers = PROVIDER_NAMES
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    provider_inspection(config, name, *name == selected),
                )
            })
            .collect();

        Self {
            searched_paths: loaded
                .searched_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            loaded_paths: loaded
                .loaded_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            defaults: config.defaults.clone(),
            effective_defaults: EffectiveDefaults {
                topology: config
                    .topology()
                    .map(|t| t.code().to_string())
                    .unwrap_or_else(|err| format!("invalid: {err}")),
                provider: selected,
                max_concurrency: config.max_concurrency(),
                call_timeout_secs: config.call_timeout().as_secs(),
                review_guide_path: config.defaults.review_guide_path.clone(),
                include_summary: config.include_summary(),
            },
            hosts,
            providers,
        }
    }
}

fn host_inspection(host: &str, cfg: Option<&HostConfig>) -> HostInspection {
    let token_resolution = resolve_host_token(host, cfg).ok();
    HostInspection {
        token: cfg.and_then(|c| c.token.as_ref()).map(|_| REDACTED.to_string()),
        token_source: token_resolution.as_ref().and_then(|r| r.source.clone()),
        token_resolved: token_resolution
            .as_ref()
            .and_then(|r| r.token.as_ref())
            .is_some(),
        api_base: cfg.and_then(|c| c.api_base.clone()),
    }
}

fn provider_inspection(config: &Config, name: &str, selected: bool) -> ProviderInspection {
    let cfg = config.provider_config(name);
    let resolution = resolve_provider_api_key(name, cfg);
    ProviderInspection {
        enabled: cfg.is_none_or(|c| c.is_enabled()),
        selected,
        model: cfg
            .and_then(|c| c.model.clone())
            .or_else(|| default_model(name).map(str::to_string))
            .unwrap_or_default(),
        api_base: cfg.and_then(|c| c.api_base.clone()),
        api_key: cfg
            .and_then(|c| c.api_key.as_ref())
            .map(|_| REDACTED.to_string()),
        api_key_source: resolution.source,
        api_key_resolved: resolution.credential.is_some(),
        temperature: cfg.map(|c| c.temperature()).unwrap_or(0.0),
    }
}
