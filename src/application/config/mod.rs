//! 애플리케이션이 사용하는 설정 스키마(순수 데이터).
//!
//! 주의: 파일/환경변수/프로세스 접근은 `infrastructure`에서만 수행한다.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::lens::Topology;

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// 전역 기본값
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// VCS 호스트별 인증/엔드포인트 설정
    #[serde(default)]
    pub hosts: HashMap<String, HostConfig>,
    /// LLM provider 설정
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DefaultsConfig {
    /// single | multi
    pub topology: Option<String>,
    /// gemini | openai | anthropic
    pub provider: Option<String>,
    /// 동시에 진행할 (file, lens) LLM 호출 수
    pub max_concurrency: Option<usize>,
    /// LLM 호출 1회 타임아웃(초)
    pub call_timeout_secs: Option<u64>,
    /// 모든 lens 지시문 뒤에 붙일 리뷰 지침 markdown 파일 경로
    pub review_guide_path: Option<String>,
    /// 리포트에 모델 summary를 포함할지 여부(기본 true)
    pub include_summary: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct HostConfig {
    /// 고정 토큰(민감정보: 권장하지 않음)
    pub token: Option<String>,
    /// 토큰을 읽을 환경변수 이름
    pub token_env: Option<String>,
    /// 토큰을 stdout으로 출력하는 커맨드(예: ["gh","auth","token"])
    pub token_command: Option<Vec<String>>,
    /// API base URL override(선택)
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProvidersConfig {
    pub gemini: Option<ProviderConfig>,
    pub openai: Option<ProviderConfig>,
    pub anthropic: Option<ProviderConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProviderConfig {
    /// provider 활성화 여부(기본 true)
    pub enabled: Option<bool>,
    /// 모델 식별자(선택)
    pub model: Option<String>,
    /// API 베이스 URL(선택)
    pub api_base: Option<String>,
    /// API 인증 키(직접값)
    pub api_key: Option<String>,
    /// API 인증 키를 읽을 환경변수 이름
    pub api_key_env: Option<String>,
    /// 샘플링 온도(기본 0)
    pub temperature: Option<f32>,
}

impl Config {
    /// 설정 문자열을 토폴로지로 해석한다. 알 수 없는 값은 오류.
    pub fn topology(&self) -> Result<Topology, String> {
        match self.defaults.topology.as_deref() {
            Some(raw) => raw.parse(),
            None => Ok(Topology::default()),
        }
    }

    pub fn provider_name(&self) -> String {
        self.defaults
            .provider
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PROVIDER)
            .to_ascii_lowercase()
    }

    pub fn max_concurrency(&self) -> usize {
        self.defaults
            .max_concurrency
            .unwrap_or(DEFAULT_MAX_CONCURRENCY)
            .max(1)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(
            self.defaults
                .call_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_CALL_TIMEOUT_SECS),
        )
    }

    pub fn include_summary(&self) -> bool {
        self.defaults.include_summary.unwrap_or(true)
    }

    pub fn host_config(&self, host: &str) -> Option<&HostConfig> {
        self.hosts.get(host)
    }

    pub fn provider_config(&self, name: &str) -> Option<&ProviderConfig> {
        match name {
            "gemini" => self.providers.gemini.as_ref(),
            "openai" => self.providers.openai.as_ref(),
            "anthropic" => self.providers.anthropic.as_ref(),
            _ => None,
        }
    }

    /// 후순위(나중 파일) 값으로 덮어쓰는 병합 규칙.
    pub fn merge_from(&mut self, other: Config) {
        self.defaults.merge_from(other.defaults);

        for (host, incoming) in other.hosts {
            if let Some(existing) = self.hosts.get_mut(&host) {
                existing.merge_from(incoming);
            } else {
                self.hosts.insert(host, incoming);
            }
        }

        self.providers.merge_from(other.providers);
    }
}

impl DefaultsConfig {
    pub fn merge_from(&mut self, other: DefaultsConfig) {
        if other.topology.is_some() {
            self.topology = other.topology;
        }
        if other.provider.is_some() {
            self.provider = other.provider;
        }
        if other.max_concurrency.is_some() {
            self.max_concurrency = other.max_concurrency;
        }
        if other.call_timeout_secs.is_some() {
            self.call_timeout_secs = other.call_timeout_secs;
        }
        if other.review_guide_path.is_some() {
            self.review_guide_path = other.review_guide_path;
        }
        if other.include_summary.is_some() {
            self.include_summary = other.include_summary;
        }
    }
}

impl HostConfig {
    pub fn merge_from(&mut self, other: HostConfig) {
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.token_env.is_some() {
            self.token_env = other.token_env;
        }
        if other.token_command.is_some() {
            self.token_command = other.token_command;
        }
        if other.api_base.is_some() {
            self.api_base = other.api_base;
        }
    }
}

impl ProviderConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(0.0)
    }

    pub fn merge_from(&mut self, other: ProviderConfig) {
        if other.enabled.is_some() {
            self.enabled = other.enabled;
        }
        if other.model.is_some() {
            self.model = other.model;
        }
        if other.api_base.is_some() {
            self.api_base = other.api_base;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.api_key_env.is_some() {
            self.api_key_env = other.api_key_env;
        }
        if other.temperature.is_some() {
            self.temperature = other.temperature;
        }
    }
}

impl ProvidersConfig {
    pub fn merge_from(&mut self, other: ProvidersConfig) {
        merge_provider_config(&mut self.gemini, other.gemini);
        merge_provider_config(&mut self.openai, other.openai);
        merge_provider_config(&mut self.anthropic, other.anthropic);
    }
}

fn merge_provider_config(target: &mut Option<ProviderConfig>, incoming: Option<ProviderConfig>) {
    match (target.as_mut(), incoming) {
        (Some(existing), Some(next)) => existing.merge_from(next),
        (None, Some(next)) => *target = Some(next),
        _ => {}
    }
}
