//! 설정 값(token/env/cmd 등)을 실제 런타임 값으로 해석하는 유틸리티.
//!
//! - 환경변수/프로세스 실행은 인프라 계층에서만 수행한다.
//! - 해석은 실행당 한 번이며, 결과는 생성자 인자로 어댑터에 전달된다.

use std::env;
use std::process::Command;

use anyhow::{Context, Result};

use crate::application::config::{HostConfig, ProviderConfig};
use crate::application::ports::HostTokenResolution;
use crate::domain::target::DEFAULT_HOST;

/// 설정이 없을 때 github.com에서 차례로 확인하는 환경변수.
const GITHUB_TOKEN_FALLBACKS: [&str; 2] = ["GITHUB_TOKEN", "GITHUB_ACCESS_TOKEN"];

/// Provider(API key) 해석 결과.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentialResolution {
    pub credential: Option<String>,
    pub source: Option<String>,
}

/// provider별 기본 API key 환경변수.
pub fn default_api_key_env(provider: &str) -> Option<&'static str> {
    match provider {
        "gemini" => Some("GOOGLE_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        _ => None,
    }
}

/// Host(VCS) 토큰을 해석한다. 우선순위: token > token_env > token_command > 기본 env.
pub fn resolve_host_token(host: &str, host_cfg: Option<&HostConfig>) -> Result<HostTokenResolution> {
    resolve_host_token_with(host, host_cfg, read_env)
}

/// Provider API key를 해석한다. 우선순위: api_key > api_key_env > 기본 env.
pub fn resolve_provider_api_key(
    provider: &str,
    cfg: Option<&ProviderConfig>,
) -> ProviderCredentialResolution {
    resolve_provider_api_key_with(provider, cfg, read_env)
}

fn read_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn resolve_host_token_with(
    host: &str,
    host_cfg: Option<&HostConfig>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<HostTokenResolution> {
    let mut hint: Option<String> = None;

    if let Some(cfg) = host_cfg {
        if let Some(token) = non_blank(cfg.token.as_deref()) {
            return Ok(HostTokenResolution {
                token: Some(token.to_string()),
                source: Some("inline".to_string()),
            });
        }

        if let Some(env_name) = non_blank(cfg.token_env.as_deref()) {
            if let Some(v) = lookup(env_name).filter(|v| !v.trim().is_empty()) {
                return Ok(HostTokenResolution {
                    token: Some(v.trim().to_string()),
                    source: Some(format!("env:{env_name}")),
                });
            }
            hint = Some(format!("env:{env_name} (missing)"));
        }

        if let Some(cmd) = cfg
            .token_command
            .as_ref()
            .filter(|v| v.iter().any(|s| !s.trim().is_empty()))
        {
            let label = format!("cmd:{}", cmd.join(" "));
            match run_token_command(cmd) {
                Ok(token) if !token.trim().is_empty() => {
                    return Ok(HostTokenResolution {
                        token: Some(token.trim().to_string()),
                        source: Some(label),
                    });
                }
                Ok(_) => hint = Some(format!("{label} (empty)")),
                Err(_) => hint = Some(format!("{label} (failed)")),
            }
        }
    }

    if host == DEFAULT_HOST {
        for env_name in GITHUB_TOKEN_FALLBACKS {
            if let Some(v) = lookup(env_name).filter(|v| !v.trim().is_empty()) {
                return Ok(HostTokenResolution {
                    token: Some(v.trim().to_string()),
                    source: Some(format!("env:{env_name}")),
                });
            }
        }
    }

    Ok(HostTokenResolution {
        token: None,
        source: hint,
    })
}

fn resolve_provider_api_key_with(
    provider: &str,
    cfg: Option<&ProviderConfig>,
    lookup: impl Fn(&str) -> Option<String>,
) -> ProviderCredentialResolution {
    if let Some(key) = cfg.and_then(|c| non_blank(c.api_key.as_deref())) {
        return ProviderCredentialResolution {
            credential: Some(key.to_string()),
            source: Some("inline".to_string()),
        };
    }

    let Some(env_name) = cfg
        .and_then(|c| non_blank(c.api_key_env.as_deref()))
        .or_else(|| default_api_key_env(provider))
    else {
        return ProviderCredentialResolution::default();
    };

    match lookup(env_name).map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => ProviderCredentialResolution {
            credential: Some(v),
            source: Some(format!("env:{env_name}")),
        },
        _ => ProviderCredentialResolution {
            credential: None,
            source: Some(format!("env:{env_name} (missing)")),
        },
    }
}

fn run_token_command(cmd: &[String]) -> Result<String> {
    let program = cmd
        .first()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .context("token_command is empty")?;

    let output = Command::new(&program)
        .args(&cmd[1..])
        .output()
        .with_context(|| format!("failed to run token command: {program}"))?;

    if !output.status.success() {
        anyhow::bail!("token command failed: {program} ({})", output.status);
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn inline_token_wins() {
        let cfg = HostConfig {
            token: Some(" ghp_inline ".into()),
            token_env: Some("CUSTOM".into()),
            ..HostConfig::default()
        };
        let res =
            resolve_host_token_with("github.com", Some(&cfg), env_of(&[("CUSTOM", "x")])).unwrap();
        assert_eq!(res.token.as_deref(), Some("ghp_inline"));
        assert_eq!(res.source.as_deref(), Some("inline"));
    }

    #[test]
    fn github_falls_back_to_access_token_env() {
        let res = resolve_host_token_with(
            "github.com",
            None,
            env_of(&[("GITHUB_ACCESS_TOKEN", "ghp_legacy")]),
        )
        .unwrap();
        assert_eq!(res.token.as_deref(), Some("ghp_legacy"));
        assert_eq!(res.source.as_deref(), Some("env:GITHUB_ACCESS_TOKEN"));
    }

    #[test]
    fn enterprise_host_has_no_implicit_fallback() {
        let cfg = HostConfig {
            token_env: Some("GHE_TOKEN".into()),
            ..HostConfig::default()
        };
        let res = resolve_host_token_with(
            "ghe.corp.local",
            Some(&cfg),
            env_of(&[("GITHUB_TOKEN", "ghp_public")]),
        )
        .unwrap();
        assert!(res.token.is_none());
        assert_eq!(res.source.as_deref(), Some("env:GHE_TOKEN (missing)"));
    }

    #[test]
    fn provider_key_uses_builtin_env_name() {
        let res = resolve_provider_api_key_with(
            "gemini",
            None,
            env_of(&[("GOOGLE_API_KEY", "AIza-test")]),
        );
        assert_eq!(res.credential.as_deref(), Some("AIza-test"));
        assert_eq!(res.source.as_deref(), Some("env:GOOGLE_API_KEY"));
    }

    #[test]
    fn provider_key_reports_missing_env() {
        let cfg = ProviderConfig {
            api_key_env: Some("MY_OPENAI".into()),
            ..ProviderConfig::default()
        };
        let res = resolve_provider_api_key_with("openai", Some(&cfg), env_of(&[]));
        assert!(res.credential.is_none());
        assert_eq!(res.source.as_deref(), Some("env:MY_OPENAI (missing)"));
    }
}
