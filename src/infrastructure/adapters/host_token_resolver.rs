//! 호스트(VCS) 토큰 해석 포트 구현.

use anyhow::Result;
use tracing::debug;

use crate::application::config::HostConfig;
use crate::application::ports::{HostTokenResolution, HostTokenResolver};
use crate::infrastructure::config::resolve_host_token;

/// 설정(token/env/cmd)과 기본 환경변수에 기반해 런타임 토큰을 해석한다.
pub struct HostTokenResolverAdapter;

impl HostTokenResolver for HostTokenResolverAdapter {
    fn resolve(&self, host: &str, host_cfg: Option<&HostConfig>) -> Result<HostTokenResolution> {
        let resolution = resolve_host_token(host, host_cfg)?;
        debug!(
            host,
            source = resolution.source.as_deref().unwrap_or("-"),
            resolved = resolution.token.is_some(),
            "resolved VCS token"
        );
        Ok(resolution)
    }
}
