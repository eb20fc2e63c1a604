//! VCS 연동 계층. 현재는 GitHub(및 Enterprise)만 지원한다.

pub mod github;

use crate::application::config::HostConfig;
use crate::application::ports::VcsGateway;
use crate::domain::target::ReviewTarget;

pub fn build_vcs_client(
    target: &ReviewTarget,
    host_cfg: Option<&HostConfig>,
    token: Option<String>,
) -> Box<dyn VcsGateway> {
    let api_base = host_cfg.and_then(|h| h.api_base.clone());
    Box::new(github::GitHubClient::new(
        target.host.clone(),
        target.owner.clone(),
        target.repo.clone(),
        target.number,
        token,
        api_base,
    ))
}
