//! VCS 게이트웨이 팩토리 포트 구현 어댑터.

use crate::application::config::HostConfig;
use crate::application::ports::{VcsFactory, VcsGateway};
use crate::domain::target::ReviewTarget;
use crate::infrastructure::vcs;

pub struct VcsFactoryAdapter;

impl VcsFactory for VcsFactoryAdapter {
    fn build(
        &self,
        target: &ReviewTarget,
        host_cfg: Option<&HostConfig>,
        token: Option<String>,
    ) -> Box<dyn VcsGateway> {
        vcs::build_vcs_client(target, host_cfg, token)
    }
}
