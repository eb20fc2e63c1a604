//! 대상 식별자 파싱 포트 구현 어댑터.

use anyhow::Result;

use crate::application::ports::TargetResolver;
use crate::domain::target::ReviewTarget;

/// `owner/repo`, `owner/repo#N`, PR URL을 도메인 타깃으로 변환하는 어댑터.
pub struct GitHubTargetResolver;

impl TargetResolver for GitHubTargetResolver {
    fn parse(&self, input: &str, pr_number: Option<u64>) -> Result<ReviewTarget> {
        Ok(ReviewTarget::parse(input, pr_number)?)
    }
}
