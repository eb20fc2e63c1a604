//! 리뷰 실행 컨텍스트(설정/대상/어댑터/변경 파일) 준비 단계.
//!
//! 여기서 실패하면 LLM 호출은 한 번도 일어나지 않는다.

use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::application::config::Config;
use crate::application::ports::{LlmAdapter, VcsGateway};
use crate::application::usecases::review_pr::ReviewPrUseCase;
use crate::domain::error::ReviewError;
use crate::domain::lens::Topology;
use crate::domain::review::{ChangedFile, PrHandle, RunOptions};
use crate::domain::target::ReviewTarget;

/// 리뷰 유스케이스 전 구간에서 공유되는 실행 상태.
pub(super) struct ExecutionContext {
    pub config: Config,
    pub target: ReviewTarget,
    pub topology: Topology,
    pub llm: Arc<dyn LlmAdapter>,
    pub review_guide: Option<String>,
    pub vcs: Box<dyn VcsGateway>,
    pub pr: PrHandle,
    pub files: Vec<ChangedFile>,
}

/// 설정 로딩, 대상 파싱, 어댑터 구성, 변경 파일 조회까지 선행한다.
pub(super) async fn load_execution_context(
    use_case: &ReviewPrUseCase<'_>,
    options: &RunOptions,
) -> Result<ExecutionContext> {
    use_case.reporter.section("Load Config");
    let config = use_case
        .config_repo
        .load()
        .context("failed to load prlens config")?;

    let target = use_case
        .target_resolver
        .parse(&options.target, options.pr_number)?;

    let topology = match options.topology {
        Some(topology) => topology,
        None => config.topology().map_err(ReviewError::Input)?,
    };
    let provider = options
        .provider
        .clone()
        .unwrap_or_else(|| config.provider_name());

    let llm = use_case
        .llm_factory
        .build(&config, &provider)
        .with_context(|| format!("failed to configure LLM provider '{provider}'"))?;
    let review_guide = use_case
        .system_prompt_resolver
        .review_guide(&config)
        .context("failed to load review guide")?;

    use_case.reporter.kv("Repository", &target.repo_name());
    use_case.reporter.kv("PR", &format!("#{}", target.number));
    use_case.reporter.kv("Topology", topology.code());
    use_case.reporter.kv("Provider", llm.name());
    if let Some(path) = &config.defaults.review_guide_path {
        use_case.reporter.kv("Guide", path);
    }

    let host_cfg = config.host_config(&target.host);
    let token = use_case
        .host_token_resolver
        .resolve(&target.host, host_cfg)?
        .token;

    if !options.dry_run && token.is_none() {
        bail!(
            "missing VCS token for host '{}'. Configure hosts.{}.token, token_env or token_command, or use --dry-run",
            target.host,
            target.host,
        );
    }

    let vcs = use_case.vcs_factory.build(&target, host_cfg, token);

    use_case.reporter.section("Fetch Changes");
    use_case.reporter.status("VCS", "fetching changed files");
    let (pr, files) = vcs.get_pr_files().await?;
    use_case.reporter.kv("Title", &pr.title);
    if !pr.html_url.is_empty() {
        use_case.reporter.kv("URL", &pr.html_url);
    }
    use_case.reporter.kv("Files", &files.len().to_string());

    if files.is_empty() {
        return Err(ReviewError::Input(format!(
            "No analysable files in {}#{} (all binary or deleted)",
            target.repo_name(),
            target.number
        ))
        .into());
    }

    Ok(ExecutionContext {
        config,
        target,
        topology,
        llm,
        review_guide,
        vcs,
        pr,
        files,
    })
}
