//! PR 리뷰 실행의 전체 오케스트레이션 유스케이스.

mod context;
pub mod pipeline;
mod publish;
pub mod reviewer;
#[cfg(test)]
pub(crate) mod testing;

use anyhow::{Context, Result};

use crate::application::ports::{
    ConfigRepository, HostTokenResolver, LlmFactory, MarkdownRenderer, Reporter,
    SystemPromptResolver, TargetResolver, VcsFactory,
};
use crate::domain::error::ReviewError;
use crate::domain::review::{FileSummary, Issue, PostedComment, PrHandle, RunOptions};

use context::load_execution_context;
use pipeline::{CallFailure, ReviewPipeline};
use publish::{post_inline_comments, render_body};

/// 리뷰 1회 실행 결과. 게시 실패 시에도 계산된 결과는 남는다.
#[derive(Debug)]
pub struct ReviewOutcome {
    pub pr: PrHandle,
    pub issues: Vec<Issue>,
    pub summaries: Vec<FileSummary>,
    pub failures: Vec<CallFailure>,
    pub report: String,
    pub published: Option<PostedComment>,
    pub publish_error: Option<ReviewError>,
}

/// 대상 입력부터 diff 조회, lens 리뷰, 리포트 게시까지 전체 흐름을 조율한다.
pub struct ReviewPrUseCase<'a> {
    pub config_repo: &'a dyn ConfigRepository,
    pub host_token_resolver: &'a dyn HostTokenResolver,
    pub system_prompt_resolver: &'a dyn SystemPromptResolver,
    pub target_resolver: &'a dyn TargetResolver,
    pub vcs_factory: &'a dyn VcsFactory,
    pub llm_factory: &'a dyn LlmFactory,
    pub renderer: &'a dyn MarkdownRenderer,
    pub reporter: &'a dyn Reporter,
}

impl<'a> ReviewPrUseCase<'a> {
    /// 리뷰 본 실행 진입점.
    /// 설정/대상/diff 준비 단계의 실패만 `Err`로 돌려주고, 게시 실패는 결과에 담는다.
    pub async fn execute(&self, options: RunOptions) -> Result<ReviewOutcome> {
        self.reporter.section("Session");
        self.reporter.kv("Target", &options.target);
        self.reporter.kv(
            "Mode",
            if options.dry_run {
                "dry-run"
            } else {
                "post-comment"
            },
        );

        let ctx = load_execution_context(self, &options).await?;

        let concurrency = options
            .concurrency
            .unwrap_or_else(|| ctx.config.max_concurrency());
        let pipeline = ReviewPipeline::for_topology(
            ctx.topology,
            ctx.llm.clone(),
            ctx.review_guide.as_deref(),
            ctx.config.call_timeout(),
            concurrency,
        );

        self.reporter
            .section(&format!("Lenses ({})", ctx.topology.code()));
        let outcome = pipeline
            .run(
                &ctx.pr.repo_name(),
                ctx.pr.number,
                &ctx.files,
                self.reporter,
            )
            .await;

        for failure in &outcome.failures {
            self.reporter.status(
                "Degraded",
                &format!(
                    "{} on {}: {}",
                    failure.lens.label(),
                    failure.file_path,
                    failure.error
                ),
            );
        }

        for (lens, usage) in &outcome.usage {
            if let Some(total) = usage.total_tokens {
                self.reporter
                    .kv(&format!("Tokens/{}", lens.label()), &total.to_string());
            }
        }

        if options.json {
            let json = serde_json::to_string_pretty(&outcome.issues)
                .context("failed to serialize issues")?;
            self.reporter.raw(&json);
        }

        let summaries = if ctx.config.include_summary() {
            outcome.summaries
        } else {
            Vec::new()
        };
        let report = render_body(self, &ctx.pr, &outcome.issues, &summaries);

        let (published, publish_error) = if options.dry_run {
            self.reporter.section("Report (dry-run)");
            if !options.json {
                self.reporter.raw(&report);
            }
            (None, None)
        } else {
            match post_inline_comments(self, ctx.vcs.as_ref(), &report).await {
                Ok(posted) => (Some(posted), None),
                Err(err) => (None, Some(err)),
            }
        };

        Ok(ReviewOutcome {
            pr: ctx.pr,
            issues: outcome.issues,
            summaries,
            failures: outcome.failures,
            report,
            published,
            publish_error,
        })
    }
}
