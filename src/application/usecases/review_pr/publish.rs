//! 최종 리포트 렌더링 및 게시 단계(Publisher).

use tracing::warn;

use crate::application::ports::VcsGateway;
use crate::application::usecases::review_pr::ReviewPrUseCase;
use crate::domain::error::ReviewError;
use crate::domain::review::{FileSummary, Issue, PostedComment, PrHandle};

/// issue 목록을 하나의 코멘트 본문으로 만든다. 비어 있으면 고정 LGTM 문구.
pub(super) fn render_body(
    use_case: &ReviewPrUseCase<'_>,
    pr: &PrHandle,
    issues: &[Issue],
    summaries: &[FileSummary],
) -> String {
    if issues.is_empty() {
        use_case.renderer.render_lgtm()
    } else {
        use_case.renderer.render_report(pr, issues, summaries)
    }
}

/// 리포트를 issue-level 코멘트 하나로 게시한다.
pub(super) async fn post_inline_comments(
    use_case: &ReviewPrUseCase<'_>,
    vcs: &dyn VcsGateway,
    body: &str,
) -> Result<PostedComment, ReviewError> {
    use_case.reporter.section("Publish");
    use_case.reporter.status("VCS", "posting review comment");

    match vcs.create_comment(body).await {
        Ok(posted) => {
            let location = posted.html_url.as_deref().unwrap_or(&posted.id);
            use_case
                .reporter
                .status("VCS", &format!("review posted: {location}"));
            Ok(posted)
        }
        Err(err) => {
            warn!(error = %format!("{err:#}"), "failed to publish review");
            Err(ReviewError::Publish(format!("{err:#}")))
        }
    }
}
