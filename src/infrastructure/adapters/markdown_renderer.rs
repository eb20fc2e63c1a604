//! 마크다운 렌더링 포트 구현 어댑터.

use crate::application::ports::MarkdownRenderer;
use crate::domain::review::{FileSummary, Issue, PrHandle};
use crate::infrastructure::render;

/// 마크다운 렌더링 어댑터.
pub struct MarkdownRendererAdapter;

impl MarkdownRenderer for MarkdownRendererAdapter {
    fn render_report(&self, pr: &PrHandle, issues: &[Issue], summaries: &[FileSummary]) -> String {
        render::render_report_markdown(pr, issues, summaries)
    }

    fn render_lgtm(&self) -> String {
        render::render_lgtm()
    }
}
