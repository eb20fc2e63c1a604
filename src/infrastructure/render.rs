//! VCS 코멘트용 Markdown 렌더링 모듈.

use crate::domain::policy::group_by_file;
use crate::domain::review::{FileSummary, Issue, PrHandle, Severity};

pub const REPORT_HEADER: &str = "## AI Code Reviewer Report";
pub const LGTM_TEXT: &str = "AI Review: LGTM! No significant issues found.";

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::Medium => "⚠️",
        Severity::Low => "ℹ️",
    }
}

/// issue 목록을 파일별로 묶은 리포트 본문을 생성한다.
/// 파일 순서는 첫 등장 순서, 파일 내 issue 순서는 입력 순서를 따른다.
pub fn render_report_markdown(pr: &PrHandle, issues: &[Issue], summaries: &[FileSummary]) -> String {
    let mut out = String::new();
    out.push_str(REPORT_HEADER);
    out.push_str("\n\n");

    for (file, file_issues) in group_by_file(issues) {
        out.push_str(&format!("### 📄 `{file}`\n"));
        for issue in file_issues {
            out.push_str(&format!(
                "\n**{} Line {} ({})**\n",
                severity_icon(issue.severity),
                issue.line_number,
                issue.category
            ));
            out.push_str(issue.description.trim());
            out.push('\n');
            let suggestion = issue.suggestion.trim_end();
            if !suggestion.trim().is_empty() {
                let fence = fence_for(suggestion);
                out.push_str(&format!("{fence}suggestion\n{suggestion}\n{fence}\n"));
            }
        }
        out.push_str("---\n");
    }

    if !summaries.is_empty() {
        out.push_str("\n<details><summary>Reviewer summaries</summary>\n\n");
        for summary in summaries {
            out.push_str(&format!(
                "- **{}** ({}): {}\n",
                summary.file_path,
                summary.lens.label(),
                summary.text
            ));
        }
        out.push_str("\n</details>\n");
    }

    if !pr.head_sha.is_empty() {
        let short: String = pr.head_sha.chars().take(7).collect();
        out.push_str(&format!("\n<sub>Head SHA: `{short}`</sub>\n"));
    }

    out
}

/// 본문 안의 가장 긴 backtick 연속보다 한 칸 긴 펜스. 최소 세 개.
fn fence_for(body: &str) -> String {
    let longest = body
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

pub fn render_lgtm() -> String {
    LGTM_TEXT.to_string()
}
