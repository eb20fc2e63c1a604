//! 도메인 정책(프롬프트 구성, 결과 후처리, 병합 규칙).

use crate::domain::lens::LensConfig;
use crate::domain::review::{ChangedFile, Issue};

/// lens 지시문 + 제외 주제 + (선택) 리뷰 가이드를 합쳐 시스템 지시문을 만든다.
pub fn build_system_instruction(lens: &LensConfig, review_guide: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(lens.instruction.trim());
    out.push('\n');

    if !lens.ignore.is_empty() {
        out.push_str(&format!("Ignore: {}.\n", lens.ignore.join(", ")));
    }

    out.push_str(
        "Line numbers must refer to the NEW version of the file. \
         If there is nothing worth reporting, return an empty issues list.\n",
    );

    if let Some(guide) = review_guide.map(str::trim).filter(|g| !g.is_empty()) {
        out.push_str("\nReview guide (must follow):\n");
        out.push_str(guide);
        out.push('\n');
    }

    out
}

/// 호출별 사람 메시지(파일명 + patch 원문).
pub fn build_human_message(file: &ChangedFile) -> String {
    format!("File Name: {}\n\nGit Patch:\n{}", file.path, file.patch)
}

/// 모델이 만든 issue에서 신뢰하지 않는 두 필드를 확정값으로 교체한 새 issue를 만든다.
pub fn stamp_issue(issue: Issue, file: &ChangedFile, lens: &LensConfig) -> Issue {
    Issue {
        file_path: file.path.clone(),
        category: lens.category.unwrap_or(issue.category),
        ..issue
    }
}

/// lens 버킷을 주어진 순서대로 이어 붙인다. 버킷 내부 순서는 유지한다.
pub fn aggregate<B: AsRef<[Issue]>>(buckets: &[B]) -> Vec<Issue> {
    let total = buckets.iter().map(|b| b.as_ref().len()).sum();
    let mut out = Vec::with_capacity(total);
    for bucket in buckets {
        out.extend_from_slice(bucket.as_ref());
    }
    out
}

/// `file_path` 첫 등장 순서대로 issue를 묶는다.
pub fn group_by_file(issues: &[Issue]) -> Vec<(&str, Vec<&Issue>)> {
    let mut groups: Vec<(&str, Vec<&Issue>)> = Vec::new();
    for issue in issues {
        match groups.iter_mut().find(|(path, _)| *path == issue.file_path) {
            Some((_, list)) => list.push(issue),
            None => groups.push((issue.file_path.as_str(), vec![issue])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lens::Lens;
    use crate::domain::review::{IssueCategory, Severity};

    fn issue(path: &str, line: u32, category: IssueCategory) -> Issue {
        Issue {
            file_path: path.to_string(),
            line_number: line,
            category,
            severity: Severity::Low,
            description: format!("{path}:{line}"),
            suggestion: String::new(),
        }
    }

    #[test]
    fn aggregate_keeps_bucket_order_and_skips_empty() {
        let s = vec![issue("a.py", 1, IssueCategory::Security)];
        let p = vec![
            issue("a.py", 2, IssueCategory::Performance),
            issue("b.py", 3, IssueCategory::Performance),
        ];
        let st: Vec<Issue> = Vec::new();

        let merged = aggregate(&[s.clone(), p.clone(), st]);
        assert_eq!(merged, vec![s[0].clone(), p[0].clone(), p[1].clone()]);
    }

    #[test]
    fn stamp_overrides_path_and_category() {
        let file = ChangedFile::new("src/db.py", "+x");
        let raw = issue("somewhere/else.py", 4, IssueCategory::BestPractice);

        let stamped = stamp_issue(raw.clone(), &file, &Lens::Security.config());
        assert_eq!(stamped.file_path, "src/db.py");
        assert_eq!(stamped.category, IssueCategory::Security);
        assert_eq!(stamped.line_number, 4);
        assert_eq!(stamped.description, raw.description);
    }

    #[test]
    fn generic_lens_keeps_model_category() {
        let file = ChangedFile::new("a.py", "+x");
        let stamped = stamp_issue(
            issue("a.py", 1, IssueCategory::Bug),
            &file,
            &Lens::Generic.config(),
        );
        assert_eq!(stamped.category, IssueCategory::Bug);
    }

    #[test]
    fn system_instruction_carries_exclusions_and_guide() {
        let text = build_system_instruction(&Lens::Security.config(), Some("  Prefer parameterised SQL. "));
        assert!(text.contains("Ignore: performance, style."));
        assert!(text.contains("Review guide (must follow):\nPrefer parameterised SQL."));

        let bare = build_system_instruction(&Lens::Security.config(), Some("   "));
        assert!(!bare.contains("Review guide"));
    }

    #[test]
    fn human_message_embeds_filename_and_patch() {
        let msg = build_human_message(&ChangedFile::new("main.py", "@@ -1 +1 @@\n+print(1)"));
        assert_eq!(msg, "File Name: main.py\n\nGit Patch:\n@@ -1 +1 @@\n+print(1)");
    }

    #[test]
    fn groups_follow_first_appearance() {
        let issues = vec![
            issue("b.py", 1, IssueCategory::Bug),
            issue("a.py", 2, IssueCategory::Bug),
            issue("b.py", 3, IssueCategory::Bug),
        ];
        let groups = group_by_file(&issues);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "b.py");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "a.py");
    }
}
