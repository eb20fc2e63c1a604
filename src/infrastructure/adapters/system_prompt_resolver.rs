//! 리뷰 가이드 파일 해석 포트 구현.

use std::fs;

use anyhow::{Context, Result};

use crate::application::config::Config;
use crate::application::ports::SystemPromptResolver;

/// 설정의 `review_guide_path`를 읽는다. 비어 있는 파일은 없는 것으로 본다.
pub struct FileSystemPromptResolver;

impl SystemPromptResolver for FileSystemPromptResolver {
    fn review_guide(&self, config: &Config) -> Result<Option<String>> {
        let Some(path) = config.defaults.review_guide_path.as_deref() else {
            return Ok(None);
        };

        let guide_raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read review guide file at {}", path))?;
        let guide = guide_raw.trim();
        if guide.is_empty() {
            return Ok(None);
        }
        Ok(Some(guide.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_guide(path: &str) -> Config {
        let mut config = Config::default();
        config.defaults.review_guide_path = Some(path.to_string());
        config
    }

    #[test]
    fn reads_trimmed_guide() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.md");
        fs::write(&path, "\n- Never log secrets.\n\n").unwrap();

        let guide = FileSystemPromptResolver
            .review_guide(&config_with_guide(path.to_str().unwrap()))
            .unwrap();
        assert_eq!(guide.as_deref(), Some("- Never log secrets."));
    }

    #[test]
    fn blank_guide_is_none_and_missing_guide_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blank = dir.path().join("blank.md");
        fs::write(&blank, "   \n").unwrap();

        assert!(
            FileSystemPromptResolver
                .review_guide(&config_with_guide(blank.to_str().unwrap()))
                .unwrap()
                .is_none()
        );
        assert!(
            FileSystemPromptResolver
                .review_guide(&config_with_guide(dir.path().join("nope.md").to_str().unwrap()))
                .is_err()
        );
        assert!(FileSystemPromptResolver.review_guide(&Config::default()).unwrap().is_none());
    }
}
