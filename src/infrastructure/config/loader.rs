//! 설정 파일 탐색/병합 로더.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::config::Config;

pub(crate) const CONFIG_ENV: &str = "PRLENS_CONFIG";

#[derive(Debug, Clone)]
pub(crate) struct LoadedConfig {
    pub config: Config,
    pub searched_paths: Vec<PathBuf>,
    pub loaded_paths: Vec<PathBuf>,
}

/// 우선순위 경로를 순회해 JSON 설정을 병합한다. 파일이 하나도 없으면 기본값.
pub(crate) fn load_merged_config() -> Result<LoadedConfig> {
    load_from_paths(config_paths())
}

pub(crate) fn load_from_paths(paths: Vec<PathBuf>) -> Result<LoadedConfig> {
    // 낮은 우선순위에서 높은 우선순위 순서로 병합한다.
    let mut merged = Config::default();
    let mut loaded_paths = Vec::new();

    for path in &paths {
        if !path.exists() {
            continue;
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let parsed: Config = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))?;
        merged.merge_from(parsed);
        debug!(path = %path.display(), "loaded config file");
        loaded_paths.push(path.to_path_buf());
    }

    Ok(LoadedConfig {
        config: merged,
        searched_paths: paths,
        loaded_paths,
    })
}

/// 시스템 + 사용자 + 프로젝트 + 명시 경로 순으로 병합 경로를 구성한다.
pub fn config_paths() -> Vec<PathBuf> {
    // 낮은 우선순위 -> 높은 우선순위 순서로 병합됨.
    let mut paths = vec![PathBuf::from("/etc/prlens/config.json")];

    if let Some(base) = dirs::config_dir() {
        paths.push(base.join("prlens").join("config.json"));
    }

    paths.push(PathBuf::from(".prlens/config.json"));

    if let Ok(path) = env::var(CONFIG_ENV) {
        paths.push(Path::new(&path).to_path_buf());
    }

    dedup_paths(paths)
}

fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for p in paths {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lens::Topology;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn later_files_override_field_by_field() {
        let dir = tempfile::tempdir().unwrap();
        let system = write(
            dir.path(),
            "system.json",
            r#"{"defaults":{"topology":"multi","max_concurrency":8},
                "hosts":{"github.com":{"token_env":"CORP_TOKEN"}}}"#,
        );
        let project = write(
            dir.path(),
            "project.json",
            r#"{"defaults":{"max_concurrency":2},
                "hosts":{"github.com":{"api_base":"http://localhost:9000"}},
                "providers":{"openai":{"model":"gpt-4.1"}}}"#,
        );

        let loaded = load_from_paths(vec![system.clone(), project.clone()]).unwrap();
        let config = loaded.config;

        assert_eq!(config.topology().unwrap(), Topology::Multi);
        assert_eq!(config.max_concurrency(), 2);
        let host = config.host_config("github.com").unwrap();
        assert_eq!(host.token_env.as_deref(), Some("CORP_TOKEN"));
        assert_eq!(host.api_base.as_deref(), Some("http://localhost:9000"));
        assert_eq!(
            config.provider_config("openai").unwrap().model.as_deref(),
            Some("gpt-4.1")
        );
        assert_eq!(loaded.loaded_paths, vec![system, project]);
    }

    #[test]
    fn missing_files_yield_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_from_paths(vec![dir.path().join("absent.json")]).unwrap();

        assert!(loaded.loaded_paths.is_empty());
        assert_eq!(loaded.searched_paths.len(), 1);
        assert_eq!(loaded.config.provider_name(), "gemini");
    }

    #[test]
    fn invalid_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write(dir.path(), "broken.json", "{ not json");

        let err = load_from_paths(vec![broken]).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }

    #[test]
    fn search_paths_are_unique_and_project_local_is_included() {
        let paths = config_paths();
        assert_eq!(paths[0], PathBuf::from("/etc/prlens/config.json"));
        assert!(paths.contains(&PathBuf::from(".prlens/config.json")));
        let mut deduped = paths.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), paths.len());
    }
}
