//! 설정 파일 탐색/병합 로더.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::config::Config;

pub const CONFIG_ENV: &str = "PRCOMMENT_CONFIG";

#[derive(Debug, Clone)]
pub(crate) struct LoadedConfig {
    pub config: Config,
    pub searched_paths: Vec<PathBuf>,
    pub loaded_paths: Vec<PathBuf>,
}

/// 우선순위 경로를 순회해 JSON 설정을 병합한다.
pub(crate) fn load_merged_config() -> Result<LoadedConfig> {
    load_from_paths(config_paths())
}

/// 주어진 경로를 앞에서부터 병합한다. 없는 파일은 건너뛴다.
pub(crate) fn load_from_paths(paths: Vec<PathBuf>) -> Result<LoadedConfig> {
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
        debug!(path = %path.display(), "loaded config");
        merged.merge_from(parsed);
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
    let mut paths = vec![PathBuf::from("/etc/prcomment/config.json")];

    if let Some(base) = dirs::config_dir() {
        paths.push(base.join("prcomment").join("config.json"));
    }

    paths.push(PathBuf::from(".prcomment/config.json"));

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
