//! 적용 설정 진단(inspection) 뷰 모델.
//! 토큰 값은 출력하지 않고 출처 라벨만 보여준다.

use std::collections::BTreeMap;

use serde::Serialize;

use super::loader::LoadedConfig;
use super::resolve::resolve_host_token;
use crate::application::config::{HostConfig, MirrorConfig, OriginConfig};

#[derive(Debug, Clone, Serialize)]
pub struct ConfigInspection {
    pub searched_paths: Vec<String>,
    pub loaded_paths: Vec<String>,
    pub effective_defaults: EffectiveDefaults,
    pub hosts: BTreeMap<String, HostInspection>,
    pub origin: Option<OriginConfig>,
    pub mirror: Option<MirrorConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveDefaults {
    pub api_base: Option<String>,
    pub greeting: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostInspection {
    pub token_source: Option<String>,
    pub token_resolved: bool,
    pub api_base: Option<String>,
}

impl ConfigInspection {
    pub(crate) fn from_loaded(loaded: LoadedConfig) -> Self {
        let hosts = loaded
            .config
            .hosts
            .iter()
            .map(|(host, cfg)| (host.clone(), host_inspection(cfg)))
            .collect();

        Self {
            searched_paths: loaded
                .searched_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            loaded_paths: loaded
                .loaded_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            effective_defaults: EffectiveDefaults {
                api_base: loaded.config.defaults.api_base.clone(),
                greeting: loaded.config.greeting(),
            },
            hosts,
            origin: loaded.config.origin.clone(),
            mirror: loaded.config.mirror.clone(),
        }
    }
}

fn host_inspection(cfg: &HostConfig) -> HostInspection {
    let resolution = resolve_host_token(Some(cfg));
    HostInspection {
        token_source: resolution.source,
        token_resolved: resolution.token.is_some(),
        api_base: cfg.api_base.clone(),
    }
}
