//! 애플리케이션이 사용하는 설정 스키마(순수 데이터).
//!
//! 주의: 파일/환경변수 접근은 `infrastructure`에서만 수행한다.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::domain::route::{MirrorRepo, RepoMapping, RepoRef};
use crate::domain::tags::COMMENT_GREETING;

pub const DEFAULT_HOST: &str = "github.com";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// 전역 기본값
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// 호스트별 인증/엔드포인트 설정
    #[serde(default)]
    pub hosts: HashMap<String, HostConfig>,
    /// 이벤트가 발생한 원본 저장소
    #[serde(default)]
    pub origin: Option<OriginConfig>,
    /// 코멘트를 대신 게시할 미러 저장소
    #[serde(default)]
    pub mirror: Option<MirrorConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DefaultsConfig {
    /// API base URL(호스트 설정이 없을 때)
    pub api_base: Option<String>,
    /// 코멘트 머리 인사말
    pub greeting: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct HostConfig {
    /// 고정 토큰(민감정보: 권장하지 않음)
    pub token: Option<String>,
    /// 토큰을 읽을 환경변수 이름
    pub token_env: Option<String>,
    /// API base URL override(선택)
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct OriginConfig {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub pull_number: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct MirrorConfig {
    pub owner: Option<String>,
    pub repo: Option<String>,
    /// 원본 PR 번호(문자열 키) -> 미러 PR 번호
    #[serde(default)]
    pub pr_map: BTreeMap<String, u64>,
}

impl Config {
    pub fn host_config(&self, host: &str) -> Option<&HostConfig> {
        self.hosts.get(host)
    }

    pub fn greeting(&self) -> String {
        self.defaults
            .greeting
            .clone()
            .unwrap_or_else(|| COMMENT_GREETING.to_string())
    }

    /// 원본/미러 저장소 매핑을 만든다. `origin` 인자가 설정 파일 값보다 우선한다.
    pub fn repo_mapping(&self, origin: Option<RepoRef>) -> Result<RepoMapping> {
        let origin = match origin {
            Some(origin) => origin,
            None => {
                let cfg = self.origin.as_ref();
                match (
                    cfg.and_then(|o| o.owner.clone()),
                    cfg.and_then(|o| o.repo.clone()),
                ) {
                    (Some(owner), Some(repo)) => RepoRef::new(owner, repo),
                    _ => bail!(
                        "origin repository is not configured. Pass --owner/--repo, --url, or set origin.owner/origin.repo in config"
                    ),
                }
            }
        };

        let mirror = self.mirror.as_ref().map(MirrorConfig::to_mirror_repo).transpose()?;
        Ok(RepoMapping::new(origin, mirror))
    }

    /// 후순위(나중 파일) 값으로 덮어쓰는 병합 규칙.
    pub fn merge_from(&mut self, other: Config) {
        self.defaults.merge_from(other.defaults);

        for (host, incoming) in other.hosts {
            if let Some(existing) = self.hosts.get_mut(&host) {
                existing.merge_from(incoming);
            } else {
                self.hosts.insert(host, incoming);
            }
        }

        match (self.origin.as_mut(), other.origin) {
            (Some(existing), Some(next)) => existing.merge_from(next),
            (None, Some(next)) => self.origin = Some(next),
            _ => {}
        }

        match (self.mirror.as_mut(), other.mirror) {
            (Some(existing), Some(next)) => existing.merge_from(next),
            (None, Some(next)) => self.mirror = Some(next),
            _ => {}
        }
    }
}

impl DefaultsConfig {
    pub fn merge_from(&mut self, other: DefaultsConfig) {
        if other.api_base.is_some() {
            self.api_base = other.api_base;
        }
        if other.greeting.is_some() {
            self.greeting = other.greeting;
        }
    }
}

impl HostConfig {
    pub fn merge_from(&mut self, other: HostConfig) {
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.token_env.is_some() {
            self.token_env = other.token_env;
        }
        if other.api_base.is_some() {
            self.api_base = other.api_base;
        }
    }
}

impl OriginConfig {
    pub fn merge_from(&mut self, other: OriginConfig) {
        if other.owner.is_some() {
            self.owner = other.owner;
        }
        if other.repo.is_some() {
            self.repo = other.repo;
        }
        if other.pull_number.is_some() {
            self.pull_number = other.pull_number;
        }
    }
}

impl MirrorConfig {
    /// `pr_map`은 항목 단위로 병합한다.
    pub fn merge_from(&mut self, other: MirrorConfig) {
        if other.owner.is_some() {
            self.owner = other.owner;
        }
        if other.repo.is_some() {
            self.repo = other.repo;
        }
        self.pr_map.extend(other.pr_map);
    }

    fn to_mirror_repo(&self) -> Result<MirrorRepo> {
        let (Some(owner), Some(repo)) = (self.owner.clone(), self.repo.clone()) else {
            bail!("mirror requires both mirror.owner and mirror.repo");
        };

        let mut pr_map = BTreeMap::new();
        for (origin, target) in &self.pr_map {
            let origin: u64 = origin
                .trim()
                .parse()
                .with_context(|| format!("invalid pull request number in mirror.pr_map: {origin:?}"))?;
            pr_map.insert(origin, *target);
        }

        Ok(MirrorRepo {
            repo: RepoRef::new(owner, repo),
            pr_map,
        })
    }
}
