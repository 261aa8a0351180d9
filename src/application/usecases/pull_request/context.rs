//! 명령행 값과 설정 파일에서 대상 호스트/저장소/PR 번호를 확정한다.

use anyhow::{Context, Result};
use tracing::debug;

use super::TargetInput;
use crate::application::config::{Config, DEFAULT_HOST};
use crate::application::ports::TargetResolver;
use crate::domain::route::{RepoMapping, RepoRef};

#[derive(Debug, Clone)]
pub(super) struct Session {
    pub host: String,
    pub mapping: RepoMapping,
    pub pull_number: u64,
}

/// URL이 있으면 URL만 사용하고, 없으면 플래그 값이 `origin` 설정을 항목별로 덮어쓴다.
pub(super) fn resolve_session(
    target_resolver: &dyn TargetResolver,
    config: &Config,
    input: &TargetInput,
) -> Result<Session> {
    if let Some(url) = input.url.as_deref() {
        let target = target_resolver
            .parse(url)
            .with_context(|| format!("failed to parse pull request URL: {url}"))?;
        debug!(host = %target.host, repo = %target.repo, pull = target.number, "resolved target from URL");
        return Ok(Session {
            mapping: config.repo_mapping(Some(target.repo))?,
            host: target.host,
            pull_number: target.number,
        });
    }

    let cfg = config.origin.as_ref();
    let owner = input.owner.clone().or_else(|| cfg.and_then(|o| o.owner.clone()));
    let repo = input.repo.clone().or_else(|| cfg.and_then(|o| o.repo.clone()));
    let origin = match (owner, repo) {
        (Some(owner), Some(repo)) => Some(RepoRef::new(owner, repo)),
        _ => None,
    };
    let mapping = config.repo_mapping(origin)?;

    let pull_number = input
        .pull_number
        .or_else(|| cfg.and_then(|o| o.pull_number))
        .context("pull request number is not set. Pass --pr, --url, or set origin.pull_number in config")?;

    Ok(Session {
        host: DEFAULT_HOST.to_string(),
        mapping,
        pull_number,
    })
}
