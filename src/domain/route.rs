//! 원본 저장소와 미러 저장소 사이의 PR 번호 라우팅.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// PR 번호가 원본과 다른 미러 저장소.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRepo {
    pub repo: RepoRef,
    /// 원본 PR 번호 -> 미러 PR 번호
    pub pr_map: BTreeMap<u64, u64>,
}

/// 작업 대상 저장소 선택자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoSelector {
    Origin,
    Mirror,
}

impl RepoSelector {
    pub fn from_target(from_target: bool) -> Self {
        if from_target { Self::Mirror } else { Self::Origin }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("mirror repository is not configured")]
    MirrorNotConfigured,
    #[error("pull request #{number} has no entry in the mirror pr_map")]
    UnmappedPull { number: u64 },
    #[error("head SHA of mirror pull request #{number} was not resolved")]
    MirrorHeadUnknown { number: u64 },
}

/// 라우팅 결과: 실제 호출에 사용할 저장소와 PR 번호.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route<'a> {
    pub repo: &'a RepoRef,
    pub number: u64,
}

/// 실행 동안 바뀌지 않는 저장소 매핑.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMapping {
    pub origin: RepoRef,
    pub mirror: Option<MirrorRepo>,
}

impl RepoMapping {
    pub fn new(origin: RepoRef, mirror: Option<MirrorRepo>) -> Self {
        Self { origin, mirror }
    }

    pub fn repo(&self, selector: RepoSelector) -> Result<&RepoRef, RouteError> {
        match selector {
            RepoSelector::Origin => Ok(&self.origin),
            RepoSelector::Mirror => self
                .mirror
                .as_ref()
                .map(|m| &m.repo)
                .ok_or(RouteError::MirrorNotConfigured),
        }
    }

    /// 원본 PR 번호를 선택된 저장소의 PR 번호로 변환한다.
    pub fn route(&self, selector: RepoSelector, number: u64) -> Result<Route<'_>, RouteError> {
        match selector {
            RepoSelector::Origin => Ok(Route {
                repo: &self.origin,
                number,
            }),
            RepoSelector::Mirror => {
                let mirror = self.mirror.as_ref().ok_or(RouteError::MirrorNotConfigured)?;
                let mapped = mirror
                    .pr_map
                    .get(&number)
                    .copied()
                    .ok_or(RouteError::UnmappedPull { number })?;
                Ok(Route {
                    repo: &mirror.repo,
                    number: mapped,
                })
            }
        }
    }
}
