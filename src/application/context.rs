//! 실행 컨텍스트(저장소 매핑/PR 번호/미러 head SHA) 준비 단계.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::application::ports::PlatformGateway;
use crate::domain::route::{RepoMapping, RepoSelector, RouteError};

/// 코어 연산이 시작되기 전에 한 번 확정되는 불변 실행 상태.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub mapping: RepoMapping,
    pub pull_number: u64,
    pub mirror_head_sha: Option<String>,
}

impl ExecutionContext {
    pub fn new(mapping: RepoMapping, pull_number: u64) -> Self {
        Self {
            mapping,
            pull_number,
            mirror_head_sha: None,
        }
    }

    pub fn with_mirror_head_sha(mut self, sha: impl Into<String>) -> Self {
        self.mirror_head_sha = Some(sha.into());
        self
    }

    /// 리뷰를 고정할 커밋. 미러 대상이면 미러 PR의 head SHA를 사용한다.
    pub fn review_commit<'a>(
        &'a self,
        selector: RepoSelector,
        commit_id: &'a str,
    ) -> Result<&'a str, RouteError> {
        match selector {
            RepoSelector::Origin => Ok(commit_id),
            RepoSelector::Mirror => {
                self.mirror_head_sha
                    .as_deref()
                    .ok_or(RouteError::MirrorHeadUnknown {
                        number: self.pull_number,
                    })
            }
        }
    }
}

/// 미러가 설정되어 있으면 미러 PR의 head SHA를 미리 조회해 컨텍스트를 확정한다.
/// 미러 PR 번호가 매핑에 없으면 경고만 남기고 미러 연산은 호출 시점에 실패로 보고된다.
pub async fn resolve_context(
    gateway: &dyn PlatformGateway,
    mapping: RepoMapping,
    pull_number: u64,
) -> Result<ExecutionContext> {
    let mut ctx = ExecutionContext::new(mapping, pull_number);
    if ctx.mapping.mirror.is_none() {
        return Ok(ctx);
    }

    let (repo, number) = match ctx.mapping.route(RepoSelector::Mirror, pull_number) {
        Ok(route) => (route.repo.clone(), route.number),
        Err(err) => {
            warn!(pull = pull_number, error = %err, "mirror routing unavailable");
            return Ok(ctx);
        }
    };

    let pr = gateway
        .get_pull_request(&repo, number)
        .await
        .with_context(|| format!("failed to fetch mirror PR {repo}#{number}"))?;
    info!(repo = %repo, pull = number, head = %pr.head_sha, "resolved mirror head");
    ctx.mirror_head_sha = Some(pr.head_sha);
    Ok(ctx)
}
