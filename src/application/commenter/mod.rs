//! PR 코멘트/리뷰 생명주기 관리자.
//!
//! 모든 원격 조회는 [`CommentCache`]를 거치고, 모든 원격 쓰기는 저장소 매핑으로
//! 원본/미러 PR 번호를 확정한 뒤 수행한다. 원격 실패는 로그로 남기고
//! [`Outcome::Recovered`]로 돌려주며 호출자의 흐름을 끊지 않는다.

mod commits;
mod lifecycle;
mod listing;
mod review;
mod threads;

#[cfg(test)]
pub(crate) mod fake_gateway;

use std::collections::HashMap;

use tracing::warn;

use crate::application::cache::CommentCache;
use crate::application::context::ExecutionContext;
use crate::application::ports::PlatformGateway;
use crate::domain::comment::{BufferedReviewComment, Comment};
use crate::domain::route::{RepoSelector, Route, RouteError};
use crate::domain::tags::{COMMENT_GREETING, wrap_body};

pub use lifecycle::CommentMode;
pub use review::SubmitReport;
pub use threads::CommentChain;

/// 한 번의 실행 동안 살아 있는 코멘트 관리자.
/// 캐시와 리뷰 버퍼는 인스턴스와 함께 생성되고 함께 버려진다.
pub struct Commenter<'a> {
    gateway: &'a dyn PlatformGateway,
    ctx: &'a ExecutionContext,
    greeting: String,
    cache: CommentCache,
    /// `(PR 번호, 선택자, 태그)`별로 이 인스턴스가 마지막으로 쓴 코멘트.
    /// 읽기-수정-쓰기 연산은 캐시보다 이 값을 먼저 본다.
    written: HashMap<(u64, RepoSelector, String), Comment>,
    review_buffer: Vec<BufferedReviewComment>,
}

impl<'a> Commenter<'a> {
    pub fn new(gateway: &'a dyn PlatformGateway, ctx: &'a ExecutionContext) -> Self {
        Self {
            gateway,
            ctx,
            greeting: COMMENT_GREETING.to_string(),
            cache: CommentCache::new(),
            written: HashMap::new(),
            review_buffer: Vec::new(),
        }
    }

    /// 본문 머리의 인사말을 교체한다.
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    pub fn context(&self) -> &ExecutionContext {
        self.ctx
    }

    pub fn cache(&self) -> &CommentCache {
        &self.cache
    }

    /// 인사말 + 메시지 + 태그 형식으로 본문을 감싼다.
    pub fn wrap(&self, message: &str, tag: &str) -> String {
        wrap_body(&self.greeting, message, tag)
    }

    fn route(&self, selector: RepoSelector, number: u64) -> Result<Route<'a>, RouteError> {
        let ctx: &'a ExecutionContext = self.ctx;
        ctx.mapping.route(selector, number)
    }

    /// 라우팅 실패를 경고로 남기고 사유 문자열로 바꾼다.
    fn resolve(
        &self,
        selector: RepoSelector,
        number: u64,
        operation: &'static str,
    ) -> Result<Route<'a>, String> {
        self.route(selector, number).map_err(|err| {
            warn!(operation, pull = number, error = %err, "cannot route request");
            err.to_string()
        })
    }
}
