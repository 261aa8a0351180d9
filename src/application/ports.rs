//! 애플리케이션 계층이 의존하는 포트(추상 인터페이스) 모음.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::comment::{
    Comment, CommentId, NewReview, PullRequest, Review, ReviewCommentDraft, ReviewEvent, ReviewId,
};
use crate::application::config::{Config, HostConfig};
use crate::domain::route::RepoRef;
use crate::domain::target::PullTarget;

/// 설정 로딩/점검을 담당하는 저장소 포트.
pub trait ConfigRepository: Send + Sync {
    fn load(&self) -> Result<Config>;
    fn inspect_pretty_json(&self) -> Result<String>;
}

/// PR URL을 도메인 대상 식별자로 변환하는 포트.
pub trait TargetResolver: Send + Sync {
    fn parse(&self, input: &str) -> Result<PullTarget>;
}

/// 호스트 토큰 해석 결과. `source`는 토큰 값 대신 출처 라벨만 담는다.
#[derive(Debug, Clone, Default)]
pub struct HostTokenResolution {
    pub token: Option<String>,
    pub source: Option<String>,
}

/// 호스트 설정(token/token_env)에서 실제 토큰을 해석하는 포트.
pub trait HostTokenResolver: Send + Sync {
    fn resolve(&self, host: &str, host_cfg: Option<&HostConfig>) -> Result<HostTokenResolution>;
}

/// 코드 호스팅 플랫폼(GitHub) REST API 포트.
/// 재시도/스로틀링은 구현체의 책임이며, 코어는 모든 실패를 동일하게 다룬다.
#[async_trait]
pub trait PlatformGateway: Send + Sync {
    async fn get_pull_request(&self, repo: &RepoRef, number: u64) -> Result<PullRequest>;
    async fn update_pull_request_body(&self, repo: &RepoRef, number: u64, body: &str)
    -> Result<()>;

    async fn list_issue_comments(
        &self,
        repo: &RepoRef,
        number: u64,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<Comment>>;
    async fn list_review_comments(
        &self,
        repo: &RepoRef,
        number: u64,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<Comment>>;
    /// 커밋 SHA 목록(시간순).
    async fn list_commits(
        &self,
        repo: &RepoRef,
        number: u64,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<String>>;
    async fn list_reviews(
        &self,
        repo: &RepoRef,
        number: u64,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<Review>>;

    async fn create_issue_comment(&self, repo: &RepoRef, number: u64, body: &str)
    -> Result<Comment>;
    async fn update_issue_comment(
        &self,
        repo: &RepoRef,
        comment_id: CommentId,
        body: &str,
    ) -> Result<Comment>;

    async fn create_review(&self, repo: &RepoRef, number: u64, review: &NewReview)
    -> Result<Review>;
    async fn submit_review(
        &self,
        repo: &RepoRef,
        number: u64,
        review_id: ReviewId,
        event: ReviewEvent,
        body: &str,
    ) -> Result<Review>;
    async fn delete_pending_review(
        &self,
        repo: &RepoRef,
        number: u64,
        review_id: ReviewId,
    ) -> Result<()>;

    async fn create_review_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        commit_id: &str,
        comment: &ReviewCommentDraft,
    ) -> Result<Comment>;
    async fn update_review_comment(
        &self,
        repo: &RepoRef,
        comment_id: CommentId,
        body: &str,
    ) -> Result<Comment>;
    async fn delete_review_comment(&self, repo: &RepoRef, comment_id: CommentId) -> Result<()>;
    async fn create_reply_to_review_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        comment_id: CommentId,
        body: &str,
    ) -> Result<Comment>;
}

/// 호스트 설정에 맞는 플랫폼 게이트웨이를 생성하는 팩토리 포트.
pub trait GatewayFactory: Send + Sync {
    fn build(
        &self,
        host: &str,
        api_base: Option<String>,
        token: Option<String>,
    ) -> Box<dyn PlatformGateway>;
}

/// 콘솔/로그 출력 추상화 포트.
pub trait Reporter: Send + Sync {
    fn section(&self, name: &str);
    fn kv(&self, key: &str, value: &str);
    fn status(&self, scope: &str, message: &str);
    fn raw(&self, line: &str);
}
