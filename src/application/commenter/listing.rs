//! 캐시를 거치는 코멘트 목록 조회.

use tracing::{debug, warn};

use super::Commenter;
use crate::application::cache::{PAGE_SIZE, paginate};
use crate::domain::comment::Comment;
use crate::domain::outcome::Outcome;
use crate::domain::route::RepoSelector;

impl<'a> Commenter<'a> {
    /// PR 이슈 코멘트 전체(생성 순).
    ///
    /// 첫 조회 성공 결과만 캐시에 남으며 이후 호출은 원격을 부르지 않는다.
    /// 캐시는 이 관리자가 수정한 코멘트 본문을 반영하지 않는다.
    pub async fn list_issue_comments(
        &mut self,
        number: u64,
        selector: RepoSelector,
    ) -> Outcome<Vec<Comment>> {
        if let Some(cached) = self.cache.issue_comments(number, selector) {
            return Outcome::Done(cached.to_vec());
        }

        let route = match self.resolve(selector, number, "list issue comments") {
            Ok(route) => route,
            Err(reason) => return Outcome::fallback(reason),
        };

        let gateway = self.gateway;
        let outcome = paginate(PAGE_SIZE, |page| {
            gateway.list_issue_comments(route.repo, route.number, page, PAGE_SIZE)
        })
        .await;

        match &outcome {
            Outcome::Done(comments) => {
                debug!(repo = %route.repo, pull = route.number, count = comments.len(), "cached issue comments");
                self.cache
                    .store_issue_comments(number, selector, comments.clone());
            }
            Outcome::Recovered { value, reason } => {
                warn!(
                    repo = %route.repo,
                    pull = route.number,
                    fetched = value.len(),
                    error = %reason,
                    "failed to list comments"
                );
            }
        }
        outcome
    }

    /// PR 리뷰(인라인) 코멘트 전체(생성 순). 캐시 규칙은 이슈 코멘트와 같다.
    pub async fn list_review_comments(
        &mut self,
        number: u64,
        selector: RepoSelector,
    ) -> Outcome<Vec<Comment>> {
        if let Some(cached) = self.cache.review_comments(number, selector) {
            return Outcome::Done(cached.to_vec());
        }

        let route = match self.resolve(selector, number, "list review comments") {
            Ok(route) => route,
            Err(reason) => return Outcome::fallback(reason),
        };

        let gateway = self.gateway;
        let outcome = paginate(PAGE_SIZE, |page| {
            gateway.list_review_comments(route.repo, route.number, page, PAGE_SIZE)
        })
        .await;

        match &outcome {
            Outcome::Done(comments) => {
                debug!(repo = %route.repo, pull = route.number, count = comments.len(), "cached review comments");
                self.cache
                    .store_review_comments(number, selector, comments.clone());
            }
            Outcome::Recovered { value, reason } => {
                warn!(
                    repo = %route.repo,
                    pull = route.number,
                    fetched = value.len(),
                    error = %reason,
                    "failed to list review comments"
                );
            }
        }
        outcome
    }
}
