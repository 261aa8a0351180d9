//! 증분 리뷰용 커밋 목록과 리뷰 완료 SHA 기록.

use tracing::warn;

use super::Commenter;
use crate::application::cache::{PAGE_SIZE, paginate};
use crate::domain::comment::Comment;
use crate::domain::commit_ids::{ReviewProgress, add_reviewed_id, reviewed_ids};
use crate::domain::outcome::Outcome;
use crate::domain::route::RepoSelector;

impl<'a> Commenter<'a> {
    /// 원본 PR의 커밋 SHA 전체(오래된 순). 캐시하지 않는다.
    pub async fn get_all_commit_ids(&self) -> Outcome<Vec<String>> {
        let number = self.ctx.pull_number;
        let route = match self.resolve(RepoSelector::Origin, number, "list commits") {
            Ok(route) => route,
            Err(reason) => return Outcome::fallback(reason),
        };

        let gateway = self.gateway;
        let outcome = paginate(PAGE_SIZE, |page| {
            gateway.list_commits(route.repo, route.number, page, PAGE_SIZE)
        })
        .await;
        if let Some(reason) = outcome.reason() {
            warn!(
                repo = %route.repo,
                pull = route.number,
                fetched = outcome.value().len(),
                error = %reason,
                "failed to list commits"
            );
        }
        outcome
    }

    /// `tag` 코멘트에 기록된 SHA와 원본 PR 커밋 목록으로 증분 리뷰 상태를 만든다.
    /// 기록 코멘트는 `selector` 저장소에서 찾는다.
    pub async fn review_progress(
        &mut self,
        tag: &str,
        selector: RepoSelector,
    ) -> Outcome<ReviewProgress> {
        let number = self.ctx.pull_number;
        let found = self.latest_with_tag(tag, number, selector).await;
        let commits = self.get_all_commit_ids().await;

        let reason = found
            .reason()
            .or(commits.reason())
            .map(ToString::to_string);
        let progress = ReviewProgress {
            reviewed: found
                .into_value()
                .map(|comment| reviewed_ids(&comment.body))
                .unwrap_or_default(),
            all_commits: commits.into_value(),
        };

        match reason {
            Some(reason) => Outcome::recovered(progress, reason),
            None => Outcome::Done(progress),
        }
    }

    /// `tag` 코멘트의 SHA 목록에 `sha`를 추가한다. 코멘트가 없으면 새로 만든다.
    pub async fn record_reviewed_commit(
        &mut self,
        tag: &str,
        sha: &str,
        selector: RepoSelector,
    ) -> Outcome<Option<Comment>> {
        let number = self.ctx.pull_number;
        let body = match self.latest_with_tag(tag, number, selector).await {
            Outcome::Done(Some(existing)) | Outcome::Recovered { value: Some(existing), .. } => {
                existing.body
            }
            Outcome::Done(None) => self.wrap("", tag),
            Outcome::Recovered { value: None, reason } => {
                warn!(pull = number, error = %reason, "skipping commit record: listing incomplete");
                return Outcome::recovered(None, reason);
            }
        };

        if reviewed_ids(&body).iter().any(|id| id == sha) {
            return Outcome::Done(None);
        }
        self.replace(&add_reviewed_id(&body, sha), tag, number, selector)
            .await
    }
}
