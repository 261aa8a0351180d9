//! 태그 기반 이슈 코멘트 생성/교체와 PR 설명(release notes) 갱신.

use std::str::FromStr;

use tracing::{info, warn};

use super::Commenter;
use crate::domain::comment::Comment;
use crate::domain::outcome::Outcome;
use crate::domain::route::RepoSelector;
use crate::domain::tags::{
    COMMENT_TAG, add_in_progress_status, remove_in_progress_status, splice_release_notes,
};

/// 코멘트 게시 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentMode {
    /// 항상 새 코멘트를 만든다.
    Create,
    /// 같은 태그의 코멘트가 있으면 본문을 교체하고 없으면 만든다.
    #[default]
    Replace,
}

impl FromStr for CommentMode {
    type Err = std::convert::Infallible;

    /// 알 수 없는 값은 경고 후 `Replace`로 처리한다.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw.trim().to_ascii_lowercase().as_str() {
            "create" => Self::Create,
            "replace" => Self::Replace,
            other => {
                warn!(mode = other, "unknown comment mode, using replace");
                Self::Replace
            }
        })
    }
}

impl<'a> Commenter<'a> {
    /// 현재 PR에 메시지를 게시한다. 태그가 비어 있으면 기본 코멘트 태그를 쓴다.
    pub async fn comment(
        &mut self,
        message: &str,
        tag: Option<&str>,
        mode: CommentMode,
        selector: RepoSelector,
    ) -> Outcome<Option<Comment>> {
        let tag = tag.filter(|t| !t.is_empty()).unwrap_or(COMMENT_TAG);
        let body = self.wrap(message, tag);
        let target = self.ctx.pull_number;

        match mode {
            CommentMode::Create => self.create(&body, target, selector).await,
            CommentMode::Replace => self.replace(&body, tag, target, selector).await,
        }
    }

    /// 새 이슈 코멘트를 만들고, 해당 캐시 버킷이 이미 채워져 있으면 거기에 추가한다.
    pub async fn create(
        &mut self,
        body: &str,
        number: u64,
        selector: RepoSelector,
    ) -> Outcome<Option<Comment>> {
        let route = match self.resolve(selector, number, "create comment") {
            Ok(route) => route,
            Err(reason) => return Outcome::fallback(reason),
        };

        match self
            .gateway
            .create_issue_comment(route.repo, route.number, body)
            .await
        {
            Ok(comment) => {
                info!(repo = %route.repo, pull = route.number, comment_id = comment.id, "created comment");
                self.cache
                    .push_issue_comment(number, selector, comment.clone());
                Outcome::Done(Some(comment))
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(repo = %route.repo, pull = route.number, error = %reason, "failed to create comment");
                Outcome::fallback(reason)
            }
        }
    }

    /// 태그를 포함한 첫 코멘트를 제자리에서 교체하고, 없으면 새로 만든다.
    ///
    /// 목록 조회가 부분 실패하고 그 안에 태그가 없으면 중복 생성을 피하기 위해
    /// 아무것도 쓰지 않는다.
    pub async fn replace(
        &mut self,
        body: &str,
        tag: &str,
        number: u64,
        selector: RepoSelector,
    ) -> Outcome<Option<Comment>> {
        let existing = match self.latest_with_tag(tag, number, selector).await {
            Outcome::Done(existing) => existing,
            Outcome::Recovered {
                value: Some(existing),
                ..
            } => Some(existing),
            Outcome::Recovered {
                value: None,
                reason,
            } => {
                warn!(pull = number, error = %reason, "skipping comment replace: listing incomplete");
                return Outcome::recovered(None, reason);
            }
        };

        let Some(existing) = existing else {
            let created = self.create(body, number, selector).await;
            if let Outcome::Done(Some(comment)) = &created {
                self.remember(tag, number, selector, comment);
            }
            return created;
        };

        let route = match self.resolve(selector, number, "replace comment") {
            Ok(route) => route,
            Err(reason) => return Outcome::fallback(reason),
        };

        match self
            .gateway
            .update_issue_comment(route.repo, existing.id, body)
            .await
        {
            Ok(updated) => {
                info!(repo = %route.repo, pull = route.number, comment_id = updated.id, "replaced comment");
                self.remember(tag, number, selector, &updated);
                Outcome::Done(Some(updated))
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(repo = %route.repo, comment_id = existing.id, error = %reason, "failed to replace comment");
                Outcome::fallback(reason)
            }
        }
    }

    /// 목록 순서상 태그를 포함한 첫 이슈 코멘트.
    pub async fn find_comment_with_tag(
        &mut self,
        tag: &str,
        number: u64,
        selector: RepoSelector,
    ) -> Outcome<Option<Comment>> {
        self.list_issue_comments(number, selector)
            .await
            .map(|comments| comments.into_iter().find(|c| c.body.contains(tag)))
    }

    /// 이 인스턴스가 `tag` 코멘트를 쓴 적이 있으면 그 결과를, 없으면 캐시 조회 결과를 돌려준다.
    ///
    /// 캐시는 자기 쓰기를 반영하지 않으므로 같은 코멘트를 여러 번 고치는 연산은
    /// 이 값을 기준으로 본문을 만들어야 앞선 쓰기를 잃지 않는다.
    pub(super) async fn latest_with_tag(
        &mut self,
        tag: &str,
        number: u64,
        selector: RepoSelector,
    ) -> Outcome<Option<Comment>> {
        if let Some(written) = self.written.get(&(number, selector, tag.to_string())) {
            return Outcome::Done(Some(written.clone()));
        }
        self.find_comment_with_tag(tag, number, selector).await
    }

    fn remember(&mut self, tag: &str, number: u64, selector: RepoSelector, comment: &Comment) {
        self.written
            .insert((number, selector, tag.to_string()), comment.clone());
    }

    /// PR 설명의 release notes 영역을 메시지로 교체한다.
    ///
    /// 읽기-수정-쓰기 사이에 외부에서 설명을 고치면 그 수정은 덮어써진다.
    pub async fn update_description(
        &mut self,
        number: u64,
        message: &str,
        selector: RepoSelector,
    ) -> Outcome<()> {
        let route = match self.resolve(selector, number, "update description") {
            Ok(route) => route,
            Err(reason) => return Outcome::fallback(reason),
        };

        let pr = match self.gateway.get_pull_request(route.repo, route.number).await {
            Ok(pr) => pr,
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(repo = %route.repo, pull = route.number, error = %reason, "failed to get PR, skipping release notes");
                return Outcome::fallback(reason);
            }
        };

        let description = splice_release_notes(pr.body.as_deref().unwrap_or_default(), message);
        match self
            .gateway
            .update_pull_request_body(route.repo, route.number, &description)
            .await
        {
            Ok(()) => {
                info!(repo = %route.repo, pull = route.number, "updated release notes");
                Outcome::Done(())
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(repo = %route.repo, pull = route.number, error = %reason, "failed to update PR description");
                Outcome::fallback(reason)
            }
        }
    }

    /// `tag` 코멘트 머리의 진행 중 상태 영역을 넣거나(`Some`) 뺀다(`None`).
    /// 코멘트가 없으면 빈 본문으로 새로 만든다. 본문이 그대로면 쓰지 않는다.
    pub async fn update_status(
        &mut self,
        tag: &str,
        status: Option<&str>,
        selector: RepoSelector,
    ) -> Outcome<Option<Comment>> {
        let number = self.ctx.pull_number;
        let current = match self.latest_with_tag(tag, number, selector).await {
            Outcome::Done(Some(existing)) | Outcome::Recovered { value: Some(existing), .. } => {
                existing.body
            }
            Outcome::Done(None) => self.wrap("", tag),
            Outcome::Recovered { value: None, reason } => {
                warn!(pull = number, error = %reason, "skipping status update: listing incomplete");
                return Outcome::recovered(None, reason);
            }
        };

        let next = match status {
            Some(status) => add_in_progress_status(&current, status),
            None => remove_in_progress_status(&current),
        };
        if next == current {
            return Outcome::Done(None);
        }
        self.replace(&next, tag, number, selector).await
    }
}
