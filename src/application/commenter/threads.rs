//! 리뷰 코멘트 스레드 조회와 답글.

use tracing::{info, warn};

use super::Commenter;
use crate::domain::comment::Comment;
use crate::domain::outcome::Outcome;
use crate::domain::route::RepoSelector;
use crate::domain::tags::{COMMENT_REPLY_TAG, COMMENT_TAG};
use crate::domain::thread::{chain_of, chains_report, comments_within_range, top_level_of};

/// 스레드 루트와 `author: body` 대화 기록.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentChain {
    pub chain: String,
    pub top_level: Option<Comment>,
}

impl<'a> Commenter<'a> {
    /// 원본 PR에서 범위 안에 달린 리뷰 코멘트.
    pub async fn comments_within_range(
        &mut self,
        number: u64,
        path: &str,
        start_line: u32,
        end_line: u32,
    ) -> Outcome<Vec<Comment>> {
        self.list_review_comments(number, RepoSelector::Origin)
            .await
            .map(|comments| {
                comments_within_range(&comments, path, start_line, end_line)
                    .into_iter()
                    .cloned()
                    .collect()
            })
    }

    /// 범위 안 스레드 중 `tag`가 들어간 것들을 번호 붙은 보고서로 만든다.
    pub async fn chains_within_range(
        &mut self,
        number: u64,
        path: &str,
        start_line: u32,
        end_line: u32,
        tag: &str,
    ) -> Outcome<String> {
        self.comments_within_range(number, path, start_line, end_line)
            .await
            .map(|comments| chains_report(&comments, tag))
    }

    /// `comment`가 속한 스레드의 루트와 대화 기록.
    pub async fn get_comment_chain(&mut self, number: u64, comment: &Comment) -> Outcome<CommentChain> {
        let listed = self.list_review_comments(number, RepoSelector::Origin).await;
        if let Some(reason) = listed.reason() {
            return Outcome::fallback(reason);
        }

        let comments = listed.into_value();
        let top_level = top_level_of(&comments, comment);
        Outcome::Done(CommentChain {
            chain: chain_of(&comments, top_level),
            top_level: Some(top_level.clone()),
        })
    }

    /// 스레드 루트에 답글을 단다.
    ///
    /// 답글이 실패하면 오류 내용을 담은 답글을 한 번 더 시도한다. 이어서 루트 본문의
    /// 코멘트 태그를 답글 태그로 바꿔 이 스레드가 대화 중임을 표시한다.
    pub async fn review_comment_reply(
        &mut self,
        number: u64,
        top_level: &Comment,
        message: &str,
    ) -> Outcome<()> {
        let route = match self.resolve(RepoSelector::Origin, number, "reply to review comment") {
            Ok(route) => route,
            Err(reason) => return Outcome::fallback(reason),
        };

        let reply = format!("{}\n\n{message}\n\n{COMMENT_REPLY_TAG}\n", self.greeting);
        let mut failure = None;

        if let Err(err) = self
            .gateway
            .create_reply_to_review_comment(route.repo, route.number, top_level.id, &reply)
            .await
        {
            let reason = format!("{err:#}");
            warn!(repo = %route.repo, comment_id = top_level.id, error = %reason, "failed to reply to the top-level comment");

            let fallback = format!(
                "Could not post the reply to the top-level comment due to the following error: {reason}"
            );
            if let Err(err) = self
                .gateway
                .create_reply_to_review_comment(route.repo, route.number, top_level.id, &fallback)
                .await
            {
                let reason = format!("{err:#}");
                warn!(repo = %route.repo, comment_id = top_level.id, error = %reason, "failed to post fallback reply");
            }
            failure = Some(reason);
        } else {
            info!(repo = %route.repo, comment_id = top_level.id, "replied to review comment");
        }

        if top_level.body.contains(COMMENT_TAG) {
            let body = top_level.body.replacen(COMMENT_TAG, COMMENT_REPLY_TAG, 1);
            if let Err(err) = self
                .gateway
                .update_review_comment(route.repo, top_level.id, &body)
                .await
            {
                let reason = format!("{err:#}");
                warn!(repo = %route.repo, comment_id = top_level.id, error = %reason, "failed to update the top-level comment");
                failure.get_or_insert(reason);
            }
        }

        match failure {
            Some(reason) => Outcome::fallback(reason),
            None => Outcome::Done(()),
        }
    }
}
