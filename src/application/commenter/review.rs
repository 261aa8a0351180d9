//! 인라인 코멘트 버퍼링과 리뷰 일괄 제출.
//!
//! 제출 순서: 같은 범위의 기존 태그 코멘트 삭제, 남은 pending 리뷰 삭제,
//! 리뷰 생성 후 제출. 일괄 제출이 실패하면 코멘트를 하나씩 게시한다.

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::Commenter;
use crate::application::cache::{PAGE_SIZE, paginate};
use crate::domain::comment::{
    BufferedReviewComment, CommentId, NewReview, ReviewCommentDraft, ReviewEvent, ReviewId,
    ReviewState,
};
use crate::domain::outcome::Outcome;
use crate::domain::route::{RepoSelector, Route};
use crate::domain::tags::COMMENT_TAG;
use crate::domain::thread::comments_at_range;

/// 리뷰 제출 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitReport {
    /// 버퍼가 비어 상태 메시지만 담은 리뷰를 제출했다.
    StatusOnly { review_id: ReviewId },
    /// 모든 코멘트를 하나의 리뷰로 제출했다.
    Batched { review_id: ReviewId, comments: usize },
    /// 일괄 제출이 실패해 코멘트를 개별 게시했다.
    Fallback {
        posted: usize,
        failed: usize,
        reason: String,
    },
    /// 아무것도 제출하지 못했다.
    Failed { reason: String },
}

impl<'a> Commenter<'a> {
    /// 인라인 코멘트를 버퍼에 쌓는다. 본문은 인사말과 기본 코멘트 태그로 감싼다.
    pub fn buffer_review_comment(
        &mut self,
        path: &str,
        start_line: u32,
        end_line: u32,
        message: &str,
    ) {
        let message = self.wrap(message, COMMENT_TAG);
        self.review_buffer.push(BufferedReviewComment {
            path: path.to_string(),
            start_line,
            end_line,
            message,
        });
    }

    pub fn buffered_review_comments(&self) -> &[BufferedReviewComment] {
        &self.review_buffer
    }

    /// PR에 남아 있는 pending 리뷰를 삭제한다.
    /// pending 리뷰가 없으면 아무것도 하지 않으므로 여러 번 불러도 안전하다.
    pub async fn delete_pending_review(
        &mut self,
        number: u64,
        selector: RepoSelector,
    ) -> Outcome<Option<ReviewId>> {
        let route = match self.resolve(selector, number, "delete pending review") {
            Ok(route) => route,
            Err(reason) => return Outcome::fallback(reason),
        };

        let gateway = self.gateway;
        let listed = paginate(PAGE_SIZE, |page| {
            gateway.list_reviews(route.repo, route.number, page, PAGE_SIZE)
        })
        .await;
        if let Some(reason) = listed.reason() {
            warn!(repo = %route.repo, pull = route.number, error = %reason, "failed to list reviews");
        }

        let pending = listed
            .value()
            .iter()
            .find(|review| review.state == ReviewState::Pending)
            .map(|review| review.id);
        let Some(review_id) = pending else {
            return listed.map(|_| None);
        };

        info!(repo = %route.repo, pull = route.number, review_id, "deleting pending review");
        match self
            .gateway
            .delete_pending_review(route.repo, route.number, review_id)
            .await
        {
            Ok(()) => Outcome::Done(Some(review_id)),
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(repo = %route.repo, review_id, error = %reason, "failed to delete pending review");
                Outcome::recovered(None, reason)
            }
        }
    }

    /// 버퍼의 코멘트를 하나의 리뷰로 제출한다.
    ///
    /// 미러 대상이면 미러 PR의 head SHA에, 아니면 `commit_id`에 리뷰를 고정한다.
    /// 버퍼는 비우지 않는다.
    pub async fn submit_review(
        &mut self,
        number: u64,
        commit_id: &str,
        status_msg: &str,
        selector: RepoSelector,
    ) -> SubmitReport {
        let route = match self.resolve(selector, number, "submit review") {
            Ok(route) => route,
            Err(reason) => return SubmitReport::Failed { reason },
        };
        let commit_id = match self.ctx.review_commit(selector, commit_id) {
            Ok(commit_id) => commit_id.to_string(),
            Err(err) => {
                warn!(pull = number, error = %err, "cannot resolve review commit");
                return SubmitReport::Failed {
                    reason: err.to_string(),
                };
            }
        };
        let body = format!("{}\n\n{status_msg}\n", self.greeting);

        self.drain_stale_comments(number, selector, route).await;
        self.delete_pending_review(number, selector).await;

        if self.review_buffer.is_empty() {
            info!(repo = %route.repo, pull = route.number, "submitting empty review");
            let review = NewReview {
                commit_id,
                body: Some(body),
                event: Some(ReviewEvent::Comment),
                comments: Vec::new(),
            };
            return match self
                .gateway
                .create_review(route.repo, route.number, &review)
                .await
            {
                Ok(review) => SubmitReport::StatusOnly {
                    review_id: review.id,
                },
                Err(err) => {
                    let reason = format!("{err:#}");
                    warn!(repo = %route.repo, pull = route.number, error = %reason, "failed to submit empty review");
                    SubmitReport::Failed { reason }
                }
            };
        }

        let drafts: Vec<ReviewCommentDraft> = self
            .review_buffer
            .iter()
            .map(ReviewCommentDraft::from)
            .collect();

        match self
            .create_and_submit(route, &commit_id, &body, drafts.clone())
            .await
        {
            Ok(review_id) => SubmitReport::Batched {
                review_id,
                comments: drafts.len(),
            },
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(
                    repo = %route.repo,
                    pull = route.number,
                    error = %reason,
                    "failed to create review, falling back to individual comments"
                );
                self.delete_pending_review(number, selector).await;
                let (posted, failed) = self.post_individually(route, &commit_id, &drafts).await;
                SubmitReport::Fallback {
                    posted,
                    failed,
                    reason,
                }
            }
        }
    }

    /// 버퍼 코멘트와 정확히 같은 범위에 있는 기존 태그 코멘트를 지운다.
    async fn drain_stale_comments(
        &mut self,
        number: u64,
        selector: RepoSelector,
        route: Route<'a>,
    ) -> usize {
        if self.review_buffer.is_empty() {
            return 0;
        }

        let existing = self
            .list_review_comments(number, selector)
            .await
            .into_value();

        let mut stale: Vec<(CommentId, String)> = Vec::new();
        for buffered in &self.review_buffer {
            let at_range = comments_at_range(
                &existing,
                &buffered.path,
                buffered.start_line,
                buffered.end_line,
            );
            for comment in at_range {
                if comment.body.contains(COMMENT_TAG) && !stale.iter().any(|(id, _)| *id == comment.id) {
                    stale.push((comment.id, buffered.to_string()));
                }
            }
        }

        let mut deleted = 0;
        for (comment_id, range) in stale {
            info!(repo = %route.repo, comment_id, range = %range, "deleting review comment");
            match self
                .gateway
                .delete_review_comment(route.repo, comment_id)
                .await
            {
                Ok(()) => deleted += 1,
                Err(err) => {
                    let reason = format!("{err:#}");
                    warn!(repo = %route.repo, comment_id, error = %reason, "failed to delete review comment");
                }
            }
        }
        deleted
    }

    /// 초안 리뷰를 만들고 제출 이벤트로 확정한다.
    async fn create_and_submit(
        &self,
        route: Route<'a>,
        commit_id: &str,
        body: &str,
        comments: Vec<ReviewCommentDraft>,
    ) -> Result<ReviewId> {
        let total = comments.len();
        let draft = NewReview {
            commit_id: commit_id.to_string(),
            body: None,
            event: None,
            comments,
        };
        let review = self
            .gateway
            .create_review(route.repo, route.number, &draft)
            .await
            .context("create review")?;

        info!(
            repo = %route.repo,
            pull = route.number,
            review_id = review.id,
            total,
            "submitting review"
        );
        self.gateway
            .submit_review(route.repo, route.number, review.id, ReviewEvent::Comment, body)
            .await
            .context("submit review")?;
        Ok(review.id)
    }

    /// 코멘트를 하나씩 게시한다. 실패한 항목은 건너뛴다. `(성공, 실패)` 개수.
    async fn post_individually(
        &self,
        route: Route<'a>,
        commit_id: &str,
        drafts: &[ReviewCommentDraft],
    ) -> (usize, usize) {
        let total = drafts.len();
        let mut posted = 0;
        let mut failed = 0;

        for (idx, draft) in drafts.iter().enumerate() {
            match self
                .gateway
                .create_review_comment(route.repo, route.number, commit_id, draft)
                .await
            {
                Ok(_) => posted += 1,
                Err(err) => {
                    failed += 1;
                    let reason = format!("{err:#}");
                    warn!(
                        repo = %route.repo,
                        path = %draft.path,
                        start_line = draft.start_line.unwrap_or(draft.line),
                        end_line = draft.line,
                        error = %reason,
                        "failed to create review comment"
                    );
                }
            }
            info!("comment {}/{} posted", idx + 1, total);
        }

        (posted, failed)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fake_gateway::{FakeGateway, mirror, origin, test_context};
    use super::*;
    use crate::domain::comment::{Comment, DiffSide};
    use crate::domain::tags::COMMENT_GREETING;

    #[tokio::test]
    async fn batch_submission_creates_one_review() {
        let gateway = FakeGateway::default();
        let ctx = test_context();
        let mut commenter = Commenter::new(&gateway, &ctx);
        commenter.buffer_review_comment("src/a.rs", 4, 4, "single");
        commenter.buffer_review_comment("src/b.rs", 10, 14, "multi");

        let report = commenter
            .submit_review(7, "head-sha", "status", RepoSelector::Origin)
            .await;

        let SubmitReport::Batched { comments, .. } = report else {
            panic!("expected batched report, got {report:?}");
        };
        assert_eq!(comments, 2);

        let created = gateway.created_reviews();
        assert_eq!(created.len(), 1);
        let (target, review) = &created[0];
        assert_eq!(target, "acme/app#7");
        assert_eq!(review.commit_id, "head-sha");
        assert_eq!(review.comments[0].start_line, None);
        assert_eq!(review.comments[1].start_line, Some(10));
        assert_eq!(review.comments[1].start_side, Some(DiffSide::Right));
        assert!(review.comments[0].body.starts_with(COMMENT_GREETING));
        assert!(review.comments[0].body.ends_with(COMMENT_TAG));
        assert_eq!(gateway.count_calls("submit_review"), 1);
        assert_eq!(gateway.count_calls("create_review_comment"), 0);
    }

    #[tokio::test]
    async fn empty_buffer_submits_status_only_review() {
        let gateway = FakeGateway::default();
        let ctx = test_context();
        let mut commenter = Commenter::new(&gateway, &ctx);

        let report = commenter
            .submit_review(7, "head-sha", "nothing to flag", RepoSelector::Origin)
            .await;

        assert!(matches!(report, SubmitReport::StatusOnly { .. }));
        let created = gateway.created_reviews();
        let review = &created[0].1;
        assert_eq!(review.event, Some(ReviewEvent::Comment));
        assert_eq!(
            review.body.as_deref(),
            Some(format!("{COMMENT_GREETING}\n\nnothing to flag\n").as_str())
        );
        assert!(review.comments.is_empty());
        assert_eq!(gateway.count_calls("submit_review"), 0);
    }

    #[tokio::test]
    async fn empty_buffer_failure_has_no_fallback() {
        let gateway = FakeGateway::default();
        gateway.fail_on("create_review");
        let ctx = test_context();
        let mut commenter = Commenter::new(&gateway, &ctx);

        let report = commenter
            .submit_review(7, "head-sha", "status", RepoSelector::Origin)
            .await;

        assert!(matches!(report, SubmitReport::Failed { .. }));
        assert_eq!(gateway.count_calls("create_review_comment"), 0);
    }

    #[tokio::test]
    async fn failed_batch_falls_back_to_each_comment_once() {
        let gateway = FakeGateway::default();
        gateway.fail_on("create_review");
        gateway.fail_review_comments_on("bad.rs");
        let ctx = test_context();
        let mut commenter = Commenter::new(&gateway, &ctx);
        commenter.buffer_review_comment("a.rs", 1, 1, "one");
        commenter.buffer_review_comment("bad.rs", 2, 5, "two");
        commenter.buffer_review_comment("c.rs", 3, 3, "three");

        let report = commenter
            .submit_review(7, "head-sha", "status", RepoSelector::Origin)
            .await;

        let SubmitReport::Fallback { posted, failed, .. } = report else {
            panic!("expected fallback report, got {report:?}");
        };
        assert_eq!((posted, failed), (2, 1));

        let attempts = gateway.review_comment_attempts();
        let paths: Vec<_> = attempts.iter().map(|(_, d)| d.path.as_str()).collect();
        assert_eq!(paths, vec!["a.rs", "bad.rs", "c.rs"]);
        assert!(attempts.iter().all(|(commit, _)| commit == "head-sha"));
        assert_eq!(gateway.review_comments(&origin(), 7).len(), 2);
    }

    #[tokio::test]
    async fn failed_finalize_deletes_leftover_draft_before_fallback() {
        let gateway = FakeGateway::default();
        gateway.fail_on("submit_review");
        let ctx = test_context();
        let mut commenter = Commenter::new(&gateway, &ctx);
        commenter.buffer_review_comment("a.rs", 1, 1, "one");

        let report = commenter
            .submit_review(7, "head-sha", "status", RepoSelector::Origin)
            .await;

        assert!(matches!(report, SubmitReport::Fallback { posted: 1, failed: 0, .. }));
        assert!(
            gateway
                .reviews(&origin(), 7)
                .iter()
                .all(|r| r.state != ReviewState::Pending)
        );
        assert_eq!(gateway.count_calls("delete_pending_review"), 1);
        assert_eq!(gateway.count_calls("list_reviews"), 2);
    }

    #[tokio::test]
    async fn stale_tagged_comments_at_same_range_are_deleted() {
        let gateway = FakeGateway::default();
        let tagged = format!("old finding\n\n{COMMENT_TAG}");
        gateway.seed_review_comment(&origin(), 7, Comment::new(1, "bot", tagged.clone()).at("a.rs", 3, 6));
        gateway.seed_review_comment(&origin(), 7, Comment::new(2, "human", "keep me").at("a.rs", 3, 6));
        gateway.seed_review_comment(&origin(), 7, Comment::new(3, "bot", tagged.clone()).at("a.rs", 4, 6));
        gateway.seed_review_comment(&origin(), 7, Comment::new(4, "bot", tagged).at("b.rs", 3, 6));
        let ctx = test_context();
        let mut commenter = Commenter::new(&gateway, &ctx);
        commenter.buffer_review_comment("a.rs", 3, 6, "new finding");
        commenter.buffer_review_comment("a.rs", 3, 6, "another finding");

        commenter
            .submit_review(7, "head-sha", "status", RepoSelector::Origin)
            .await;

        let remaining: Vec<_> = gateway
            .review_comments(&origin(), 7)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(remaining, vec![2, 3, 4]);
        assert_eq!(gateway.count_calls("delete_review_comment"), 1);
    }

    #[tokio::test]
    async fn existing_pending_review_is_cleared_first() {
        let gateway = FakeGateway::default();
        gateway.seed_review(&origin(), 7, 55, ReviewState::Pending);
        gateway.seed_review(&origin(), 7, 56, ReviewState::Commented);
        let ctx = test_context();
        let mut commenter = Commenter::new(&gateway, &ctx);
        commenter.buffer_review_comment("a.rs", 1, 1, "one");

        commenter
            .submit_review(7, "head-sha", "status", RepoSelector::Origin)
            .await;

        let ids: Vec<_> = gateway.reviews(&origin(), 7).iter().map(|r| r.id).collect();
        assert!(!ids.contains(&55));
        assert!(ids.contains(&56));
    }

    #[tokio::test]
    async fn delete_pending_review_is_idempotent() {
        let gateway = FakeGateway::default();
        gateway.seed_review(&origin(), 7, 55, ReviewState::Pending);
        let ctx = test_context();
        let mut commenter = Commenter::new(&gateway, &ctx);

        let first = commenter.delete_pending_review(7, RepoSelector::Origin).await;
        let second = commenter.delete_pending_review(7, RepoSelector::Origin).await;

        assert_eq!(first, Outcome::Done(Some(55)));
        assert_eq!(second, Outcome::Done(None));
        assert_eq!(gateway.count_calls("delete_pending_review"), 1);
    }

    #[tokio::test]
    async fn housekeeping_failures_do_not_block_submission() {
        let gateway = FakeGateway::default();
        gateway.fail_on("list_reviews");
        gateway.fail_on("list_review_comments");
        let ctx = test_context();
        let mut commenter = Commenter::new(&gateway, &ctx);
        commenter.buffer_review_comment("a.rs", 1, 1, "one");

        let report = commenter
            .submit_review(7, "head-sha", "status", RepoSelector::Origin)
            .await;

        assert!(matches!(report, SubmitReport::Batched { comments: 1, .. }));
    }

    #[tokio::test]
    async fn mirror_review_uses_mirror_head_and_number() {
        let gateway = FakeGateway::default();
        let ctx = test_context();
        let mut commenter = Commenter::new(&gateway, &ctx);
        commenter.buffer_review_comment("a.rs", 1, 1, "one");

        commenter
            .submit_review(7, "origin-sha", "status", RepoSelector::Mirror)
            .await;

        let created = gateway.created_reviews();
        assert_eq!(created[0].0, format!("{}#700", mirror()));
        assert_eq!(created[0].1.commit_id, "mirror-head");
    }

    #[tokio::test]
    async fn fallback_comments_are_not_visible_in_cached_listing() {
        let gateway = FakeGateway::default();
        gateway.fail_on("create_review");
        let ctx = test_context();
        let mut commenter = Commenter::new(&gateway, &ctx);
        commenter.buffer_review_comment("a.rs", 1, 1, "one");

        commenter
            .submit_review(7, "head-sha", "status", RepoSelector::Origin)
            .await;

        assert_eq!(gateway.review_comments(&origin(), 7).len(), 1);
        let cached = commenter
            .list_review_comments(7, RepoSelector::Origin)
            .await
            .into_value();
        assert!(cached.is_empty());
    }
}
