//! 테스트용 인메모리 플랫폼 게이트웨이.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;

use crate::application::context::ExecutionContext;
use crate::application::ports::PlatformGateway;
use crate::domain::comment::{
    Comment, CommentId, NewReview, PullRequest, Review, ReviewCommentDraft, ReviewEvent, ReviewId,
    ReviewState,
};
use crate::domain::route::{MirrorRepo, RepoMapping, RepoRef};

pub(crate) fn origin() -> RepoRef {
    RepoRef::new("acme", "app")
}

pub(crate) fn mirror() -> RepoRef {
    RepoRef::new("mirror-org", "app-mirror")
}

/// 원본 acme/app#7, 미러 mirror-org/app-mirror#700.
pub(crate) fn test_context() -> ExecutionContext {
    let mapping = RepoMapping::new(
        origin(),
        Some(MirrorRepo {
            repo: mirror(),
            pr_map: BTreeMap::from([(7, 700)]),
        }),
    );
    ExecutionContext::new(mapping, 7).with_mirror_head_sha("mirror-head")
}

type Key = (String, u64);

fn key(repo: &RepoRef, number: u64) -> Key {
    (repo.to_string(), number)
}

#[derive(Default)]
struct State {
    pulls: HashMap<Key, PullRequest>,
    issue_comments: HashMap<Key, Vec<Comment>>,
    review_comments: HashMap<Key, Vec<Comment>>,
    commits: HashMap<Key, Vec<String>>,
    reviews: HashMap<Key, Vec<Review>>,
    created_reviews: Vec<(Key, NewReview)>,
    posted_review_comments: Vec<(Key, String, ReviewCommentDraft)>,
    calls: Vec<String>,
    failing: HashSet<String>,
    failing_pages: HashMap<String, u32>,
    failing_paths: HashSet<String>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        1000 + self.next_id
    }

    fn record(&mut self, op: &str) -> Result<()> {
        self.calls.push(op.to_string());
        if self.failing.contains(op) {
            bail!("{op}: injected failure");
        }
        Ok(())
    }

    fn record_page(&mut self, op: &str, page: u32) -> Result<()> {
        self.record(op)?;
        if self.failing_pages.get(op) == Some(&page) {
            bail!("{op}: injected failure on page {page}");
        }
        Ok(())
    }
}

fn page_of<T: Clone>(items: Option<&Vec<T>>, page: u32, per_page: usize) -> Vec<T> {
    items
        .map(|all| {
            all.iter()
                .skip((page as usize - 1) * per_page)
                .take(per_page)
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

fn find_comment_mut<'s>(
    buckets: &'s mut HashMap<Key, Vec<Comment>>,
    repo: &RepoRef,
    comment_id: CommentId,
) -> Option<&'s mut Comment> {
    let repo = repo.to_string();
    buckets
        .iter_mut()
        .filter(|(key, _)| key.0 == repo)
        .flat_map(|(_, comments)| comments.iter_mut())
        .find(|c| c.id == comment_id)
}

#[derive(Default)]
pub(crate) struct FakeGateway {
    state: Mutex<State>,
}

impl FakeGateway {
    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("fake gateway state poisoned")
    }

    pub(crate) fn fail_on(&self, op: &str) {
        self.state().failing.insert(op.to_string());
    }

    pub(crate) fn fail_on_page(&self, op: &str, page: u32) {
        self.state().failing_pages.insert(op.to_string(), page);
    }

    pub(crate) fn fail_review_comments_on(&self, path: &str) {
        self.state().failing_paths.insert(path.to_string());
    }

    pub(crate) fn seed_pull(&self, repo: &RepoRef, number: u64, body: Option<&str>, head: &str) {
        self.state().pulls.insert(
            key(repo, number),
            PullRequest {
                number,
                body: body.map(ToString::to_string),
                head_sha: head.to_string(),
            },
        );
    }

    pub(crate) fn seed_issue_comment(&self, repo: &RepoRef, number: u64, comment: Comment) {
        self.state()
            .issue_comments
            .entry(key(repo, number))
            .or_default()
            .push(comment);
    }

    pub(crate) fn seed_review_comment(&self, repo: &RepoRef, number: u64, comment: Comment) {
        self.state()
            .review_comments
            .entry(key(repo, number))
            .or_default()
            .push(comment);
    }

    pub(crate) fn seed_review(&self, repo: &RepoRef, number: u64, id: ReviewId, state: ReviewState) {
        self.state()
            .reviews
            .entry(key(repo, number))
            .or_default()
            .push(Review { id, state });
    }

    pub(crate) fn seed_commits(&self, repo: &RepoRef, number: u64, shas: &[&str]) {
        self.state()
            .commits
            .insert(key(repo, number), shas.iter().map(|s| s.to_string()).collect());
    }

    pub(crate) fn issue_comments(&self, repo: &RepoRef, number: u64) -> Vec<Comment> {
        self.state()
            .issue_comments
            .get(&key(repo, number))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn review_comments(&self, repo: &RepoRef, number: u64) -> Vec<Comment> {
        self.state()
            .review_comments
            .get(&key(repo, number))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn reviews(&self, repo: &RepoRef, number: u64) -> Vec<Review> {
        self.state()
            .reviews
            .get(&key(repo, number))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn pull_body(&self, repo: &RepoRef, number: u64) -> Option<String> {
        self.state()
            .pulls
            .get(&key(repo, number))
            .and_then(|pr| pr.body.clone())
    }

    /// `(저장소#번호, 리뷰 요청)` 목록.
    pub(crate) fn created_reviews(&self) -> Vec<(String, NewReview)> {
        self.state()
            .created_reviews
            .iter()
            .map(|((repo, number), review)| (format!("{repo}#{number}"), review.clone()))
            .collect()
    }

    /// `(commit, 초안)` 목록. 실패한 시도도 포함한다.
    pub(crate) fn review_comment_attempts(&self) -> Vec<(String, ReviewCommentDraft)> {
        self.state()
            .posted_review_comments
            .iter()
            .map(|(_, commit, draft)| (commit.clone(), draft.clone()))
            .collect()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub(crate) fn count_calls(&self, op: &str) -> usize {
        self.state().calls.iter().filter(|c| c.as_str() == op).count()
    }
}

#[async_trait]
impl PlatformGateway for FakeGateway {
    async fn get_pull_request(&self, repo: &RepoRef, number: u64) -> Result<PullRequest> {
        let mut state = self.state();
        state.record("get_pull_request")?;
        state
            .pulls
            .get(&key(repo, number))
            .cloned()
            .ok_or_else(|| anyhow!("pull request {repo}#{number} not found"))
    }

    async fn update_pull_request_body(
        &self,
        repo: &RepoRef,
        number: u64,
        body: &str,
    ) -> Result<()> {
        let mut state = self.state();
        state.record("update_pull_request_body")?;
        let pr = state
            .pulls
            .get_mut(&key(repo, number))
            .ok_or_else(|| anyhow!("pull request {repo}#{number} not found"))?;
        pr.body = Some(body.to_string());
        Ok(())
    }

    async fn list_issue_comments(
        &self,
        repo: &RepoRef,
        number: u64,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<Comment>> {
        let mut state = self.state();
        state.record_page("list_issue_comments", page)?;
        Ok(page_of(state.issue_comments.get(&key(repo, number)), page, per_page))
    }

    async fn list_review_comments(
        &self,
        repo: &RepoRef,
        number: u64,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<Comment>> {
        let mut state = self.state();
        state.record_page("list_review_comments", page)?;
        Ok(page_of(state.review_comments.get(&key(repo, number)), page, per_page))
    }

    async fn list_commits(
        &self,
        repo: &RepoRef,
        number: u64,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<String>> {
        let mut state = self.state();
        state.record_page("list_commits", page)?;
        Ok(page_of(state.commits.get(&key(repo, number)), page, per_page))
    }

    async fn list_reviews(
        &self,
        repo: &RepoRef,
        number: u64,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<Review>> {
        let mut state = self.state();
        state.record_page("list_reviews", page)?;
        Ok(page_of(state.reviews.get(&key(repo, number)), page, per_page))
    }

    async fn create_issue_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        body: &str,
    ) -> Result<Comment> {
        let mut state = self.state();
        state.record("create_issue_comment")?;
        let comment = Comment::new(state.next_id(), "prcomment[bot]", body);
        state
            .issue_comments
            .entry(key(repo, number))
            .or_default()
            .push(comment.clone());
        Ok(comment)
    }

    async fn update_issue_comment(
        &self,
        repo: &RepoRef,
        comment_id: CommentId,
        body: &str,
    ) -> Result<Comment> {
        let mut state = self.state();
        state.record("update_issue_comment")?;
        let comment = find_comment_mut(&mut state.issue_comments, repo, comment_id)
            .ok_or_else(|| anyhow!("issue comment {comment_id} not found"))?;
        comment.body = body.to_string();
        Ok(comment.clone())
    }

    async fn create_review(
        &self,
        repo: &RepoRef,
        number: u64,
        review: &NewReview,
    ) -> Result<Review> {
        let mut state = self.state();
        state.created_reviews.push((key(repo, number), review.clone()));
        state.record("create_review")?;
        let created = Review {
            id: state.next_id(),
            state: if review.event.is_some() {
                ReviewState::Commented
            } else {
                ReviewState::Pending
            },
        };
        state
            .reviews
            .entry(key(repo, number))
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn submit_review(
        &self,
        repo: &RepoRef,
        number: u64,
        review_id: ReviewId,
        _event: ReviewEvent,
        _body: &str,
    ) -> Result<Review> {
        let mut state = self.state();
        state.record("submit_review")?;
        let review = state
            .reviews
            .get_mut(&key(repo, number))
            .and_then(|reviews| reviews.iter_mut().find(|r| r.id == review_id))
            .ok_or_else(|| anyhow!("review {review_id} not found"))?;
        review.state = ReviewState::Commented;
        Ok(review.clone())
    }

    async fn delete_pending_review(
        &self,
        repo: &RepoRef,
        number: u64,
        review_id: ReviewId,
    ) -> Result<()> {
        let mut state = self.state();
        state.record("delete_pending_review")?;
        let reviews = state.reviews.entry(key(repo, number)).or_default();
        let idx = reviews
            .iter()
            .position(|r| r.id == review_id && r.state == ReviewState::Pending)
            .ok_or_else(|| anyhow!("pending review {review_id} not found"))?;
        reviews.remove(idx);
        Ok(())
    }

    async fn create_review_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        commit_id: &str,
        comment: &ReviewCommentDraft,
    ) -> Result<Comment> {
        let mut state = self.state();
        state
            .posted_review_comments
            .push((key(repo, number), commit_id.to_string(), comment.clone()));
        state.record("create_review_comment")?;
        if state.failing_paths.contains(&comment.path) {
            bail!("create_review_comment: invalid range for {}", comment.path);
        }
        let created = Comment::new(state.next_id(), "prcomment[bot]", comment.body.clone()).at(
            comment.path.clone(),
            comment.start_line.unwrap_or(comment.line),
            comment.line,
        );
        state
            .review_comments
            .entry(key(repo, number))
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update_review_comment(
        &self,
        repo: &RepoRef,
        comment_id: CommentId,
        body: &str,
    ) -> Result<Comment> {
        let mut state = self.state();
        state.record("update_review_comment")?;
        let comment = find_comment_mut(&mut state.review_comments, repo, comment_id)
            .ok_or_else(|| anyhow!("review comment {comment_id} not found"))?;
        comment.body = body.to_string();
        Ok(comment.clone())
    }

    async fn delete_review_comment(&self, repo: &RepoRef, comment_id: CommentId) -> Result<()> {
        let mut state = self.state();
        state.record("delete_review_comment")?;
        let repo = repo.to_string();
        let bucket = state
            .review_comments
            .iter_mut()
            .find(|(key, comments)| key.0 == repo && comments.iter().any(|c| c.id == comment_id))
            .map(|(_, comments)| comments)
            .ok_or_else(|| anyhow!("review comment {comment_id} not found"))?;
        bucket.retain(|c| c.id != comment_id);
        Ok(())
    }

    async fn create_reply_to_review_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        comment_id: CommentId,
        body: &str,
    ) -> Result<Comment> {
        let mut state = self.state();
        state.record("create_reply_to_review_comment")?;
        let id = state.next_id();
        let bucket = state.review_comments.entry(key(repo, number)).or_default();
        let parent = bucket
            .iter()
            .find(|c| c.id == comment_id)
            .cloned()
            .ok_or_else(|| anyhow!("review comment {comment_id} not found"))?;
        let mut reply = Comment::new(id, "prcomment[bot]", body).replying_to(comment_id);
        reply.path = parent.path;
        reply.start_line = parent.start_line;
        reply.end_line = parent.end_line;
        bucket.push(reply.clone());
        Ok(reply)
    }
}
