//! GitHub REST API 연동 구현.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::application::ports::PlatformGateway;
use crate::domain::comment::{
    Comment, CommentId, DiffSide, NewReview, PullRequest, Review, ReviewCommentDraft, ReviewEvent,
    ReviewId, ReviewState,
};
use crate::domain::route::RepoRef;

pub struct GitHubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn repo_endpoint(&self, repo: &RepoRef, tail: &str) -> String {
        format!("{}/repos/{}/{}/{tail}", self.api_base, repo.owner, repo.repo)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        // 공통 헤더/인증 적용.
        let req = self
            .client
            .request(method, url)
            .header("User-Agent", "prcomment")
            .header("Accept", "application/vnd.github+json");

        if let Some(token) = &self.token {
            req.bearer_auth(token)
        } else {
            req
        }
    }

    fn page_request(&self, url: String, page: u32, per_page: usize) -> RequestBuilder {
        self.request(Method::GET, url)
            .query(&[("page", page.to_string()), ("per_page", per_page.to_string())])
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, action: &str) -> Result<T> {
        let body = self.send_text(req, action).await?;
        serde_json::from_str(&body).with_context(|| format!("github: invalid {action} JSON"))
    }

    async fn send_text(&self, req: RequestBuilder, action: &str) -> Result<String> {
        let resp: Response = req
            .send()
            .await
            .with_context(|| format!("github: failed to {action}"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("github: failed to read {action} body"))?;

        if !status.is_success() {
            bail!("github: failed to {action} ({status}): {body}");
        }
        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    number: u64,
    body: Option<String>,
    head: PullHead,
}

#[derive(Debug, Deserialize)]
struct PullHead {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Debug, Deserialize)]
struct CommentResponse {
    id: u64,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    user: Option<UserResponse>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    original_line: Option<u32>,
    #[serde(default)]
    start_line: Option<u32>,
    #[serde(default)]
    original_start_line: Option<u32>,
    #[serde(default)]
    in_reply_to_id: Option<u64>,
}

impl From<CommentResponse> for Comment {
    fn from(c: CommentResponse) -> Self {
        // outdated 코멘트는 line이 비고 original_line만 남는다.
        Comment {
            id: c.id,
            body: c.body.unwrap_or_default(),
            author: c.user.map(|u| u.login).unwrap_or_default(),
            path: c.path,
            start_line: c.start_line.or(c.original_start_line),
            end_line: c.line.or(c.original_line),
            in_reply_to_id: c.in_reply_to_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ReviewResponse {
    id: u64,
    #[serde(default)]
    state: String,
}

impl From<ReviewResponse> for Review {
    fn from(r: ReviewResponse) -> Self {
        Review {
            id: r.id,
            state: ReviewState::from_api(&r.state),
        }
    }
}

#[derive(Debug, Serialize)]
struct DraftPayload<'a> {
    path: &'a str,
    body: &'a str,
    line: u32,
    /// 다중 라인 코멘트에만 보낸다.
    #[serde(skip_serializing_if = "Option::is_none")]
    side: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_side: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit_id: Option<&'a str>,
}

impl<'a> DraftPayload<'a> {
    fn new(draft: &'a ReviewCommentDraft, commit_id: Option<&'a str>) -> Self {
        Self {
            path: &draft.path,
            body: &draft.body,
            line: draft.line,
            side: draft.start_side.map(DiffSide::as_api),
            start_line: draft.start_line,
            start_side: draft.start_side.map(DiffSide::as_api),
            commit_id,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReviewPayload<'a> {
    commit_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<&'static str>,
    comments: Vec<DraftPayload<'a>>,
}

#[async_trait]
impl PlatformGateway for GitHubClient {
    async fn get_pull_request(&self, repo: &RepoRef, number: u64) -> Result<PullRequest> {
        let url = self.repo_endpoint(repo, &format!("pulls/{number}"));
        let pr: PullResponse = self.send(self.request(Method::GET, url), "fetch PR").await?;
        Ok(PullRequest {
            number: pr.number,
            body: pr.body,
            head_sha: pr.head.sha,
        })
    }

    async fn update_pull_request_body(
        &self,
        repo: &RepoRef,
        number: u64,
        body: &str,
    ) -> Result<()> {
        let url = self.repo_endpoint(repo, &format!("pulls/{number}"));
        self.send_text(
            self.request(Method::PATCH, url).json(&json!({ "body": body })),
            "update PR",
        )
        .await?;
        Ok(())
    }

    async fn list_issue_comments(
        &self,
        repo: &RepoRef,
        number: u64,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<Comment>> {
        let url = self.repo_endpoint(repo, &format!("issues/{number}/comments"));
        let comments: Vec<CommentResponse> = self
            .send(self.page_request(url, page, per_page), "list comments")
            .await?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }

    async fn list_review_comments(
        &self,
        repo: &RepoRef,
        number: u64,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<Comment>> {
        let url = self.repo_endpoint(repo, &format!("pulls/{number}/comments"));
        let comments: Vec<CommentResponse> = self
            .send(self.page_request(url, page, per_page), "list review comments")
            .await?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }

    async fn list_commits(
        &self,
        repo: &RepoRef,
        number: u64,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<String>> {
        let url = self.repo_endpoint(repo, &format!("pulls/{number}/commits"));
        let commits: Vec<CommitResponse> = self
            .send(self.page_request(url, page, per_page), "list commits")
            .await?;
        Ok(commits.into_iter().map(|c| c.sha).collect())
    }

    async fn list_reviews(
        &self,
        repo: &RepoRef,
        number: u64,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<Review>> {
        let url = self.repo_endpoint(repo, &format!("pulls/{number}/reviews"));
        let reviews: Vec<ReviewResponse> = self
            .send(self.page_request(url, page, per_page), "list reviews")
            .await?;
        Ok(reviews.into_iter().map(Review::from).collect())
    }

    async fn create_issue_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        body: &str,
    ) -> Result<Comment> {
        let url = self.repo_endpoint(repo, &format!("issues/{number}/comments"));
        let comment: CommentResponse = self
            .send(
                self.request(Method::POST, url).json(&json!({ "body": body })),
                "create comment",
            )
            .await?;
        Ok(comment.into())
    }

    async fn update_issue_comment(
        &self,
        repo: &RepoRef,
        comment_id: CommentId,
        body: &str,
    ) -> Result<Comment> {
        let url = self.repo_endpoint(repo, &format!("issues/comments/{comment_id}"));
        let comment: CommentResponse = self
            .send(
                self.request(Method::PATCH, url).json(&json!({ "body": body })),
                "update comment",
            )
            .await?;
        Ok(comment.into())
    }

    async fn create_review(
        &self,
        repo: &RepoRef,
        number: u64,
        review: &NewReview,
    ) -> Result<Review> {
        let url = self.repo_endpoint(repo, &format!("pulls/{number}/reviews"));
        let payload = ReviewPayload {
            commit_id: &review.commit_id,
            body: review.body.as_deref(),
            event: review.event.map(ReviewEvent::as_api),
            comments: review
                .comments
                .iter()
                .map(|draft| DraftPayload::new(draft, None))
                .collect(),
        };
        let created: ReviewResponse = self
            .send(self.request(Method::POST, url).json(&payload), "create review")
            .await?;
        Ok(created.into())
    }

    async fn submit_review(
        &self,
        repo: &RepoRef,
        number: u64,
        review_id: ReviewId,
        event: ReviewEvent,
        body: &str,
    ) -> Result<Review> {
        let url = self.repo_endpoint(repo, &format!("pulls/{number}/reviews/{review_id}/events"));
        let submitted: ReviewResponse = self
            .send(
                self.request(Method::POST, url)
                    .json(&json!({ "event": event.as_api(), "body": body })),
                "submit review",
            )
            .await?;
        Ok(submitted.into())
    }

    async fn delete_pending_review(
        &self,
        repo: &RepoRef,
        number: u64,
        review_id: ReviewId,
    ) -> Result<()> {
        let url = self.repo_endpoint(repo, &format!("pulls/{number}/reviews/{review_id}"));
        self.send_text(self.request(Method::DELETE, url), "delete pending review")
            .await?;
        Ok(())
    }

    async fn create_review_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        commit_id: &str,
        comment: &ReviewCommentDraft,
    ) -> Result<Comment> {
        let url = self.repo_endpoint(repo, &format!("pulls/{number}/comments"));
        let created: CommentResponse = self
            .send(
                self.request(Method::POST, url)
                    .json(&DraftPayload::new(comment, Some(commit_id))),
                "create review comment",
            )
            .await?;
        Ok(created.into())
    }

    async fn update_review_comment(
        &self,
        repo: &RepoRef,
        comment_id: CommentId,
        body: &str,
    ) -> Result<Comment> {
        let url = self.repo_endpoint(repo, &format!("pulls/comments/{comment_id}"));
        let updated: CommentResponse = self
            .send(
                self.request(Method::PATCH, url).json(&json!({ "body": body })),
                "update review comment",
            )
            .await?;
        Ok(updated.into())
    }

    async fn delete_review_comment(&self, repo: &RepoRef, comment_id: CommentId) -> Result<()> {
        let url = self.repo_endpoint(repo, &format!("pulls/comments/{comment_id}"));
        self.send_text(self.request(Method::DELETE, url), "delete review comment")
            .await?;
        Ok(())
    }

    async fn create_reply_to_review_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        comment_id: CommentId,
        body: &str,
    ) -> Result<Comment> {
        let url = self.repo_endpoint(repo, &format!("pulls/{number}/comments/{comment_id}/replies"));
        let reply: CommentResponse = self
            .send(
                self.request(Method::POST, url).json(&json!({ "body": body })),
                "reply to review comment",
            )
            .await?;
        Ok(reply.into())
    }
}
