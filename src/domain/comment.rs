//! PR 코멘트/리뷰 도메인 엔티티.

use std::fmt;

pub type CommentId = u64;
pub type ReviewId = u64;

/// 이슈 코멘트 또는 파일 범위에 달린 리뷰 코멘트.
///
/// `start_line`이 없고 `end_line`만 있으면 단일 라인 코멘트다.
/// `in_reply_to_id`는 부모를 가리키는 역참조일 뿐 소유 관계가 아니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub body: String,
    pub author: String,
    pub path: Option<String>,
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
    pub in_reply_to_id: Option<CommentId>,
}

impl Comment {
    pub fn new(id: CommentId, author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            body: body.into(),
            author: author.into(),
            path: None,
            start_line: None,
            end_line: None,
            in_reply_to_id: None,
        }
    }

    /// 파일 범위를 지정한다. `start == end`이면 단일 라인으로 기록한다.
    pub fn at(mut self, path: impl Into<String>, start: u32, end: u32) -> Self {
        self.path = Some(path.into());
        self.start_line = (start != end).then_some(start);
        self.end_line = Some(end);
        self
    }

    pub fn replying_to(mut self, parent: CommentId) -> Self {
        self.in_reply_to_id = Some(parent);
        self
    }

    pub fn is_thread_root(&self) -> bool {
        self.in_reply_to_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewState {
    Pending,
    Commented,
    Approved,
    ChangesRequested,
    Dismissed,
    Other(String),
}

impl ReviewState {
    /// 플랫폼 API의 상태 문자열을 해석한다.
    pub fn from_api(raw: &str) -> Self {
        match raw {
            "PENDING" => Self::Pending,
            "COMMENTED" => Self::Commented,
            "APPROVED" => Self::Approved,
            "CHANGES_REQUESTED" => Self::ChangesRequested,
            "DISMISSED" => Self::Dismissed,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: ReviewId,
    pub state: ReviewState,
}

/// 리뷰 제출 이벤트. 이 도구는 verdict 없이 코멘트 이벤트만 사용한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewEvent {
    Comment,
}

impl ReviewEvent {
    pub fn as_api(self) -> &'static str {
        match self {
            Self::Comment => "COMMENT",
        }
    }
}

/// diff 비교 기준 면. 다중 라인 코멘트는 항상 변경 후(RIGHT) 기준이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffSide {
    Right,
}

impl DiffSide {
    pub fn as_api(self) -> &'static str {
        match self {
            Self::Right => "RIGHT",
        }
    }
}

/// 제출 전까지 프로세스 메모리에만 존재하는 인라인 코멘트.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedReviewComment {
    pub path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub message: String,
}

impl fmt::Display for BufferedReviewComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.path, self.start_line, self.end_line)
    }
}

/// 플랫폼 범위 인코딩으로 변환된 리뷰 코멘트.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewCommentDraft {
    pub path: String,
    pub body: String,
    pub line: u32,
    pub start_line: Option<u32>,
    pub start_side: Option<DiffSide>,
}

impl From<&BufferedReviewComment> for ReviewCommentDraft {
    fn from(comment: &BufferedReviewComment) -> Self {
        // 단일 라인은 끝 라인만, 다중 라인은 시작 라인과 비교 면을 함께 보낸다.
        let multi_line = comment.start_line != comment.end_line;
        Self {
            path: comment.path.clone(),
            body: comment.message.clone(),
            line: comment.end_line,
            start_line: multi_line.then_some(comment.start_line),
            start_side: multi_line.then_some(DiffSide::Right),
        }
    }
}

/// 초안 리뷰 생성 요청.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub commit_id: String,
    pub body: Option<String>,
    pub event: Option<ReviewEvent>,
    pub comments: Vec<ReviewCommentDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub body: Option<String>,
    pub head_sha: String,
}
