//! 코멘트 조회 캐시와 페이지네이션.
//! 캐시는 실행 시작 시 생성되어 실행 종료와 함께 버려지며, 무효화 경로가 없다.

use std::collections::HashMap;
use std::future::Future;

use crate::domain::comment::Comment;
use crate::domain::outcome::Outcome;
use crate::domain::route::RepoSelector;

pub const PAGE_SIZE: usize = 100;

type CacheKey = (u64, RepoSelector);

/// PR 번호(원본 기준)와 저장소 선택자별 코멘트 스냅샷.
#[derive(Debug, Default)]
pub struct CommentCache {
    issue_comments: HashMap<CacheKey, Vec<Comment>>,
    review_comments: HashMap<CacheKey, Vec<Comment>>,
}

impl CommentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue_comments(&self, number: u64, selector: RepoSelector) -> Option<&[Comment]> {
        self.issue_comments
            .get(&(number, selector))
            .map(Vec::as_slice)
    }

    pub fn review_comments(&self, number: u64, selector: RepoSelector) -> Option<&[Comment]> {
        self.review_comments
            .get(&(number, selector))
            .map(Vec::as_slice)
    }

    pub(crate) fn store_issue_comments(
        &mut self,
        number: u64,
        selector: RepoSelector,
        comments: Vec<Comment>,
    ) {
        self.issue_comments.insert((number, selector), comments);
    }

    pub(crate) fn store_review_comments(
        &mut self,
        number: u64,
        selector: RepoSelector,
        comments: Vec<Comment>,
    ) {
        self.review_comments.insert((number, selector), comments);
    }

    /// 새로 만든 이슈 코멘트를 이미 채워진 버킷에 추가한다.
    /// 버킷이 비어 있으면 다음 조회가 원격에서 전체를 가져오므로 건드리지 않는다.
    pub(crate) fn push_issue_comment(
        &mut self,
        number: u64,
        selector: RepoSelector,
        comment: Comment,
    ) -> bool {
        match self.issue_comments.get_mut(&(number, selector)) {
            Some(bucket) => {
                bucket.push(comment);
                true
            }
            None => false,
        }
    }
}

/// 짧은 페이지(또는 빈 페이지)가 나올 때까지 1페이지부터 이어 붙인다.
/// 중간에 실패하면 그때까지 모은 결과를 `Recovered`로 돌려준다. 재시도는 하지 않는다.
pub async fn paginate<T, F, Fut>(page_size: usize, mut fetch: F) -> Outcome<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = anyhow::Result<Vec<T>>>,
{
    let mut items = Vec::new();
    let mut page = 1;

    loop {
        match fetch(page).await {
            Ok(batch) => {
                let short = batch.len() < page_size;
                items.extend(batch);
                if short {
                    return Outcome::Done(items);
                }
                page += 1;
            }
            Err(err) => return Outcome::recovered(items, format!("page {page}: {err:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    fn pages(sizes: &[usize]) -> Vec<Vec<usize>> {
        let mut next = 0;
        sizes
            .iter()
            .map(|&size| {
                let page: Vec<usize> = (next..next + size).collect();
                next += size;
                page
            })
            .collect()
    }

    #[tokio::test]
    async fn stops_after_short_page_and_keeps_order() {
        let source = pages(&[3, 3, 1, 3]);
        let mut requested = Vec::new();

        let outcome = paginate(3, |page| {
            requested.push(page);
            let batch = source[page as usize - 1].clone();
            async move { Ok(batch) }
        })
        .await;

        assert_eq!(outcome, Outcome::Done((0..7).collect::<Vec<_>>()));
        assert_eq!(requested, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn full_last_page_needs_an_empty_page_to_terminate() {
        let source = pages(&[2, 2, 0]);
        let mut requested = Vec::new();

        let outcome = paginate(2, |page| {
            requested.push(page);
            let batch = source[page as usize - 1].clone();
            async move { Ok(batch) }
        })
        .await;

        assert_eq!(outcome.into_value(), vec![0, 1, 2, 3]);
        assert_eq!(requested, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn empty_first_page_yields_nothing() {
        let outcome = paginate::<usize, _, _>(100, |_| async { Ok(Vec::new()) }).await;
        assert_eq!(outcome, Outcome::Done(Vec::new()));
    }

    #[tokio::test]
    async fn failure_returns_partial_result() {
        let outcome = paginate(2, |page| async move {
            if page == 1 {
                Ok(vec!["a", "b"])
            } else {
                Err(anyhow!("boom"))
            }
        })
        .await;

        assert!(!outcome.is_done());
        assert_eq!(outcome.value(), &vec!["a", "b"]);
        assert!(outcome.reason().unwrap().contains("boom"));
    }

    #[test]
    fn push_only_extends_populated_buckets() {
        let mut cache = CommentCache::new();
        let comment = Comment::new(1, "bot", "body");

        assert!(!cache.push_issue_comment(7, RepoSelector::Origin, comment.clone()));
        assert!(cache.issue_comments(7, RepoSelector::Origin).is_none());

        cache.store_issue_comments(7, RepoSelector::Origin, Vec::new());
        assert!(cache.push_issue_comment(7, RepoSelector::Origin, comment.clone()));
        assert_eq!(cache.issue_comments(7, RepoSelector::Origin), Some(&[comment][..]));
        assert!(cache.issue_comments(7, RepoSelector::Mirror).is_none());
    }
}
