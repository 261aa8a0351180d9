//! 평면 코멘트 목록에서 대화 스레드를 복원하는 규칙.

use std::collections::{HashMap, HashSet};

use crate::domain::comment::{Comment, CommentId};

const CHAIN_SEPARATOR: &str = "\n---\n";

/// 부모 역참조를 따라 스레드 루트를 찾는다.
/// 부모가 목록에 없거나 순환이 생기면 그 지점에서 멈춘다.
pub fn top_level_of<'a>(comments: &'a [Comment], comment: &'a Comment) -> &'a Comment {
    let by_id: HashMap<CommentId, &Comment> = comments.iter().map(|c| (c.id, c)).collect();
    let mut visited = HashSet::from([comment.id]);
    let mut current = comment;

    while let Some(parent_id) = current.in_reply_to_id {
        let Some(&parent) = by_id.get(&parent_id) else {
            break;
        };
        if !visited.insert(parent.id) {
            break;
        }
        current = parent;
    }

    current
}

/// 루트와 루트의 직접 답글만 `author: body` 형식으로 이어 붙인다.
/// 손자 답글은 포함하지 않는다.
pub fn chain_of(comments: &[Comment], top_level: &Comment) -> String {
    std::iter::once(top_level)
        .chain(
            comments
                .iter()
                .filter(|c| c.in_reply_to_id == Some(top_level.id)),
        )
        .map(|c| format!("{}: {}", c.author, c.body))
        .collect::<Vec<_>>()
        .join(CHAIN_SEPARATOR)
}

/// 범위 안 루트 코멘트들의 체인 중 `tag`를 포함하는 것만 번호를 붙여 보고서로 만든다.
pub fn chains_report(comments: &[Comment], tag: &str) -> String {
    let mut report = String::new();
    let mut chain_num = 0;

    for root in comments.iter().filter(|c| c.is_thread_root()) {
        let chain = chain_of(comments, root);
        if chain.is_empty() || !chain.contains(tag) {
            continue;
        }
        chain_num += 1;
        report.push_str(&format!("Conversation Chain {chain_num}:\n{chain}\n---\n"));
    }

    report
}

/// 범위에 포함되는 리뷰 코멘트. 단일 라인 요청은 끝 라인 일치로 판단한다.
pub fn comments_within_range<'a>(
    comments: &'a [Comment],
    path: &str,
    start_line: u32,
    end_line: u32,
) -> Vec<&'a Comment> {
    filter_range(comments, path, start_line, end_line, |s, e| {
        s >= start_line && e <= end_line
    })
}

/// 정확히 같은 범위에 달린 리뷰 코멘트.
pub fn comments_at_range<'a>(
    comments: &'a [Comment],
    path: &str,
    start_line: u32,
    end_line: u32,
) -> Vec<&'a Comment> {
    filter_range(comments, path, start_line, end_line, |s, e| {
        s == start_line && e == end_line
    })
}

fn filter_range<'a>(
    comments: &'a [Comment],
    path: &str,
    start_line: u32,
    end_line: u32,
    multi_line_match: impl Fn(u32, u32) -> bool,
) -> Vec<&'a Comment> {
    comments
        .iter()
        .filter(|c| c.path.as_deref() == Some(path) && !c.body.is_empty())
        .filter(|c| {
            let multi = matches!(
                (c.start_line, c.end_line),
                (Some(s), Some(e)) if multi_line_match(s, e)
            );
            let single = start_line == end_line && c.end_line == Some(end_line);
            multi || single
        })
        .collect()
}
