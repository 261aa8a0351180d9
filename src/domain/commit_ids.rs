//! 리뷰 완료 커밋 SHA 목록을 코멘트 본문에 기록/조회하는 규칙.
//! 영역 형식: `<!-- commit_ids_reviewed_start -->`, SHA마다 `<!-- sha -->`, 종료 마커.

use crate::domain::tags::COMMIT_IDS;

/// 본문에 기록된 리뷰 완료 SHA 목록(기록 순서 유지).
pub fn reviewed_ids(body: &str) -> Vec<String> {
    COMMIT_IDS
        .content_within(body)
        .split("<!--")
        .map(|id| id.replacen("-->", "", 1).trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

/// 마커를 포함한 SHA 목록 영역. 없으면 빈 문자열.
pub fn reviewed_ids_block(body: &str) -> &str {
    COMMIT_IDS.block(body)
}

/// SHA를 목록 끝에 추가한다. 영역이 없으면 본문 끝에 새로 만든다.
/// 기존 항목은 지우거나 재정렬하지 않는다.
pub fn add_reviewed_id(body: &str, sha: &str) -> String {
    let entry = format!("<!-- {sha} -->\n");
    COMMIT_IDS
        .insert_before_end(body, &entry)
        .unwrap_or_else(|| format!("{body}\n{}\n{entry}{}", COMMIT_IDS.start, COMMIT_IDS.end))
}

/// 커밋 목록을 최신부터 거슬러 올라가며 처음 만나는 리뷰 완료 SHA.
/// 증분 리뷰의 diff 기준점이며, 없으면 PR base부터 리뷰해야 한다.
pub fn highest_reviewed<'a>(commit_ids: &'a [String], reviewed: &[String]) -> Option<&'a str> {
    commit_ids
        .iter()
        .rev()
        .find(|id| reviewed.contains(*id))
        .map(String::as_str)
}

/// 증분 리뷰 상태 스냅샷.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewProgress {
    pub all_commits: Vec<String>,
    pub reviewed: Vec<String>,
}

impl ReviewProgress {
    pub fn baseline(&self) -> Option<&str> {
        highest_reviewed(&self.all_commits, &self.reviewed)
    }

    /// 기준점 이후의 커밋. 기준점이 없으면 전체.
    pub fn unreviewed(&self) -> &[String] {
        match self.baseline() {
            Some(base) => {
                let idx = self
                    .all_commits
                    .iter()
                    .position(|id| id == base)
                    .map_or(0, |i| i + 1);
                &self.all_commits[idx..]
            }
            None => &self.all_commits,
        }
    }
}
