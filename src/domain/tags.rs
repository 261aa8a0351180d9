//! 자동 생성 영역을 표시하는 태그 레지스트리와 영역 코덱.
//! 태그 문자열은 이미 게시된 코멘트와의 호환 계약이므로 바꾸지 않는다.

pub const COMMENT_GREETING: &str = r#"<img src="https://avatars.githubusercontent.com/in/347564?s=41" alt="Image description" width="20" height="20">   CodeRabbit"#;

pub const COMMENT_TAG: &str = "<!-- This is an auto-generated comment by OSS CodeRabbit -->";

pub const COMMENT_REPLY_TAG: &str = "<!-- This is an auto-generated reply by OSS CodeRabbit -->";

pub const SUMMARIZE_TAG: &str =
    "<!-- This is an auto-generated comment: summarize by OSS CodeRabbit -->";

pub const IN_PROGRESS: TagPair = TagPair {
    start: "<!-- This is an auto-generated comment: summarize review in progress by OSS CodeRabbit -->",
    end: "<!-- end of auto-generated comment: summarize review in progress by OSS CodeRabbit -->",
};

pub const DESCRIPTION: TagPair = TagPair {
    start: "\n<!-- This is an auto-generated comment: release notes by OSS CodeRabbit -->",
    end: "<!-- end of auto-generated comment: release notes by OSS CodeRabbit -->",
};

pub const RAW_SUMMARY: TagPair = TagPair {
    start: "<!-- This is an auto-generated comment: raw summary by OSS CodeRabbit -->\n<!--\n",
    end: "-->\n<!-- end of auto-generated comment: raw summary by OSS CodeRabbit -->",
};

pub const SHORT_SUMMARY: TagPair = TagPair {
    start: "<!-- This is an auto-generated comment: short summary by OSS CodeRabbit -->\n<!--\n",
    end: "-->\n<!-- end of auto-generated comment: short summary by OSS CodeRabbit -->",
};

pub const COMMIT_IDS: TagPair = TagPair {
    start: "<!-- commit_ids_reviewed_start -->",
    end: "<!-- commit_ids_reviewed_end -->",
};

const IN_PROGRESS_BANNER: &str = "Currently reviewing new changes in this PR...";

/// 시작/끝 마커 쌍으로 경계가 정해지는 본문 영역.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagPair {
    pub start: &'static str,
    pub end: &'static str,
}

impl TagPair {
    /// 마커 사이의 내용. 마커가 하나라도 없으면 빈 문자열.
    pub fn content_within<'a>(&self, text: &'a str) -> &'a str {
        content_within(text, self.start, self.end)
    }

    /// 첫 영역을 마커째 잘라낸 본문. 마커가 없으면 원문 그대로.
    pub fn remove_within(&self, text: &str) -> String {
        remove_within(text, self.start, self.end)
    }

    /// 마커를 포함한 영역 전체.
    pub fn block<'a>(&self, text: &'a str) -> &'a str {
        match region_bounds(text, self.start, self.end) {
            Some((start, end)) => &text[start..end + self.end.len()],
            None => "",
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        region_bounds(text, self.start, self.end).is_some()
    }

    /// 영역 끝 마커 바로 앞에 내용을 삽입한다. 영역이 없으면 `None`.
    pub fn insert_before_end(&self, text: &str, content: &str) -> Option<String> {
        let (_, end) = region_bounds(text, self.start, self.end)?;
        Some(format!("{}{content}{}", &text[..end], &text[end..]))
    }

    /// 본문 뒤에 새 영역을 덧붙인다.
    pub fn append_to(&self, text: &str, content: &str) -> String {
        format!("{text}{}\n{content}\n{}", self.start, self.end)
    }
}

/// `(start 마커 위치, end 마커 위치)`. end 마커는 start 마커 뒤에서만 찾는다.
fn region_bounds(text: &str, start_tag: &str, end_tag: &str) -> Option<(usize, usize)> {
    let start = text.find(start_tag)?;
    let content_start = start + start_tag.len();
    let end = text[content_start..].find(end_tag)? + content_start;
    Some((start, end))
}

pub fn content_within<'a>(text: &'a str, start_tag: &str, end_tag: &str) -> &'a str {
    match region_bounds(text, start_tag, end_tag) {
        Some((start, end)) => &text[start + start_tag.len()..end],
        None => "",
    }
}

pub fn remove_within(text: &str, start_tag: &str, end_tag: &str) -> String {
    match region_bounds(text, start_tag, end_tag) {
        Some((start, end)) => format!("{}{}", &text[..start], &text[end + end_tag.len()..]),
        None => text.to_string(),
    }
}

/// 외부로 나가는 모든 메시지의 공통 포맷: 인사말, 본문, 식별 태그.
pub fn wrap_body(greeting: &str, message: &str, tag: &str) -> String {
    format!("{greeting}\n\n{message}\n\n{tag}")
}

pub fn raw_summary(body: &str) -> &str {
    RAW_SUMMARY.content_within(body)
}

pub fn short_summary(body: &str) -> &str {
    SHORT_SUMMARY.content_within(body)
}

/// release notes 영역을 제외한 사용자 작성 설명.
pub fn description_without_release_notes(description: &str) -> String {
    DESCRIPTION.remove_within(description)
}

/// release notes 본문. 인용(`> `) 라인은 제외한다.
pub fn release_notes(description: &str) -> String {
    DESCRIPTION
        .content_within(description)
        .split('\n')
        .filter(|line| !line.starts_with("> "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 기존 설명에서 release notes 영역을 교체한 새 설명을 만든다.
/// 메시지 안에 중첩된 마커는 먼저 제거한다.
pub fn splice_release_notes(description: &str, message: &str) -> String {
    let preserved = DESCRIPTION.remove_within(description);
    let message = DESCRIPTION.remove_within(message);
    DESCRIPTION.append_to(&preserved, &message)
}

/// 진행 중 상태 영역을 본문 앞에 붙인다. 이미 있으면 그대로 둔다.
pub fn add_in_progress_status(body: &str, status: &str) -> String {
    if IN_PROGRESS.contains(body) {
        return body.to_string();
    }
    format!(
        "{}\n\n{IN_PROGRESS_BANNER}\n\n{status}\n\n{}\n\n---\n\n{body}",
        IN_PROGRESS.start, IN_PROGRESS.end
    )
}

pub fn remove_in_progress_status(body: &str) -> String {
    IN_PROGRESS.remove_within(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: &str = "<!-- s -->";
    const E: &str = "<!-- e -->";

    #[test]
    fn content_within_returns_inner_text() {
        assert_eq!(content_within("a<!-- s -->inner<!-- e -->b", S, E), "inner");
    }

    #[test]
    fn content_within_is_empty_when_a_marker_is_missing() {
        assert_eq!(content_within("a<!-- s -->inner", S, E), "");
        assert_eq!(content_within("inner<!-- e -->", S, E), "");
        assert_eq!(content_within("", S, E), "");
    }

    #[test]
    fn end_marker_before_start_marker_is_ignored() {
        let text = "<!-- e -->x<!-- s -->y";
        assert_eq!(content_within(text, S, E), "");
        assert_eq!(remove_within(text, S, E), text);
    }

    #[test]
    fn remove_within_excises_only_the_first_region() {
        let text = "head<!-- s -->1<!-- e -->mid<!-- s -->2<!-- e -->tail";
        assert_eq!(remove_within(text, S, E), "headmid<!-- s -->2<!-- e -->tail");
    }

    #[test]
    fn wrap_body_puts_tag_last() {
        let body = wrap_body("hi", "msg", COMMENT_TAG);
        assert_eq!(body, format!("hi\n\nmsg\n\n{COMMENT_TAG}"));
    }

    #[test]
    fn description_region_round_trips() {
        let original = "User written description.";
        let spliced = splice_release_notes(original, "notes");
        assert!(spliced.starts_with(original));
        assert_eq!(DESCRIPTION.remove_within(&spliced), original);
    }

    #[test]
    fn repeated_splice_keeps_a_single_region() {
        let once = splice_release_notes("desc", "first");
        let twice = splice_release_notes(&once, "second");
        assert_eq!(twice.matches(DESCRIPTION.end).count(), 1);
        assert_eq!(DESCRIPTION.content_within(&twice), "\nsecond\n");
        assert_eq!(description_without_release_notes(&twice), "desc");
    }

    #[test]
    fn nested_markers_in_message_are_stripped() {
        let nested = DESCRIPTION.append_to("", "old");
        let message = format!("fresh{nested}");
        let spliced = splice_release_notes("desc", &message);
        assert_eq!(spliced.matches(DESCRIPTION.end).count(), 1);
        assert!(spliced.contains("fresh"));
        assert!(!spliced.contains("old"));
    }

    #[test]
    fn release_notes_drop_quoted_lines() {
        let body = splice_release_notes("", "- New Feature: x\n> a poem\n> more poem");
        assert_eq!(release_notes(&body), "\n- New Feature: x\n");
    }

    #[test]
    fn in_progress_status_round_trips() {
        let body = "summary body";
        let with_status = add_in_progress_status(body, "reviewing abc");
        assert!(with_status.contains(IN_PROGRESS_BANNER));
        assert!(with_status.contains("reviewing abc"));
        assert_eq!(add_in_progress_status(&with_status, "other"), with_status);
        assert_eq!(remove_in_progress_status(&with_status), "\n\n---\n\nsummary body");
    }

    #[test]
    fn summary_accessors_read_their_own_regions() {
        let body = format!(
            "{}raw text{}\n{}short text{}",
            RAW_SUMMARY.start, RAW_SUMMARY.end, SHORT_SUMMARY.start, SHORT_SUMMARY.end
        );
        assert_eq!(raw_summary(&body), "raw text");
        assert_eq!(short_summary(&body), "short text");
    }

    #[test]
    fn block_includes_markers() {
        let text = "x<!-- s -->y<!-- e -->z";
        let pair = TagPair { start: S, end: E };
        assert_eq!(pair.block(text), "<!-- s -->y<!-- e -->");
        assert_eq!(pair.block("nothing"), "");
    }
}
