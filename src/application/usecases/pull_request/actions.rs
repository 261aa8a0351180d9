//! 요청된 작업을 `Commenter` 연산으로 실행하고 결과를 보고한다.
//!
//! 코어 연산의 실패는 `Outcome`으로 돌아오므로 여기서는 보고만 한다.
//! 대상 코멘트를 찾지 못하는 것처럼 요청 자체가 성립하지 않을 때만 오류를 낸다.

use anyhow::{Context, Result, bail};

use super::{Finding, PrAction};
use crate::application::commenter::{Commenter, SubmitReport};
use crate::application::ports::{PlatformGateway, Reporter};
use crate::domain::comment::{Comment, CommentId};
use crate::domain::commit_ids::reviewed_ids_block;
use crate::domain::outcome::Outcome;
use crate::domain::route::RepoSelector;
use crate::domain::tags::{
    COMMENT_TAG, SUMMARIZE_TAG, description_without_release_notes, raw_summary, release_notes,
    short_summary,
};

pub(super) async fn dispatch(
    reporter: &dyn Reporter,
    gateway: &dyn PlatformGateway,
    commenter: &mut Commenter<'_>,
    selector: RepoSelector,
    action: PrAction,
) -> Result<()> {
    let pull = commenter.context().pull_number;

    match action {
        PrAction::Comment { message, tag, mode } => {
            let outcome = commenter
                .comment(&message, tag.as_deref(), mode, selector)
                .await;
            report_comment(reporter, "comment", &outcome);
        }
        PrAction::Describe { message } => {
            let outcome = commenter.update_description(pull, &message, selector).await;
            report(reporter, "describe", &outcome, "release notes updated");
        }
        PrAction::Status { status } => {
            let outcome = commenter
                .update_status(SUMMARIZE_TAG, status.as_deref(), selector)
                .await;
            report_comment(reporter, "status", &outcome);
        }
        PrAction::Summary => summary(reporter, gateway, commenter, selector).await?,
        PrAction::Progress => {
            let outcome = commenter.review_progress(SUMMARIZE_TAG, selector).await;
            report(reporter, "progress", &outcome, "commit list loaded");

            let progress = outcome.into_value();
            reporter.section("Review progress");
            reporter.kv("Commits", &progress.all_commits.len().to_string());
            reporter.kv("Reviewed", &progress.reviewed.len().to_string());
            reporter.kv("Baseline", progress.baseline().unwrap_or("(none)"));
            reporter.kv("Unreviewed", &progress.unreviewed().len().to_string());
            for sha in progress.unreviewed() {
                reporter.raw(sha);
            }
        }
        PrAction::MarkReviewed { sha } => {
            let outcome = commenter
                .record_reviewed_commit(SUMMARIZE_TAG, &sha, selector)
                .await;
            match &outcome {
                Outcome::Done(None) => reporter.status("mark-reviewed", "already recorded"),
                _ => report_comment(reporter, "mark-reviewed", &outcome),
            }
        }
        PrAction::Review {
            commit_id,
            status,
            findings,
            dry_run,
        } => {
            buffer_findings(commenter, &findings);
            if dry_run {
                list_buffered(reporter, commenter);
            } else {
                review(reporter, gateway, commenter, selector, commit_id, &status).await?;
            }
        }
        PrAction::Chains {
            path,
            start_line,
            end_line,
            tag,
        } => {
            let tag = tag.filter(|t| !t.is_empty()).unwrap_or_else(|| COMMENT_TAG.to_string());
            let outcome = commenter
                .chains_within_range(pull, &path, start_line, end_line, &tag)
                .await;
            report(reporter, "chains", &outcome, "review comments loaded");
            reporter.raw(outcome.value());
        }
        PrAction::Thread { comment_id } => {
            let comment = find_review_comment(commenter, pull, comment_id).await?;
            let outcome = commenter.get_comment_chain(pull, &comment).await;
            report(reporter, "thread", &outcome, "thread loaded");

            let chain = outcome.into_value();
            if let Some(top_level) = &chain.top_level {
                reporter.kv("Top-level comment", &top_level.id.to_string());
            }
            reporter.raw(&chain.chain);
        }
        PrAction::Reply {
            comment_id,
            message,
        } => {
            let comment = find_review_comment(commenter, pull, comment_id).await?;
            let chain = commenter.get_comment_chain(pull, &comment).await;
            if let Some(reason) = chain.reason() {
                reporter.status("reply", &format!("recovered: {reason}"));
            }
            let top_level = chain.into_value().top_level.unwrap_or(comment);
            let outcome = commenter.review_comment_reply(pull, &top_level, &message).await;
            report(reporter, "reply", &outcome, "reply posted");
        }
    }
    Ok(())
}

fn buffer_findings(commenter: &mut Commenter<'_>, findings: &[Finding]) {
    for finding in findings {
        commenter.buffer_review_comment(
            &finding.path,
            finding.start_line,
            finding.end_line,
            &finding.message,
        );
    }
}

/// 제출 없이 버퍼에 쌓인 코멘트를 태그가 붙은 최종 본문 그대로 출력한다.
fn list_buffered(reporter: &dyn Reporter, commenter: &Commenter<'_>) {
    let buffered = commenter.buffered_review_comments();
    reporter.section("Buffered review comments");
    reporter.kv("Count", &buffered.len().to_string());
    for comment in buffered {
        reporter.section(&comment.to_string());
        reporter.raw(&comment.message);
    }
    reporter.status("review", "dry run; nothing submitted");
}

async fn review(
    reporter: &dyn Reporter,
    gateway: &dyn PlatformGateway,
    commenter: &mut Commenter<'_>,
    selector: RepoSelector,
    commit_id: Option<String>,
    status: &str,
) -> Result<()> {
    let pull = commenter.context().pull_number;
    let commit_id = match commit_id {
        Some(commit_id) => commit_id,
        None => {
            let origin = &commenter.context().mapping.origin;
            gateway
                .get_pull_request(origin, pull)
                .await
                .with_context(|| format!("failed to fetch head commit of {origin}#{pull}"))?
                .head_sha
        }
    };

    match commenter.submit_review(pull, &commit_id, status, selector).await {
        SubmitReport::StatusOnly { review_id } => {
            reporter.status("review", &format!("status review {review_id} submitted"));
        }
        SubmitReport::Batched {
            review_id,
            comments,
        } => {
            reporter.status(
                "review",
                &format!("review {review_id} submitted with {comments} comment(s) in review"),
            );
        }
        SubmitReport::Fallback {
            posted,
            failed,
            reason,
        } => {
            reporter.status(
                "review",
                &format!("batch submit failed ({reason}); posted {posted}, failed {failed}"),
            );
        }
        SubmitReport::Failed { reason } => {
            reporter.status("review", &format!("failed: {reason}"));
        }
    }
    Ok(())
}

async fn summary(
    reporter: &dyn Reporter,
    gateway: &dyn PlatformGateway,
    commenter: &mut Commenter<'_>,
    selector: RepoSelector,
) -> Result<()> {
    let pull = commenter.context().pull_number;
    let found = commenter
        .find_comment_with_tag(SUMMARIZE_TAG, pull, selector)
        .await;
    report(reporter, "summary", &found, "summary comment loaded");

    if let Some(comment) = found.into_value() {
        reporter.section("Raw summary");
        reporter.raw(raw_summary(&comment.body));
        reporter.section("Short summary");
        reporter.raw(short_summary(&comment.body));
        reporter.section("Reviewed commits");
        reporter.raw(reviewed_ids_block(&comment.body));
    }

    let route = commenter.context().mapping.route(selector, pull)?;
    let pr = gateway
        .get_pull_request(route.repo, route.number)
        .await
        .with_context(|| format!("failed to fetch {}#{}", route.repo, route.number))?;
    let description = pr.body.unwrap_or_default();

    reporter.section("Description");
    reporter.raw(&description_without_release_notes(&description));
    reporter.section("Release notes");
    reporter.raw(&release_notes(&description));
    Ok(())
}

async fn find_review_comment(
    commenter: &mut Commenter<'_>,
    pull: u64,
    comment_id: CommentId,
) -> Result<Comment> {
    let listed = commenter
        .list_review_comments(pull, RepoSelector::Origin)
        .await;
    let reason = listed.reason().map(ToString::to_string);
    match listed.into_value().into_iter().find(|c| c.id == comment_id) {
        Some(comment) => Ok(comment),
        None => match reason {
            Some(reason) => bail!(
                "review comment {comment_id} not found on pull request #{pull} (listing incomplete: {reason})"
            ),
            None => bail!("review comment {comment_id} not found on pull request #{pull}"),
        },
    }
}

fn report<T>(reporter: &dyn Reporter, scope: &str, outcome: &Outcome<T>, done: &str) {
    match outcome.reason() {
        Some(reason) => reporter.status(scope, &format!("recovered: {reason}")),
        None => reporter.status(scope, done),
    }
}

fn report_comment(reporter: &dyn Reporter, scope: &str, outcome: &Outcome<Option<Comment>>) {
    match outcome {
        Outcome::Done(Some(comment)) => {
            reporter.status(scope, &format!("comment {} written", comment.id));
        }
        Outcome::Done(None) => reporter.status(scope, "nothing to change"),
        Outcome::Recovered { reason, .. } => {
            reporter.status(scope, &format!("recovered: {reason}"));
        }
    }
}
