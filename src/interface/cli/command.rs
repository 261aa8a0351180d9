//! CLI 명령 파싱 모듈.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::application::commenter::CommentMode;
use crate::application::usecases::pull_request::{Finding, PrAction, PrRequest, TargetInput};

#[derive(Debug, Parser)]
#[command(name = "prcomment")]
#[command(about = "Manage automated review comments on GitHub pull requests")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    target: TargetArgs,

    /// Publish to the configured mirror repository instead of the origin
    #[arg(long, global = true)]
    mirror: bool,

    /// Show info-level logs
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct TargetArgs {
    /// Pull request URL (overrides --owner/--repo/--pr)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Origin repository owner
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Origin repository name
    #[arg(long, global = true)]
    repo: Option<String>,

    /// Origin pull request number
    #[arg(long = "pr", global = true)]
    pull_number: Option<u64>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show effective merged config
    Config,
    #[command(flatten)]
    Pull(PullCommand),
}

#[derive(Debug, Subcommand)]
enum PullCommand {
    /// Post or replace a tagged comment ("-" reads the message from stdin)
    Comment {
        message: String,
        /// Identifying tag (defaults to the standard comment tag)
        #[arg(long)]
        tag: Option<String>,
        /// create | replace
        #[arg(long, default_value = "replace")]
        mode: String,
    },
    /// Replace the release notes block of the PR description
    Describe { message: String },
    /// Set the in-progress status on the summary comment, or clear it when omitted
    Status { message: Option<String> },
    /// Print summary comment blocks and the PR description
    Summary,
    /// Show reviewed commits and what remains to review
    Progress,
    /// Record a commit SHA as reviewed
    MarkReviewed { sha: String },
    /// Submit a review with inline comments from a JSON findings file
    Review {
        /// JSON array of {path, start_line, end_line, message}
        #[arg(long)]
        findings: Option<PathBuf>,
        /// Commit to pin the review to (defaults to the PR head)
        #[arg(long)]
        commit: Option<String>,
        /// Review body
        #[arg(long, default_value = "")]
        status: String,
        /// List the buffered comments without submitting
        #[arg(long)]
        dry_run: bool,
    },
    /// Print tagged comment threads within a line range
    Chains {
        path: String,
        start_line: u32,
        end_line: u32,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Print the thread a review comment belongs to
    Thread { comment_id: u64 },
    /// Reply to the thread a review comment belongs to
    Reply { comment_id: u64, message: String },
}

pub enum CliAction {
    InspectConfig,
    PullRequest(PrRequest),
}

pub struct Invocation {
    pub verbose: bool,
    pub action: CliAction,
}

impl Cli {
    pub fn parse_action() -> Result<Invocation, String> {
        Cli::parse().into_invocation().map_err(|err| format!("{err:#}"))
    }

    fn into_invocation(self) -> Result<Invocation> {
        let action = match self.command {
            Commands::Config => CliAction::InspectConfig,
            Commands::Pull(command) => CliAction::PullRequest(PrRequest {
                target: TargetInput {
                    url: self.target.url,
                    owner: self.target.owner,
                    repo: self.target.repo,
                    pull_number: self.target.pull_number,
                },
                mirror: self.mirror,
                action: into_pr_action(command)?,
            }),
        };

        Ok(Invocation {
            verbose: self.verbose,
            action,
        })
    }
}

fn into_pr_action(command: PullCommand) -> Result<PrAction> {
    Ok(match command {
        PullCommand::Comment { message, tag, mode } => PrAction::Comment {
            message: read_message(message)?,
            tag,
            mode: mode.parse::<CommentMode>().unwrap_or_default(),
        },
        PullCommand::Describe { message } => PrAction::Describe {
            message: read_message(message)?,
        },
        PullCommand::Status { message } => PrAction::Status {
            status: message.map(read_message).transpose()?,
        },
        PullCommand::Summary => PrAction::Summary,
        PullCommand::Progress => PrAction::Progress,
        PullCommand::MarkReviewed { sha } => PrAction::MarkReviewed { sha },
        PullCommand::Review {
            findings,
            commit,
            status,
            dry_run,
        } => PrAction::Review {
            commit_id: commit,
            status,
            dry_run,
            findings: match findings {
                Some(path) => load_findings(&path)?,
                None => Vec::new(),
            },
        },
        PullCommand::Chains {
            path,
            start_line,
            end_line,
            tag,
        } => PrAction::Chains {
            path,
            start_line,
            end_line,
            tag,
        },
        PullCommand::Thread { comment_id } => PrAction::Thread { comment_id },
        PullCommand::Reply {
            comment_id,
            message,
        } => PrAction::Reply {
            comment_id,
            message: read_message(message)?,
        },
    })
}

/// `-`이면 표준입력 전체를 메시지로 읽는다.
fn read_message(message: String) -> Result<String> {
    if message != "-" {
        return Ok(message);
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read message from stdin")?;
    Ok(buf)
}

fn load_findings(path: &Path) -> Result<Vec<Finding>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read findings file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse findings file: {}", path.display()))
}
