//! PR 하나에 대한 코멘트/리뷰 작업 유스케이스.

mod actions;
mod context;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::application::commenter::{CommentMode, Commenter};
use crate::application::config::Config;
use crate::application::context::{ExecutionContext, resolve_context};
use crate::application::ports::{
    ConfigRepository, GatewayFactory, HostTokenResolver, PlatformGateway, Reporter, TargetResolver,
};
use crate::domain::comment::CommentId;
use crate::domain::route::RepoSelector;

use context::{Session, resolve_session};

/// 대상 PR 지정. URL이 있으면 다른 값보다 우선한다.
#[derive(Debug, Clone, Default)]
pub struct TargetInput {
    pub url: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub pull_number: Option<u64>,
}

/// 리뷰 코멘트 파일(JSON 배열)의 한 항목.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub message: String,
}

#[derive(Debug, Clone)]
pub enum PrAction {
    Comment {
        message: String,
        tag: Option<String>,
        mode: CommentMode,
    },
    Describe {
        message: String,
    },
    /// `None`이면 진행 중 상태를 지운다.
    Status {
        status: Option<String>,
    },
    Summary,
    Progress,
    MarkReviewed {
        sha: String,
    },
    /// `dry_run`이면 버퍼에 담긴 코멘트만 보여 주고 제출하지 않는다.
    Review {
        commit_id: Option<String>,
        status: String,
        findings: Vec<Finding>,
        dry_run: bool,
    },
    Chains {
        path: String,
        start_line: u32,
        end_line: u32,
        tag: Option<String>,
    },
    Thread {
        comment_id: CommentId,
    },
    Reply {
        comment_id: CommentId,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct PrRequest {
    pub target: TargetInput,
    /// 원본 대신 미러 저장소에 게시한다.
    pub mirror: bool,
    pub action: PrAction,
}

/// 설정 로딩부터 게이트웨이 생성, 코멘트 작업 실행까지 조율한다.
pub struct PullRequestUseCase<'a> {
    pub config_repo: &'a dyn ConfigRepository,
    pub target_resolver: &'a dyn TargetResolver,
    pub host_token_resolver: &'a dyn HostTokenResolver,
    pub gateway_factory: &'a dyn GatewayFactory,
    pub reporter: &'a dyn Reporter,
}

impl<'a> PullRequestUseCase<'a> {
    pub async fn execute(&self, request: PrRequest) -> Result<()> {
        let config = self
            .config_repo
            .load()
            .context("failed to load prcomment config")?;
        let session = resolve_session(self.target_resolver, &config, &request.target)?;

        let host_cfg = config.host_config(&session.host);
        let resolution = self
            .host_token_resolver
            .resolve(&session.host, host_cfg)
            .context("failed to resolve host token")?;
        let Some(token) = resolution.token else {
            bail!(
                "missing token for host '{}'. Configure hosts.{}.token or hosts.{}.token_env in config, or set GITHUB_TOKEN",
                session.host,
                session.host,
                session.host,
            );
        };
        let api_base = host_cfg
            .and_then(|h| h.api_base.clone())
            .or_else(|| config.defaults.api_base.clone());
        let gateway = self.gateway_factory.build(&session.host, api_base, Some(token));

        self.reporter.section("Target");
        self.reporter.kv("Host", &session.host);
        self.reporter.kv("Repository", &session.mapping.origin.to_string());
        self.reporter.kv("Pull", &format!("#{}", session.pull_number));
        if request.mirror {
            self.reporter.kv("Publish to", "mirror");
        }

        let selector = RepoSelector::from_target(request.mirror);
        self.run(&config, gateway.as_ref(), session, selector, request.action)
            .await
    }

    /// 미러 대상일 때만 미러 PR head SHA를 미리 조회한다.
    async fn run(
        &self,
        config: &Config,
        gateway: &dyn PlatformGateway,
        session: Session,
        selector: RepoSelector,
        action: PrAction,
    ) -> Result<()> {
        let ctx = match selector {
            RepoSelector::Mirror => {
                resolve_context(gateway, session.mapping, session.pull_number).await?
            }
            RepoSelector::Origin => ExecutionContext::new(session.mapping, session.pull_number),
        };

        let mut commenter = Commenter::new(gateway, &ctx).with_greeting(config.greeting());
        actions::dispatch(self.reporter, gateway, &mut commenter, selector, action).await
    }
}
