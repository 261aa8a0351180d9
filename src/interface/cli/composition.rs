//! 애플리케이션 조립(composition root) 모듈.

use crate::application::usecases::inspect_config::InspectConfigUseCase;
use crate::application::usecases::pull_request::PullRequestUseCase;
use crate::infrastructure::adapters::{
    ConsoleReporter, GatewayFactoryAdapter, HostTokenResolverAdapter, JsonConfigRepository,
    UrlTargetResolver,
};

/// 실행 시점 의존성을 한 곳에서 조립하는 컨테이너.
pub struct AppComposition {
    config_repo: JsonConfigRepository,
    host_token_resolver: HostTokenResolverAdapter,
    target_resolver: UrlTargetResolver,
    gateway_factory: GatewayFactoryAdapter,
    reporter: ConsoleReporter,
}

impl Default for AppComposition {
    fn default() -> Self {
        Self::new()
    }
}

impl AppComposition {
    pub fn new() -> Self {
        Self {
            config_repo: JsonConfigRepository,
            host_token_resolver: HostTokenResolverAdapter,
            target_resolver: UrlTargetResolver,
            gateway_factory: GatewayFactoryAdapter,
            reporter: ConsoleReporter::new(),
        }
    }

    /// 설정 점검 유스케이스를 생성한다.
    pub fn inspect_config_usecase(&self) -> InspectConfigUseCase<'_> {
        InspectConfigUseCase {
            config_repo: &self.config_repo,
        }
    }

    /// PR 코멘트 작업 유스케이스를 생성한다.
    pub fn pull_request_usecase(&self) -> PullRequestUseCase<'_> {
        PullRequestUseCase {
            config_repo: &self.config_repo,
            target_resolver: &self.target_resolver,
            host_token_resolver: &self.host_token_resolver,
            gateway_factory: &self.gateway_factory,
            reporter: &self.reporter,
        }
    }
}
