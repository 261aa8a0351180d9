//! 코드 호스팅 플랫폼 연동 계층.

pub mod github;

use crate::application::ports::PlatformGateway;
use crate::domain::target::PullTarget;

/// 호스트와 설정된 API base로 GitHub 클라이언트를 만든다.
/// API base가 없으면 github.com은 공개 API, 그 외는 Enterprise 기본 경로를 사용한다.
pub fn build_client(
    host: &str,
    api_base: Option<String>,
    token: Option<String>,
) -> Box<dyn PlatformGateway> {
    let api_base = api_base
        .filter(|base| !base.trim().is_empty())
        .unwrap_or_else(|| PullTarget::default_api_base(host));
    Box::new(github::GitHubClient::new(api_base, token))
}
