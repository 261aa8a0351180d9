//! 플랫폼 게이트웨이 포트 구현 어댑터.

use crate::application::ports::{GatewayFactory, PlatformGateway};
use crate::infrastructure::vcs;

/// 플랫폼 게이트웨이 팩토리 어댑터.
pub struct GatewayFactoryAdapter;

impl GatewayFactory for GatewayFactoryAdapter {
    fn build(
        &self,
        host: &str,
        api_base: Option<String>,
        token: Option<String>,
    ) -> Box<dyn PlatformGateway> {
        vcs::build_client(host, api_base, token)
    }
}
