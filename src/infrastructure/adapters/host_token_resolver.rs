//! 호스트 토큰 해석 포트 구현.

use anyhow::Result;

use crate::application::config::HostConfig;
use crate::application::ports::{HostTokenResolution, HostTokenResolver};
use crate::infrastructure::config::resolve_host_token;

/// 설정(token/token_env)과 `GITHUB_TOKEN`으로 런타임 토큰을 해석한다.
pub struct HostTokenResolverAdapter;

impl HostTokenResolver for HostTokenResolverAdapter {
    fn resolve(&self, _host: &str, host_cfg: Option<&HostConfig>) -> Result<HostTokenResolution> {
        Ok(resolve_host_token(host_cfg))
    }
}
