//! 설정 값(token/env)을 실제 런타임 값으로 해석하는 유틸리티.
//!
//! - 환경변수 접근은 인프라 계층에서만 수행한다.

use std::env;

use crate::application::config::HostConfig;
use crate::application::ports::HostTokenResolution;

/// 호스트 설정으로 토큰을 찾지 못했을 때 읽는 환경변수.
pub const FALLBACK_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// 호스트 토큰을 해석한다. 우선순위: inline > token_env > `GITHUB_TOKEN`.
pub fn resolve_host_token(host_cfg: Option<&HostConfig>) -> HostTokenResolution {
    resolve_with(host_cfg, |name| env::var(name).ok())
}

fn resolve_with(
    host_cfg: Option<&HostConfig>,
    lookup: impl Fn(&str) -> Option<String>,
) -> HostTokenResolution {
    let env_value = |name: &str| {
        lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    if let Some(token) = host_cfg
        .and_then(|cfg| cfg.token.as_deref())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return HostTokenResolution {
            token: Some(token.to_string()),
            source: Some("inline".to_string()),
        };
    }

    let mut env_hint = None;
    if let Some(env_name) = host_cfg
        .and_then(|cfg| cfg.token_env.as_deref())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        match env_value(env_name) {
            Some(token) => {
                return HostTokenResolution {
                    token: Some(token),
                    source: Some(format!("env:{env_name}")),
                };
            }
            None => env_hint = Some(format!("env:{env_name} (missing)")),
        }
    }

    match env_value(FALLBACK_TOKEN_ENV) {
        Some(token) => HostTokenResolution {
            token: Some(token),
            source: Some(format!("env:{FALLBACK_TOKEN_ENV}")),
        },
        None => HostTokenResolution {
            token: None,
            source: env_hint,
        },
    }
}
