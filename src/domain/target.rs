//! 입력 URL을 GitHub PR 대상으로 해석하는 모듈.

use anyhow::{Result, anyhow, bail};
use url::Url;

use crate::domain::route::RepoRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullTarget {
    pub host: String,
    pub repo: RepoRef,
    pub number: u64,
}

impl PullTarget {
    /// `https://<host>/<owner>/<repo>/pull/<number>[/...]` 형식만 받는다.
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input)?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow!("URL host is missing"))?
            .to_string();

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [owner, repo, "pull", number, ..] => {
                let number = number
                    .parse()
                    .map_err(|_| anyhow!("invalid pull request number in URL: {input}"))?;
                Ok(Self {
                    host,
                    repo: RepoRef::new(*owner, *repo),
                    number,
                })
            }
            _ => bail!("unsupported URL format: {input}"),
        }
    }

    /// 호스트에 대응하는 REST API base URL.
    pub fn default_api_base(host: &str) -> String {
        if host == "github.com" {
            "https://api.github.com".to_string()
        } else {
            format!("https://{host}/api/v3")
        }
    }
}
