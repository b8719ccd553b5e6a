//! Central API HTTP client
//!
//! Wraps `reqwest::Client` with Central-specific URL construction, bearer
//! authentication, and status-code mapping. Each network declaration carries
//! its own API token, so the token is a per-call argument rather than client
//! state.

use crate::central::Member;
use crate::error::{Result, ZtAgentError};
use std::time::Duration;
use tracing::debug;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client for the ZeroTier Central API
pub struct CentralClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CentralClient {
    /// Create a new client for the given API base URL
    /// (e.g. `https://my.zerotier.com/api`).
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("zt-agent/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// The API base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Verify the API token can read the network.
    ///
    /// Run before member writes so an invalid key or network ID fails with a
    /// clear error instead of a confusing member-level one.
    pub async fn check_network(&self, network: &str, token: &str) -> Result<()> {
        let url = self.url(&format!("network/{}", network))?;
        debug!("GET {}", url);

        let resp = self.http.get(url).bearer_auth(token).send().await?;
        Self::expect_success(resp, &format!("network {}", network)).await?;
        Ok(())
    }

    /// Fetch the member record for a node on a network
    pub async fn get_member(&self, network: &str, node: &str, token: &str) -> Result<Member> {
        let url = self.url(&format!("network/{}/member/{}", network, node))?;
        debug!("GET {}", url);

        let resp = self.http.get(url).bearer_auth(token).send().await?;
        let resp =
            Self::expect_success(resp, &format!("member {} of network {}", node, network)).await?;

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            ZtAgentError::Serialization(format!("Failed to parse member record: {}", e))
        })
    }

    /// Post an updated member record for a node on a network
    pub async fn update_member(
        &self,
        network: &str,
        node: &str,
        token: &str,
        member: &Member,
    ) -> Result<()> {
        let url = self.url(&format!("network/{}/member/{}", network, node))?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(member)
            .send()
            .await?;
        Self::expect_success(resp, &format!("member {} of network {}", node, network)).await?;
        Ok(())
    }

    /// Build a full URL for an API path relative to the base
    fn url(&self, path: &str) -> Result<Url> {
        let full = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path);
        Ok(Url::parse(&full)?)
    }

    /// Map non-success statuses onto agent errors.
    ///
    /// 401/403 means the token was rejected; 404 means the network or node
    /// does not exist. Everything else carries the response body so the
    /// operator sees the API's own message unmodified.
    async fn expect_success(
        resp: reqwest::Response,
        what: &str,
    ) -> Result<reqwest::Response> {
        let status = resp.status();

        if status.is_success() {
            return Ok(resp);
        }

        match status.as_u16() {
            401 | 403 => Err(ZtAgentError::Api {
                status: status.as_u16(),
                message: "unable to authenticate with the Central API".to_string(),
            }),
            404 => Err(ZtAgentError::NotFound(format!(
                "{} does not exist on Central",
                what
            ))),
            code => {
                let body = resp.text().await.unwrap_or_default();
                Err(ZtAgentError::Api {
                    status: code,
                    message: if body.is_empty() {
                        format!("request for {} failed", what)
                    } else {
                        body
                    },
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_construction() {
        let client = CentralClient::new("https://my.zerotier.com/api").unwrap();
        let url = client.url("network/8056c2e21c000001/member/abcdef1234").unwrap();
        assert_eq!(
            url.as_str(),
            "https://my.zerotier.com/api/network/8056c2e21c000001/member/abcdef1234"
        );
    }

    #[test]
    fn test_url_construction_with_trailing_slash() {
        let client = CentralClient::new("https://my.zerotier.com/api/").unwrap();
        let url = client.url("network/8056c2e21c000001").unwrap();
        assert_eq!(
            url.as_str(),
            "https://my.zerotier.com/api/network/8056c2e21c000001"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(CentralClient::new("not a url").is_err());
    }
}
