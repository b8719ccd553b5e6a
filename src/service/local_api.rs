//! Local zerotier-one JSON API client
//!
//! The daemon exposes a JSON API on 127.0.0.1:9993, authenticated with the
//! contents of `authtoken.secret` in its home directory. This is the same
//! API `zerotier-cli` drives; the agent calls it directly for node status
//! and membership operations.

use crate::error::{Result, ZtAgentError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Node status as reported by `GET /status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeStatus {
    /// This node's 10-hex-digit ZeroTier address
    pub address: String,

    /// Whether the node can reach a root server
    #[serde(default)]
    pub online: bool,

    /// Daemon version string
    #[serde(default)]
    pub version: String,
}

/// A joined network as reported by `GET /network`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinedNetwork {
    /// Network ID
    #[serde(rename = "nwid")]
    pub id: String,

    /// Connection status (OK, ACCESS_DENIED, NOT_FOUND, ...)
    #[serde(default)]
    pub status: String,

    /// Addresses assigned to this node on the network
    #[serde(default, rename = "assignedAddresses")]
    pub assigned_addresses: Vec<String>,
}

/// HTTP client for the daemon's local JSON API
pub struct LocalApi {
    http: reqwest::Client,
    base_url: Url,
    auth_token: String,
}

impl LocalApi {
    /// Create a client with an explicit auth token
    pub fn new(base_url: &str, auth_token: String) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url,
            auth_token,
        })
    }

    /// Create a client reading `authtoken.secret` from the daemon home
    /// directory
    pub fn from_home(base_url: &str, home: &Path) -> Result<Self> {
        let token_path = home.join("authtoken.secret");
        let token = std::fs::read_to_string(&token_path).map_err(|e| {
            ZtAgentError::Service(format!(
                "Failed to read auth token {:?}: {} (is zerotier-one installed, and are you root?)",
                token_path, e
            ))
        })?;

        Self::new(base_url, token.trim().to_string())
    }

    /// Fetch node status
    pub async fn status(&self) -> Result<NodeStatus> {
        self.get_json("status").await
    }

    /// List currently joined networks
    pub async fn networks(&self) -> Result<Vec<JoinedNetwork>> {
        self.get_json("network").await
    }

    /// Join a network. Idempotent: joining an already-joined network is a
    /// no-op on the daemon side.
    pub async fn join(&self, network: &str) -> Result<()> {
        let url = self.url(&format!("network/{}", network))?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .header("X-ZT1-Auth", &self.auth_token)
            // The daemon expects a JSON body on join, even an empty one
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(Self::connect_error)?;

        self.expect_success(resp, &format!("join network {}", network))
            .await?;
        Ok(())
    }

    /// Leave a network
    pub async fn leave(&self, network: &str) -> Result<()> {
        let url = self.url(&format!("network/{}", network))?;
        debug!("DELETE {}", url);

        let resp = self
            .http
            .delete(url)
            .header("X-ZT1-Auth", &self.auth_token)
            .send()
            .await
            .map_err(Self::connect_error)?;

        self.expect_success(resp, &format!("leave network {}", network))
            .await?;
        Ok(())
    }

    /// GET a path and deserialize the JSON response
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .header("X-ZT1-Auth", &self.auth_token)
            .send()
            .await
            .map_err(Self::connect_error)?;

        let resp = self.expect_success(resp, path).await?;
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            ZtAgentError::Serialization(format!("Failed to parse /{} response: {}", path, e))
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        let full = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path);
        Ok(Url::parse(&full)?)
    }

    /// Give connection failures an actionable message; everything else
    /// passes through as a transport error.
    fn connect_error(err: reqwest::Error) -> ZtAgentError {
        if err.is_connect() {
            ZtAgentError::Service(
                "zerotier-one service is not reachable; is the daemon running?".to_string(),
            )
        } else {
            ZtAgentError::Transport(err)
        }
    }

    async fn expect_success(
        &self,
        resp: reqwest::Response,
        what: &str,
    ) -> Result<reqwest::Response> {
        let status = resp.status();

        if status.is_success() {
            return Ok(resp);
        }

        match status.as_u16() {
            401 | 403 => Err(ZtAgentError::Service(
                "local service rejected the auth token; check authtoken.secret".to_string(),
            )),
            404 => Err(ZtAgentError::NotFound(format!(
                "local service has no resource for {}",
                what
            ))),
            code => {
                let body = resp.text().await.unwrap_or_default();
                Err(ZtAgentError::Service(format!(
                    "local service returned HTTP {} for {}: {}",
                    code,
                    what,
                    body.trim()
                )))
            }
        }
    }
}

/// Read the node ID from `identity.public` in the daemon home directory.
///
/// Fallback used when the service API is unavailable; the file's first
/// colon-separated field is the node address.
pub fn node_id_from_identity(home: &Path) -> Result<String> {
    let path = home.join("identity.public");
    let contents = std::fs::read_to_string(&path).map_err(|e| {
        ZtAgentError::Service(format!("Failed to read identity {:?}: {}", path, e))
    })?;

    contents
        .split(':')
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ZtAgentError::Service(format!("Identity file {:?} is malformed", path))
        })
}
