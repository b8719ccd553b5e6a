//! Configuration management
//!
//! This module handles parsing and validation of the operator's declarations
//! file: the pinned package version, per-network membership declarations,
//! and the optional `local.conf` mapping.

mod toml_parser;
mod validation;

pub use toml_parser::TomlConfig;
pub use validation::{validate_network_id, validate_node_id, validate_version};

use crate::error::{Result, ZtAgentError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default base URL of the ZeroTier Central API
pub const DEFAULT_CENTRAL_URL: &str = "https://my.zerotier.com/api";

/// Default base URL of the local zerotier-one service API
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:9993";

/// Main configuration structure: the declared desired state for this host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Pinned zerotier-one package version (skip install handling if unset)
    pub version: Option<String>,

    /// Base URL of the ZeroTier Central API
    #[serde(default = "default_central_url")]
    pub central_url: String,

    /// Base URL of the local zerotier-one service API
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Override for the ZeroTier home directory (authtoken, local.conf)
    pub home_dir: Option<PathBuf>,

    /// Declared network memberships, keyed by 16-hex-digit network ID
    #[serde(default)]
    pub networks: HashMap<String, NetworkDeclaration>,

    /// Declared local.conf content, written verbatim when present
    pub local_config: Option<serde_json::Value>,
}

/// Declaration for a single network membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkDeclaration {
    /// Central API token used for member updates on this network
    pub api_key: Option<String>,

    /// Whether the host should be a member of this network
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Member display name on Central
    pub node_name: Option<String>,

    /// Member description on Central
    pub description: Option<String>,

    /// Whether the member is hidden in the Central network view
    #[serde(default)]
    pub hidden: bool,

    /// Open-ended member config mapping, passed through to Central verbatim.
    /// Accepted keys (authorized, tags, ipAssignments, ...) are defined by
    /// the Central API schema, not by the agent.
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self {
            version: None,
            central_url: default_central_url(),
            service_url: default_service_url(),
            home_dir: None,
            networks: HashMap::new(),
            local_config: None,
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let toml_config = TomlConfig::from_file(path)?;
        let config: Config = toml_config.try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Add or update a network declaration
    pub fn add_network(&mut self, id: String, declaration: NetworkDeclaration) {
        self.networks.insert(id, declaration);
    }

    /// Get a network declaration by network ID
    pub fn get_network(&self, id: &str) -> Option<&NetworkDeclaration> {
        self.networks.get(id)
    }

    /// The ZeroTier home directory, honoring the declared override
    pub fn home(&self) -> PathBuf {
        self.home_dir
            .clone()
            .unwrap_or_else(crate::platform::zerotier_home)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(ref version) = self.version {
            validation::validate_version(version)?;
        }

        for (id, declaration) in &self.networks {
            declaration
                .validate(id)
                .map_err(|e| ZtAgentError::Config(format!("Network '{}': {}", id, e)))?;
        }

        if let Some(ref local) = self.local_config {
            if !local.is_object() {
                return Err(ZtAgentError::Config(
                    "local_config must be a table of settings".to_string(),
                ));
            }
        }

        Ok(())
    }
}

impl NetworkDeclaration {
    /// Validate a single network declaration
    pub fn validate(&self, id: &str) -> Result<()> {
        validation::validate_network_id(id)?;

        if self.enabled && self.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(ZtAgentError::Validation(
                "api_key is required for an enabled network".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for NetworkDeclaration {
    fn default() -> Self {
        Self {
            api_key: None,
            enabled: default_enabled(),
            node_name: None,
            description: None,
            hidden: false,
            config: serde_json::Map::new(),
        }
    }
}

// Default value functions for serde
fn default_central_url() -> String {
    DEFAULT_CENTRAL_URL.to_string()
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

fn default_enabled() -> bool {
    true
}
