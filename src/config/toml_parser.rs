//! TOML declarations file parser
//!
//! This module handles parsing of the operator's TOML declarations file and
//! its conversion into the internal `Config`. Open-ended mappings (member
//! config, local.conf content) arrive as TOML tables and are converted to
//! JSON values, since that is the shape both APIs consume.

use crate::config::{Config, NetworkDeclaration};
use crate::error::{Result, ZtAgentError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// TOML declarations file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Pinned zerotier-one package version
    pub version: Option<String>,

    /// Base URL of the ZeroTier Central API
    pub central_url: Option<String>,

    /// Base URL of the local zerotier-one service API
    pub service_url: Option<String>,

    /// Override for the ZeroTier home directory
    pub home_dir: Option<PathBuf>,

    /// Per-network membership declarations
    #[serde(default)]
    pub networks: HashMap<String, TomlNetworkDeclaration>,

    /// Declared local.conf content
    pub local_config: Option<toml::Value>,
}

/// TOML network membership declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlNetworkDeclaration {
    /// Central API token for this network
    pub api_key: Option<String>,

    /// Whether the host should be a member
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Member display name on Central
    pub node_name: Option<String>,

    /// Member description on Central
    pub description: Option<String>,

    /// Whether the member is hidden in the Central network view
    #[serde(default)]
    pub hidden: bool,

    /// Open-ended member config mapping
    pub config: Option<toml::Value>,
}

impl TomlConfig {
    /// Load declarations from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ZtAgentError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::parse(&contents)
    }

    /// Parse declarations from a TOML string
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml)
            .map_err(|e| ZtAgentError::Config(format!("Failed to parse TOML config: {}", e)))
    }
}

// Convert the TOML file structure into the internal Config
impl TryFrom<TomlConfig> for Config {
    type Error = ZtAgentError;

    fn try_from(toml: TomlConfig) -> Result<Self> {
        let mut config = Config::new();

        config.version = toml.version;
        if let Some(url) = toml.central_url {
            config.central_url = url;
        }
        if let Some(url) = toml.service_url {
            config.service_url = url;
        }
        config.home_dir = toml.home_dir;

        for (id, declaration) in toml.networks {
            config.add_network(id, declaration.try_into()?);
        }

        config.local_config = toml.local_config.map(toml_to_json).transpose()?;

        Ok(config)
    }
}

impl TryFrom<TomlNetworkDeclaration> for NetworkDeclaration {
    type Error = ZtAgentError;

    fn try_from(toml: TomlNetworkDeclaration) -> Result<Self> {
        let member_config = match toml.config.map(toml_to_json).transpose()? {
            Some(serde_json::Value::Object(map)) => map,
            Some(_) => {
                return Err(ZtAgentError::Config(
                    "network config must be a table".to_string(),
                ))
            }
            None => serde_json::Map::new(),
        };

        Ok(NetworkDeclaration {
            api_key: toml.api_key,
            enabled: toml.enabled,
            node_name: toml.node_name,
            description: toml.description,
            hidden: toml.hidden,
            config: member_config,
        })
    }
}

/// Convert a TOML value tree into a JSON value tree.
///
/// Datetimes have no JSON counterpart and are rejected rather than silently
/// stringified; the remote APIs would not accept them anyway.
pub fn toml_to_json(value: toml::Value) -> Result<serde_json::Value> {
    use serde_json::Value as Json;
    use toml::Value as Toml;

    Ok(match value {
        Toml::String(s) => Json::String(s),
        Toml::Integer(i) => Json::Number(i.into()),
        Toml::Float(f) => serde_json::Number::from_f64(f)
            .map(Json::Number)
            .ok_or_else(|| {
                ZtAgentError::Config(format!("non-finite float {} is not representable", f))
            })?,
        Toml::Boolean(b) => Json::Bool(b),
        Toml::Datetime(dt) => {
            return Err(ZtAgentError::Config(format!(
                "datetime value '{}' is not supported in config mappings",
                dt
            )))
        }
        Toml::Array(values) => Json::Array(
            values
                .into_iter()
                .map(toml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        Toml::Table(table) => Json::Object(
            table
                .into_iter()
                .map(|(k, v)| Ok((k, toml_to_json(v)?)))
                .collect::<Result<serde_json::Map<_, _>>>()?,
        ),
    })
}

// Default value functions
fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_basic_declarations() {
        let toml = r#"
            version = "1.14.2"

            [networks.8056c2e21c000001]
            api_key = "token123"
            node_name = "web-01"
            description = "production web host"

            [networks.8056c2e21c000001.config]
            authorized = true
            tags = [[1001, 2001]]
        "#;

        let config = TomlConfig::parse(toml).expect("Failed to parse TOML");
        assert_eq!(config.version.as_deref(), Some("1.14.2"));
        assert!(config.networks.contains_key("8056c2e21c000001"));

        let network = &config.networks["8056c2e21c000001"];
        assert!(network.enabled);
        assert_eq!(network.api_key.as_deref(), Some("token123"));
        assert_eq!(network.node_name.as_deref(), Some("web-01"));
        assert!(network.config.is_some());
    }

    #[test]
    fn test_parse_with_defaults() {
        let toml = r#"
            [networks.8056c2e21c000001]
            api_key = "token123"
        "#;

        let config = TomlConfig::parse(toml).expect("Failed to parse TOML");
        let network = &config.networks["8056c2e21c000001"];

        // Check defaults
        assert!(network.enabled);
        assert!(!network.hidden);
        assert!(network.node_name.is_none());
        assert!(network.config.is_none());
    }

    #[test]
    fn test_parse_disabled_network() {
        let toml = r#"
            [networks.8056c2e21c000001]
            enabled = false
        "#;

        let config = TomlConfig::parse(toml).expect("Failed to parse TOML");
        assert!(!config.networks["8056c2e21c000001"].enabled);
    }

    #[test]
    fn test_convert_to_config() {
        let toml = r#"
            central_url = "https://central.example/api"

            [networks.8056c2e21c000001]
            api_key = "token123"

            [networks.8056c2e21c000001.config]
            authorized = true
            tags = [[1001, 2001]]

            [local_config.settings]
            allowTcpFallbackRelay = false
            primaryPort = 9993
        "#;

        let toml_config = TomlConfig::parse(toml).expect("Failed to parse TOML");
        let config: Config = toml_config.try_into().expect("Failed to convert");

        assert_eq!(config.central_url, "https://central.example/api");
        assert_eq!(config.service_url, crate::config::DEFAULT_SERVICE_URL);

        let network = config.get_network("8056c2e21c000001").unwrap();
        assert_eq!(network.config.get("authorized"), Some(&json!(true)));
        assert_eq!(network.config.get("tags"), Some(&json!([[1001, 2001]])));

        let local = config.local_config.unwrap();
        assert_eq!(
            local,
            json!({ "settings": { "allowTcpFallbackRelay": false, "primaryPort": 9993 } })
        );
    }

    #[test]
    fn test_toml_to_json_scalars() {
        assert_eq!(
            toml_to_json(toml::Value::Integer(42)).unwrap(),
            json!(42)
        );
        assert_eq!(
            toml_to_json(toml::Value::Boolean(true)).unwrap(),
            json!(true)
        );
        assert_eq!(
            toml_to_json(toml::Value::String("x".to_string())).unwrap(),
            json!("x")
        );
    }

    #[test]
    fn test_toml_to_json_rejects_datetime() {
        let toml = "when = 2024-01-01T00:00:00Z";
        let value: toml::Value = toml::from_str(toml).unwrap();
        assert!(toml_to_json(value).is_err());
    }

    #[test]
    fn test_scalar_network_config_rejected() {
        let toml = r#"
            [networks.8056c2e21c000001]
            api_key = "token123"
            config = 5
        "#;

        let toml_config = TomlConfig::parse(toml).expect("Failed to parse TOML");
        let result: Result<Config> = toml_config.try_into();
        assert!(result.is_err());
    }
}
