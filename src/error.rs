//! Error types for zt-agent
//!
//! This module defines the error types used throughout the application.
//! We use `thiserror` for ergonomic error definitions and `anyhow` for
//! error propagation in application code.

use thiserror::Error;

/// Main error type for zt-agent operations
#[derive(Error, Debug)]
pub enum ZtAgentError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// ZeroTier Central API errors (non-success HTTP response)
    #[error("Central API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code returned by the API
        status: u16,
        /// Response body or a short description of the failure
        message: String,
    },

    /// Local zerotier-one service errors
    #[error("Service error: {0}")]
    Service(String),

    /// HTTP transport errors (connection refused, DNS failure, timeout)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL construction errors
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Package installation errors
    #[error("Install error: {0}")]
    Install(String),

    /// Platform-specific errors
    #[error("Platform error: {0}")]
    Platform(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Permission errors
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias using ZtAgentError
pub type Result<T> = std::result::Result<T, ZtAgentError>;

impl ZtAgentError {
    /// Returns `true` if this error indicates the Central API rejected the
    /// supplied credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }

    /// Returns `true` if this is a "not found" error, from either the API
    /// or the local filesystem.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Api { status: 404, .. } => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for ZtAgentError {
    fn from(err: serde_json::Error) -> Self {
        ZtAgentError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for ZtAgentError {
    fn from(err: toml::de::Error) -> Self {
        ZtAgentError::Config(err.to_string())
    }
}
