//! Configuration validation functions
//!
//! This module provides validation for declaration fields: network IDs,
//! node IDs, and version strings. Member config mappings are deliberately
//! not validated; their schema belongs to the Central API.

use crate::error::{Result, ZtAgentError};

/// Validate a ZeroTier network ID (16 hex digits)
pub fn validate_network_id(id: &str) -> Result<()> {
    if id.len() != 16 || !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ZtAgentError::Validation(format!(
            "Network ID '{}' is not a 16-digit hex identifier",
            id
        )));
    }
    Ok(())
}

/// Validate a ZeroTier node ID (10 hex digits)
pub fn validate_node_id(id: &str) -> Result<()> {
    if id.len() != 10 || !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ZtAgentError::Validation(format!(
            "Node ID '{}' is not a 10-digit hex identifier",
            id
        )));
    }
    Ok(())
}

/// Validate a pinned package version (dotted numerics, e.g. "1.14.2")
pub fn validate_version(version: &str) -> Result<()> {
    if version.is_empty() {
        return Err(ZtAgentError::Validation(
            "Version string cannot be empty".to_string(),
        ));
    }

    let valid = version
        .split('.')
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));

    if !valid {
        return Err(ZtAgentError::Validation(format!(
            "Version '{}' is not a dotted numeric version",
            version
        )));
    }

    Ok(())
}
