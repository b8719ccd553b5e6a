//! Systemd service manager integration for Linux
//!
//! Restarts the zerotier-one unit through `systemctl` after local
//! configuration changes.

use super::{run_service_command, ServiceManager};
use crate::error::Result;
use std::process::Command;
use tracing::info;

const UNIT: &str = "zerotier-one";

/// Systemd-backed service manager
pub struct SystemdManager {
    unit: String,
}

impl SystemdManager {
    /// Create a manager for the default zerotier-one unit
    pub fn new() -> Self {
        Self {
            unit: UNIT.to_string(),
        }
    }

    /// Create a manager for a non-default unit name
    pub fn with_unit(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }
}

impl Default for SystemdManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceManager for SystemdManager {
    fn unit(&self) -> &str {
        &self.unit
    }

    fn restart(&self) -> Result<()> {
        info!("Restarting {} via systemctl", self.unit);
        run_service_command("systemctl", &["restart", &self.unit])
    }

    fn is_active(&self) -> Result<bool> {
        // `systemctl is-active` exits nonzero for inactive units, so the
        // generic command helper doesn't apply here.
        let output = Command::new("systemctl")
            .args(["is-active", "--quiet", &self.unit])
            .status()
            .map_err(|e| {
                crate::error::ZtAgentError::Service(format!("Failed to run systemctl: {}", e))
            })?;

        Ok(output.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_unit() {
        let manager = SystemdManager::new();
        assert_eq!(manager.unit(), "zerotier-one");
    }

    #[test]
    fn test_custom_unit() {
        let manager = SystemdManager::with_unit("zerotier-one@staging");
        assert_eq!(manager.unit(), "zerotier-one@staging");
    }
}
