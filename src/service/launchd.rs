//! Launchd service manager integration for macOS
//!
//! Restarts the ZeroTier One launch daemon through `launchctl` after local
//! configuration changes.

use super::{run_service_command, ServiceManager};
use crate::error::Result;
use std::process::Command;
use tracing::info;

const LABEL: &str = "com.zerotier.one";

/// Launchd-backed service manager
pub struct LaunchdManager {
    label: String,
}

impl LaunchdManager {
    /// Create a manager for the default ZeroTier One daemon label
    pub fn new() -> Self {
        Self {
            label: LABEL.to_string(),
        }
    }
}

impl Default for LaunchdManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceManager for LaunchdManager {
    fn unit(&self) -> &str {
        &self.label
    }

    fn restart(&self) -> Result<()> {
        info!("Restarting {} via launchctl", self.label);
        let target = format!("system/{}", self.label);
        run_service_command("launchctl", &["kickstart", "-k", &target])
    }

    fn is_active(&self) -> Result<bool> {
        let output = Command::new("launchctl")
            .args(["print", &format!("system/{}", self.label)])
            .output()
            .map_err(|e| {
                crate::error::ZtAgentError::Service(format!("Failed to run launchctl: {}", e))
            })?;

        Ok(output.status.success())
    }
}
