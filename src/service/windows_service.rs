//! Windows service manager integration
//!
//! Restarts the ZeroTier One Windows service through `sc.exe` after local
//! configuration changes.

use super::{run_service_command, ServiceManager};
use crate::error::Result;
use std::process::Command;
use tracing::info;

const SERVICE: &str = "ZeroTierOneService";

/// Windows Service Control Manager integration
pub struct WindowsManager {
    service: String,
}

impl WindowsManager {
    /// Create a manager for the default ZeroTier One service
    pub fn new() -> Self {
        Self {
            service: SERVICE.to_string(),
        }
    }
}

impl Default for WindowsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceManager for WindowsManager {
    fn unit(&self) -> &str {
        &self.service
    }

    fn restart(&self) -> Result<()> {
        info!("Restarting {} via sc.exe", self.service);
        // sc stop returns an error if the service is already stopped; a
        // fresh start afterwards is what matters.
        let _ = run_service_command("sc.exe", &["stop", &self.service]);
        run_service_command("sc.exe", &["start", &self.service])
    }

    fn is_active(&self) -> Result<bool> {
        let output = Command::new("sc.exe")
            .args(["query", &self.service])
            .output()
            .map_err(|e| {
                crate::error::ZtAgentError::Service(format!("Failed to run sc.exe: {}", e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(output.status.success() && stdout.contains("RUNNING"))
    }
}
