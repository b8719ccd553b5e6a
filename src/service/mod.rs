//! Local zerotier-one service integration
//!
//! This module talks to the locally running daemon in two ways: through its
//! JSON API (membership operations, node status) and through the platform
//! service manager (restarting the daemon after `local.conf` changes).

mod local_api;

#[cfg(target_os = "linux")]
mod systemd;

#[cfg(target_os = "macos")]
mod launchd;

#[cfg(target_os = "windows")]
mod windows_service;

pub use local_api::{node_id_from_identity, JoinedNetwork, LocalApi, NodeStatus};

#[cfg(target_os = "linux")]
pub use systemd::SystemdManager;

#[cfg(target_os = "macos")]
pub use launchd::LaunchdManager;

#[cfg(target_os = "windows")]
pub use windows_service::WindowsManager;

use crate::error::{Result, ZtAgentError};
use std::process::Command;
use tracing::{debug, info};

/// Abstraction over the platform's service manager, used to restart the
/// zerotier-one daemon after its local configuration changes.
pub trait ServiceManager {
    /// Human-readable name of the managed service unit
    fn unit(&self) -> &str;

    /// Restart the daemon
    fn restart(&self) -> Result<()>;

    /// Check whether the daemon is currently active
    fn is_active(&self) -> Result<bool>;
}

/// Service manager for the platform this binary was built for
pub fn create_service_manager() -> Box<dyn ServiceManager> {
    #[cfg(target_os = "linux")]
    {
        Box::new(SystemdManager::new())
    }

    #[cfg(target_os = "macos")]
    {
        Box::new(LaunchdManager::new())
    }

    #[cfg(target_os = "windows")]
    {
        Box::new(WindowsManager::new())
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        Box::new(NullManager)
    }
}

/// Run a service-manager command, mapping failure onto a `Service` error
/// that carries the command's stderr.
pub(crate) fn run_service_command(program: &str, args: &[&str]) -> Result<()> {
    debug!("Running: {} {}", program, args.join(" "));

    let output = Command::new(program).args(args).output().map_err(|e| {
        ZtAgentError::Service(format!("Failed to run {}: {}", program, e))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ZtAgentError::Service(format!(
            "{} {} failed: {}",
            program,
            args.join(" "),
            stderr.trim()
        )));
    }

    Ok(())
}

/// No-op manager for platforms without a known service manager.
///
/// Restart requests are logged and reported as unsupported so the operator
/// knows to bounce the daemon themselves.
pub struct NullManager;

impl ServiceManager for NullManager {
    fn unit(&self) -> &str {
        "zerotier-one"
    }

    fn restart(&self) -> Result<()> {
        info!("No service manager on this platform; restart zerotier-one manually");
        Err(ZtAgentError::Platform(
            "service restart not supported on this platform".to_string(),
        ))
    }

    fn is_active(&self) -> Result<bool> {
        Err(ZtAgentError::Platform(
            "service status not supported on this platform".to_string(),
        ))
    }
}
