//! Package installation and version pinning
//!
//! Ensures the zerotier-one package is installed at the declared version.
//! The installed version is read from `zerotier-cli -v`; when it differs
//! (or the binary is absent) the platform package manager installs the
//! exact version, and on apt the package is held so unattended upgrades
//! don't move it.

use crate::error::{Result, ZtAgentError};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info};

/// Package managers the installer knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Debian/Ubuntu apt
    Apt,
    /// Fedora/RHEL dnf
    Dnf,
    /// openSUSE zypper
    Zypper,
    /// macOS Homebrew
    Brew,
}

impl PackageManager {
    /// Detect the package manager available on this host
    pub fn detect() -> Option<Self> {
        if find_in_path("apt-get").is_some() {
            Some(Self::Apt)
        } else if find_in_path("dnf").is_some() {
            Some(Self::Dnf)
        } else if find_in_path("zypper").is_some() {
            Some(Self::Zypper)
        } else if find_in_path("brew").is_some() {
            Some(Self::Brew)
        } else {
            None
        }
    }

    /// The install command for a pinned zerotier-one version.
    ///
    /// Homebrew cannot install arbitrary pinned versions, so it returns the
    /// plain install command; the caller surfaces a mismatch as an error
    /// instead of silently installing something else.
    pub fn install_command(&self, version: &str) -> (&'static str, Vec<String>) {
        match self {
            Self::Apt => (
                "apt-get",
                vec![
                    "install".to_string(),
                    "-y".to_string(),
                    "--allow-downgrades".to_string(),
                    format!("zerotier-one={}", version),
                ],
            ),
            Self::Dnf => (
                "dnf",
                vec![
                    "install".to_string(),
                    "-y".to_string(),
                    format!("zerotier-one-{}", version),
                ],
            ),
            Self::Zypper => (
                "zypper",
                vec![
                    "--non-interactive".to_string(),
                    "install".to_string(),
                    format!("zerotier-one={}", version),
                ],
            ),
            Self::Brew => ("brew", vec!["install".to_string(), "zerotier-one".to_string()]),
        }
    }

    /// Whether this manager supports installing an exact pinned version
    pub fn supports_pinning(&self) -> bool {
        !matches!(self, Self::Brew)
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apt => write!(f, "apt"),
            Self::Dnf => write!(f, "dnf"),
            Self::Zypper => write!(f, "zypper"),
            Self::Brew => write!(f, "brew"),
        }
    }
}

/// Locate a binary on PATH
pub fn find_in_path(binary: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

/// The installed zerotier-one version, or `None` when the binary is absent.
///
/// `zerotier-cli -v` prints a bare version string; a failure to run the
/// binary at all is treated as not-installed.
pub fn installed_version() -> Option<String> {
    let cli = find_in_path("zerotier-cli")?;
    debug!("Probing version via {:?}", cli);

    let output = Command::new(cli).arg("-v").output().ok()?;
    if !output.status.success() {
        return None;
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

/// Ensure zerotier-one is installed at the pinned version.
///
/// Returns `true` if an install ran. The declared version is compared
/// exactly; no range semantics.
pub fn ensure_version(pinned: &str) -> Result<bool> {
    match installed_version() {
        Some(current) if current == pinned => {
            debug!("zerotier-one {} already installed", current);
            return Ok(false);
        }
        Some(current) => {
            info!("zerotier-one {} installed, {} declared", current, pinned);
        }
        None => {
            info!("zerotier-one not installed, {} declared", pinned);
        }
    }

    let manager = PackageManager::detect().ok_or_else(|| {
        ZtAgentError::Install(
            "no supported package manager found (apt, dnf, zypper, brew)".to_string(),
        )
    })?;

    if !manager.supports_pinning() {
        return Err(ZtAgentError::Install(format!(
            "{} cannot install a pinned version; install zerotier-one {} manually",
            manager, pinned
        )));
    }

    let (program, args) = manager.install_command(pinned);
    info!("Installing zerotier-one {} via {}", pinned, manager);
    run_install_command(program, &args)?;

    // Keep apt from upgrading past the pin
    if manager == PackageManager::Apt {
        run_install_command("apt-mark", &["hold".to_string(), "zerotier-one".to_string()])?;
    }

    Ok(true)
}

fn run_install_command(program: &str, args: &[String]) -> Result<()> {
    debug!("Running: {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| ZtAgentError::Install(format!("Failed to run {}: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ZtAgentError::Install(format!(
            "{} {} failed: {}",
            program,
            args.join(" "),
            stderr.trim()
        )));
    }

    Ok(())
}
