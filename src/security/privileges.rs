//! Privilege level detection
//!
//! The daemon home directory is root-owned on every supported platform, so
//! an unprivileged run fails late with confusing I/O errors. Detecting the
//! privilege level first lets `apply` fail immediately with a clear message.

use crate::error::{Result, ZtAgentError};

/// Privilege level of the current process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeLevel {
    /// Running as root (Unix) or Administrator (Windows)
    Root,
    /// Running as regular user
    User,
    /// Unknown privilege level
    Unknown,
}

impl PrivilegeLevel {
    /// Detect current privilege level
    pub fn detect() -> Self {
        #[cfg(unix)]
        {
            let uid = unsafe { libc::getuid() };
            let euid = unsafe { libc::geteuid() };

            if uid == 0 || euid == 0 {
                return Self::Root;
            }
            Self::User
        }

        #[cfg(windows)]
        {
            // Would check for Administrator membership on Windows; assume
            // User until that is wired up
            Self::User
        }

        #[cfg(not(any(unix, windows)))]
        {
            Self::Unknown
        }
    }

    /// Check if elevated
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::Root)
    }
}

impl std::fmt::Display for PrivilegeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::User => write!(f, "user"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Fail unless the process is running elevated
pub fn require_elevated() -> Result<()> {
    let level = PrivilegeLevel::detect();
    if level.is_elevated() {
        return Ok(());
    }

    Err(ZtAgentError::Permission(format!(
        "running as {}; the daemon home directory requires root",
        level
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_level_detect() {
        let level = PrivilegeLevel::detect();
        assert!(matches!(
            level,
            PrivilegeLevel::Root | PrivilegeLevel::User | PrivilegeLevel::Unknown
        ));
    }

    #[test]
    fn test_privilege_level_display() {
        assert_eq!(PrivilegeLevel::Root.to_string(), "root");
        assert_eq!(PrivilegeLevel::User.to_string(), "user");
    }

    #[test]
    fn test_is_elevated() {
        assert!(PrivilegeLevel::Root.is_elevated());
        assert!(!PrivilegeLevel::User.is_elevated());
    }
}
