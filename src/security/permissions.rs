//! File permission validation for secret-bearing files
//!
//! The declarations file carries Central API keys and the daemon home holds
//! `authtoken.secret`; both must stay unreadable to other users.

use crate::error::{Result, ZtAgentError};
use std::path::Path;
use tracing::debug;

/// Maximum mode for a secret file: owner read/write only
#[cfg(unix)]
const SECRET_MAX_MODE: u32 = 0o600;

/// Validate that a secret-bearing file is not accessible to group/other
#[cfg(unix)]
pub fn check_secret_file(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    debug!("Validating permissions for {:?}", path);

    let metadata = std::fs::metadata(path).map_err(|e| {
        ZtAgentError::Permission(format!("Failed to read metadata for {:?}: {}", path, e))
    })?;

    let mode = metadata.permissions().mode() & 0o777;
    if mode & !SECRET_MAX_MODE != 0 {
        return Err(ZtAgentError::Permission(format!(
            "File {:?} has insecure permissions {:o}; expected 0600 or stricter",
            path, mode
        )));
    }

    debug!("Permissions valid for {:?}: {:o}", path, mode);
    Ok(())
}

/// Validate secret file permissions (non-Unix stub)
#[cfg(not(unix))]
pub fn check_secret_file(path: &Path) -> Result<()> {
    debug!("Permission validation not implemented for this platform: {:?}", path);
    Ok(())
}

/// Tighten a secret-bearing file to owner read/write only
#[cfg(unix)]
pub fn set_secret_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let perms = std::fs::Permissions::from_mode(SECRET_MAX_MODE);
    std::fs::set_permissions(path, perms).map_err(|e| {
        ZtAgentError::Permission(format!("Failed to set permissions on {:?}: {}", path, e))
    })?;

    debug!("Set secret permissions on {:?}", path);
    Ok(())
}

/// Tighten secret file permissions (non-Unix stub)
#[cfg(not(unix))]
pub fn set_secret_permissions(path: &Path) -> Result<()> {
    debug!("Permission setting not implemented for this platform: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_secret_file_checks() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authtoken.secret");
        std::fs::write(&path, "s3cret").unwrap();

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(check_secret_file(&path).is_err());

        set_secret_permissions(&path).unwrap();
        assert!(check_secret_file(&path).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_secret_file(&dir.path().join("nope")).is_err());
    }
}
