//! Security hardening and privilege management
//!
//! The agent reads the daemon's auth token and writes into its home
//! directory, both of which normally require root. This module detects the
//! privilege level up front and validates that secret-bearing files (the
//! daemon auth token, the declarations file with its API keys) are not
//! readable by other users.

mod permissions;
mod privileges;

pub use permissions::{check_secret_file, set_secret_permissions};
pub use privileges::{require_elevated, PrivilegeLevel};
