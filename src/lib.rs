//! zt-agent: Declarative ZeroTier node agent
//!
//! This library reconciles a host's ZeroTier state against a declared
//! configuration: the installed `zerotier-one` package version, the set of
//! joined networks, each membership's record on ZeroTier Central, and the
//! daemon's `local.conf`.
//!
//! # Architecture
//!
//! The agent runs as a one-shot reconciliation pass (typically from cron,
//! a systemd timer, or a provisioning pipeline). It reads a TOML
//! declarations file, observes current state through the daemon's local
//! JSON API, and converges remote and local state toward the declaration.
//! The data plane stays entirely inside the `zerotier-one` daemon; the
//! agent only manages membership and configuration around it.
//!
//! # Modules
//!
//! - `config`: Declarations parsing and validation
//! - `central`: ZeroTier Central REST API client
//! - `service`: Local daemon API client and service manager integration
//! - `reconcile`: Membership and member-record reconciliation engine
//! - `localconf`: Canonical `local.conf` writer
//! - `install`: Package version pinning
//! - `platform`: Platform and environment detection
//! - `security`: Privilege and file-permission checks
//! - `report`: Per-run outcome reporting
//! - `error`: Error types and handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod central;
pub mod config;
pub mod error;
pub mod install;
pub mod localconf;
pub mod platform;
pub mod reconcile;
pub mod report;
pub mod security;
pub mod service;

// Re-export commonly used types
pub use error::{Result, ZtAgentError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
