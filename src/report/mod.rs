//! Run outcome reporting
//!
//! A reconciliation pass produces one outcome per declared or observed
//! network plus flags for the install and local-config steps. The report is
//! what the operator sees, and its `failed` state drives the process exit
//! code.

use std::fmt;

/// Outcome of reconciling a single network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Membership was created
    Joined,
    /// Membership was removed
    Left,
    /// The Central member record was updated
    Updated,
    /// Joined and the Central record was updated in the same pass
    JoinedAndUpdated,
    /// Nothing needed to change
    Unchanged,
    /// Reconciliation of this network failed
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Joined => write!(f, "joined"),
            Self::Left => write!(f, "left"),
            Self::Updated => write!(f, "updated"),
            Self::JoinedAndUpdated => write!(f, "joined+updated"),
            Self::Unchanged => write!(f, "unchanged"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl Outcome {
    /// Whether this outcome changed state somewhere
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged | Self::Failed)
    }
}

/// Result row for one network
#[derive(Debug, Clone)]
pub struct NetworkResult {
    /// Network ID
    pub network: String,
    /// What happened
    pub outcome: Outcome,
    /// Error or informational detail, when there is one
    pub detail: Option<String>,
}

/// Full report for one reconciliation run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Whether the package install step changed anything
    pub install_changed: bool,
    /// Whether local.conf was rewritten
    pub local_config_changed: bool,
    /// Whether the daemon was restarted
    pub service_restarted: bool,
    /// Per-network results, in processing order
    pub networks: Vec<NetworkResult>,
}

impl RunReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome for a network
    pub fn record(&mut self, network: impl Into<String>, outcome: Outcome) {
        self.networks.push(NetworkResult {
            network: network.into(),
            outcome,
            detail: None,
        });
    }

    /// Record a failure for a network, keeping the error text
    pub fn record_failure(&mut self, network: impl Into<String>, error: impl fmt::Display) {
        self.networks.push(NetworkResult {
            network: network.into(),
            outcome: Outcome::Failed,
            detail: Some(error.to_string()),
        });
    }

    /// Whether anything on the host or control plane changed
    pub fn changed(&self) -> bool {
        self.install_changed
            || self.local_config_changed
            || self.networks.iter().any(|n| n.outcome.is_change())
    }

    /// Whether any network failed to reconcile
    pub fn failed(&self) -> bool {
        self.networks.iter().any(|n| n.outcome == Outcome::Failed)
    }

    /// Networks that failed, with their recorded details
    pub fn failures(&self) -> impl Iterator<Item = &NetworkResult> {
        self.networks
            .iter()
            .filter(|n| n.outcome == Outcome::Failed)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.networks {
            match &result.detail {
                Some(detail) => {
                    writeln!(f, "{}: {} ({})", result.network, result.outcome, detail)?
                }
                None => writeln!(f, "{}: {}", result.network, result.outcome)?,
            }
        }

        if self.install_changed {
            writeln!(f, "package: installed/updated")?;
        }
        if self.local_config_changed {
            writeln!(f, "local.conf: rewritten")?;
        }
        if self.service_restarted {
            writeln!(f, "service: restarted")?;
        }

        write!(
            f,
            "result: {}",
            if self.failed() {
                "failed"
            } else if self.changed() {
                "changed"
            } else {
                "unchanged"
            }
        )
    }
}
