//! Membership reconciliation engine
//!
//! Converges the host's ZeroTier state toward the declaration in two
//! phases: a pure planning step that diffs declared networks against the
//! currently joined set, and an apply step that executes the plan against
//! the local service and Central APIs.
//!
//! Networks are independent resources. A failure on one is recorded and
//! reconciliation continues with the rest; the run as a whole is then
//! reported failed. Leaves are applied before joins so a host shedding
//! memberships does so even when Central is unreachable.

use crate::central::CentralClient;
use crate::config::{Config, NetworkDeclaration};
use crate::error::{Result, ZtAgentError};
use crate::report::{Outcome, RunReport};
use crate::service::LocalApi;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

/// A single planned operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Remove the local membership
    Leave,
    /// Create the local membership
    Join,
    /// Converge the member record on Central
    Sync,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leave => write!(f, "leave"),
            Self::Join => write!(f, "join"),
            Self::Sync => write!(f, "sync member config"),
        }
    }
}

/// One step of a reconciliation plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    /// Network the step applies to
    pub network: String,
    /// Operation to perform
    pub action: Action,
}

/// Compute the reconciliation plan for a declared configuration and the
/// currently joined network set.
///
/// Ordering is deterministic: leaves first (sorted by network ID), then for
/// each declared-and-enabled network a join (when not yet a member) followed
/// by a Central sync.
pub fn plan(config: &Config, joined: &[String]) -> Vec<PlannedStep> {
    let mut steps = Vec::new();

    // Sorted views make plan output and tests stable
    let declared: BTreeMap<&str, &NetworkDeclaration> = config
        .networks
        .iter()
        .map(|(id, declaration)| (id.as_str(), declaration))
        .collect();

    let mut leaves: Vec<&str> = joined
        .iter()
        .map(String::as_str)
        .filter(|id| !matches!(declared.get(id), Some(declaration) if declaration.enabled))
        .collect();
    leaves.sort_unstable();

    for id in leaves {
        steps.push(PlannedStep {
            network: id.to_string(),
            action: Action::Leave,
        });
    }

    for (id, declaration) in &declared {
        if !declaration.enabled {
            continue;
        }

        if !joined.iter().any(|j| j == id) {
            steps.push(PlannedStep {
                network: id.to_string(),
                action: Action::Join,
            });
        }

        steps.push(PlannedStep {
            network: id.to_string(),
            action: Action::Sync,
        });
    }

    steps
}

/// Executes a reconciliation plan
pub struct Reconciler {
    central: CentralClient,
    local: LocalApi,
}

impl Reconciler {
    /// Create a reconciler from the two API clients
    pub fn new(central: CentralClient, local: LocalApi) -> Self {
        Self { central, local }
    }

    /// Apply a plan, recording one outcome per network in the report.
    ///
    /// A failed step fails its network (remaining steps for that network are
    /// skipped) but not the run; the caller inspects `report.failed()`.
    pub async fn apply(
        &self,
        config: &Config,
        node_id: &str,
        steps: &[PlannedStep],
        report: &mut RunReport,
    ) {
        // Aggregate step results per network, preserving first-seen order
        let mut order: Vec<String> = Vec::new();
        let mut results: BTreeMap<String, NetworkProgress> = BTreeMap::new();

        for step in steps {
            if !results.contains_key(&step.network) {
                order.push(step.network.clone());
            }
            let progress = results.entry(step.network.clone()).or_default();

            if progress.error.is_some() {
                continue; // earlier step for this network already failed
            }

            let outcome = self.execute(config, node_id, step).await;
            match outcome {
                Ok(StepEffect::Joined) => progress.joined = true,
                Ok(StepEffect::Left) => progress.left = true,
                Ok(StepEffect::Updated) => progress.updated = true,
                Ok(StepEffect::None) => {}
                Err(e) => {
                    warn!("Network {}: {} failed: {}", step.network, step.action, e);
                    progress.error = Some(e.to_string());
                }
            }
        }

        for network in order {
            let progress = &results[&network];
            match &progress.error {
                Some(error) => report.record_failure(network, error),
                None => report.record(network, progress.outcome()),
            }
        }
    }

    /// Execute one step
    async fn execute(
        &self,
        config: &Config,
        node_id: &str,
        step: &PlannedStep,
    ) -> Result<StepEffect> {
        match step.action {
            Action::Leave => {
                info!("Leaving network {}", step.network);
                self.local.leave(&step.network).await?;
                Ok(StepEffect::Left)
            }
            Action::Join => {
                info!("Joining network {}", step.network);
                self.local.join(&step.network).await?;
                Ok(StepEffect::Joined)
            }
            Action::Sync => {
                let declaration = config.get_network(&step.network).ok_or_else(|| {
                    ZtAgentError::Config(format!(
                        "no declaration for planned network {}",
                        step.network
                    ))
                })?;
                let changed = self.sync_member(&step.network, declaration, node_id).await?;
                Ok(if changed {
                    StepEffect::Updated
                } else {
                    StepEffect::None
                })
            }
        }
    }

    /// Converge the Central member record for one network.
    ///
    /// Read-merge-compare-write: the current record is fetched, the
    /// declaration merged in, and a POST only happens when the merge
    /// actually changed something. Returns whether a write happened.
    async fn sync_member(
        &self,
        network: &str,
        declaration: &NetworkDeclaration,
        node_id: &str,
    ) -> Result<bool> {
        let token = declaration.api_key.as_deref().ok_or_else(|| {
            ZtAgentError::Validation(format!("network {} has no api_key", network))
        })?;

        self.central.check_network(network, token).await?;

        let mut member = self.central.get_member(network, node_id, token).await?;
        if !member.apply_declaration(declaration) {
            return Ok(false);
        }

        info!("Updating member {} on network {}", node_id, network);
        self.central
            .update_member(network, node_id, token, &member)
            .await?;
        Ok(true)
    }
}

/// What a completed step changed
enum StepEffect {
    Joined,
    Left,
    Updated,
    None,
}

/// Accumulated effects for one network across its steps
#[derive(Default)]
struct NetworkProgress {
    joined: bool,
    left: bool,
    updated: bool,
    error: Option<String>,
}

impl NetworkProgress {
    fn outcome(&self) -> Outcome {
        match (self.joined, self.left, self.updated) {
            (true, _, true) => Outcome::JoinedAndUpdated,
            (true, _, false) => Outcome::Joined,
            (false, true, _) => Outcome::Left,
            (false, false, true) => Outcome::Updated,
            (false, false, false) => Outcome::Unchanged,
        }
    }
}
