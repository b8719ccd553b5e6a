//! Central member record model
//!
//! A member record is the control plane's view of one node on one network.
//! Only the fields the agent converges are modeled; everything else the API
//! returns is preserved through `flatten` so a read-merge-write cycle never
//! drops server-side fields.

use crate::config::NetworkDeclaration;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A member record as returned by `GET /network/{id}/member/{node}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    /// Member display name
    #[serde(default)]
    pub name: String,

    /// Member description
    #[serde(default)]
    pub description: String,

    /// Whether the member is hidden in the network view
    #[serde(default)]
    pub hidden: bool,

    /// Member config object (authorized, tags, ipAssignments, ...)
    #[serde(default)]
    pub config: Map<String, Value>,

    /// Fields the agent does not manage, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Member {
    /// Merge a declaration into this record, returning `true` if anything
    /// changed.
    ///
    /// Declared config keys overwrite the corresponding keys of the member's
    /// config object; keys the declaration does not mention are left alone.
    /// `name` and `description` are only converged when declared, `hidden`
    /// always is.
    pub fn apply_declaration(&mut self, declaration: &NetworkDeclaration) -> bool {
        let mut changed = false;

        for (key, value) in &declaration.config {
            if self.config.get(key) != Some(value) {
                self.config.insert(key.clone(), value.clone());
                changed = true;
            }
        }

        if let Some(ref name) = declaration.node_name {
            if &self.name != name {
                self.name = name.clone();
                changed = true;
            }
        }

        if let Some(ref description) = declaration.description {
            if &self.description != description {
                self.description = description.clone();
                changed = true;
            }
        }

        if self.hidden != declaration.hidden {
            self.hidden = declaration.hidden;
            changed = true;
        }

        changed
    }
}
