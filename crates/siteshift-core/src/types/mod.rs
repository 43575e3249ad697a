//! Shared domain types used across the directory, inventory and workflow layers.

use serde::{Deserialize, Serialize};

/// Snapshot of a device record in the inventory, keyed by hardware serial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Inventory-internal identifier used by update calls
    pub id: String,
    /// Hardware serial number
    pub serial: String,
    /// Name of the currently assigned site; empty when unassigned
    pub site_name: String,
}

/// An inventory site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
}

impl Site {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A subgroup found below the configured parent group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryGroup {
    /// Common name, used as the site mapping key
    pub name: String,
    /// Distinguished name
    pub dn: String,
}

/// Outcome of comparing the device's site with the one its owner maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelocationDecision {
    /// The owner belongs to none of the candidate groups.
    NoGroupMatched,
    /// The device already sits in the target site.
    AlreadyAtTarget,
    /// The device must be moved to the target site.
    RelocationRequired,
}

/// Everything a single workflow run learned and did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocationReport {
    pub serial: String,
    pub owner: String,
    pub group: Option<DirectoryGroup>,
    pub current_site: Option<String>,
    pub target_site: Option<Site>,
    pub decision: RelocationDecision,
    /// True when the update call was issued and accepted.
    pub applied: bool,
}

impl RelocationReport {
    /// Whether the run should exit with a success status.
    ///
    /// A dry run that found a required move still counts as success.
    pub fn is_success(&self) -> bool {
        self.decision != RelocationDecision::NoGroupMatched
    }
}
