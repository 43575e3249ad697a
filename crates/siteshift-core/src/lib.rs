//! Siteshift Core Library
//!
//! Moves a managed device to the inventory site that matches its owner's
//! directory group: resolve the owner from the inventory, find the owner's
//! group below a parent group, map the group to a site and relocate the
//! device if it is elsewhere.

pub mod config;
pub mod directory;
pub mod error;
pub mod hardware;
pub mod identity;
pub mod inventory;
pub mod matching;
pub mod types;
pub mod workflow;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{
        ConfigStore, Credentials, DirectorySettings, InventorySettings, PartialSettings,
        RelocationConfig, Settings, SiteComparison, SiteMapping,
    };

    // Directory
    pub use crate::directory::{Directory, DirectorySession, GroupSet, LdapDirectory};

    // Inventory
    pub use crate::inventory::{Inventory, JamfClient};

    // Errors
    pub use crate::error::{ConfigError, DirectoryError, Error, InventoryError};

    // Workflow
    pub use crate::matching::{GroupMatch, match_group};
    pub use crate::types::{DeviceIdentity, DirectoryGroup, RelocationDecision, RelocationReport, Site};
    pub use crate::workflow::SiteRelocation;
}
