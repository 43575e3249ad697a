//! Error taxonomy for directory, inventory and configuration failures.
//!
//! Every component returns its own error type; the relocation workflow
//! wraps them in [`Error`] without altering the original cause. A user
//! who belongs to no candidate group is a business outcome and is reported
//! through [`crate::types::RelocationDecision`], not through these types.

use thiserror::Error;

/// Failures talking to the directory service.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The server rejected the bind credentials (LDAP result code 49).
    #[error("directory rejected the credentials for '{user}'")]
    Auth { user: String },

    /// No connection could be established within the caller timeout.
    #[error("timed out after {timeout_secs}s connecting to directory at {url}")]
    ConnectTimeout { url: String, timeout_secs: u64 },

    #[error("failed to connect to directory at {url}: {message}")]
    Connect { url: String, message: String },

    #[error("directory bind failed with code {code}: {message}")]
    Bind { code: u32, message: String },

    #[error("directory search '{filter}' failed: {message}")]
    Search { filter: String, message: String },

    #[error("failed to release directory session: {0}")]
    Unbind(String),

    /// Two subgroups of the parent group share a name.
    #[error("group name '{name}' is used by both '{first_dn}' and '{second_dn}'")]
    DuplicateGroup {
        name: String,
        first_dn: String,
        second_dn: String,
    },

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Failures talking to the device inventory API.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("no {resource} '{key}' found in inventory")]
    NotFound { resource: &'static str, key: String },

    /// The record exists but lacks an element that enrollment should have set.
    #[error("inventory record for '{key}' has no {field}")]
    MissingField { key: String, field: &'static str },

    /// Non-success HTTP status. The body is kept verbatim for diagnostics.
    #[error("inventory API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("inventory request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed inventory response: {0}")]
    Xml(String),

    #[error("invalid inventory URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Configuration faults detected before or during a run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("group '{group}' matched but has no site mapping entry")]
    UnmappedGroup { group: String },

    #[error("invalid site mapping: {0}")]
    InvalidSiteMapping(String),

    #[error("missing required settings: {}", .0.join(", "))]
    MissingSettings(Vec<&'static str>),
}

/// Top-level error surfaced by the relocation workflow.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
