//! Run configuration.
//!
//! Settings come from three layers, highest precedence first:
//! - CLI flags (or their `SITESHIFT_*` environment variables)
//! - Positional parameters passed by a management policy
//! - siteshift.toml

pub mod mapping;
pub mod parser;
pub mod paths;
pub mod schema;
pub mod settings;
pub mod store;

use std::time::Duration;

pub use mapping::SiteMapping;
pub use parser::{parse_config_toml, parse_config_toml_str};
pub use paths::{config_path_in, default_config_path};
pub use schema::{DirectorySection, InventorySection, SiteshiftConfig};
pub use settings::{MappingSource, PartialSettings, Settings};
pub use store::ConfigStore;

/// Seconds to wait for the directory before giving up.
pub const DEFAULT_DIRECTORY_TIMEOUT_SECS: u64 = 20;

/// A user name and password. `Debug` never shows the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How to reach and authenticate to the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySettings {
    /// `ldap://` or `ldaps://` URL
    pub url: String,
    pub credentials: Credentials,
    /// Bounds connecting, binding and each search
    pub timeout: Duration,
}

/// How to reach and authenticate to the inventory API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySettings {
    pub base_url: String,
    pub credentials: Credentials,
}

/// How the current and target site names are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SiteComparison {
    #[default]
    Exact,
    CaseInsensitive,
}

impl SiteComparison {
    pub fn same_site(self, current: &str, target: &str) -> bool {
        match self {
            SiteComparison::Exact => current == target,
            SiteComparison::CaseInsensitive => current.to_lowercase() == target.to_lowercase(),
        }
    }
}

/// Everything the relocation workflow needs for one run.
#[derive(Debug, Clone)]
pub struct RelocationConfig {
    pub directory: DirectorySettings,
    /// Search base for every directory query
    pub base_dn: String,
    /// Fully qualified DN of the group whose subgroups are candidates
    pub parent_group_dn: String,
    pub site_mapping: SiteMapping,
    pub site_comparison: SiteComparison,
    /// Decide but never issue the update call
    pub dry_run: bool,
}

/// Turn a bare directory domain into an LDAP URL.
pub fn directory_url(domain: &str) -> String {
    let domain = domain.trim();
    if domain.contains("://") {
        domain.to_string()
    } else {
        format!("ldap://{}", domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_url() {
        assert_eq!(directory_url("ads.example.org"), "ldap://ads.example.org");
        assert_eq!(
            directory_url("ldaps://ads.example.org:636"),
            "ldaps://ads.example.org:636"
        );
    }

    #[test]
    fn test_site_comparison() {
        assert!(SiteComparison::Exact.same_site("Finance", "Finance"));
        assert!(!SiteComparison::Exact.same_site("finance", "Finance"));
        assert!(SiteComparison::CaseInsensitive.same_site("finance", "Finance"));
        assert!(!SiteComparison::CaseInsensitive.same_site("HR", "Finance"));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("svc", "hunter2"));
        assert!(debug.contains("svc"));
        assert!(!debug.contains("hunter2"));
    }
}
