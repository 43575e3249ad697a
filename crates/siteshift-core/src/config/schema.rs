//! Configuration schema for siteshift.toml
//!
//! ```toml
//! ignore_site_case = false
//!
//! [directory]
//! domain = "ads.example.org"
//! base = "DC=ads,DC=example,DC=org"
//! group = "CN=MacEnrolment,OU=Mac"
//! timeout_secs = 20
//! user = "svc-enrolment"
//!
//! [inventory]
//! url = "https://jss.example.org:8443"
//! user = "api-siteshift"
//!
//! [sites]
//! "MacEnrolment-Finance" = "Finance"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration structure for siteshift.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteshiftConfig {
    /// Compare site names case-insensitively
    #[serde(default)]
    pub ignore_site_case: Option<bool>,

    #[serde(default)]
    pub directory: DirectorySection,

    #[serde(default)]
    pub inventory: InventorySection,

    /// Group name to site name
    #[serde(default)]
    pub sites: BTreeMap<String, String>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectorySection {
    pub domain: Option<String>,
    pub base: Option<String>,
    pub group: Option<String>,
    pub timeout_secs: Option<u64>,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventorySection {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

fn redacted(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

impl std::fmt::Debug for DirectorySection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectorySection")
            .field("domain", &self.domain)
            .field("base", &self.base)
            .field("group", &self.group)
            .field("timeout_secs", &self.timeout_secs)
            .field("user", &self.user)
            .field("password", &redacted(&self.password))
            .finish()
    }
}

impl std::fmt::Debug for InventorySection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventorySection")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &redacted(&self.password))
            .finish()
    }
}
