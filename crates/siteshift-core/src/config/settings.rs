//! Layered settings: CLI flags over policy parameters over the config file.

use std::collections::BTreeMap;
use std::time::Duration;

use super::schema::SiteshiftConfig;
use super::{
    Credentials, DEFAULT_DIRECTORY_TIMEOUT_SECS, DirectorySettings, InventorySettings,
    RelocationConfig, SiteComparison, SiteMapping, directory_url,
};
use crate::directory::filter::qualify_dn;
use crate::error::ConfigError;

/// Number of leading parameters a management policy always passes
/// (mount point, computer name, console user).
pub const POLICY_RESERVED_PARAMETERS: usize = 3;

/// The site mapping as it arrived from one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingSource {
    /// String form, parsed by [`SiteMapping::parse`]
    Literal(String),
    /// Table from the config file
    Table(BTreeMap<String, String>),
}

/// One layer of settings; every field optional. Blank strings count as unset.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PartialSettings {
    pub directory_domain: Option<String>,
    pub directory_base: Option<String>,
    pub group_dn: Option<String>,
    pub site_mapping: Option<MappingSource>,
    pub directory_user: Option<String>,
    pub directory_password: Option<String>,
    pub inventory_url: Option<String>,
    pub inventory_user: Option<String>,
    pub inventory_password: Option<String>,
    pub timeout_secs: Option<u64>,
    pub ignore_site_case: Option<bool>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub relocation: RelocationConfig,
    pub inventory: InventorySettings,
}

impl PartialSettings {
    /// Read the positional parameters a management policy passes to a script.
    ///
    /// `params` excludes the program name. Parameters 4 through 11 carry, in
    /// order: directory domain, search base, group DN, site mapping,
    /// directory user and password, inventory user and password.
    pub fn from_policy_parameters(params: &[String]) -> Self {
        let param = |n: usize| params.get(POLICY_RESERVED_PARAMETERS + n).cloned();
        Self {
            directory_domain: param(0),
            directory_base: param(1),
            group_dn: param(2),
            site_mapping: param(3).map(MappingSource::Literal),
            directory_user: param(4),
            directory_password: param(5),
            inventory_user: param(6),
            inventory_password: param(7),
            ..Self::default()
        }
    }

    pub fn from_file(config: &SiteshiftConfig) -> Self {
        let SiteshiftConfig {
            ignore_site_case,
            directory,
            inventory,
            sites,
        } = config.clone();
        Self {
            directory_domain: directory.domain,
            directory_base: directory.base,
            group_dn: directory.group,
            site_mapping: (!sites.is_empty()).then_some(MappingSource::Table(sites)),
            directory_user: directory.user,
            directory_password: directory.password,
            inventory_url: inventory.url,
            inventory_user: inventory.user,
            inventory_password: inventory.password,
            timeout_secs: directory.timeout_secs,
            ignore_site_case,
        }
    }

    /// Fill every unset field of `self` from `fallback`.
    pub fn or(self, fallback: PartialSettings) -> PartialSettings {
        PartialSettings {
            directory_domain: pick(self.directory_domain, fallback.directory_domain),
            directory_base: pick(self.directory_base, fallback.directory_base),
            group_dn: pick(self.group_dn, fallback.group_dn),
            site_mapping: match self.site_mapping {
                Some(MappingSource::Literal(s)) if s.trim().is_empty() => fallback.site_mapping,
                Some(mapping) => Some(mapping),
                None => fallback.site_mapping,
            },
            directory_user: pick(self.directory_user, fallback.directory_user),
            directory_password: pick(self.directory_password, fallback.directory_password),
            inventory_url: pick(self.inventory_url, fallback.inventory_url),
            inventory_user: pick(self.inventory_user, fallback.inventory_user),
            inventory_password: pick(self.inventory_password, fallback.inventory_password),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
            ignore_site_case: self.ignore_site_case.or(fallback.ignore_site_case),
        }
    }

    /// Names of required settings that are still unset.
    pub fn missing(&self) -> Vec<&'static str> {
        let unset = |value: &Option<String>| non_blank(value).is_none();
        let mapping_unset = match &self.site_mapping {
            None => true,
            Some(MappingSource::Literal(s)) => s.trim().is_empty(),
            Some(MappingSource::Table(t)) => t.is_empty(),
        };

        [
            ("directory domain", unset(&self.directory_domain)),
            ("directory search base", unset(&self.directory_base)),
            ("group DN", unset(&self.group_dn)),
            ("site mapping", mapping_unset),
            ("directory user", unset(&self.directory_user)),
            ("directory password", unset(&self.directory_password)),
            ("inventory URL", unset(&self.inventory_url)),
            ("inventory user", unset(&self.inventory_user)),
            ("inventory password", unset(&self.inventory_password)),
        ]
        .into_iter()
        .filter(|(_, is_unset)| *is_unset)
        .map(|(name, _)| name)
        .collect()
    }

    /// Resolve into settings, failing with the full list of missing names.
    pub fn resolve(self) -> Result<Settings, ConfigError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(ConfigError::MissingSettings(missing));
        }

        let required =
            |value: Option<String>| value.map(|v| v.trim().to_string()).unwrap_or_default();

        let site_mapping = match self.site_mapping {
            Some(MappingSource::Literal(s)) => SiteMapping::parse(&s)?,
            Some(MappingSource::Table(t)) => SiteMapping::from_entries(t)?,
            None => return Err(ConfigError::MissingSettings(vec!["site mapping"])),
        };

        let base_dn = required(self.directory_base);
        let parent_group_dn = qualify_dn(&required(self.group_dn), &base_dn);
        let timeout_secs = self
            .timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_DIRECTORY_TIMEOUT_SECS);

        let directory = DirectorySettings {
            url: directory_url(&required(self.directory_domain)),
            credentials: Credentials::new(
                required(self.directory_user),
                self.directory_password.unwrap_or_default(),
            ),
            timeout: Duration::from_secs(timeout_secs),
        };

        let inventory = InventorySettings {
            base_url: required(self.inventory_url),
            credentials: Credentials::new(
                required(self.inventory_user),
                self.inventory_password.unwrap_or_default(),
            ),
        };

        let site_comparison = if self.ignore_site_case.unwrap_or(false) {
            SiteComparison::CaseInsensitive
        } else {
            SiteComparison::Exact
        };

        Ok(Settings {
            relocation: RelocationConfig {
                directory,
                base_dn,
                parent_group_dn,
                site_mapping,
                site_comparison,
                dry_run: false,
            },
            inventory,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn pick(preferred: Option<String>, fallback: Option<String>) -> Option<String> {
    if non_blank(&preferred).is_some() {
        preferred
    } else {
        fallback
    }
}

impl std::fmt::Debug for PartialSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secret = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("PartialSettings")
            .field("directory_domain", &self.directory_domain)
            .field("directory_base", &self.directory_base)
            .field("group_dn", &self.group_dn)
            .field("site_mapping", &self.site_mapping)
            .field("directory_user", &self.directory_user)
            .field("directory_password", &secret(&self.directory_password))
            .field("inventory_url", &self.inventory_url)
            .field("inventory_user", &self.inventory_user)
            .field("inventory_password", &secret(&self.inventory_password))
            .field("timeout_secs", &self.timeout_secs)
            .field("ignore_site_case", &self.ignore_site_case)
            .finish()
    }
}
