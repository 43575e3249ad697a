//! Site relocation workflow.
//!
//! One linear pass per run:
//!
//! ```text
//! connect -> resolve owner -> enumerate subgroups -> match group
//!   -> (no group: done, device unchanged)
//!   -> look up mapped site -> compare with current site
//!   -> (same site: done) | update device site
//! ```
//!
//! The directory session is closed as soon as matching finishes, whether
//! or not any step up to that point failed. The update call is the last
//! step, so a failed run never leaves a partial change behind.

use tracing::{debug, info, warn};

use crate::config::RelocationConfig;
use crate::directory::{Directory, DirectorySession};
use crate::error::{ConfigError, Result};
use crate::identity::IdentityResolver;
use crate::inventory::Inventory;
use crate::matching::{GroupMatch, match_group};
use crate::types::{RelocationDecision, RelocationReport};

/// Moves a device to the site mapped from its owner's directory group.
#[derive(Debug)]
pub struct SiteRelocation<D, I> {
    config: RelocationConfig,
    directory: D,
    inventory: I,
}

impl<D: Directory, I: Inventory> SiteRelocation<D, I> {
    pub fn new(config: RelocationConfig, directory: D, inventory: I) -> Self {
        Self {
            config,
            directory,
            inventory,
        }
    }

    /// Run the workflow once for the device with hardware serial `serial`.
    ///
    /// An owner outside every candidate group is not an error: the report
    /// carries [`RelocationDecision::NoGroupMatched`].
    pub fn run(&self, serial: &str) -> Result<RelocationReport> {
        info!(serial = %serial, dry_run = self.config.dry_run, "Starting site relocation");

        let mut session = self.directory.connect(&self.config.directory)?;
        let resolved = self.resolve_group(&mut session, serial);
        self.release(session);
        let (owner, matched) = resolved?;

        let group = match matched {
            GroupMatch::Matched(group) => group,
            GroupMatch::NoMatch => {
                info!(owner = %owner, "No group found for user, device unchanged");
                return Ok(RelocationReport {
                    serial: serial.to_string(),
                    owner,
                    group: None,
                    current_site: None,
                    target_site: None,
                    decision: RelocationDecision::NoGroupMatched,
                    applied: false,
                });
            }
        };
        info!(owner = %owner, group = %group.name, "Owner is a member of group");

        let target_name = self
            .config
            .site_mapping
            .site_for(&group.name)
            .ok_or_else(|| ConfigError::UnmappedGroup {
                group: group.name.clone(),
            })?;

        let device = self.inventory.device_by_serial(serial)?;
        let target = self.inventory.site_by_name(target_name)?;
        debug!(current = %device.site_name, target = %target.name, "Site resolved");

        let mut report = RelocationReport {
            serial: serial.to_string(),
            owner,
            group: Some(group),
            current_site: Some(device.site_name.clone()),
            target_site: Some(target.clone()),
            decision: RelocationDecision::AlreadyAtTarget,
            applied: false,
        };

        if self
            .config
            .site_comparison
            .same_site(&device.site_name, &target.name)
        {
            info!(site = %target.name, "Device is already in the correct site");
            return Ok(report);
        }

        report.decision = RelocationDecision::RelocationRequired;
        if self.config.dry_run {
            info!(from = %device.site_name, to = %target.name, "Dry run, device not moved");
            return Ok(report);
        }

        self.inventory.update_device_site(&device.id, &target)?;
        report.applied = true;
        info!(from = %device.site_name, to = %target.name, "Moved device to site");

        Ok(report)
    }

    /// Everything that needs the directory session.
    fn resolve_group(
        &self,
        session: &mut D::Session,
        serial: &str,
    ) -> Result<(String, GroupMatch)> {
        let owner = IdentityResolver::new(&self.inventory).resolve_owner(serial)?;

        let base_dn = &self.config.base_dn;
        let groups = session.enumerate_subgroups(base_dn, &self.config.parent_group_dn)?;
        debug!(count = groups.len(), "Candidate groups enumerated");

        let matched = match_group(&groups, &owner, |user, group_dn| {
            session.is_user_in_group(base_dn, user, group_dn)
        })?;

        Ok((owner, matched))
    }

    fn release(&self, session: D::Session) {
        if let Err(e) = session.close() {
            warn!(error = %e, "Failed to release directory session");
        }
    }
}
