//! In-memory directory and inventory used by the workflow tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use siteshift_core::config::{
    Credentials, DirectorySettings, RelocationConfig, SiteComparison, SiteMapping,
};
use siteshift_core::directory::{Directory, DirectorySession, GroupSet};
use siteshift_core::error::{DirectoryError, InventoryError};
use siteshift_core::inventory::Inventory;
use siteshift_core::types::{DeviceIdentity, Site};

pub const BASE_DN: &str = "DC=example,DC=org";
pub const PARENT_DN: &str = "CN=MacEnrolment,OU=Mac,DC=example,DC=org";
pub const SERIAL: &str = "C02XK1ABJGH5";

pub fn group_dn(name: &str) -> String {
    format!("CN={},OU=Groups,{}", name, BASE_DN)
}

pub fn relocation_config(mapping: &[(&str, &str)]) -> RelocationConfig {
    let entries = mapping
        .iter()
        .map(|(g, s)| (g.to_string(), s.to_string()))
        .collect();
    RelocationConfig {
        directory: DirectorySettings {
            url: "ldap://ads.example.org".to_string(),
            credentials: Credentials::new("svc-enrolment", "secret"),
            timeout: Duration::from_secs(20),
        },
        base_dn: BASE_DN.to_string(),
        parent_group_dn: PARENT_DN.to_string(),
        site_mapping: SiteMapping::from_entries(entries).expect("valid mapping"),
        site_comparison: SiteComparison::Exact,
        dry_run: false,
    }
}

// =============================================================================
// Directory
// =============================================================================

#[derive(Default)]
pub struct DirectoryState {
    /// Subgroups of the parent group, in the order the server returns them
    pub subgroups: Vec<(String, String)>,
    /// Group DN to its members (usernames or nested group DNs)
    pub members: HashMap<String, Vec<String>>,
    pub connect_error: Option<fn() -> DirectoryError>,
    pub fail_enumeration: bool,
    pub connects: usize,
    pub closes: usize,
    pub probes: Vec<String>,
}

#[derive(Clone, Default)]
pub struct FakeDirectory {
    pub state: Rc<RefCell<DirectoryState>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subgroup(self, name: &str) -> Self {
        self.with_subgroup_dn(name, &group_dn(name))
    }

    pub fn with_subgroup_dn(self, name: &str, dn: &str) -> Self {
        self.state
            .borrow_mut()
            .subgroups
            .push((name.to_string(), dn.to_string()));
        self
    }

    pub fn with_member(self, group_dn: &str, member: &str) -> Self {
        self.state
            .borrow_mut()
            .members
            .entry(group_dn.to_string())
            .or_default()
            .push(member.to_string());
        self
    }

    pub fn failing_connect(self, error: fn() -> DirectoryError) -> Self {
        self.state.borrow_mut().connect_error = Some(error);
        self
    }

    pub fn failing_enumeration(self) -> Self {
        self.state.borrow_mut().fail_enumeration = true;
        self
    }

    pub fn connects(&self) -> usize {
        self.state.borrow().connects
    }

    pub fn closes(&self) -> usize {
        self.state.borrow().closes
    }

    pub fn probes(&self) -> Vec<String> {
        self.state.borrow().probes.clone()
    }
}

impl Directory for FakeDirectory {
    type Session = FakeSession;

    fn connect(&self, _settings: &DirectorySettings) -> Result<FakeSession, DirectoryError> {
        let mut state = self.state.borrow_mut();
        state.connects += 1;
        if let Some(error) = state.connect_error {
            return Err(error());
        }
        Ok(FakeSession {
            state: Rc::clone(&self.state),
        })
    }
}

pub struct FakeSession {
    state: Rc<RefCell<DirectoryState>>,
}

impl DirectorySession for FakeSession {
    fn enumerate_subgroups(
        &mut self,
        _base_dn: &str,
        parent_group_dn: &str,
    ) -> Result<GroupSet, DirectoryError> {
        let state = self.state.borrow();
        if state.fail_enumeration {
            return Err(DirectoryError::Search {
                filter: parent_group_dn.to_string(),
                message: "server busy".to_string(),
            });
        }

        let mut groups = GroupSet::new();
        for (name, dn) in &state.subgroups {
            if let Some(first_dn) = groups.get(name) {
                return Err(DirectoryError::DuplicateGroup {
                    name: name.clone(),
                    first_dn: first_dn.clone(),
                    second_dn: dn.clone(),
                });
            }
            groups.insert(name.clone(), dn.clone());
        }
        Ok(groups)
    }

    fn is_user_in_group(
        &mut self,
        _base_dn: &str,
        username: &str,
        group_dn: &str,
    ) -> Result<bool, DirectoryError> {
        let mut state = self.state.borrow_mut();
        state.probes.push(group_dn.to_string());

        // Walk nested groups the way an in-chain match does server-side.
        let mut pending = vec![group_dn.to_string()];
        let mut seen = HashSet::new();
        while let Some(dn) = pending.pop() {
            if !seen.insert(dn.clone()) {
                continue;
            }
            for member in state.members.get(&dn).into_iter().flatten() {
                if member == username {
                    return Ok(true);
                }
                pending.push(member.clone());
            }
        }
        Ok(false)
    }

    fn close(self) -> Result<(), DirectoryError> {
        self.state.borrow_mut().closes += 1;
        Ok(())
    }
}

// =============================================================================
// Inventory
// =============================================================================

#[derive(Default)]
pub struct InventoryState {
    pub devices: HashMap<String, DeviceIdentity>,
    pub owners: HashMap<String, String>,
    pub sites: HashMap<String, Site>,
    pub update_error: Option<(u16, String)>,
    pub updates: Vec<(String, Site)>,
    pub device_lookups: usize,
}

#[derive(Clone, Default)]
pub struct FakeInventory {
    pub state: Rc<RefCell<InventoryState>>,
}

impl FakeInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(self, serial: &str, id: &str, site_name: &str) -> Self {
        self.state.borrow_mut().devices.insert(
            serial.to_string(),
            DeviceIdentity {
                id: id.to_string(),
                serial: serial.to_string(),
                site_name: site_name.to_string(),
            },
        );
        self
    }

    pub fn with_owner(self, serial: &str, owner: &str) -> Self {
        self.state
            .borrow_mut()
            .owners
            .insert(serial.to_string(), owner.to_string());
        self
    }

    pub fn with_site(self, id: &str, name: &str) -> Self {
        self.state
            .borrow_mut()
            .sites
            .insert(name.to_string(), Site::new(id, name));
        self
    }

    pub fn failing_update(self, status: u16, body: &str) -> Self {
        self.state.borrow_mut().update_error = Some((status, body.to_string()));
        self
    }

    pub fn updates(&self) -> Vec<(String, Site)> {
        self.state.borrow().updates.clone()
    }

    pub fn device_lookups(&self) -> usize {
        self.state.borrow().device_lookups
    }

    pub fn site_of(&self, serial: &str) -> Option<String> {
        self.state
            .borrow()
            .devices
            .get(serial)
            .map(|device| device.site_name.clone())
    }
}

impl Inventory for FakeInventory {
    fn device_by_serial(&self, serial: &str) -> Result<DeviceIdentity, InventoryError> {
        let mut state = self.state.borrow_mut();
        state.device_lookups += 1;
        state
            .devices
            .get(serial)
            .cloned()
            .ok_or_else(|| InventoryError::NotFound {
                resource: "computer with serial number",
                key: serial.to_string(),
            })
    }

    fn owner_username(&self, serial: &str) -> Result<String, InventoryError> {
        let state = self.state.borrow();
        if !state.devices.contains_key(serial) {
            return Err(InventoryError::NotFound {
                resource: "computer with serial number",
                key: serial.to_string(),
            });
        }
        state
            .owners
            .get(serial)
            .cloned()
            .ok_or_else(|| InventoryError::MissingField {
                key: serial.to_string(),
                field: "owner username",
            })
    }

    fn site_by_name(&self, name: &str) -> Result<Site, InventoryError> {
        self.state
            .borrow()
            .sites
            .get(name)
            .cloned()
            .ok_or_else(|| InventoryError::NotFound {
                resource: "site",
                key: name.to_string(),
            })
    }

    fn update_device_site(&self, device_id: &str, site: &Site) -> Result<(), InventoryError> {
        let mut state = self.state.borrow_mut();
        if let Some((status, body)) = state.update_error.clone() {
            return Err(InventoryError::Api { status, body });
        }
        state.updates.push((device_id.to_string(), site.clone()));
        if let Some(device) = state.devices.values_mut().find(|d| d.id == device_id) {
            device.site_name = site.name.clone();
        }
        Ok(())
    }
}
