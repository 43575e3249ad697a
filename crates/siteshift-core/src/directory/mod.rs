//! Directory service access: authentication and group membership queries.
//!
//! [`Directory`] opens sessions; a [`DirectorySession`] answers queries until
//! [`DirectorySession::close`] consumes it. Callers must close every session
//! they open, including on error paths.

pub mod filter;
pub mod ldap;

use std::collections::BTreeMap;

use crate::config::DirectorySettings;
use crate::error::DirectoryError;

pub use ldap::{LdapDirectory, LdapSession};

/// Subgroups keyed by name, mapped to their distinguished names.
///
/// Ordered by name, which fixes the probe order of group matching.
pub type GroupSet = BTreeMap<String, String>;

/// Opens authenticated directory sessions.
pub trait Directory {
    type Session: DirectorySession;

    /// Bind with the configured credentials, honoring the connect timeout.
    fn connect(&self, settings: &DirectorySettings) -> Result<Self::Session, DirectoryError>;
}

/// An authenticated directory session.
pub trait DirectorySession {
    /// Groups under `base_dn` that are members of `parent_group_dn`.
    ///
    /// Returns an empty set when there are none. Two groups with the same
    /// name fail with [`DirectoryError::DuplicateGroup`].
    fn enumerate_subgroups(
        &mut self,
        base_dn: &str,
        parent_group_dn: &str,
    ) -> Result<GroupSet, DirectoryError>;

    /// Whether `username` is a direct or nested member of `group_dn`.
    fn is_user_in_group(
        &mut self,
        base_dn: &str,
        username: &str,
        group_dn: &str,
    ) -> Result<bool, DirectoryError>;

    /// Release the connection.
    fn close(self) -> Result<(), DirectoryError>;
}

impl<T: Directory + ?Sized> Directory for &T {
    type Session = T::Session;

    fn connect(&self, settings: &DirectorySettings) -> Result<Self::Session, DirectoryError> {
        (**self).connect(settings)
    }
}

/// Insert a group, rejecting a second group with the same name.
pub(crate) fn insert_group(
    groups: &mut GroupSet,
    name: String,
    dn: String,
) -> Result<(), DirectoryError> {
    if let Some(first_dn) = groups.get(&name) {
        return Err(DirectoryError::DuplicateGroup {
            name,
            first_dn: first_dn.clone(),
            second_dn: dn,
        });
    }
    groups.insert(name, dn);
    Ok(())
}
