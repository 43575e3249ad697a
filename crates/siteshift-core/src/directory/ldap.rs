//! LDAP / Active Directory implementation of the directory traits.
//!
//! ldap3 is async; the session owns a tokio runtime and blocks on each
//! operation so the workflow stays synchronous.

use std::time::Duration;

use ldap3::{Ldap, LdapConnAsync, Scope, SearchEntry};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use super::filter::{leading_rdn_value, member_in_chain_filter, subgroups_filter};
use super::{Directory, DirectorySession, GroupSet, insert_group};
use crate::config::DirectorySettings;
use crate::error::DirectoryError;

/// LDAP result code for invalid credentials.
const LDAP_INVALID_CREDENTIALS: u32 = 49;

/// Opens simple-bind sessions against an LDAP server.
#[derive(Debug, Default, Clone, Copy)]
pub struct LdapDirectory;

impl LdapDirectory {
    pub fn new() -> Self {
        Self
    }
}

impl Directory for LdapDirectory {
    type Session = LdapSession;

    fn connect(&self, settings: &DirectorySettings) -> Result<LdapSession, DirectoryError> {
        let runtime = Runtime::new().map_err(DirectoryError::Runtime)?;
        let ldap = runtime.block_on(open(settings))?;

        info!(url = %settings.url, "Directory connection established");

        Ok(LdapSession {
            runtime,
            ldap,
            timeout: settings.timeout,
            url: settings.url.clone(),
        })
    }
}

async fn open(settings: &DirectorySettings) -> Result<Ldap, DirectoryError> {
    let url = &settings.url;
    let timed_out = || DirectoryError::ConnectTimeout {
        url: url.clone(),
        timeout_secs: settings.timeout.as_secs(),
    };

    debug!(url = %url, "Connecting to directory");

    let (conn, mut ldap) = tokio::time::timeout(settings.timeout, LdapConnAsync::new(url))
        .await
        .map_err(|_| timed_out())?
        .map_err(|e| DirectoryError::Connect {
            url: url.clone(),
            message: e.to_string(),
        })?;

    tokio::spawn(async move {
        if let Err(e) = conn.drive().await {
            warn!(error = %e, "Directory connection driver error");
        }
    });

    let user = &settings.credentials.user;
    debug!(user = %user, "Performing simple bind");

    let result = tokio::time::timeout(
        settings.timeout,
        ldap.simple_bind(user, &settings.credentials.password),
    )
    .await
    .map_err(|_| timed_out())?
    .map_err(|e| DirectoryError::Connect {
        url: url.clone(),
        message: e.to_string(),
    })?;

    match result.rc {
        0 => Ok(ldap),
        LDAP_INVALID_CREDENTIALS => Err(DirectoryError::Auth { user: user.clone() }),
        code => Err(DirectoryError::Bind {
            code,
            message: result.text,
        }),
    }
}

/// A bound LDAP connection.
pub struct LdapSession {
    runtime: Runtime,
    ldap: Ldap,
    timeout: Duration,
    url: String,
}

impl LdapSession {
    fn search(
        &mut self,
        base_dn: &str,
        filter: &str,
        attrs: &[&str],
    ) -> Result<Vec<SearchEntry>, DirectoryError> {
        debug!(base = %base_dn, filter = %filter, "Searching directory");

        let timeout = self.timeout;
        let ldap = &mut self.ldap;
        let (entries, _) = self
            .runtime
            .block_on(async {
                ldap.with_timeout(timeout)
                    .search(base_dn, Scope::Subtree, filter, attrs.to_vec())
                    .await
                    .and_then(|result| result.success())
            })
            .map_err(|e| DirectoryError::Search {
                filter: filter.to_string(),
                message: e.to_string(),
            })?;

        Ok(entries.into_iter().map(SearchEntry::construct).collect())
    }
}

impl DirectorySession for LdapSession {
    fn enumerate_subgroups(
        &mut self,
        base_dn: &str,
        parent_group_dn: &str,
    ) -> Result<GroupSet, DirectoryError> {
        let filter = subgroups_filter(parent_group_dn);
        let entries = self.search(base_dn, &filter, &["cn"])?;

        let mut groups = GroupSet::new();
        for entry in entries {
            let name = entry
                .attrs
                .get("cn")
                .and_then(|values| values.first())
                .map(String::as_str)
                .or_else(|| leading_rdn_value(&entry.dn))
                .map(str::to_string);
            match name {
                Some(name) => insert_group(&mut groups, name, entry.dn)?,
                None => debug!(dn = %entry.dn, "Skipping group without a name"),
            }
        }

        debug!(parent = %parent_group_dn, count = groups.len(), "Enumerated subgroups");
        Ok(groups)
    }

    fn is_user_in_group(
        &mut self,
        base_dn: &str,
        username: &str,
        group_dn: &str,
    ) -> Result<bool, DirectoryError> {
        let filter = member_in_chain_filter(group_dn, username);
        let entries = self.search(base_dn, &filter, &["uid"])?;
        Ok(!entries.is_empty())
    }

    fn close(mut self) -> Result<(), DirectoryError> {
        debug!(url = %self.url, "Unbinding from directory");
        let ldap = &mut self.ldap;
        self.runtime
            .block_on(ldap.unbind())
            .map_err(|e| DirectoryError::Unbind(e.to_string()))
    }
}

impl std::fmt::Debug for LdapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapSession")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
