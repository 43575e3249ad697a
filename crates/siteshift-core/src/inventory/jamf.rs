//! Inventory client for the Jamf Pro Classic API (`/JSSResource`).
//!
//! Requests are async reqwest calls driven to completion on a runtime
//! owned by the client, so callers stay synchronous.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tokio::runtime::Runtime;
use tracing::{debug, info};
use url::Url;

use super::Inventory;
use super::xml::{parse_device, parse_owner, parse_site, site_update_document};
use crate::config::{Credentials, InventorySettings};
use crate::error::InventoryError;
use crate::types::{DeviceIdentity, Site};

const XML: &str = "application/xml";

/// HTTP client for device and site records.
pub struct JamfClient {
    base_url: Url,
    credentials: Credentials,
    client: reqwest::Client,
    runtime: Runtime,
}

impl JamfClient {
    pub fn new(settings: &InventorySettings) -> Result<Self, InventoryError> {
        let base_url = parse_base_url(&settings.base_url)?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("siteshift/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let runtime = Runtime::new().map_err(InventoryError::Runtime)?;

        Ok(Self {
            base_url,
            credentials: settings.credentials.clone(),
            client,
            runtime,
        })
    }

    /// `<base>/JSSResource/<segments...>`, each segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, InventoryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| InventoryError::InvalidUrl {
                url: self.base_url.to_string(),
                message: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .push("JSSResource")
            .extend(segments);
        Ok(url)
    }

    fn get_xml(&self, resource: &'static str, key: &str, url: Url) -> Result<String, InventoryError> {
        debug!(method = "GET", url = %url, "Inventory request");

        let (status, body) = self.runtime.block_on(async {
            let response = self
                .client
                .get(url)
                .basic_auth(&self.credentials.user, Some(&self.credentials.password))
                .header(ACCEPT, XML)
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        })?;

        debug!(status = status.as_u16(), "Inventory response");

        if status == StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound {
                resource,
                key: key.to_string(),
            });
        }
        if !status.is_success() {
            return Err(InventoryError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn computer_xml(&self, serial: &str) -> Result<String, InventoryError> {
        let url = self.endpoint(&["computers", "serialnumber", serial])?;
        self.get_xml("computer with serial number", serial, url)
    }
}

impl Inventory for JamfClient {
    fn device_by_serial(&self, serial: &str) -> Result<DeviceIdentity, InventoryError> {
        let xml = self.computer_xml(serial)?;
        parse_device(serial, &xml)
    }

    fn owner_username(&self, serial: &str) -> Result<String, InventoryError> {
        let xml = self.computer_xml(serial)?;
        parse_owner(serial, &xml)
    }

    fn site_by_name(&self, name: &str) -> Result<Site, InventoryError> {
        let url = self.endpoint(&["sites", "name", name])?;
        let xml = self.get_xml("site", name, url)?;
        let site = parse_site(name, &xml)?;
        if site.name != name {
            debug!(requested = %name, returned = %site.name, "Site name differs from request");
            return Err(InventoryError::NotFound {
                resource: "site",
                key: name.to_string(),
            });
        }
        Ok(site)
    }

    fn update_device_site(&self, device_id: &str, site: &Site) -> Result<(), InventoryError> {
        let url = self.endpoint(&["computers", "id", device_id])?;
        let document = site_update_document(site);

        debug!(method = "PUT", url = %url, site = %site.name, "Inventory request");

        let (status, body) = self.runtime.block_on(async {
            let response = self
                .client
                .put(url)
                .basic_auth(&self.credentials.user, Some(&self.credentials.password))
                .header(CONTENT_TYPE, XML)
                .header(ACCEPT, XML)
                .body(document)
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        })?;

        if !status.is_success() {
            return Err(InventoryError::Api {
                status: status.as_u16(),
                body,
            });
        }
        if status != StatusCode::CREATED {
            debug!(status = status.as_u16(), "Update accepted with unexpected success status");
        }

        info!(device_id = %device_id, site = %site.name, "Device site updated");
        Ok(())
    }
}

fn parse_base_url(raw: &str) -> Result<Url, InventoryError> {
    let invalid = |message: String| InventoryError::InvalidUrl {
        url: raw.to_string(),
        message,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_string()));
    }
    Ok(url)
}

impl std::fmt::Debug for JamfClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JamfClient")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> JamfClient {
        JamfClient::new(&InventorySettings {
            base_url: base_url.to_string(),
            credentials: Credentials::new("api", "secret"),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_for_serial() {
        let url = client("https://jss.example.org:8443")
            .endpoint(&["computers", "serialnumber", "C02XK1ABJGH5"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://jss.example.org:8443/JSSResource/computers/serialnumber/C02XK1ABJGH5"
        );
    }

    #[test]
    fn test_endpoint_encodes_site_name() {
        let url = client("https://jss.example.org/")
            .endpoint(&["sites", "name", "IT Services/Lab"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://jss.example.org/JSSResource/sites/name/IT%20Services%2FLab"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = client("https://example.org/jamf/")
            .endpoint(&["computers", "id", "412"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.org/jamf/JSSResource/computers/id/412"
        );
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let settings = |url: &str| InventorySettings {
            base_url: url.to_string(),
            credentials: Credentials::new("api", "secret"),
        };
        assert!(matches!(
            JamfClient::new(&settings("jss.example.org")),
            Err(InventoryError::InvalidUrl { .. })
        ));
        assert!(matches!(
            JamfClient::new(&settings("ftp://jss.example.org")),
            Err(InventoryError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_debug_hides_password() {
        let debug = format!("{:?}", client("https://jss.example.org"));
        assert!(!debug.contains("secret"));
    }
}
