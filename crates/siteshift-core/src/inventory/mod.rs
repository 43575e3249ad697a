//! Device inventory access.

pub mod jamf;
pub mod xml;

use crate::error::InventoryError;
use crate::types::{DeviceIdentity, Site};

pub use jamf::JamfClient;

/// Lookups and updates against the device inventory, keyed by serial
/// number and site name.
pub trait Inventory {
    /// The device record for `serial`.
    fn device_by_serial(&self, serial: &str) -> Result<DeviceIdentity, InventoryError>;

    /// The username recorded as the device's owner.
    ///
    /// Fails with [`InventoryError::MissingField`] when the record has no
    /// owner. That means the device was never enrolled properly; callers
    /// must not retry.
    fn owner_username(&self, serial: &str) -> Result<String, InventoryError>;

    /// The site whose name is exactly `name`.
    fn site_by_name(&self, name: &str) -> Result<Site, InventoryError>;

    /// Assign the device to `site`. Issued verbatim on every call.
    fn update_device_site(&self, device_id: &str, site: &Site) -> Result<(), InventoryError>;
}

impl<T: Inventory + ?Sized> Inventory for &T {
    fn device_by_serial(&self, serial: &str) -> Result<DeviceIdentity, InventoryError> {
        (**self).device_by_serial(serial)
    }

    fn owner_username(&self, serial: &str) -> Result<String, InventoryError> {
        (**self).owner_username(serial)
    }

    fn site_by_name(&self, name: &str) -> Result<Site, InventoryError> {
        (**self).site_by_name(name)
    }

    fn update_device_site(&self, device_id: &str, site: &Site) -> Result<(), InventoryError> {
        (**self).update_device_site(device_id, site)
    }
}
