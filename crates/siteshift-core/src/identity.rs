//! Owner resolution for the current device.

use tracing::debug;

use crate::error::InventoryError;
use crate::inventory::Inventory;

/// Resolves which user owns a device, as recorded by the inventory.
#[derive(Debug)]
pub struct IdentityResolver<'a, I: ?Sized> {
    inventory: &'a I,
}

impl<'a, I: Inventory + ?Sized> IdentityResolver<'a, I> {
    pub fn new(inventory: &'a I) -> Self {
        Self { inventory }
    }

    /// Live lookup of the owner username; never cached.
    pub fn resolve_owner(&self, serial: &str) -> Result<String, InventoryError> {
        let owner = self.inventory.owner_username(serial)?;
        debug!(serial = %serial, owner = %owner, "Resolved device owner");
        Ok(owner)
    }
}
