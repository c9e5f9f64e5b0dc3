//! Customers, vendors and items.

use serde::{Deserialize, Serialize};

use super::Reference;

/// Postal address attached to a customer or vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PhysicalAddress {
    /// QuickBooks id of the address.
    pub id: String,
    /// First street line.
    #[serde(default)]
    pub line1: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
}

/// A customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Customer {
    /// QuickBooks id.
    pub id: String,
    /// Display name.
    pub display_name: String,
    /// Currency the customer is billed in.
    #[serde(default)]
    pub currency_ref: Option<Reference>,
    /// Billing address.
    #[serde(default)]
    pub bill_addr: Option<PhysicalAddress>,
    /// Shipping address.
    #[serde(default)]
    pub ship_addr: Option<PhysicalAddress>,
}

/// A vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vendor {
    /// QuickBooks id.
    pub id: String,
    /// Display name.
    pub display_name: String,
    /// Billing address.
    #[serde(default)]
    pub bill_addr: Option<PhysicalAddress>,
    /// Shipping address.
    #[serde(default)]
    pub ship_addr: Option<PhysicalAddress>,
}

/// Item classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    /// Service.
    Service,
    /// Tracked inventory.
    Inventory,
    /// Untracked goods.
    NonInventory,
    /// Category used for grouping.
    Category,
    /// Bundle of items.
    Group,
    /// Any other classification.
    #[serde(other)]
    Other,
}

impl ItemType {
    /// Whether items of this type become ERP items.
    #[must_use]
    pub const fn is_migrated(self) -> bool {
        matches!(self, Self::Service | Self::Inventory)
    }
}

/// A product or service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    /// QuickBooks id.
    pub id: String,
    /// Item name.
    pub name: String,
    /// Classification.
    #[serde(rename = "Type")]
    pub item_type: ItemType,
    /// Account income from this item is booked to.
    #[serde(default)]
    pub income_account_ref: Option<Reference>,
    /// Account purchases of this item are booked to.
    #[serde(default)]
    pub expense_account_ref: Option<Reference>,
}
