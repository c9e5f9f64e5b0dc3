//! ERP documents produced by the migration.
//!
//! Every document carries the `quickbooks_id` it was created from (possibly
//! type prefixed, e.g. `Bill - 123`) and the company it belongs to. Stores
//! refuse a second document with the same `(doctype, quickbooks_id, company)`.

pub mod memory;
pub mod store;
mod types;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::{LedgerValidationError, validate_postings};

pub use memory::MemoryStore;
pub use store::{DocumentStore, StoreError, StoredDocument};
pub use types::{
    AccountDoc, AccountKind, AddressDoc, AddressType, ChargeType, CustomerDoc, DiscountBasis,
    DynamicLink, InvoiceItem, ItemDoc, JournalEntryDoc, JournalLine, PartyType, PosPayment,
    PurchaseInvoiceDoc, RootType, SalesInvoiceDoc, SupplierDoc, TaxRow,
};

/// Kind of ERP document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocType {
    /// Ledger account.
    Account,
    /// Customer.
    Customer,
    /// Supplier.
    Supplier,
    /// Postal address.
    Address,
    /// Item.
    Item,
    /// Sales invoice.
    #[serde(rename = "Sales Invoice")]
    SalesInvoice,
    /// Purchase invoice.
    #[serde(rename = "Purchase Invoice")]
    PurchaseInvoice,
    /// Journal entry.
    #[serde(rename = "Journal Entry")]
    JournalEntry,
}

impl DocType {
    /// Every document type.
    pub const ALL: [Self; 8] = [
        Self::Account,
        Self::Customer,
        Self::Supplier,
        Self::Address,
        Self::Item,
        Self::SalesInvoice,
        Self::PurchaseInvoice,
        Self::JournalEntry,
    ];

    /// Display name, also the persisted discriminator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::Customer => "Customer",
            Self::Supplier => "Supplier",
            Self::Address => "Address",
            Self::Item => "Item",
            Self::SalesInvoice => "Sales Invoice",
            Self::PurchaseInvoice => "Purchase Invoice",
            Self::JournalEntry => "Journal Entry",
        }
    }

    /// Naming series for documents whose name the store assigns.
    #[must_use]
    pub const fn naming_series(self) -> Option<&'static str> {
        match self {
            Self::SalesInvoice => Some("SINV"),
            Self::PurchaseInvoice => Some("PINV"),
            Self::JournalEntry => Some("JV"),
            Self::Account | Self::Customer | Self::Supplier | Self::Address | Self::Item => None,
        }
    }

    /// Parses the persisted discriminator.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|doctype| doctype.as_str() == value)
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// Journal entry postings are invalid.
    #[error(transparent)]
    Ledger(#[from] LedgerValidationError),

    /// Invoice without items.
    #[error("{0} must have at least one item")]
    NoItems(DocType),

    /// Leaf account without a parent.
    #[error("Account {0} has no parent account")]
    Orphan(String),

    /// Tax row computed on a row that does not precede it.
    #[error("Tax row {row} must reference an earlier row")]
    InvalidTaxRow {
        /// 1-based row number.
        row: usize,
    },
}

impl DocumentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(err) => err.error_code(),
            Self::NoItems(_) => "NO_ITEMS",
            Self::Orphan(_) => "ORPHAN_ACCOUNT",
            Self::InvalidTaxRow { .. } => "INVALID_TAX_ROW",
        }
    }
}

/// A document ready to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "doctype")]
pub enum Document {
    /// Ledger account.
    Account(AccountDoc),
    /// Customer.
    Customer(CustomerDoc),
    /// Supplier.
    Supplier(SupplierDoc),
    /// Postal address.
    Address(AddressDoc),
    /// Item.
    Item(ItemDoc),
    /// Sales invoice.
    #[serde(rename = "Sales Invoice")]
    SalesInvoice(SalesInvoiceDoc),
    /// Purchase invoice.
    #[serde(rename = "Purchase Invoice")]
    PurchaseInvoice(PurchaseInvoiceDoc),
    /// Journal entry.
    #[serde(rename = "Journal Entry")]
    JournalEntry(JournalEntryDoc),
}

impl Document {
    /// Document type.
    #[must_use]
    pub const fn doctype(&self) -> DocType {
        match self {
            Self::Account(_) => DocType::Account,
            Self::Customer(_) => DocType::Customer,
            Self::Supplier(_) => DocType::Supplier,
            Self::Address(_) => DocType::Address,
            Self::Item(_) => DocType::Item,
            Self::SalesInvoice(_) => DocType::SalesInvoice,
            Self::PurchaseInvoice(_) => DocType::PurchaseInvoice,
            Self::JournalEntry(_) => DocType::JournalEntry,
        }
    }

    /// Name chosen by the transformer. Transactions are named by the store
    /// from their naming series and return `None`.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Account(doc) => Some(&doc.name),
            Self::Customer(doc) => Some(&doc.name),
            Self::Supplier(doc) => Some(&doc.name),
            Self::Address(doc) => Some(&doc.name),
            Self::Item(doc) => Some(&doc.name),
            Self::SalesInvoice(_) | Self::PurchaseInvoice(_) | Self::JournalEntry(_) => None,
        }
    }

    /// Idempotency key. Root accounts have none.
    #[must_use]
    pub fn quickbooks_id(&self) -> Option<&str> {
        match self {
            Self::Account(doc) => doc.quickbooks_id.as_deref(),
            Self::Customer(doc) => Some(&doc.quickbooks_id),
            Self::Supplier(doc) => Some(&doc.quickbooks_id),
            Self::Address(doc) => Some(&doc.quickbooks_id),
            Self::Item(doc) => Some(&doc.quickbooks_id),
            Self::SalesInvoice(doc) => Some(&doc.quickbooks_id),
            Self::PurchaseInvoice(doc) => Some(&doc.quickbooks_id),
            Self::JournalEntry(doc) => Some(&doc.quickbooks_id),
        }
    }

    /// Owning company.
    #[must_use]
    pub fn company(&self) -> &str {
        match self {
            Self::Account(doc) => &doc.company,
            Self::Customer(doc) => &doc.company,
            Self::Supplier(doc) => &doc.company,
            Self::Address(doc) => &doc.company,
            Self::Item(doc) => &doc.company,
            Self::SalesInvoice(doc) => &doc.company,
            Self::PurchaseInvoice(doc) => &doc.company,
            Self::JournalEntry(doc) => &doc.company,
        }
    }

    /// Checks the document's own rules. Stores call this before inserting.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] describing the first broken rule.
    pub fn validate(&self) -> Result<(), DocumentError> {
        match self {
            Self::JournalEntry(doc) => validate_postings(&doc.accounts)?,
            Self::SalesInvoice(doc) => {
                if doc.items.is_empty() {
                    return Err(DocumentError::NoItems(DocType::SalesInvoice));
                }
                validate_tax_rows(&doc.taxes)?;
            }
            Self::PurchaseInvoice(doc) => {
                if doc.items.is_empty() {
                    return Err(DocumentError::NoItems(DocType::PurchaseInvoice));
                }
                validate_tax_rows(&doc.taxes)?;
            }
            Self::Account(doc) if !doc.is_group && doc.parent_account.is_none() => {
                return Err(DocumentError::Orphan(doc.name.clone()));
            }
            _ => {}
        }
        Ok(())
    }
}

fn validate_tax_rows(taxes: &[TaxRow]) -> Result<(), DocumentError> {
    for (index, tax) in taxes.iter().enumerate() {
        let row = index + 1;
        if tax.charge_type == ChargeType::OnPreviousRowAmount
            && !tax.row_id.is_some_and(|parent| parent >= 1 && parent < row)
        {
            return Err(DocumentError::InvalidTaxRow { row });
        }
    }
    Ok(())
}

/// Appends the company abbreviation, the way the ERP keeps names unique
/// across companies.
#[must_use]
pub fn encode_company_abbr(name: &str, abbr: &str) -> String {
    let suffix = format!(" - {abbr}");
    if name.ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}
