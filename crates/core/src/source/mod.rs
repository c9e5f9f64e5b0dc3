//! Typed models of QuickBooks Online entities.
//!
//! Records arrive from the query endpoint as raw JSON. [`SourceRecord::parse`]
//! turns one of them into the typed model for its [`EntityKind`]; transaction
//! lines stay close to the wire shape until [`Line::detail`] converts them into
//! a [`LineDetail`] at the transform boundary.

pub mod account;
pub mod kind;
pub mod line;
pub mod party;
pub mod tax;
pub mod transaction;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use account::{Account, AccountType};
pub use kind::{EntityKind, GlEntryKind};
pub use line::{
    AccountBasedExpenseLineDetail, DepositLineDetail, DiscountLineDetail,
    ItemBasedExpenseLineDetail, JournalEntryLineDetail, Line, LineDetail, LinkedTxn, PostingType,
    SHIPPING_ITEM_ID, SalesItemLineDetail,
};
pub use party::{Customer, Item, ItemType, PhysicalAddress, Vendor};
pub use tax::{
    NON_TAXABLE, TaxApplicability, TaxCode, TaxLine, TaxLineDetail, TaxRate, TaxRateDetail,
    TaxRateList, TxnTaxDetail, resolve_tax_code,
};
pub use transaction::{
    BillPayType, BillPayment, CashBack, CheckPayment, CreditCardPayment, Deposit, JournalEntry,
    Payment, Preferences, Purchase, PurchaseTransaction, SalesFormsPrefs, SalesTransaction,
};

/// A pointer to another QuickBooks entity (`{"value": "42", "name": "Rent"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Id of the referenced entity.
    pub value: String,
    /// Display name, when QuickBooks includes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Reference {
    /// Creates a reference without a display name.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            name: None,
        }
    }
}

/// Errors raised while reading QuickBooks payloads.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The payload does not match the entity model.
    #[error("Invalid {entity} payload: {source}")]
    Payload {
        /// Entity being parsed.
        entity: &'static str,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// A line declares a detail type but omits the matching detail object.
    #[error("{entity} line is missing {field}")]
    MissingField {
        /// Entity owning the line.
        entity: &'static str,
        /// Name of the absent field.
        field: &'static str,
    },
}

/// One parsed QuickBooks record, tagged by entity.
#[derive(Debug, Clone)]
pub enum SourceRecord {
    /// Chart of accounts entry.
    Account(Account),
    /// Tax rate.
    TaxRate(TaxRate),
    /// Tax code grouping tax rates.
    TaxCode(TaxCode),
    /// Customer.
    Customer(Customer),
    /// Product or service.
    Item(Item),
    /// Vendor.
    Vendor(Vendor),
    /// Company preferences.
    Preferences(Preferences),
    /// Manual journal entry.
    JournalEntry(JournalEntry),
    /// Expense, check or credit card charge.
    Purchase(Purchase),
    /// Bank deposit.
    Deposit(Deposit),
    /// Sales invoice.
    Invoice(SalesTransaction),
    /// Customer credit memo.
    CreditMemo(SalesTransaction),
    /// Sales receipt.
    SalesReceipt(SalesTransaction),
    /// Refund receipt.
    RefundReceipt(SalesTransaction),
    /// Vendor bill.
    Bill(PurchaseTransaction),
    /// Vendor credit.
    VendorCredit(PurchaseTransaction),
    /// Customer payment.
    Payment(Payment),
    /// Vendor bill payment.
    BillPayment(BillPayment),
}

impl SourceRecord {
    /// Parses a raw query result row as the model for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Payload`] when the JSON does not fit the model.
    pub fn parse(kind: EntityKind, value: serde_json::Value) -> Result<Self, SourceError> {
        fn typed<T: serde::de::DeserializeOwned>(
            kind: EntityKind,
            value: serde_json::Value,
        ) -> Result<T, SourceError> {
            serde_json::from_value(value).map_err(|source| SourceError::Payload {
                entity: kind.api_name(),
                source,
            })
        }

        Ok(match kind {
            EntityKind::Account => Self::Account(typed(kind, value)?),
            EntityKind::TaxRate => Self::TaxRate(typed(kind, value)?),
            EntityKind::TaxCode => Self::TaxCode(typed(kind, value)?),
            EntityKind::Customer => Self::Customer(typed(kind, value)?),
            EntityKind::Item => Self::Item(typed(kind, value)?),
            EntityKind::Vendor => Self::Vendor(typed(kind, value)?),
            EntityKind::Preferences => Self::Preferences(typed(kind, value)?),
            EntityKind::JournalEntry => Self::JournalEntry(typed(kind, value)?),
            EntityKind::Purchase => Self::Purchase(typed(kind, value)?),
            EntityKind::Deposit => Self::Deposit(typed(kind, value)?),
            EntityKind::Invoice => Self::Invoice(typed(kind, value)?),
            EntityKind::CreditMemo => Self::CreditMemo(typed(kind, value)?),
            EntityKind::SalesReceipt => Self::SalesReceipt(typed(kind, value)?),
            EntityKind::RefundReceipt => Self::RefundReceipt(typed(kind, value)?),
            EntityKind::Bill => Self::Bill(typed(kind, value)?),
            EntityKind::VendorCredit => Self::VendorCredit(typed(kind, value)?),
            EntityKind::Payment => Self::Payment(typed(kind, value)?),
            EntityKind::BillPayment => Self::BillPayment(typed(kind, value)?),
        })
    }

    /// Entity this record was parsed as.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Account(_) => EntityKind::Account,
            Self::TaxRate(_) => EntityKind::TaxRate,
            Self::TaxCode(_) => EntityKind::TaxCode,
            Self::Customer(_) => EntityKind::Customer,
            Self::Item(_) => EntityKind::Item,
            Self::Vendor(_) => EntityKind::Vendor,
            Self::Preferences(_) => EntityKind::Preferences,
            Self::JournalEntry(_) => EntityKind::JournalEntry,
            Self::Purchase(_) => EntityKind::Purchase,
            Self::Deposit(_) => EntityKind::Deposit,
            Self::Invoice(_) => EntityKind::Invoice,
            Self::CreditMemo(_) => EntityKind::CreditMemo,
            Self::SalesReceipt(_) => EntityKind::SalesReceipt,
            Self::RefundReceipt(_) => EntityKind::RefundReceipt,
            Self::Bill(_) => EntityKind::Bill,
            Self::VendorCredit(_) => EntityKind::VendorCredit,
            Self::Payment(_) => EntityKind::Payment,
            Self::BillPayment(_) => EntityKind::BillPayment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_dispatches_on_kind() {
        let record = SourceRecord::parse(
            EntityKind::CreditMemo,
            json!({
                "Id": "7",
                "TxnDate": "2019-03-01",
                "CustomerRef": {"value": "3", "name": "Amy's Bird Sanctuary"},
                "Line": []
            }),
        )
        .unwrap();

        assert_eq!(record.kind(), EntityKind::CreditMemo);
        let SourceRecord::CreditMemo(memo) = record else {
            panic!("expected credit memo");
        };
        assert_eq!(memo.id, "7");
        assert_eq!(memo.customer_ref.value, "3");
    }

    #[test]
    fn test_parse_reports_entity_on_error() {
        let err = SourceRecord::parse(EntityKind::Vendor, json!({"Id": 5})).unwrap_err();
        assert!(err.to_string().starts_with("Invalid Vendor payload"));
    }
}
