//! Closed sets of QuickBooks entity and GL-only transaction types.

use std::fmt;

/// QuickBooks entities read through the query endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Chart of accounts.
    Account,
    /// Tax rates.
    TaxRate,
    /// Tax codes.
    TaxCode,
    /// Customers.
    Customer,
    /// Products and services.
    Item,
    /// Vendors.
    Vendor,
    /// Company preferences.
    Preferences,
    /// Manual journal entries.
    JournalEntry,
    /// Expenses, checks and credit card charges.
    Purchase,
    /// Bank deposits.
    Deposit,
    /// Sales invoices.
    Invoice,
    /// Credit memos.
    CreditMemo,
    /// Sales receipts.
    SalesReceipt,
    /// Refund receipts.
    RefundReceipt,
    /// Vendor bills.
    Bill,
    /// Vendor credits.
    VendorCredit,
    /// Customer payments.
    Payment,
    /// Bill payments.
    BillPayment,
}

impl EntityKind {
    /// Migration order: referenced entities come before the documents that
    /// point at them.
    pub const ALL: [Self; 18] = [
        Self::Account,
        Self::TaxRate,
        Self::TaxCode,
        Self::Customer,
        Self::Item,
        Self::Vendor,
        Self::Preferences,
        Self::JournalEntry,
        Self::Purchase,
        Self::Deposit,
        Self::Invoice,
        Self::CreditMemo,
        Self::SalesReceipt,
        Self::RefundReceipt,
        Self::Bill,
        Self::VendorCredit,
        Self::Payment,
        Self::BillPayment,
    ];

    /// Name used in query statements and as the `QueryResponse` key.
    #[must_use]
    pub const fn api_name(self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::TaxRate => "TaxRate",
            Self::TaxCode => "TaxCode",
            Self::Customer => "Customer",
            Self::Item => "Item",
            Self::Vendor => "Vendor",
            Self::Preferences => "Preferences",
            Self::JournalEntry => "JournalEntry",
            Self::Purchase => "Purchase",
            Self::Deposit => "Deposit",
            Self::Invoice => "Invoice",
            Self::CreditMemo => "CreditMemo",
            Self::SalesReceipt => "SalesReceipt",
            Self::RefundReceipt => "RefundReceipt",
            Self::Bill => "Bill",
            Self::VendorCredit => "VendorCredit",
            Self::Payment => "Payment",
            Self::BillPayment => "BillPayment",
        }
    }

    /// Human readable plural used in progress messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Account => "Accounts",
            Self::TaxRate => "Tax Rates",
            Self::TaxCode => "Tax Codes",
            Self::Customer => "Customers",
            Self::Item => "Items",
            Self::Vendor => "Vendors",
            Self::Preferences => "Preferences",
            Self::JournalEntry => "Journal Entries",
            Self::Purchase => "Purchases",
            Self::Deposit => "Deposits",
            Self::Invoice => "Invoices",
            Self::CreditMemo => "Credit Memos",
            Self::SalesReceipt => "Sales Receipts",
            Self::RefundReceipt => "Refund Receipts",
            Self::Bill => "Bills",
            Self::VendorCredit => "Vendor Credits",
            Self::Payment => "Payments",
            Self::BillPayment => "Bill Payments",
        }
    }

    /// Prefix of the idempotency key of transactional documents.
    ///
    /// Master data (accounts, parties, items) is keyed by the bare id and
    /// returns `None`.
    #[must_use]
    pub const fn key_prefix(self) -> Option<&'static str> {
        match self {
            Self::Invoice => Some("Invoice"),
            Self::CreditMemo => Some("Credit Memo"),
            Self::SalesReceipt => Some("Sales Receipt"),
            Self::RefundReceipt => Some("Refund Receipt"),
            Self::JournalEntry => Some("Journal Entry"),
            Self::Bill => Some("Bill"),
            Self::VendorCredit => Some("Vendor Credit"),
            Self::Payment => Some("Payment"),
            Self::BillPayment => Some("BillPayment"),
            Self::Purchase => Some("Purchase"),
            Self::Deposit => Some("Deposit"),
            Self::TaxRate => Some("TaxRate"),
            Self::Account
            | Self::TaxCode
            | Self::Customer
            | Self::Item
            | Self::Vendor
            | Self::Preferences => None,
        }
    }

    /// Idempotency key of the document created from record `id`.
    #[must_use]
    pub fn key(self, id: &str) -> String {
        match self.key_prefix() {
            Some(prefix) => format!("{prefix} - {id}"),
            None => id.to_string(),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

/// Transaction types that only exist in the General Ledger report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlEntryKind {
    /// Customer prepayments.
    AdvancePayment,
    /// Generic tax payment.
    TaxPayment,
    /// Sales tax payment.
    SalesTaxPayment,
    /// Purchase tax payment.
    PurchaseTaxPayment,
    /// Inventory quantity adjustment.
    InventoryQtyAdjust,
}

impl GlEntryKind {
    /// Every GL-only type, in synthesis order.
    pub const ALL: [Self; 5] = [
        Self::AdvancePayment,
        Self::TaxPayment,
        Self::SalesTaxPayment,
        Self::PurchaseTaxPayment,
        Self::InventoryQtyAdjust,
    ];

    /// Transaction type text as it appears in the report's type column.
    #[must_use]
    pub const fn report_name(self) -> &'static str {
        match self {
            Self::AdvancePayment => "Advance Payment",
            Self::TaxPayment => "Tax Payment",
            Self::SalesTaxPayment => "Sales Tax Payment",
            Self::PurchaseTaxPayment => "Purchase Tax Payment",
            Self::InventoryQtyAdjust => "Inventory Qty Adjust",
        }
    }

    /// Prefix of the idempotency key. All tax payment variants share one.
    #[must_use]
    pub const fn key_prefix(self) -> &'static str {
        match self {
            Self::AdvancePayment => "Advance Payment",
            Self::TaxPayment | Self::SalesTaxPayment | Self::PurchaseTaxPayment => "Tax Payment",
            Self::InventoryQtyAdjust => "Inventory Qty Adjust",
        }
    }

    /// Idempotency key of the journal entry synthesized for `id`.
    #[must_use]
    pub fn key(self, id: &str) -> String {
        format!("{} - {id}", self.key_prefix())
    }
}

impl fmt::Display for GlEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.report_name())
    }
}
