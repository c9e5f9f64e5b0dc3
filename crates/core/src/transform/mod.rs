//! Turns QuickBooks records into target documents.
//!
//! Every transformer checks the record's key against the store before doing
//! anything else, so a second run over the same data creates nothing. Cross
//! references are resolved through the store by QuickBooks id; a reference
//! that has not been imported fails the record with
//! [`TransformError::MissingReference`] before any document is written.

pub mod accounts;
pub mod item;
pub mod journal;
pub mod party;
pub mod preferences;
pub mod purchase;
pub mod sales;
pub mod tax;

#[cfg(test)]
mod fixtures;

use thiserror::Error;

use crate::document::{DocType, Document, DocumentStore, StoreError, StoredDocument};
use crate::ledger::{GeneralLedger, LedgerEntry, SynthError, synthesize_journal_entry};
use crate::migration::ConnectorDefaults;
use crate::settings::CompanySettings;
use crate::source::{GlEntryKind, SourceError, SourceRecord};

pub use accounts::{AccountChart, make_root_account, save_account, unique_account_name};
pub use tax::TaxTables;

/// Errors raised while transforming one record.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The record payload is malformed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A referenced record has not been imported.
    #[error("{doctype} for QuickBooks id {quickbooks_id} has not been imported")]
    MissingReference {
        /// Expected document type.
        doctype: DocType,
        /// Key looked up.
        quickbooks_id: String,
    },

    /// A field needed to build the document is absent.
    #[error("{entity} has no {field}")]
    MissingField {
        /// Record or document kind.
        entity: &'static str,
        /// Absent field.
        field: &'static str,
    },

    /// The General Ledger has no entry for the transaction.
    #[error("General Ledger has no {txn_type} entry {id}")]
    MissingLedgerEntry {
        /// Ledger transaction type.
        txn_type: String,
        /// Transaction id.
        id: String,
    },

    /// A line names a tax code that was not fetched.
    #[error("Unknown tax code {0}")]
    UnknownTaxCode(String),

    /// A tax code names a tax rate that was not fetched.
    #[error("Unknown tax rate {0}")]
    UnknownTaxRate(String),

    /// A connector default has not been discovered yet.
    #[error("No {0} configured")]
    MissingDefault(&'static str),

    /// Journal synthesis failed.
    #[error(transparent)]
    Synth(#[from] SynthError),

    /// The store refused the document.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TransformError {
    /// Returns the error code for logs and API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Source(_) => "INVALID_PAYLOAD",
            Self::MissingReference { .. } => "MISSING_REFERENCE",
            Self::MissingField { .. } => "MISSING_FIELD",
            Self::MissingLedgerEntry { .. } => "MISSING_LEDGER_ENTRY",
            Self::UnknownTaxCode(_) => "UNKNOWN_TAX_CODE",
            Self::UnknownTaxRate(_) => "UNKNOWN_TAX_RATE",
            Self::MissingDefault(_) => "MISSING_DEFAULT",
            Self::Synth(_) => "MISSING_POSTING_DATE",
            Self::Store(err) => err.error_code(),
        }
    }
}

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Documents were created, in creation order.
    Created(Vec<String>),
    /// The record's key was already present.
    AlreadyImported,
    /// The record is intentionally not migrated.
    Skipped(&'static str),
}

impl Outcome {
    /// Outcome for a single created document.
    #[must_use]
    pub fn created(name: String) -> Self {
        Self::Created(vec![name])
    }

    /// Number of documents created.
    #[must_use]
    pub fn created_count(&self) -> usize {
        match self {
            Self::Created(names) => names.len(),
            Self::AlreadyImported | Self::Skipped(_) => 0,
        }
    }
}

/// Everything a transformer needs besides the record itself.
#[derive(Clone, Copy)]
pub struct TransformContext<'a> {
    /// Target document store.
    pub store: &'a dyn DocumentStore,
    /// Target company settings.
    pub settings: &'a CompanySettings,
    /// Accounts discovered earlier in the run.
    pub defaults: &'a ConnectorDefaults,
    /// Group membership of the source chart of accounts.
    pub chart: &'a AccountChart,
    /// Fetched tax rates and codes.
    pub tax: &'a TaxTables,
    /// Reconstructed General Ledger.
    pub ledger: &'a GeneralLedger,
}

impl TransformContext<'_> {
    /// Target company name.
    #[must_use]
    pub fn company(&self) -> &str {
        &self.settings.company
    }

    /// Whether a document with this key exists for the company.
    pub async fn exists(&self, doctype: DocType, key: &str) -> Result<bool, TransformError> {
        Ok(self.store.exists(doctype, key, self.company()).await?)
    }

    /// Finds an imported document, failing with
    /// [`TransformError::MissingReference`] when absent.
    pub async fn lookup(
        &self,
        doctype: DocType,
        key: &str,
    ) -> Result<StoredDocument, TransformError> {
        self.store
            .find(doctype, key, self.company())
            .await?
            .ok_or_else(|| TransformError::MissingReference {
                doctype,
                quickbooks_id: key.to_string(),
            })
    }

    /// Target name of the account imported under `key`.
    pub async fn account_name(&self, key: &str) -> Result<String, TransformError> {
        Ok(self.lookup(DocType::Account, key).await?.name)
    }

    /// Validates and stores a document.
    pub async fn insert(&self, document: Document) -> Result<String, TransformError> {
        Ok(self.store.insert(document).await?)
    }
}

impl std::fmt::Debug for TransformContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformContext")
            .field("company", &self.settings.company)
            .field("defaults", self.defaults)
            .finish_non_exhaustive()
    }
}

/// Transforms one QuickBooks record.
///
/// Tax codes and preferences produce no documents: tax codes feed
/// [`TaxTables`] and preferences feed [`ConnectorDefaults`], both handled by
/// the runner before dispatch.
pub async fn save_record(
    ctx: &TransformContext<'_>,
    record: &SourceRecord,
) -> Result<Outcome, TransformError> {
    match record {
        SourceRecord::Account(account) => accounts::save_account(ctx, account).await,
        SourceRecord::TaxRate(rate) => tax::save_tax_rate(ctx, rate).await,
        SourceRecord::TaxCode(_) => Ok(Outcome::Skipped("tax codes are lookup data")),
        SourceRecord::Customer(customer) => party::save_customer(ctx, customer).await,
        SourceRecord::Item(item) => item::save_item(ctx, item).await,
        SourceRecord::Vendor(vendor) => party::save_vendor(ctx, vendor).await,
        SourceRecord::Preferences(_) => Ok(Outcome::Skipped("preferences are settings")),
        SourceRecord::JournalEntry(entry) => journal::save_journal_entry(ctx, entry).await,
        SourceRecord::Purchase(purchase) => journal::save_purchase(ctx, purchase).await,
        SourceRecord::Deposit(deposit) => journal::save_deposit(ctx, deposit).await,
        SourceRecord::Invoice(invoice) => sales::save_invoice(ctx, invoice).await,
        SourceRecord::CreditMemo(memo) => {
            sales::save_sales_invoice(ctx, memo, sales::SalesFlavor::CreditMemo).await
        }
        SourceRecord::SalesReceipt(receipt) => {
            sales::save_sales_invoice(ctx, receipt, sales::SalesFlavor::SalesReceipt).await
        }
        SourceRecord::RefundReceipt(receipt) => {
            sales::save_sales_invoice(ctx, receipt, sales::SalesFlavor::RefundReceipt).await
        }
        SourceRecord::Bill(bill) => {
            purchase::save_purchase_invoice(ctx, bill, purchase::PurchaseFlavor::Bill).await
        }
        SourceRecord::VendorCredit(credit) => {
            purchase::save_purchase_invoice(ctx, credit, purchase::PurchaseFlavor::VendorCredit)
                .await
        }
        SourceRecord::Payment(payment) => journal::save_payment(ctx, payment).await,
        SourceRecord::BillPayment(payment) => journal::save_bill_payment(ctx, payment).await,
    }
}

/// Saves a transaction only the General Ledger knows about.
pub async fn save_gl_entry(
    ctx: &TransformContext<'_>,
    kind: GlEntryKind,
    entry: &LedgerEntry,
) -> Result<Outcome, TransformError> {
    let key = kind.key(&entry.id);
    if ctx.exists(DocType::JournalEntry, &key).await? {
        return Ok(Outcome::AlreadyImported);
    }
    let journal = synthesize_journal_entry(kind, entry, ctx.settings)?;
    let name = ctx.insert(Document::JournalEntry(journal)).await?;
    Ok(Outcome::created(name))
}
