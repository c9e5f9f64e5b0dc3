//! Persistence seam for documents and fiscal years.

use async_trait::async_trait;
use thiserror::Error;

use super::{DocType, Document, DocumentError};
use crate::fiscal::{FiscalError, FiscalYear};

/// Errors returned by document stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A document with the same key or name already exists.
    #[error("{doctype} {key} already exists")]
    Duplicate {
        /// Document type.
        doctype: DocType,
        /// Conflicting key or name.
        key: String,
    },

    /// The document broke one of its own rules.
    #[error("{doctype} rejected: {source}")]
    Rejected {
        /// Document type.
        doctype: DocType,
        /// Broken rule.
        #[source]
        source: DocumentError,
    },

    /// The fiscal year overlaps or is malformed.
    #[error(transparent)]
    Fiscal(#[from] FiscalError),

    /// Storage backend failure.
    #[error("Storage error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Duplicate { .. } => "DUPLICATE_DOCUMENT",
            Self::Rejected { source, .. } => source.error_code(),
            Self::Fiscal(err) => err.error_code(),
            Self::Backend(_) => "STORAGE_ERROR",
        }
    }
}

/// A persisted document and the name it was stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Unique name within the doctype.
    pub name: String,
    /// Payload.
    pub document: Document,
}

/// Document persistence.
///
/// Implementations validate every document on insert and enforce uniqueness
/// of `(doctype, quickbooks_id, company)` and of `(doctype, name)`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Whether a document with this key exists.
    async fn exists(
        &self,
        doctype: DocType,
        quickbooks_id: &str,
        company: &str,
    ) -> Result<bool, StoreError> {
        Ok(self.find(doctype, quickbooks_id, company).await?.is_some())
    }

    /// Finds a document by key.
    async fn find(
        &self,
        doctype: DocType,
        quickbooks_id: &str,
        company: &str,
    ) -> Result<Option<StoredDocument>, StoreError>;

    /// Finds a document by name.
    async fn find_by_name(
        &self,
        doctype: DocType,
        name: &str,
    ) -> Result<Option<StoredDocument>, StoreError>;

    /// All documents of a type for a company, in insertion order.
    async fn list(&self, doctype: DocType, company: &str)
    -> Result<Vec<StoredDocument>, StoreError>;

    /// Validates and inserts a document, returning its name.
    async fn insert(&self, document: Document) -> Result<String, StoreError>;

    /// Fiscal years ordered by start date.
    async fn fiscal_years(&self) -> Result<Vec<FiscalYear>, StoreError>;

    /// Inserts a fiscal year that overlaps no existing one.
    async fn insert_fiscal_year(&self, year: FiscalYear) -> Result<(), StoreError>;
}
