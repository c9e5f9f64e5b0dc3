//! In-memory document store for tests and dry runs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::store::{DocumentStore, StoreError, StoredDocument};
use super::{DocType, Document};
use crate::fiscal::FiscalYear;

#[derive(Debug, Default)]
struct Inner {
    documents: Vec<StoredDocument>,
    sequences: HashMap<DocType, u64>,
    fiscal_years: Vec<FiscalYear>,
}

/// Document store keeping everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with fiscal years.
    #[must_use]
    pub fn with_fiscal_years(years: Vec<FiscalYear>) -> Self {
        let store = Self::default();
        if let Ok(mut inner) = store.inner.lock() {
            inner.fiscal_years = years;
            inner.fiscal_years.sort_by_key(|year| year.start_date);
        }
        store
    }

    /// Number of stored documents of a type.
    pub fn count(&self, doctype: DocType) -> usize {
        self.lock().map_or(0, |inner| {
            inner
                .documents
                .iter()
                .filter(|stored| stored.document.doctype() == doctype)
                .count()
        })
    }

    /// Total number of stored documents.
    pub fn len(&self) -> usize {
        self.lock().map_or(0, |inner| inner.documents.len())
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

fn matches_key(stored: &StoredDocument, doctype: DocType, quickbooks_id: &str, company: &str) -> bool {
    let document = &stored.document;
    document.doctype() == doctype
        && document.quickbooks_id() == Some(quickbooks_id)
        && document.company() == company
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        doctype: DocType,
        quickbooks_id: &str,
        company: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .documents
            .iter()
            .find(|stored| matches_key(stored, doctype, quickbooks_id, company))
            .cloned())
    }

    async fn find_by_name(
        &self,
        doctype: DocType,
        name: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .documents
            .iter()
            .find(|stored| stored.document.doctype() == doctype && stored.name == name)
            .cloned())
    }

    async fn list(
        &self,
        doctype: DocType,
        company: &str,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .documents
            .iter()
            .filter(|stored| {
                stored.document.doctype() == doctype && stored.document.company() == company
            })
            .cloned()
            .collect())
    }

    async fn insert(&self, document: Document) -> Result<String, StoreError> {
        let doctype = document.doctype();
        document
            .validate()
            .map_err(|source| StoreError::Rejected { doctype, source })?;

        let mut inner = self.lock()?;

        if let Some(key) = document.quickbooks_id()
            && inner
                .documents
                .iter()
                .any(|stored| matches_key(stored, doctype, key, document.company()))
        {
            return Err(StoreError::Duplicate {
                doctype,
                key: key.to_string(),
            });
        }

        let name = match (document.name(), doctype.naming_series()) {
            (Some(name), _) => name.to_string(),
            (None, Some(series)) => {
                let sequence = inner.sequences.entry(doctype).or_insert(0);
                *sequence += 1;
                format!("{series}-{sequence:05}")
            }
            (None, None) => {
                return Err(StoreError::Backend(format!("{doctype} has no name")));
            }
        };

        if inner
            .documents
            .iter()
            .any(|stored| stored.document.doctype() == doctype && stored.name == name)
        {
            return Err(StoreError::Duplicate { doctype, key: name });
        }

        inner.documents.push(StoredDocument {
            name: name.clone(),
            document,
        });
        Ok(name)
    }

    async fn fiscal_years(&self) -> Result<Vec<FiscalYear>, StoreError> {
        Ok(self.lock()?.fiscal_years.clone())
    }

    async fn insert_fiscal_year(&self, year: FiscalYear) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if let Some(existing) = inner.fiscal_years.iter().find(|other| other.overlaps(&year)) {
            return Err(crate::fiscal::FiscalError::OverlappingYear(existing.year.clone()).into());
        }
        inner.fiscal_years.push(year);
        inner.fiscal_years.sort_by_key(|year| year.start_date);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{CustomerDoc, JournalEntryDoc, JournalLine};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn customer(id: &str, name: &str) -> Document {
        Document::Customer(CustomerDoc {
            name: name.into(),
            quickbooks_id: id.into(),
            customer_type: "Individual".into(),
            customer_group: "Commercial".into(),
            territory: "All Territories".into(),
            default_currency: Some("USD".into()),
            receivable_account: None,
            company: "Acme Ltd".into(),
        })
    }

    fn journal(key: &str) -> Document {
        Document::JournalEntry(JournalEntryDoc {
            quickbooks_id: key.into(),
            company: "Acme Ltd".into(),
            posting_date: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            accounts: vec![
                JournalLine::new("Cash - AL", dec!(5), dec!(0), "Main - AL"),
                JournalLine::new("Sales - AL", dec!(0), dec!(5), "Main - AL"),
            ],
        })
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryStore::new();
        let name = store.insert(customer("1", "Amy - AL")).await.unwrap();
        assert_eq!(name, "Amy - AL");

        assert!(store.exists(DocType::Customer, "1", "Acme Ltd").await.unwrap());
        assert!(!store.exists(DocType::Customer, "1", "Other Co").await.unwrap());
        assert!(!store.exists(DocType::Supplier, "1", "Acme Ltd").await.unwrap());
        assert!(store
            .find_by_name(DocType::Customer, "Amy - AL")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_duplicate_key_rejected() {
        let store = MemoryStore::new();
        store.insert(customer("1", "Amy - AL")).await.unwrap();
        let err = store.insert(customer("1", "Amy 2 - AL")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_transactions_named_from_series() {
        let store = MemoryStore::new();
        assert_eq!(store.insert(journal("Deposit - 1")).await.unwrap(), "JV-00001");
        assert_eq!(store.insert(journal("Deposit - 2")).await.unwrap(), "JV-00002");
    }

    #[tokio::test]
    async fn test_invalid_document_rejected() {
        let store = MemoryStore::new();
        let Document::JournalEntry(mut doc) = journal("Deposit - 1") else {
            unreachable!()
        };
        doc.accounts.pop();
        let err = store.insert(Document::JournalEntry(doc)).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { doctype: DocType::JournalEntry, .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_fiscal_year_rejected() {
        let year = |start: (i32, u32, u32), end: (i32, u32, u32)| {
            FiscalYear::new(
                NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
                NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            )
            .unwrap()
        };
        let store = MemoryStore::with_fiscal_years(vec![year((2019, 1, 1), (2019, 12, 31))]);

        store.insert_fiscal_year(year((2018, 1, 1), (2018, 12, 31))).await.unwrap();
        assert!(store
            .insert_fiscal_year(year((2018, 6, 1), (2019, 5, 31)))
            .await
            .is_err());

        let years = store.fiscal_years().await.unwrap();
        assert_eq!(years[0].year, "2018");
        assert_eq!(years.len(), 2);
    }
}
