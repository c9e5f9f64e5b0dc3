//! Document repository backed by `erp_documents`.
//!
//! Documents are stored as JSON payloads next to the columns the store looks
//! them up by. Names of series documents come from `naming_series` inside
//! the inserting transaction.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tallybridge_core::document::{DocType, Document, DocumentStore, StoreError, StoredDocument};
use tallybridge_core::fiscal::{FiscalError, FiscalYear};
use tallybridge_shared::types::{DocumentId, FiscalYearId};
use tracing::debug;

use crate::entities::{erp_documents, fiscal_years, naming_series};

/// Maps a database failure into the store's error type.
pub(crate) fn backend(err: DbErr) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn to_stored(model: erp_documents::Model) -> Result<StoredDocument, StoreError> {
    let document = serde_json::from_value(model.payload).map_err(|e| {
        StoreError::Backend(format!("corrupt {} {}: {e}", model.doctype, model.name))
    })?;
    Ok(StoredDocument {
        name: model.name,
        document,
    })
}

/// PostgreSQL implementation of [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
}

impl DocumentRepository {
    /// Creates a new document repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Reserves the next name of `series`.
async fn next_in_series<C: ConnectionTrait>(db: &C, series: &str) -> Result<String, DbErr> {
    let current = naming_series::Entity::find_by_id(series.to_string())
        .one(db)
        .await?;
    let next = current.as_ref().map_or(1, |row| row.current + 1);
    let model = naming_series::ActiveModel {
        prefix: Set(series.to_string()),
        current: Set(next),
    };
    if current.is_some() {
        model.update(db).await?;
    } else {
        model.insert(db).await?;
    }
    Ok(format!("{series}-{next:05}"))
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn find(
        &self,
        doctype: DocType,
        quickbooks_id: &str,
        company: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        erp_documents::Entity::find()
            .filter(erp_documents::Column::Doctype.eq(doctype.as_str()))
            .filter(erp_documents::Column::QuickbooksId.eq(quickbooks_id))
            .filter(erp_documents::Column::Company.eq(company))
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(to_stored)
            .transpose()
    }

    async fn find_by_name(
        &self,
        doctype: DocType,
        name: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        erp_documents::Entity::find()
            .filter(erp_documents::Column::Doctype.eq(doctype.as_str()))
            .filter(erp_documents::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(to_stored)
            .transpose()
    }

    async fn list(
        &self,
        doctype: DocType,
        company: &str,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        erp_documents::Entity::find()
            .filter(erp_documents::Column::Doctype.eq(doctype.as_str()))
            .filter(erp_documents::Column::Company.eq(company))
            .order_by_asc(erp_documents::Column::CreatedAt)
            .order_by_asc(erp_documents::Column::Id)
            .all(&self.db)
            .await
            .map_err(backend)?
            .into_iter()
            .map(to_stored)
            .collect()
    }

    async fn insert(&self, document: Document) -> Result<String, StoreError> {
        let doctype = document.doctype();
        document
            .validate()
            .map_err(|source| StoreError::Rejected { doctype, source })?;
        let payload =
            serde_json::to_value(&document).map_err(|e| StoreError::Backend(e.to_string()))?;

        let txn = self.db.begin().await.map_err(backend)?;

        if let Some(key) = document.quickbooks_id() {
            let existing = erp_documents::Entity::find()
                .filter(erp_documents::Column::Doctype.eq(doctype.as_str()))
                .filter(erp_documents::Column::QuickbooksId.eq(key))
                .filter(erp_documents::Column::Company.eq(document.company()))
                .one(&txn)
                .await
                .map_err(backend)?;
            if existing.is_some() {
                return Err(StoreError::Duplicate {
                    doctype,
                    key: key.to_string(),
                });
            }
        }

        let name = match (document.name(), doctype.naming_series()) {
            (Some(name), _) => name.to_string(),
            (None, Some(series)) => next_in_series(&txn, series).await.map_err(backend)?,
            (None, None) => {
                return Err(StoreError::Backend(format!("{doctype} has no name")));
            }
        };

        let taken = erp_documents::Entity::find()
            .filter(erp_documents::Column::Doctype.eq(doctype.as_str()))
            .filter(erp_documents::Column::Name.eq(&name))
            .one(&txn)
            .await
            .map_err(backend)?;
        if taken.is_some() {
            return Err(StoreError::Duplicate { doctype, key: name });
        }

        erp_documents::ActiveModel {
            id: Set(DocumentId::new().into_inner()),
            doctype: Set(doctype.as_str().to_string()),
            name: Set(name.clone()),
            quickbooks_id: Set(document.quickbooks_id().map(str::to_string)),
            company: Set(document.company().to_string()),
            payload: Set(payload),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&txn)
        .await
        .map_err(backend)?;

        txn.commit().await.map_err(backend)?;
        debug!(%doctype, name = %name, "Inserted document");
        Ok(name)
    }

    async fn fiscal_years(&self) -> Result<Vec<FiscalYear>, StoreError> {
        let years = fiscal_years::Entity::find()
            .order_by_asc(fiscal_years::Column::StartDate)
            .all(&self.db)
            .await
            .map_err(backend)?;
        Ok(years
            .into_iter()
            .map(|model| FiscalYear {
                year: model.year,
                start_date: model.start_date,
                end_date: model.end_date,
            })
            .collect())
    }

    async fn insert_fiscal_year(&self, year: FiscalYear) -> Result<(), StoreError> {
        let overlapping = fiscal_years::Entity::find()
            .filter(fiscal_years::Column::StartDate.lte(year.end_date))
            .filter(fiscal_years::Column::EndDate.gte(year.start_date))
            .one(&self.db)
            .await
            .map_err(backend)?;
        if let Some(existing) = overlapping {
            return Err(FiscalError::OverlappingYear(existing.year).into());
        }

        fiscal_years::ActiveModel {
            id: Set(FiscalYearId::new().into_inner()),
            year: Set(year.year),
            start_date: Set(year.start_date),
            end_date: Set(year.end_date),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(backend)?;
        Ok(())
    }
}
