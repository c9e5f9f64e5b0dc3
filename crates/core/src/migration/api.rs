//! Read side of the QuickBooks Online API.

use async_trait::async_trait;
use serde_json::Value;
use tallybridge_shared::types::QueryWindow;

use super::MigrationError;
use crate::ledger::Report;
use crate::source::EntityKind;

/// Queries a connected QuickBooks company.
///
/// Implementations handle authentication, including refreshing an expired
/// access token.
#[async_trait]
pub trait QuickBooksApi: Send + Sync {
    /// `SELECT COUNT(*) FROM {entity}`; a missing `totalCount` counts as zero.
    async fn count(&self, entity: EntityKind) -> Result<u64, MigrationError>;

    /// `SELECT * FROM {entity}` restricted to one window. A response without
    /// the entity array yields no records.
    async fn query(
        &self,
        entity: EntityKind,
        window: QueryWindow,
    ) -> Result<Vec<Value>, MigrationError>;

    /// The General Ledger report over all dates.
    async fn general_ledger(&self) -> Result<Report, MigrationError>;
}
