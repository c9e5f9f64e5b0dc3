//! Paginated fetching.

use serde_json::Value;
use tallybridge_shared::types::query_windows;
use tracing::{debug, info};

use super::{MigrationError, QuickBooksApi};
use crate::source::EntityKind;

/// Fetches every record of `entity`, page by page.
///
/// The record count is read first; pages of `page_size` then cover positions
/// `1..=count`. Pages are concatenated in request order.
pub async fn fetch_all(
    api: &dyn QuickBooksApi,
    entity: EntityKind,
    page_size: u32,
) -> Result<Vec<Value>, MigrationError> {
    let total = api.count(entity).await?;
    let mut records = Vec::new();
    for window in query_windows(total, page_size) {
        debug!(entity = %entity, start = window.start_position, "Fetching page");
        records.extend(api.query(entity, window).await?);
    }
    info!(entity = %entity, total, fetched = records.len(), "Fetched records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Report;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::Mutex;
    use tallybridge_shared::types::QueryWindow;

    struct PagedApi {
        records: Vec<Value>,
        requests: Mutex<Vec<QueryWindow>>,
    }

    impl PagedApi {
        fn new(count: usize) -> Self {
            Self {
                records: (1..=count).map(|id| json!({"Id": id.to_string()})).collect(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl QuickBooksApi for PagedApi {
        async fn count(&self, _entity: EntityKind) -> Result<u64, MigrationError> {
            Ok(self.records.len() as u64)
        }

        async fn query(
            &self,
            _entity: EntityKind,
            window: QueryWindow,
        ) -> Result<Vec<Value>, MigrationError> {
            self.requests.lock().unwrap().push(window);
            let start = usize::try_from(window.start_position - 1).unwrap();
            let end = (start + window.max_results as usize).min(self.records.len());
            Ok(self.records[start..end].to_vec())
        }

        async fn general_ledger(&self) -> Result<Report, MigrationError> {
            Ok(Report::default())
        }
    }

    #[tokio::test]
    async fn test_empty_entity_issues_no_page_requests() {
        let api = PagedApi::new(0);
        let records = fetch_all(&api, EntityKind::Customer, 1000).await.unwrap();
        assert!(records.is_empty());
        assert!(api.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pages_are_concatenated_in_order() {
        let api = PagedApi::new(5);
        let records = fetch_all(&api, EntityKind::Vendor, 2).await.unwrap();

        let ids: Vec<_> = records.iter().map(|r| r["Id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5"]);
        let starts: Vec<_> = api
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|w| w.start_position)
            .collect();
        assert_eq!(starts, [1, 3, 5]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_fetch_returns_every_record_once(total in 0usize..300, page_size in 1u32..120) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let api = PagedApi::new(total);
            let records = runtime
                .block_on(fetch_all(&api, EntityKind::Item, page_size))
                .unwrap();

            prop_assert_eq!(records.len(), total);
            prop_assert_eq!(records, api.records.clone());
            let expected_pages = total.div_ceil(page_size as usize);
            prop_assert_eq!(api.requests.lock().unwrap().len(), expected_pages);
        }
    }
}
