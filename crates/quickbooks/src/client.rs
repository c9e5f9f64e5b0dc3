//! REST client for the accounting API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tallybridge_core::ledger::Report;
use tallybridge_core::migration::{MigrationError, QuickBooksApi};
use tallybridge_core::source::EntityKind;
use tallybridge_shared::config::QuickBooksConfig;
use tallybridge_shared::types::QueryWindow;
use tracing::debug;

use crate::error::{QuickBooksError, fault_message};
use crate::token::TokenManager;

/// Columns requested from the General Ledger report, in the order the
/// reconstructor reads them.
pub const GENERAL_LEDGER_COLUMNS: &str = "tx_date,txn_type,credit_amt,debt_amt";

/// Query and reports client for one QuickBooks company.
#[derive(Clone)]
pub struct QuickBooksClient {
    http: Client,
    tokens: Arc<TokenManager>,
    api_endpoint: String,
    realm_id: String,
    minor_version: u32,
}

impl QuickBooksClient {
    /// Creates a client for the company `realm_id`.
    #[must_use]
    pub fn new(
        http: Client,
        tokens: Arc<TokenManager>,
        config: &QuickBooksConfig,
        realm_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            tokens,
            api_endpoint: config.api_endpoint.trim_end_matches('/').to_string(),
            realm_id: realm_id.into(),
            minor_version: config.minor_version,
        }
    }

    fn company_url(&self, path: &str) -> String {
        format!("{}/company/{}/{path}", self.api_endpoint, self.realm_id)
    }

    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value, QuickBooksError> {
        let minor_version = self.minor_version.to_string();
        let response = self
            .tokens
            .send_with_refresh(|token| {
                self.http
                    .get(url)
                    .bearer_auth(token)
                    .header(ACCEPT, "application/json")
                    .query(query)
                    .query(&[("minorversion", minor_version.as_str())])
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(QuickBooksError::Status {
                status: status.as_u16(),
                message: fault_message(&body, status.as_u16()),
            });
        }
        response
            .json()
            .await
            .map_err(|e| QuickBooksError::InvalidResponse(e.to_string()))
    }

    async fn run_query(&self, statement: String) -> Result<Value, QuickBooksError> {
        debug!(query = %statement, "QuickBooks query");
        let url = self.company_url("query");
        let mut body = self.get_json(&url, &[("query", statement)]).await?;
        Ok(body
            .get_mut("QueryResponse")
            .map(Value::take)
            .unwrap_or_default())
    }

    /// Number of records of `entity`. A response without `totalCount` counts
    /// as zero.
    pub async fn count_records(&self, entity: EntityKind) -> Result<u64, QuickBooksError> {
        let response = self
            .run_query(format!("SELECT COUNT(*) FROM {}", entity.api_name()))
            .await?;
        Ok(response["totalCount"].as_u64().unwrap_or(0))
    }

    /// One page of `entity`. A page without the entity array is empty.
    pub async fn query_page(
        &self,
        entity: EntityKind,
        window: QueryWindow,
    ) -> Result<Vec<Value>, QuickBooksError> {
        let name = entity.api_name();
        let mut response = self
            .run_query(format!(
                "SELECT * FROM {name} STARTPOSITION {} MAXRESULTS {}",
                window.start_position, window.max_results
            ))
            .await?;
        match response.get_mut(name).map(Value::take) {
            Some(Value::Array(records)) => Ok(records),
            _ => Ok(Vec::new()),
        }
    }

    /// The General Ledger report over all dates.
    pub async fn general_ledger_report(&self) -> Result<Report, QuickBooksError> {
        let url = self.company_url("reports/GeneralLedger");
        let body = self
            .get_json(
                &url,
                &[
                    ("columns", GENERAL_LEDGER_COLUMNS.to_string()),
                    ("date_macro", "All".to_string()),
                ],
            )
            .await?;
        serde_json::from_value(body).map_err(|e| QuickBooksError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl QuickBooksApi for QuickBooksClient {
    async fn count(&self, entity: EntityKind) -> Result<u64, MigrationError> {
        Ok(self.count_records(entity).await?)
    }

    async fn query(
        &self,
        entity: EntityKind,
        window: QueryWindow,
    ) -> Result<Vec<Value>, MigrationError> {
        Ok(self.query_page(entity, window).await?)
    }

    async fn general_ledger(&self) -> Result<Report, MigrationError> {
        Ok(self.general_ledger_report().await?)
    }
}
