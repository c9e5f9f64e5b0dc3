//! Persisted connector state: OAuth tokens, run status and discovered defaults.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::StoreError;

/// Lifecycle of the QuickBooks connection and of the migration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorStatus {
    /// No tokens yet.
    #[default]
    #[serde(rename = "Not Connected")]
    NotConnected,
    /// OAuth callback received, token exchange running.
    #[serde(rename = "Connecting to QuickBooks")]
    Connecting,
    /// Tokens stored.
    #[serde(rename = "Connected to QuickBooks")]
    Connected,
    /// A migration run is active.
    #[serde(rename = "In Progress")]
    InProgress,
    /// The last run finished.
    #[serde(rename = "Complete")]
    Complete,
    /// The last run aborted.
    #[serde(rename = "Failed")]
    Failed,
}

impl ConnectorStatus {
    /// All statuses.
    pub const ALL: [Self; 6] = [
        Self::NotConnected,
        Self::Connecting,
        Self::Connected,
        Self::InProgress,
        Self::Complete,
        Self::Failed,
    ];

    /// Display label, also used as the stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotConnected => "Not Connected",
            Self::Connecting => "Connecting to QuickBooks",
            Self::Connected => "Connected to QuickBooks",
            Self::InProgress => "In Progress",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Parses a stored label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

impl std::fmt::Display for ConnectorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accounts discovered while migrating, used by later transformers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorDefaults {
    /// Target account for QuickBooks' undeposited funds.
    pub undeposited_funds_account: Option<String>,
    /// Income account for the shipping pseudo-item.
    pub shipping_account: Option<String>,
}

/// Snapshot of the connector record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorState {
    /// QuickBooks company id.
    pub realm_id: Option<String>,
    /// Current OAuth access token.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    /// Current OAuth refresh token.
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    /// Run status.
    pub status: ConnectorStatus,
    /// Completion time of the last successful run.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Discovered defaults.
    pub defaults: ConnectorDefaults,
}

/// Persistence of the singleton connector record.
#[async_trait]
pub trait ConnectorStore: Send + Sync {
    /// Loads the record, or the default state when none exists.
    async fn load(&self) -> Result<ConnectorState, StoreError>;

    /// Stores a new token pair.
    async fn save_tokens(&self, access_token: &str, refresh_token: &str)
    -> Result<(), StoreError>;

    /// Stores the QuickBooks company id.
    async fn set_realm(&self, realm_id: &str) -> Result<(), StoreError>;

    /// Updates the run status.
    async fn set_status(&self, status: ConnectorStatus) -> Result<(), StoreError>;

    /// Replaces the discovered defaults.
    async fn save_defaults(&self, defaults: &ConnectorDefaults) -> Result<(), StoreError>;

    /// Records a successful run.
    async fn touch_last_synced(&self, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// Connector record kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryConnectorStore {
    state: Mutex<ConnectorState>,
}

impl MemoryConnectorStore {
    /// Creates a store starting from `state`.
    #[must_use]
    pub fn new(state: ConnectorState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ConnectorState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("connector state lock poisoned".to_string()))
    }
}

#[async_trait]
impl ConnectorStore for MemoryConnectorStore {
    async fn load(&self) -> Result<ConnectorState, StoreError> {
        Ok(self.lock()?.clone())
    }

    async fn save_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.access_token = Some(access_token.to_string());
        state.refresh_token = Some(refresh_token.to_string());
        Ok(())
    }

    async fn set_realm(&self, realm_id: &str) -> Result<(), StoreError> {
        self.lock()?.realm_id = Some(realm_id.to_string());
        Ok(())
    }

    async fn set_status(&self, status: ConnectorStatus) -> Result<(), StoreError> {
        self.lock()?.status = status;
        Ok(())
    }

    async fn save_defaults(&self, defaults: &ConnectorDefaults) -> Result<(), StoreError> {
        self.lock()?.defaults = defaults.clone();
        Ok(())
    }

    async fn touch_last_synced(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.lock()?.last_synced_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ConnectorStatus::NotConnected, "\"Not Connected\"")]
    #[case(ConnectorStatus::Connecting, "\"Connecting to QuickBooks\"")]
    #[case(ConnectorStatus::InProgress, "\"In Progress\"")]
    #[case(ConnectorStatus::Failed, "\"Failed\"")]
    fn test_status_wire_labels(#[case] status: ConnectorStatus, #[case] json: &str) {
        assert_eq!(serde_json::to_string(&status).unwrap(), json);
        assert_eq!(ConnectorStatus::parse(status.as_str()), Some(status));
    }

    #[test]
    fn test_tokens_are_not_serialized() {
        let state = ConnectorState {
            access_token: Some("access".into()),
            refresh_token: Some("refresh".into()),
            ..ConnectorState::default()
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(!json.contains("access"));
        assert!(!json.contains("refresh"));
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryConnectorStore::default();
        store.save_tokens("a1", "r1").await.unwrap();
        store.set_realm("4620816365").await.unwrap();
        store.set_status(ConnectorStatus::Connected).await.unwrap();

        let state = store.load().await.unwrap();
        assert_eq!(state.access_token.as_deref(), Some("a1"));
        assert_eq!(state.refresh_token.as_deref(), Some("r1"));
        assert_eq!(state.realm_id.as_deref(), Some("4620816365"));
        assert_eq!(state.status, ConnectorStatus::Connected);
    }
}
