//! Connector repository backed by the singleton `connectors` row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tallybridge_core::document::StoreError;
use tallybridge_core::migration::{
    ConnectorDefaults, ConnectorState, ConnectorStatus, ConnectorStore,
};
use tallybridge_shared::types::ConnectorId;
use uuid::Uuid;

use super::document::backend;
use crate::entities::connectors;

fn to_state(model: connectors::Model) -> Result<ConnectorState, StoreError> {
    let status = ConnectorStatus::parse(&model.status)
        .ok_or_else(|| StoreError::Backend(format!("unknown connector status {}", model.status)))?;
    Ok(ConnectorState {
        realm_id: model.realm_id,
        access_token: model.access_token,
        refresh_token: model.refresh_token,
        status,
        last_synced_at: model.last_synced_at.map(|at| at.with_timezone(&Utc)),
        defaults: ConnectorDefaults {
            undeposited_funds_account: model.undeposited_funds_account,
            shipping_account: model.shipping_account,
        },
    })
}

/// PostgreSQL implementation of [`ConnectorStore`].
#[derive(Debug, Clone)]
pub struct ConnectorRepository {
    db: DatabaseConnection,
}

impl ConnectorRepository {
    /// Creates a new connector repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find(&self) -> Result<Option<connectors::Model>, StoreError> {
        connectors::Entity::find()
            .order_by_asc(connectors::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(backend)
    }

    /// Id of the connector row, creating it on first use.
    async fn row_id(&self) -> Result<Uuid, StoreError> {
        if let Some(existing) = self.find().await? {
            return Ok(existing.id);
        }
        let now = Utc::now().into();
        let model = connectors::ActiveModel {
            id: Set(ConnectorId::new().into_inner()),
            realm_id: Set(None),
            access_token: Set(None),
            refresh_token: Set(None),
            status: Set(ConnectorStatus::NotConnected.as_str().to_string()),
            undeposited_funds_account: Set(None),
            shipping_account: Set(None),
            last_synced_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(backend)?;
        Ok(model.id)
    }

    /// Applies `change` to the connector row.
    async fn update(
        &self,
        change: impl FnOnce(&mut connectors::ActiveModel),
    ) -> Result<(), StoreError> {
        let mut model = connectors::ActiveModel {
            id: Set(self.row_id().await?),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        change(&mut model);
        model.update(&self.db).await.map_err(backend)?;
        Ok(())
    }
}

#[async_trait]
impl ConnectorStore for ConnectorRepository {
    async fn load(&self) -> Result<ConnectorState, StoreError> {
        self.find()
            .await?
            .map_or_else(|| Ok(ConnectorState::default()), to_state)
    }

    async fn save_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), StoreError> {
        self.update(|model| {
            model.access_token = Set(Some(access_token.to_string()));
            model.refresh_token = Set(Some(refresh_token.to_string()));
        })
        .await
    }

    async fn set_realm(&self, realm_id: &str) -> Result<(), StoreError> {
        self.update(|model| model.realm_id = Set(Some(realm_id.to_string())))
            .await
    }

    async fn set_status(&self, status: ConnectorStatus) -> Result<(), StoreError> {
        self.update(|model| model.status = Set(status.as_str().to_string()))
            .await
    }

    async fn save_defaults(&self, defaults: &ConnectorDefaults) -> Result<(), StoreError> {
        self.update(|model| {
            model.undeposited_funds_account = Set(defaults.undeposited_funds_account.clone());
            model.shipping_account = Set(defaults.shipping_account.clone());
        })
        .await
    }

    async fn touch_last_synced(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.update(|model| model.last_synced_at = Set(Some(at.into())))
            .await
    }
}
