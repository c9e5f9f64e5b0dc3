//! Access token lifecycle.
//!
//! The manager caches the current token pair, persists every new pair through
//! the [`ConnectorStore`], and wraps outbound requests so that a 401 triggers
//! exactly one refresh and one retry.

use std::sync::Arc;

use reqwest::{RequestBuilder, Response, StatusCode};
use tallybridge_core::migration::{ConnectorStatus, ConnectorStore};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::error::QuickBooksError;
use crate::oauth::{OAuthClient, TokenSet};

/// Refreshes allowed per request before giving up.
pub const MAX_REFRESH_ATTEMPTS: u32 = 1;

#[derive(Debug, Clone)]
struct TokenPair {
    access: String,
    refresh: String,
}

/// Owns the OAuth tokens of the connector.
pub struct TokenManager {
    oauth: OAuthClient,
    store: Arc<dyn ConnectorStore>,
    tokens: RwLock<Option<TokenPair>>,
}

impl TokenManager {
    /// Creates a manager; tokens load lazily from `store`.
    #[must_use]
    pub fn new(oauth: OAuthClient, store: Arc<dyn ConnectorStore>) -> Self {
        Self {
            oauth,
            store,
            tokens: RwLock::new(None),
        }
    }

    /// The OAuth client.
    #[must_use]
    pub fn oauth(&self) -> &OAuthClient {
        &self.oauth
    }

    /// Completes the authorization code flow for `realm_id`.
    ///
    /// The connector passes through `Connecting to QuickBooks` and ends in
    /// `Connected to QuickBooks`, or back in `Not Connected` if the exchange
    /// fails.
    pub async fn connect(&self, code: &str, realm_id: &str) -> Result<(), QuickBooksError> {
        self.store.set_status(ConnectorStatus::Connecting).await?;

        let tokens = match self.oauth.exchange_code(code).await {
            Ok(tokens) => tokens,
            Err(e) => {
                error!(error = %e, "Failed to exchange authorization code");
                self.store.set_status(ConnectorStatus::NotConnected).await?;
                return Err(e);
            }
        };

        self.store.set_realm(realm_id).await?;
        self.persist(tokens).await?;
        self.store.set_status(ConnectorStatus::Connected).await?;
        info!(realm_id, "Connected to QuickBooks");
        Ok(())
    }

    /// Current access token.
    pub async fn access_token(&self) -> Result<String, QuickBooksError> {
        Ok(self.current().await?.access)
    }

    /// Exchanges the refresh token for a new pair and returns the new access
    /// token.
    pub async fn refresh(&self) -> Result<String, QuickBooksError> {
        let current = self.current().await?;
        let tokens = self.oauth.refresh(&current.refresh).await?;
        let access = tokens.access_token.clone();
        self.persist(tokens).await?;
        info!("Refreshed QuickBooks access token");
        Ok(access)
    }

    /// Sends the request built by `build` with the current token, refreshing
    /// and retrying once on 401.
    ///
    /// # Errors
    ///
    /// Returns [`QuickBooksError::Unauthorized`] when the retried request is
    /// rejected too. A failed refresh propagates as is.
    pub async fn send_with_refresh<F>(&self, build: F) -> Result<Response, QuickBooksError>
    where
        F: Fn(&str) -> RequestBuilder + Send + Sync,
    {
        let mut token = self.access_token().await?;
        let mut refreshes = 0;
        loop {
            let response = build(&token).send().await?;
            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }
            if refreshes >= MAX_REFRESH_ATTEMPTS {
                return Err(QuickBooksError::Unauthorized);
            }
            refreshes += 1;
            warn!("Access token rejected, refreshing");
            token = self.refresh().await?;
        }
    }

    async fn current(&self) -> Result<TokenPair, QuickBooksError> {
        if let Some(pair) = self.tokens.read().await.clone() {
            return Ok(pair);
        }
        let state = self.store.load().await?;
        let (Some(access), Some(refresh)) = (state.access_token, state.refresh_token) else {
            return Err(QuickBooksError::NotConnected);
        };
        let pair = TokenPair { access, refresh };
        *self.tokens.write().await = Some(pair.clone());
        Ok(pair)
    }

    async fn persist(&self, tokens: TokenSet) -> Result<(), QuickBooksError> {
        self.store
            .save_tokens(&tokens.access_token, &tokens.refresh_token)
            .await?;
        *self.tokens.write().await = Some(TokenPair {
            access: tokens.access_token,
            refresh: tokens.refresh_token,
        });
        Ok(())
    }
}
