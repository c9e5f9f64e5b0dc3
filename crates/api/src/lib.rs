//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - The QuickBooks connect and migration routes
//! - Admin token middleware
//! - JSON error responses

pub mod error;
pub mod middleware;
pub mod routes;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::Router;
use tallybridge_core::CompanySettings;
use tallybridge_core::document::DocumentStore;
use tallybridge_core::migration::{BroadcastProgress, ConnectorStore};
use tallybridge_quickbooks::{OAuthClient, TokenManager};
use tallybridge_shared::AppConfig;
use tallybridge_shared::config::QuickBooksConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Outbound QuickBooks request timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// How long the consent popup may take before its `state` is refused.
const OAUTH_STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Migrated document store.
    pub documents: Arc<dyn DocumentStore>,
    /// Connector record store.
    pub connector: Arc<dyn ConnectorStore>,
    /// OAuth token owner shared by every QuickBooks client.
    pub tokens: Arc<TokenManager>,
    /// HTTP client for QuickBooks calls.
    pub http: reqwest::Client,
    /// QuickBooks application settings.
    pub quickbooks: Arc<QuickBooksConfig>,
    /// Target company and posting defaults.
    pub settings: CompanySettings,
    /// Records per QuickBooks query page.
    pub page_size: u32,
    /// Progress fan-out feeding the SSE route.
    pub progress: Arc<BroadcastProgress>,
    /// OAuth `state` values issued and not yet used.
    pub oauth_states: Arc<OAuthStates>,
    /// Bearer token for the control routes.
    pub admin_token: Arc<str>,
    /// Held while a migrate request checks and claims the connector.
    pub run_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    /// Builds the state from configuration and the two stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: &AppConfig,
        documents: Arc<dyn DocumentStore>,
        connector: Arc<dyn ConnectorStore>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .gzip(true)
            .build()?;
        let oauth = OAuthClient::new(http.clone(), config.quickbooks.clone());
        let tokens = Arc::new(TokenManager::new(oauth, connector.clone()));

        Ok(Self {
            documents,
            connector,
            tokens,
            http,
            quickbooks: Arc::new(config.quickbooks.clone()),
            settings: CompanySettings::from(&config.migration),
            page_size: config.migration.page_size,
            progress: Arc::new(BroadcastProgress::default()),
            oauth_states: Arc::new(OAuthStates::default()),
            admin_token: Arc::from(config.server.admin_token.as_str()),
            run_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }
}

/// OAuth `state` values handed out by the authorize route. Each is accepted
/// once by the callback and only within its time to live.
#[derive(Debug)]
pub struct OAuthStates {
    ttl: Duration,
    pending: Mutex<HashMap<String, Instant>>,
}

impl Default for OAuthStates {
    fn default() -> Self {
        Self::with_ttl(OAUTH_STATE_TTL)
    }
}

impl OAuthStates {
    /// Creates an empty set whose states expire after `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Issues a fresh state value, dropping expired ones.
    pub fn issue(&self) -> String {
        let state = uuid::Uuid::new_v4().simple().to_string();
        if let Ok(mut pending) = self.pending.lock() {
            let ttl = self.ttl;
            pending.retain(|_, issued| issued.elapsed() < ttl);
            pending.insert(state.clone(), Instant::now());
        }
        state
    }

    /// Whether `state` was issued and has not expired; it is forgotten
    /// either way.
    pub fn consume(&self, state: &str) -> bool {
        self.pending.lock().is_ok_and(|mut pending| {
            pending
                .remove(state)
                .is_some_and(|issued| issued.elapsed() < self.ttl)
        })
    }

    /// States issued and not yet consumed or pruned.
    pub fn pending(&self) -> usize {
        self.pending.lock().map_or(0, |pending| pending.len())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_accepted_once() {
        let states = OAuthStates::default();
        let state = states.issue();

        assert!(states.consume(&state));
        assert!(!states.consume(&state));
        assert!(!states.consume("forged"));
    }

    #[test]
    fn test_expired_state_is_rejected() {
        let states = OAuthStates::with_ttl(Duration::ZERO);
        let state = states.issue();

        assert!(!states.consume(&state));
    }

    #[test]
    fn test_issue_prunes_expired_states() {
        let states = OAuthStates::with_ttl(Duration::ZERO);
        for _ in 0..5 {
            states.issue();
        }

        // Only the state just issued survives pruning.
        assert_eq!(states.pending(), 1);
    }
}
