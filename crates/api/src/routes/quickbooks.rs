//! QuickBooks connect and migration routes.
//!
//! - `GET /quickbooks/authorize` - consent URL for the popup (admin)
//! - `GET /quickbooks/callback` - OAuth redirect target
//! - `POST /quickbooks/migrate` - starts a run in the background (admin)
//! - `GET /quickbooks/status` - connector record (admin)
//! - `GET /quickbooks/progress` - server-sent progress events

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tallybridge_core::migration::progress::PROGRESS_EVENT;
use tallybridge_core::migration::{ConnectorState, ConnectorStatus, MigrationError, MigrationRunner};
use tallybridge_quickbooks::QuickBooksClient;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::AppState;
use crate::error::ApiError;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Consent URL the UI opens in a popup.
#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    /// Intuit consent page including the `state` to echo back.
    pub authorization_url: String,
}

/// Parameters Intuit appends to the redirect URL.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code.
    pub code: Option<String>,
    /// QuickBooks company id.
    #[serde(rename = "realmId")]
    pub realm_id: Option<String>,
    /// Echo of the issued state.
    pub state: Option<String>,
    /// Set when the user declined consent.
    pub error: Option<String>,
}

/// Routes reachable without the admin token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/quickbooks/callback", get(callback))
        .route("/quickbooks/progress", get(progress))
}

/// Routes behind the admin token.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/quickbooks/authorize", get(authorize))
        .route("/quickbooks/migrate", post(start_migration))
        .route("/quickbooks/status", get(status))
}

async fn authorize(State(state): State<AppState>) -> Result<Json<AuthorizeResponse>, ApiError> {
    let oauth_state = state.oauth_states.issue();
    let authorization_url = state.tokens.oauth().authorization_url(&oauth_state)?;
    Ok(Json(AuthorizeResponse { authorization_url }))
}

/// Page shown in the consent popup; it closes itself.
fn popup_page(status: StatusCode, message: &str) -> Response {
    let body = format!(
        "<!DOCTYPE html><html><head><title>Tallybridge</title></head>\
         <body><p>{message}</p><script>window.close();</script></body></html>"
    );
    (status, Html(body)).into_response()
}

async fn callback(State(state): State<AppState>, Query(query): Query<CallbackQuery>) -> Response {
    if let Some(reason) = query.error.as_deref() {
        warn!(reason = %reason, "QuickBooks authorization was declined");
        return popup_page(StatusCode::BAD_REQUEST, "Authorization was declined.");
    }

    let issued = query
        .state
        .as_deref()
        .is_some_and(|s| state.oauth_states.consume(s));
    if !issued {
        warn!("OAuth callback with unknown state");
        return popup_page(StatusCode::BAD_REQUEST, "Unknown authorization request.");
    }

    let (Some(code), Some(realm_id)) = (query.code.as_deref(), query.realm_id.as_deref()) else {
        return popup_page(
            StatusCode::BAD_REQUEST,
            "Authorization response is missing the code or company id.",
        );
    };

    match state.tokens.connect(code, realm_id).await {
        Ok(()) => {
            info!(realm_id = %realm_id, "Connected to QuickBooks");
            popup_page(StatusCode::OK, "Connected to QuickBooks. You can close this window.")
        }
        Err(e) => {
            error!(error = %e, "Failed to exchange authorization code");
            popup_page(StatusCode::BAD_GATEWAY, "Could not connect to QuickBooks.")
        }
    }
}

async fn start_migration(State(state): State<AppState>) -> Result<Response, ApiError> {
    // Serializes the status check and claim of concurrent requests
    let _guard = state.run_lock.lock().await;

    let connector = state.connector.load().await?;
    let Some(realm_id) = connector.realm_id else {
        return Err(MigrationError::NotConnected.into());
    };

    let client = QuickBooksClient::new(
        state.http.clone(),
        state.tokens.clone(),
        &state.quickbooks,
        realm_id,
    );
    let runner = MigrationRunner::new(
        Arc::new(client),
        state.documents.clone(),
        state.connector.clone(),
        state.progress.clone(),
        state.settings.clone(),
        state.page_size,
    );
    runner.start().await?;

    tokio::spawn(async move {
        // The runner logs the outcome and records the final status
        let _ = runner.execute().await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "status": ConnectorStatus::InProgress })),
    )
        .into_response())
}

async fn status(State(state): State<AppState>) -> Result<Json<ConnectorState>, ApiError> {
    Ok(Json(state.connector.load().await?))
}

async fn progress(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.progress.subscribe();
    let events = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let sse = Event::default()
                        .event(PROGRESS_EVENT)
                        .json_data(&event)
                        .unwrap_or_else(|_| Event::default().event(PROGRESS_EVENT));
                    return Some((Ok(sse), receiver));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Progress subscriber fell behind");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}

#[cfg(test)]
#[path = "quickbooks_tests.rs"]
mod tests;
