//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::admin_middleware};

pub mod health;
pub mod quickbooks;

/// Creates the API router with public and admin-protected routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Control routes require the admin token
    let protected_routes =
        Router::new()
            .merge(quickbooks::protected_routes())
            .layer(middleware::from_fn_with_state(
                state.clone(),
                admin_middleware,
            ));

    // The OAuth redirect and the browser's EventSource cannot send headers
    Router::new()
        .merge(health::routes())
        .merge(quickbooks::public_routes())
        .merge(protected_routes)
}
