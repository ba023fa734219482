//! Axum router configuration for the honeypot endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers::{liveness, post_honeypot, HoneypotAppState};
use crate::adapters::http::middleware::{require_api_key, ApiKeyState};

/// Create the honeypot router.
///
/// # Routes
///
/// - `GET /` - Liveness probe (no authentication)
/// - `POST /honeypot` - Process one message (requires `x-api-key`)
pub fn honeypot_router(state: HoneypotAppState, api_key: ApiKeyState) -> Router {
    let protected = Router::new()
        .route("/honeypot", post(post_honeypot))
        .route_layer(middleware::from_fn_with_state(api_key, require_api_key));

    Router::new()
        .route("/", get(liveness))
        .merge(protected)
        .with_state(state)
}
