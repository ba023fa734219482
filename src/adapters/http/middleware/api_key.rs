//! Shared-secret authentication for the honeypot endpoint.
//!
//! The caller presents the secret in the `x-api-key` header. Comparison is
//! constant time. When no secret is configured every request is rejected
//! with 500 so a misconfigured deployment never runs open.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware state: the expected key, if configured.
#[derive(Clone)]
pub struct ApiKeyState {
    expected: Option<Arc<Secret<String>>>,
}

impl ApiKeyState {
    pub fn new(expected: Option<&str>) -> Self {
        Self {
            expected: expected
                .filter(|k| !k.trim().is_empty())
                .map(|k| Arc::new(Secret::new(k.to_string()))),
        }
    }

    /// State that rejects every request as unconfigured.
    pub fn unconfigured() -> Self {
        Self { expected: None }
    }

    fn matches(&self, provided: &str) -> Option<bool> {
        self.expected.as_ref().map(|expected| {
            bool::from(expected.expose_secret().as_bytes().ct_eq(provided.as_bytes()))
        })
    }
}

/// Rejects requests whose `x-api-key` does not match the configured secret.
pub async fn require_api_key(
    State(state): State<ApiKeyState>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    match state.matches(provided) {
        Some(true) => next.run(request).await,
        Some(false) => {
            tracing::warn!(
                key_present = !provided.is_empty(),
                "Rejected request with invalid API key"
            );
            rejection(StatusCode::UNAUTHORIZED, "Invalid or missing API key", "UNAUTHORIZED")
        }
        None => {
            tracing::error!("No API key configured, rejecting request");
            rejection(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server API key is not configured",
                "API_KEY_NOT_CONFIGURED",
            )
        }
    }
}

fn rejection(status: StatusCode, message: &str, code: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": message,
            "code": code
        })),
    )
        .into_response()
}
