//! HTTP handlers for the honeypot endpoint.
//!
//! These handlers connect Axum routes to the per-turn orchestrator.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::honeypot::{
    ProcessMessageCommand, ProcessMessageError, ProcessMessageHandler,
};
use crate::domain::foundation::SessionId;
use crate::domain::session::Message;

use super::dto::{ErrorResponse, HoneypotRequest, HoneypotResponse, LivenessResponse};

/// Retry-After used when the provider gave no hint.
const DEFAULT_RETRY_AFTER_SECS: u32 = 30;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state.
///
/// Cloned for each request; the orchestrator is shared behind an `Arc`.
#[derive(Clone)]
pub struct HoneypotAppState {
    pub process_message: Arc<ProcessMessageHandler>,
}

impl HoneypotAppState {
    pub fn new(process_message: Arc<ProcessMessageHandler>) -> Self {
        Self { process_message }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET / - Liveness probe
pub async fn liveness() -> impl IntoResponse {
    Json(LivenessResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
    })
}

/// POST /honeypot - Process one inbound message
pub async fn post_honeypot(
    State(state): State<HoneypotAppState>,
    Json(request): Json<HoneypotRequest>,
) -> Result<impl IntoResponse, HoneypotApiError> {
    let session_id = SessionId::new(request.session_id)
        .map_err(|e| HoneypotApiError::BadRequest(e.to_string()))?;

    if let Some(ref metadata) = request.metadata {
        tracing::debug!(session_id = %session_id, metadata = ?metadata, "Channel metadata");
    }

    let command = ProcessMessageCommand {
        session_id,
        message: Message::from(request.message),
        history: request
            .conversation_history
            .unwrap_or_default()
            .into_iter()
            .map(Message::from)
            .collect(),
    };

    let result = state.process_message.handle(command).await?;
    Ok(Json(HoneypotResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts application errors to HTTP responses.
#[derive(Debug)]
pub enum HoneypotApiError {
    BadRequest(String),
    QuotaExceeded { retry_after_secs: Option<u32> },
    ReplyFailed(String),
    Internal(String),
}

impl From<ProcessMessageError> for HoneypotApiError {
    fn from(err: ProcessMessageError) -> Self {
        match err {
            ProcessMessageError::QuotaExceeded { retry_after_secs } => {
                HoneypotApiError::QuotaExceeded { retry_after_secs }
            }
            ProcessMessageError::ReplyFailed(message) => HoneypotApiError::ReplyFailed(message),
            ProcessMessageError::Store(e) => HoneypotApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for HoneypotApiError {
    fn into_response(self) -> Response {
        match self {
            HoneypotApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("bad_request", message)),
            )
                .into_response(),
            HoneypotApiError::QuotaExceeded { retry_after_secs } => {
                let retry_after = retry_after_secs.unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                tracing::warn!(retry_after, "Reply generation out of quota");
                let body = ErrorResponse::with_details(
                    "service_unavailable",
                    "Reply generation is temporarily unavailable",
                    serde_json::json!({ "retry_after_secs": retry_after }),
                );
                let mut response = (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
                response
            }
            HoneypotApiError::ReplyFailed(message) => {
                tracing::error!(error = %message, "Reply generation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("reply_failed", message)),
                )
                    .into_response()
            }
            HoneypotApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal error processing message");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("internal_error", message)),
                )
                    .into_response()
            }
        }
    }
}
