//! HTTP DTOs for the honeypot endpoint.
//!
//! Field names follow the channel's wire format: camelCase on the request,
//! snake_case on the response except `sessionId`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::application::handlers::honeypot::ProcessMessageResult;
use crate::domain::session::{ExtractedIntelligence, Message, Sender};
use crate::ports::CallbackOutcome;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// One inbound message on the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePayload {
    pub sender: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl From<MessagePayload> for Message {
    fn from(payload: MessagePayload) -> Self {
        Message::new(Sender::from(payload.sender), payload.text, payload.timestamp)
    }
}

/// Body of `POST /honeypot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoneypotRequest {
    pub session_id: String,
    pub message: MessagePayload,
    /// Full conversation so far, as the channel sees it.
    #[serde(default)]
    pub conversation_history: Option<Vec<MessagePayload>>,
    /// Channel metadata (channel, language, locale). Logged, not interpreted.
    #[serde(default)]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body returned for every processed turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoneypotResponse {
    pub status: String,
    pub reply: String,
    /// Same text as `reply`.
    pub generated_response: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub is_scam: bool,
    pub scam_type: String,
    pub confidence: f64,
    pub persona: Option<String>,
    pub intelligence: ExtractedIntelligence,
    pub agent_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<CallbackOutcome>,
}

impl From<ProcessMessageResult> for HoneypotResponse {
    fn from(result: ProcessMessageResult) -> Self {
        Self {
            status: "success".to_string(),
            generated_response: result.reply.clone(),
            reply: result.reply,
            session_id: result.session_id.to_string(),
            is_scam: result.detection.is_scam(),
            scam_type: result.detection.scam_type().to_string(),
            confidence: result.detection.confidence(),
            persona: result.persona.map(|p| p.as_str().to_string()),
            intelligence: result.intelligence,
            agent_active: result.agent_active,
            note: result.note,
            callback: result.callback,
        }
    }
}

/// Liveness probe body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
    pub service: String,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Create an error response with details.
    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}
