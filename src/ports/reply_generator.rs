//! Reply generator port.
//!
//! Produces the decoy agent's next in-character message. Prompt content and
//! model choice belong to the adapter.

use async_trait::async_trait;

use crate::domain::foundation::SessionId;
use crate::domain::persona::Persona;
use crate::domain::session::{DetectionState, Message};

/// Everything a generator needs to produce one reply.
#[derive(Debug, Clone)]
pub struct ReplyRequest {
    pub session_id: SessionId,
    /// The counterparty message being answered.
    pub message: String,
    /// Prior conversation, oldest first, excluding `message`.
    pub history: Vec<Message>,
    pub persona: Persona,
    pub detection: DetectionState,
}

/// Reply generation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplyError {
    /// Upstream quota or rate limit; the caller should retry later.
    #[error("reply generation quota exceeded")]
    QuotaExceeded {
        retry_after_secs: Option<u32>,
    },

    #[error("reply generation failed: {0}")]
    Failed(String),
}

impl ReplyError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Port for in-character reply generation.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, request: ReplyRequest) -> Result<String, ReplyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_generator_is_object_safe() {
        fn _accepts_dyn(_g: &dyn ReplyGenerator) {}
    }

    #[test]
    fn failed_error_carries_message() {
        assert_eq!(
            ReplyError::failed("boom").to_string(),
            "reply generation failed: boom"
        );
    }
}
