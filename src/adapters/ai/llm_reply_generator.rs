//! LLM-backed ReplyGenerator.
//!
//! Builds an in-character prompt from the persona descriptor and the
//! conversation transcript, then asks the provider for the next line.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::persona::Persona;
use crate::domain::session::Message;
use crate::ports::{
    AIError, AIProvider, ChatRole, CompletionRequest, ReplyError, ReplyGenerator, ReplyRequest,
    RequestMetadata,
};

const DEFAULT_TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 300;

/// Reply generator built on an `AIProvider`.
pub struct LlmReplyGenerator {
    ai_provider: Arc<dyn AIProvider>,
    temperature: f32,
}

impl LlmReplyGenerator {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self {
            ai_provider,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn system_prompt(persona: &Persona) -> String {
        let mut prompt = persona.system_prompt.trim().to_string();

        if !persona.goal.trim().is_empty() {
            prompt.push_str("\n\nYOUR GOAL: ");
            prompt.push_str(persona.goal.trim());
        }
        if !persona.style_guide.trim().is_empty() {
            prompt.push_str("\n\nSTYLE GUIDE:\n");
            prompt.push_str(persona.style_guide.trim());
        }

        prompt.push_str(
            "\n\nCURRENT SCENARIO:\n\
             You are in a chat. You suspect or know the other person is a scammer (or a stranger).\n\
             Play your role convincingly and keep them talking.\n\
             NEVER break character. Never reveal you are an AI or that you suspect a scam.\n\
             Reply with the message text only.",
        );
        prompt
    }

    fn user_prompt(history: &[Message], message: &str) -> String {
        let transcript: String = history
            .iter()
            .map(|m| format!("{}: {}\n", m.sender.as_str(), m.text))
            .collect();

        format!(
            "CONVERSATION HISTORY:\n{}\n\nNEW MESSAGE:\n{}\n\nReply:",
            transcript, message
        )
    }
}

impl From<AIError> for ReplyError {
    fn from(err: AIError) -> Self {
        match err {
            AIError::RateLimited { retry_after_secs } => ReplyError::QuotaExceeded {
                retry_after_secs: Some(retry_after_secs),
            },
            AIError::QuotaExceeded(_) => ReplyError::QuotaExceeded {
                retry_after_secs: None,
            },
            other => ReplyError::failed(other.to_string()),
        }
    }
}

#[async_trait]
impl ReplyGenerator for LlmReplyGenerator {
    async fn generate(&self, request: ReplyRequest) -> Result<String, ReplyError> {
        let completion = CompletionRequest::new(RequestMetadata::new(Some(
            request.session_id.clone(),
        )))
        .with_system_prompt(Self::system_prompt(&request.persona))
        .with_message(
            ChatRole::User,
            Self::user_prompt(&request.history, &request.message),
        )
        .with_temperature(self.temperature)
        .with_max_tokens(MAX_TOKENS);

        let response = self.ai_provider.complete(completion).await?;
        let reply = response.content.trim();

        if reply.is_empty() {
            return Err(ReplyError::failed("provider returned an empty reply"));
        }
        Ok(reply.to_string())
    }
}
