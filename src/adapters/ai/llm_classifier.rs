//! LLM-backed SemanticClassifier.
//!
//! Asks a chat-completion model for a strict JSON verdict and parses it. The
//! whole call is bounded by a deadline; any failure surfaces as a
//! `ClassifierError` so the pipeline can fall back to the rule verdict.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::detection::round2;
use crate::domain::session::SCAM_TYPE_NONE;
use crate::ports::{
    AIError, AIProvider, ChatRole, ClassifierError, CompletionRequest, RequestMetadata,
    SemanticClassifier, SemanticVerdict,
};

/// Scam types the model is allowed to answer with.
pub const SEMANTIC_SCAM_TYPES: [&str; 8] = [
    "phishing",
    "lottery",
    "investment",
    "tech_support",
    "romance",
    "job_offer",
    "impersonation",
    SCAM_TYPE_NONE,
];

const DEFAULT_TEMPERATURE: f32 = 0.2;
const MAX_TOKENS: u32 = 400;

/// Semantic classifier built on an `AIProvider`.
pub struct LlmSemanticClassifier {
    ai_provider: Arc<dyn AIProvider>,
    timeout: Duration,
    temperature: f32,
}

impl LlmSemanticClassifier {
    pub fn new(ai_provider: Arc<dyn AIProvider>, timeout: Duration) -> Self {
        Self {
            ai_provider,
            timeout,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn system_prompt() -> String {
        format!(
            r#"You are a fraud analyst. Judge a single message by its intent, not by keywords alone.

Rules you must apply:
- A request for an OTP, password, PIN or CVV is always a scam.
- "Suspicious activity" or "secure your account" combined with a credential request is phishing.
- Urgency combined with a payment or credential request is a scam.
- Legitimate companies never ask for one-time codes over chat.
- Messages that only warn the reader NOT to share codes are not scams.

Allowed scam_type values: {}.

Respond with ONLY a JSON object, no prose:
{{
  "is_scam": true | false,
  "scam_type": "<one allowed value>",
  "confidence": 0.0-1.0,
  "reasoning": "one short sentence",
  "red_flags": ["short flag", "..."]
}}"#,
            SEMANTIC_SCAM_TYPES.join(", ")
        )
    }

    fn user_prompt(text: &str) -> String {
        format!("MESSAGE TO ANALYZE:\n\"{}\"", text)
    }

    /// Parse the model's answer into a verdict.
    fn parse_verdict(response: &str) -> Result<SemanticVerdict, ClassifierError> {
        let json = strip_code_fence(response);
        let raw: RawVerdict = serde_json::from_str(json)
            .map_err(|e| ClassifierError::MalformedOutput(e.to_string()))?;

        if !raw.confidence.is_finite() {
            return Err(ClassifierError::MalformedOutput(
                "confidence is not a number".to_string(),
            ));
        }

        let scam_type = raw.scam_type.trim().to_lowercase();
        let scam_type = if SEMANTIC_SCAM_TYPES.contains(&scam_type.as_str()) {
            scam_type
        } else if raw.is_scam {
            "unknown".to_string()
        } else {
            SCAM_TYPE_NONE.to_string()
        };

        Ok(
            SemanticVerdict::new(raw.is_scam, scam_type, round2(raw.confidence.clamp(0.0, 1.0)))
                .with_reasoning(raw.reasoning)
                .with_flags(raw.red_flags),
        )
    }
}

/// Models often wrap JSON in a markdown fence.
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    is_scam: bool,
    #[serde(default)]
    scam_type: String,
    confidence: f64,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    red_flags: Vec<String>,
}

#[async_trait]
impl SemanticClassifier for LlmSemanticClassifier {
    async fn classify(&self, text: &str) -> Result<SemanticVerdict, ClassifierError> {
        let request = CompletionRequest::new(RequestMetadata::new(None))
            .with_system_prompt(Self::system_prompt())
            .with_message(ChatRole::User, Self::user_prompt(text))
            .with_temperature(self.temperature)
            .with_max_tokens(MAX_TOKENS);

        let response = tokio::time::timeout(self.timeout, self.ai_provider.complete(request))
            .await
            .map_err(|_| ClassifierError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| match e {
                AIError::Timeout { timeout_secs } => ClassifierError::Timeout(timeout_secs.into()),
                other => ClassifierError::Provider(other.to_string()),
            })?;

        Self::parse_verdict(&response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};

    fn classifier(provider: MockAIProvider) -> LlmSemanticClassifier {
        LlmSemanticClassifier::new(Arc::new(provider), Duration::from_secs(2))
    }

    #[tokio::test]
    async fn parses_plain_json_verdict() {
        let provider = MockAIProvider::new().with_response(
            r#"{"is_scam": true, "scam_type": "phishing", "confidence": 0.934,
                "reasoning": "asks for OTP", "red_flags": ["otp request"]}"#,
        );

        let verdict = classifier(provider).classify("share your OTP").await.unwrap();
        assert!(verdict.is_scam);
        assert_eq!(verdict.scam_type, "phishing");
        assert_eq!(verdict.confidence, 0.93);
        assert_eq!(verdict.flags, vec!["otp request".to_string()]);
    }

    #[tokio::test]
    async fn accepts_fenced_json() {
        let provider = MockAIProvider::new().with_response(
            "```json\n{\"is_scam\": false, \"scam_type\": \"none\", \"confidence\": 0.1}\n```",
        );

        let verdict = classifier(provider).classify("see you at lunch").await.unwrap();
        assert!(!verdict.is_scam);
        assert_eq!(verdict.scam_type, "none");
    }

    #[tokio::test]
    async fn unknown_scam_type_is_normalized() {
        let provider = MockAIProvider::new()
            .with_response(r#"{"is_scam": true, "scam_type": "crypto", "confidence": 1.7}"#);

        let verdict = classifier(provider).classify("x").await.unwrap();
        assert_eq!(verdict.scam_type, "unknown");
        assert_eq!(verdict.confidence, 1.0);
    }

    #[tokio::test]
    async fn prose_is_malformed_output() {
        let provider = MockAIProvider::new().with_response("I think this is a scam.");
        let err = classifier(provider).classify("x").await.unwrap_err();
        assert!(matches!(err, ClassifierError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn provider_errors_are_mapped() {
        let provider = MockAIProvider::new().with_error(MockError::AuthenticationFailed);
        let err = classifier(provider).classify("x").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Provider(_)));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let provider = MockAIProvider::new()
            .with_response(r#"{"is_scam": true, "scam_type": "phishing", "confidence": 0.9}"#)
            .with_delay(Duration::from_millis(200));
        let classifier =
            LlmSemanticClassifier::new(Arc::new(provider), Duration::from_millis(20));

        let err = classifier.classify("x").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Timeout(_)));
    }

    #[tokio::test]
    async fn request_uses_low_temperature() {
        let provider = MockAIProvider::new()
            .with_response(r#"{"is_scam": false, "scam_type": "none", "confidence": 0.0}"#);
        let classifier = classifier(provider.clone());

        classifier.classify("hello").await.unwrap();
        let calls = provider.get_calls();
        assert_eq!(calls[0].temperature, Some(0.2));
        assert!(calls[0].messages[0].content.contains("hello"));
    }
}
