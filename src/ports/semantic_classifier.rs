//! Semantic classifier port.
//!
//! Second-stage scam classification. Receives only the message text and
//! returns the same verdict shape as the rule layer plus free-text reasoning.
//! Any failure is non-fatal: the detection pipeline falls back to stage 1.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Verdict returned by a semantic classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticVerdict {
    pub is_scam: bool,
    pub scam_type: String,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub flags: Vec<String>,
}

impl SemanticVerdict {
    pub fn new(is_scam: bool, scam_type: impl Into<String>, confidence: f64) -> Self {
        Self {
            is_scam,
            scam_type: scam_type.into(),
            confidence,
            reasoning: String::new(),
            flags: Vec::new(),
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn with_flags(mut self, flags: Vec<String>) -> Self {
        self.flags = flags;
        self
    }
}

/// Semantic classifier failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier timed out after {0}s")]
    Timeout(u64),

    #[error("classifier returned malformed output: {0}")]
    MalformedOutput(String),

    #[error("classifier provider failed: {0}")]
    Provider(String),

    #[error("classifier not configured")]
    NotConfigured,
}

/// Port for the semantic (stage 2) classifier.
#[async_trait]
pub trait SemanticClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<SemanticVerdict, ClassifierError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_classifier_is_object_safe() {
        fn _accepts_dyn(_c: &dyn SemanticClassifier) {}
    }

    #[test]
    fn verdict_builder_sets_optional_fields() {
        let verdict = SemanticVerdict::new(true, "phishing", 0.95)
            .with_reasoning("asks for OTP")
            .with_flags(vec!["credential_request".into()]);
        assert_eq!(verdict.reasoning, "asks for OTP");
        assert_eq!(verdict.flags.len(), 1);
    }
}
