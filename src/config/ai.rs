//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Chat-completions provider settings shared by the semantic classifier and
/// the reply generator.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Provider API key. Without one the service runs offline.
    #[serde(default)]
    pub api_key: Option<Secret<String>>,

    /// OpenAI-compatible base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries for transient provider failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Upper bound for one semantic classification, in seconds
    #[serde(default = "default_classifier_timeout")]
    pub classifier_timeout_secs: u64,

    #[serde(default = "default_reply_temperature")]
    pub reply_temperature: f32,

    #[serde(default = "default_classifier_temperature")]
    pub classifier_temperature: f32,
}

impl AiConfig {
    /// The configured key, if any. Blank keys count as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(self.classifier_timeout_secs)
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidUrl("ai.base_url"));
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AI__MODEL"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("ai.timeout_secs"));
        }
        if self.classifier_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("ai.classifier_timeout_secs"));
        }
        if !(0.0..=2.0).contains(&self.reply_temperature) {
            return Err(ValidationError::InvalidTemperature("ai.reply_temperature"));
        }
        if !(0.0..=2.0).contains(&self.classifier_temperature) {
            return Err(ValidationError::InvalidTemperature("ai.classifier_temperature"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            classifier_timeout_secs: default_classifier_timeout(),
            reply_temperature: default_reply_temperature(),
            classifier_temperature: default_classifier_temperature(),
        }
    }
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_classifier_timeout() -> u64 {
    8
}

fn default_reply_temperature() -> f32 {
    0.7
}

fn default_classifier_temperature() -> f32 {
    0.2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.model, "openai/gpt-4o-mini");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.classifier_timeout(), Duration::from_secs(8));
        assert!(!config.has_api_key());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_key_is_no_key() {
        let config = AiConfig {
            api_key: Some(Secret::new("  ".to_string())),
            ..Default::default()
        };
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_validation_rejects_bad_base_url() {
        let config = AiConfig {
            base_url: "openrouter.ai".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidUrl("ai.base_url"))
        );
    }

    #[test]
    fn test_validation_rejects_temperature_out_of_range() {
        let config = AiConfig {
            reply_temperature: 2.5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidTemperature("ai.reply_temperature"))
        );
    }

    #[test]
    fn test_validation_rejects_zero_classifier_timeout() {
        let config = AiConfig {
            classifier_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
