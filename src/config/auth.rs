//! Inbound API authentication configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Shared-secret authentication for `POST /honeypot`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Expected value of the `x-api-key` header
    #[serde(default)]
    pub api_key: Option<Secret<String>>,
}

impl AuthConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(Secret::new(api_key.into())),
        }
    }

    /// The configured key, if any. Blank keys count as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .filter(|k| !k.trim().is_empty())
    }

    /// Validate authentication configuration
    ///
    /// Outside production a missing key is allowed; every request is then
    /// rejected with 500 until one is configured.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if *environment == Environment::Production && self.api_key().is_none() {
            return Err(ValidationError::MissingRequired("AUTH__API_KEY"));
        }
        Ok(())
    }
}
