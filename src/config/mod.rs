//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `HONEYPOT` prefix and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use scam_honeypot::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod ai;
mod auth;
mod callback;
mod engagement;
mod error;
mod personas;
mod server;

pub use ai::AiConfig;
pub use auth::AuthConfig;
pub use callback::CallbackConfig;
pub use engagement::EngagementConfig;
pub use error::{ConfigError, ValidationError};
pub use personas::PersonasConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a runnable
/// development configuration. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Shared secret for inbound requests
    #[serde(default)]
    pub auth: AuthConfig,

    /// Chat-completions provider
    #[serde(default)]
    pub ai: AiConfig,

    /// Lock-in, termination and idle thresholds
    #[serde(default)]
    pub engagement: EngagementConfig,

    /// Final report delivery
    #[serde(default)]
    pub callback: CallbackConfig,

    /// Persona library override
    #[serde(default)]
    pub personas: PersonasConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `HONEYPOT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `HONEYPOT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `HONEYPOT__AUTH__API_KEY=...` -> `auth.api_key = ...`
    /// - `HONEYPOT__ENGAGEMENT__IDLE_TIMEOUT_SECS=60` -> `engagement.idle_timeout_secs = 60`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("HONEYPOT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.ai.validate()?;
        self.engagement.validate()?;
        self.callback.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "HONEYPOT__SERVER__PORT",
        "HONEYPOT__SERVER__ENVIRONMENT",
        "HONEYPOT__AUTH__API_KEY",
        "HONEYPOT__AI__MODEL",
        "HONEYPOT__ENGAGEMENT__NON_SCAM_MAX_MESSAGES",
        "HONEYPOT__ENGAGEMENT__IDLE_TIMEOUT_SECS",
        "HONEYPOT__CALLBACK__URL",
        "HONEYPOT__CALLBACK__LOG_PAYLOAD",
        "HONEYPOT__PERSONAS__PATH",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment_uses_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();

        let config = AppConfig::load().expect("Should load with defaults");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.engagement.non_scam_max_messages, 3);
        assert!(config.personas.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_nested_values() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("HONEYPOT__SERVER__PORT", "3000");
        env::set_var("HONEYPOT__AUTH__API_KEY", "shared-secret");
        env::set_var("HONEYPOT__AI__MODEL", "openai/gpt-4o");
        env::set_var("HONEYPOT__ENGAGEMENT__NON_SCAM_MAX_MESSAGES", "5");
        env::set_var("HONEYPOT__ENGAGEMENT__IDLE_TIMEOUT_SECS", "90");
        env::set_var("HONEYPOT__CALLBACK__URL", "http://localhost:9000/report");
        env::set_var("HONEYPOT__CALLBACK__LOG_PAYLOAD", "true");
        env::set_var("HONEYPOT__PERSONAS__PATH", "/etc/honeypot/personas.yaml");

        let config = AppConfig::load().expect("Should load configuration");
        clear_env();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.api_key(), Some("shared-secret"));
        assert_eq!(config.ai.model, "openai/gpt-4o");
        assert_eq!(config.engagement.non_scam_max_messages, 5);
        assert_eq!(config.engagement.idle_timeout(), Duration::from_secs(90));
        assert_eq!(config.callback.url, "http://localhost:9000/report");
        assert!(config.callback.log_payload);
        assert_eq!(
            config.personas.path.as_deref(),
            Some(std::path::Path::new("/etc/honeypot/personas.yaml"))
        );
    }

    #[test]
    fn test_production_without_api_key_fails_validation() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("HONEYPOT__SERVER__ENVIRONMENT", "production");

        let config = AppConfig::load().expect("Should load configuration");
        clear_env();

        assert!(config.is_production());
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("AUTH__API_KEY"))
        );
    }

    #[test]
    fn test_unparseable_value_is_a_load_error() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("HONEYPOT__SERVER__PORT", "not-a-port");

        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
