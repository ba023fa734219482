//! Engagement thresholds

use serde::Deserialize;
use std::time::Duration;

use crate::domain::engagement::TerminationPolicy;

use super::error::ValidationError;

/// When to stop talking to a counterparty.
#[derive(Debug, Clone, Deserialize)]
pub struct EngagementConfig {
    /// Counterparty messages without a confirmed scam before the session is closed
    #[serde(default = "default_non_scam_max_messages")]
    pub non_scam_max_messages: usize,

    #[serde(default = "default_min_scammer_turns")]
    pub min_scammer_turns: usize,

    #[serde(default = "default_min_intel_categories")]
    pub min_intel_categories: usize,

    #[serde(default = "default_max_scammer_turns")]
    pub max_scammer_turns: usize,

    #[serde(default = "default_max_total_messages")]
    pub max_total_messages: usize,

    /// Silence after which a scam session is reported
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl EngagementConfig {
    pub fn termination_policy(&self) -> TerminationPolicy {
        TerminationPolicy {
            min_scammer_turns: self.min_scammer_turns,
            min_intel_categories: self.min_intel_categories,
            max_scammer_turns: self.max_scammer_turns,
            max_total_messages: self.max_total_messages,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Validate engagement thresholds
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.non_scam_max_messages == 0 {
            return Err(ValidationError::InvalidThreshold(
                "engagement.non_scam_max_messages must be at least 1",
            ));
        }
        if self.max_scammer_turns == 0 || self.max_total_messages == 0 {
            return Err(ValidationError::InvalidThreshold(
                "engagement caps must be at least 1",
            ));
        }
        if self.min_scammer_turns > self.max_scammer_turns {
            return Err(ValidationError::InvalidThreshold(
                "engagement.min_scammer_turns exceeds max_scammer_turns",
            ));
        }
        if self.min_intel_categories > 4 {
            return Err(ValidationError::InvalidThreshold(
                "engagement.min_intel_categories exceeds the 4 high-value categories",
            ));
        }
        if self.idle_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("engagement.idle_timeout_secs"));
        }
        Ok(())
    }
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            non_scam_max_messages: default_non_scam_max_messages(),
            min_scammer_turns: default_min_scammer_turns(),
            min_intel_categories: default_min_intel_categories(),
            max_scammer_turns: default_max_scammer_turns(),
            max_total_messages: default_max_total_messages(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

fn default_non_scam_max_messages() -> usize {
    3
}

fn default_min_scammer_turns() -> usize {
    4
}

fn default_min_intel_categories() -> usize {
    2
}

fn default_max_scammer_turns() -> usize {
    10
}

fn default_max_total_messages() -> usize {
    24
}

fn default_idle_timeout() -> u64 {
    45
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_termination_policy_defaults() {
        let config = EngagementConfig::default();
        assert_eq!(config.termination_policy(), TerminationPolicy::default());
        assert_eq!(config.idle_timeout(), Duration::from_secs(45));
        assert_eq!(config.non_scam_max_messages, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_min_turns_above_cap_is_rejected() {
        let config = EngagementConfig {
            min_scammer_turns: 12,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_zero_lock_in_threshold_is_rejected() {
        let config = EngagementConfig {
            non_scam_max_messages: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_idle_timeout_is_rejected() {
        let config = EngagementConfig {
            idle_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidTimeout("engagement.idle_timeout_secs"))
        );
    }
}
