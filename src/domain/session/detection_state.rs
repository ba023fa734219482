//! Detection verdict persisted on a session.

use serde::{Deserialize, Serialize};

/// Scam type recorded for sessions that are not (or not yet) scams.
pub const SCAM_TYPE_NONE: &str = "none";

/// Whether a session is considered fraudulent, and how sure we are.
///
/// # Invariants
///
/// - `confidence` is always within `[0, 1]`
/// - `is_scam == false` implies `scam_type == "none"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionState {
    is_scam: bool,
    scam_type: String,
    confidence: f64,
}

impl DetectionState {
    /// Creates a detection state, normalizing values onto the invariants.
    ///
    /// Non-finite confidence becomes 0, out-of-range confidence is clamped and
    /// a blank scam type on a scam verdict becomes `"unknown"`.
    pub fn new(is_scam: bool, scam_type: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let scam_type = if !is_scam {
            SCAM_TYPE_NONE.to_string()
        } else {
            let raw = scam_type.into();
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                "unknown".to_string()
            } else {
                trimmed.to_ascii_lowercase()
            }
        };

        Self {
            is_scam,
            scam_type,
            confidence,
        }
    }

    /// The state of a session with no confirmed scam.
    pub fn not_scam() -> Self {
        Self::new(false, SCAM_TYPE_NONE, 0.0)
    }

    pub fn is_scam(&self) -> bool {
        self.is_scam
    }

    pub fn scam_type(&self) -> &str {
        &self.scam_type
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

impl Default for DetectionState {
    fn default() -> Self {
        Self::not_scam()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_scam_forces_none_type() {
        let state = DetectionState::new(false, "phishing", 0.4);
        assert_eq!(state.scam_type(), SCAM_TYPE_NONE);
        assert!(!state.is_scam());
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(DetectionState::new(true, "lottery", 1.7).confidence(), 1.0);
        assert_eq!(DetectionState::new(true, "lottery", -0.2).confidence(), 0.0);
        assert_eq!(DetectionState::new(true, "lottery", f64::NAN).confidence(), 0.0);
    }

    #[test]
    fn blank_scam_type_on_scam_becomes_unknown() {
        let state = DetectionState::new(true, "  ", 0.9);
        assert_eq!(state.scam_type(), "unknown");
    }

    #[test]
    fn default_is_not_scam() {
        let state = DetectionState::default();
        assert!(!state.is_scam());
        assert_eq!(state.confidence(), 0.0);
    }
}
