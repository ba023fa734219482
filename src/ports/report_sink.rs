//! Report sink port.
//!
//! Delivers the final intelligence report. Implementations own their retry
//! policy and always return an outcome rather than an error: a failed delivery
//! is a normal result that leaves the session open.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::engagement::IntelligenceReport;

/// Result of a delivery attempt sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackOutcome {
    pub ok: bool,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

impl CallbackOutcome {
    pub fn delivered(status_code: u16) -> Self {
        Self {
            ok: true,
            status_code: Some(status_code),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            status_code: None,
            error: Some(error.into()),
        }
    }
}

/// Port for delivering intelligence reports.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn deliver(&self, report: &IntelligenceReport) -> CallbackOutcome;
}
