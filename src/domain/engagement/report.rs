//! Final intelligence report sent to the report sink.

use serde::{Deserialize, Serialize};

use crate::domain::session::{ExtractedIntelligence, IntelCategory, Session};

/// Keywords listed in the notes before truncation.
pub const NOTES_KEYWORD_LIMIT: usize = 8;

/// Payload delivered to the report sink, in the sink's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelligenceReport {
    pub session_id: String,
    pub scam_detected: bool,
    pub total_messages_exchanged: usize,
    pub extracted_intelligence: ExtractedIntelligence,
    pub agent_notes: String,
}

impl IntelligenceReport {
    /// Builds the report from a session snapshot.
    pub fn from_session(session: &Session) -> Self {
        Self {
            session_id: session.id().to_string(),
            scam_detected: session.detection().is_scam(),
            total_messages_exchanged: session.total_messages(),
            extracted_intelligence: session.extracted().clone(),
            agent_notes: agent_notes(session.detection().scam_type(), session.extracted()),
        }
    }
}

/// Deterministic summary of what was captured.
///
/// `"Scam type: phishing. Keywords: otp, urgent. UPI IDs captured: 1."`
pub fn agent_notes(scam_type: &str, intel: &ExtractedIntelligence) -> String {
    let scam_type = if scam_type.trim().is_empty() {
        "unknown"
    } else {
        scam_type
    };
    let mut parts = vec![format!("Scam type: {}.", scam_type)];

    let keywords = intel.get(IntelCategory::SuspiciousKeywords);
    if !keywords.is_empty() {
        let listed: Vec<&str> = keywords
            .iter()
            .take(NOTES_KEYWORD_LIMIT)
            .map(String::as_str)
            .collect();
        parts.push(format!("Keywords: {}.", listed.join(", ")));
    }

    for (category, label) in [
        (IntelCategory::UpiIds, "UPI IDs"),
        (IntelCategory::BankAccounts, "Bank accounts"),
        (IntelCategory::PhoneNumbers, "Phone numbers"),
        (IntelCategory::PhishingLinks, "Links"),
    ] {
        let count = intel.get(category).len();
        if count > 0 {
            parts.push(format!("{} captured: {}.", label, count));
        }
    }

    parts.join(" ")
}
