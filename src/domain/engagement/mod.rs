//! Engagement lifecycle rules: when to stop and what to report.

mod report;
mod termination;

pub use report::{agent_notes, IntelligenceReport, NOTES_KEYWORD_LIMIT};
pub use termination::{EngagementSnapshot, TerminationPolicy, TerminationReason};
