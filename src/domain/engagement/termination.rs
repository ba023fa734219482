//! Termination policy: when to stop engaging and report.

use serde::{Deserialize, Serialize};

use crate::domain::session::Session;

/// Thresholds that close an engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationPolicy {
    /// Scammer turns required before "enough intelligence" can trigger.
    pub min_scammer_turns: usize,
    /// High-value categories required for "enough intelligence".
    pub min_intel_categories: usize,
    /// Hard cap on scammer turns.
    pub max_scammer_turns: usize,
    /// Hard cap on total messages.
    pub max_total_messages: usize,
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self {
            min_scammer_turns: 4,
            min_intel_categories: 2,
            max_scammer_turns: 10,
            max_total_messages: 24,
        }
    }
}

/// Why a session should be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    EnoughIntelligence,
    ScammerTurnCap,
    MessageCap,
    /// The counterparty went silent (idle path).
    Idle,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::EnoughIntelligence => "enough_intelligence",
            TerminationReason::ScammerTurnCap => "scammer_turn_cap",
            TerminationReason::MessageCap => "message_cap",
            TerminationReason::Idle => "idle",
        }
    }
}

/// Counters the policy decides on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementSnapshot {
    pub is_scam: bool,
    pub completed: bool,
    pub scammer_turns: usize,
    pub intel_coverage: usize,
    pub total_messages: usize,
}

impl EngagementSnapshot {
    pub fn of(session: &Session) -> Self {
        Self {
            is_scam: session.detection().is_scam(),
            completed: session.is_completed(),
            scammer_turns: session.scammer_turns(),
            intel_coverage: session.extracted().high_value_coverage(),
            total_messages: session.total_messages(),
        }
    }
}

impl TerminationPolicy {
    /// Returns the first reason that applies, or `None` to keep engaging.
    ///
    /// Never fires for non-scam or already completed sessions.
    pub fn evaluate(&self, snapshot: &EngagementSnapshot) -> Option<TerminationReason> {
        if !snapshot.is_scam || snapshot.completed {
            return None;
        }

        if snapshot.scammer_turns >= self.min_scammer_turns
            && snapshot.intel_coverage >= self.min_intel_categories
        {
            return Some(TerminationReason::EnoughIntelligence);
        }
        if snapshot.scammer_turns >= self.max_scammer_turns {
            return Some(TerminationReason::ScammerTurnCap);
        }
        if snapshot.total_messages >= self.max_total_messages {
            return Some(TerminationReason::MessageCap);
        }
        None
    }

    pub fn should_terminate(&self, session: &Session) -> Option<TerminationReason> {
        self.evaluate(&EngagementSnapshot::of(session))
    }
}
