//! Session aggregate entity.
//!
//! A session is created the first time the channel references a session id
//! and lives for the rest of the process. All mutation goes through the
//! `SessionStore` port, which applies these methods under its lock.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::persona::PersonaId;

use super::{DetectionState, ExtractedIntelligence, IntelCategory, Message};

/// Session aggregate - one counterparty conversation.
///
/// # Invariants
///
/// - `messages` is append-only, except for wholesale replacement by a
///   strictly longer authoritative history
/// - `total_messages == messages.len()`
/// - `idle_epoch` grows by exactly 1 per counterparty message appended
/// - once `completed`, detection, persona and intelligence are frozen
/// - at most one report lease is outstanding
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    id: SessionId,
    messages: Vec<Message>,
    detection: DetectionState,
    persona_id: Option<PersonaId>,
    extracted: ExtractedIntelligence,
    total_messages: usize,
    completed: bool,
    last_counterparty_activity: Option<Timestamp>,
    /// Monotonic twin of `last_counterparty_activity`; idle checks use this.
    #[serde(skip)]
    last_counterparty_instant: Option<Instant>,
    idle_epoch: u64,
    report_in_flight: bool,
    created_at: Timestamp,
}

/// Why a report lease could not be granted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportRefusal {
    /// The session is already closed.
    #[error("session already completed")]
    Completed,
    /// There is nothing to report on a non-scam session.
    #[error("session is not a confirmed scam")]
    NotScam,
    /// Another caller holds the lease.
    #[error("report already in flight")]
    InFlight,
    /// A newer counterparty message arrived after the idle check was scheduled.
    #[error("idle epoch moved from {expected} to {current}")]
    StaleEpoch { expected: u64, current: u64 },
}

impl Session {
    /// Create a fresh session with no messages.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            messages: Vec::new(),
            detection: DetectionState::default(),
            persona_id: None,
            extracted: ExtractedIntelligence::new(),
            total_messages: 0,
            completed: false,
            last_counterparty_activity: None,
            last_counterparty_instant: None,
            idle_epoch: 0,
            report_in_flight: false,
            created_at: Timestamp::now(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn detection(&self) -> &DetectionState {
        &self.detection
    }

    pub fn persona_id(&self) -> Option<&PersonaId> {
        self.persona_id.as_ref()
    }

    pub fn extracted(&self) -> &ExtractedIntelligence {
        &self.extracted
    }

    pub fn total_messages(&self) -> usize {
        self.total_messages
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn last_counterparty_activity(&self) -> Option<&Timestamp> {
        self.last_counterparty_activity.as_ref()
    }

    /// How long the counterparty has been silent, on the monotonic clock.
    pub fn counterparty_quiet_for(&self) -> Option<Duration> {
        self.last_counterparty_instant.map(|at| at.elapsed())
    }

    pub fn idle_epoch(&self) -> u64 {
        self.idle_epoch
    }

    pub fn is_report_in_flight(&self) -> bool {
        self.report_in_flight
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Number of messages authored by the counterparty.
    pub fn scammer_turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.is_from_counterparty())
            .count()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a message, returning the idle epoch after the append.
    ///
    /// Counterparty messages bump the idle epoch and refresh the activity
    /// timestamp in the same step.
    pub fn append_message(&mut self, message: Message) -> u64 {
        if message.is_from_counterparty() {
            self.idle_epoch += 1;
            self.last_counterparty_activity = Some(Timestamp::now());
            self.last_counterparty_instant = Some(Instant::now());
        }
        self.messages.push(message);
        self.total_messages = self.messages.len();
        self.idle_epoch
    }

    /// Replace the log with an authoritative history, if strictly longer.
    ///
    /// The replacement did not come from the live channel, so idle tracking is
    /// reset as if the counterparty had never been active. Returns true if the
    /// history was replaced.
    pub fn replace_messages(&mut self, messages: Vec<Message>) -> bool {
        if messages.len() <= self.messages.len() {
            return false;
        }
        self.messages = messages;
        self.total_messages = self.messages.len();
        self.last_counterparty_activity = None;
        self.last_counterparty_instant = None;
        self.idle_epoch = 0;
        true
    }

    /// Record a detection verdict. Ignored once completed.
    pub fn record_detection(&mut self, detection: DetectionState) -> bool {
        if self.completed {
            return false;
        }
        self.detection = detection;
        true
    }

    /// Assign the persona. Ignored once completed.
    pub fn assign_persona(&mut self, persona_id: PersonaId) -> bool {
        if self.completed {
            return false;
        }
        self.persona_id = Some(persona_id);
        true
    }

    /// Add a harvested value. Ignored once completed, when empty, or when
    /// already present.
    pub fn add_extracted(&mut self, category: IntelCategory, value: &str) -> bool {
        if self.completed {
            return false;
        }
        self.extracted.insert(category, value)
    }

    /// Close the session. Returns true only on the transition.
    pub fn mark_completed(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.report_in_flight = false;
        true
    }

    /// Take the report lease.
    ///
    /// When `expected_epoch` is given (idle path) the lease is only granted if
    /// no counterparty message arrived since that epoch was captured.
    pub fn begin_report(&mut self, expected_epoch: Option<u64>) -> Result<(), ReportRefusal> {
        if self.completed {
            return Err(ReportRefusal::Completed);
        }
        if !self.detection.is_scam() {
            return Err(ReportRefusal::NotScam);
        }
        if self.report_in_flight {
            return Err(ReportRefusal::InFlight);
        }
        if let Some(expected) = expected_epoch {
            if expected != self.idle_epoch {
                return Err(ReportRefusal::StaleEpoch {
                    expected,
                    current: self.idle_epoch,
                });
            }
        }
        self.report_in_flight = true;
        Ok(())
    }

    /// Release the report lease; a delivered report completes the session.
    ///
    /// Returns true if this call completed the session.
    pub fn finish_report(&mut self, delivered: bool) -> bool {
        if !self.report_in_flight {
            return false;
        }
        self.report_in_flight = false;
        if delivered {
            self.mark_completed()
        } else {
            false
        }
    }
}
