//! Session store port.
//!
//! Concurrent key-value state for engagement sessions. The store holds no
//! business rules of its own; it applies `Session` methods atomically so that
//! concurrent requests and idle checks never observe a half-applied mutation.

use async_trait::async_trait;

use crate::domain::foundation::SessionId;
use crate::domain::persona::PersonaId;
use crate::domain::session::{DetectionState, IntelCategory, Message, ReportRefusal, Session};

/// Errors from session store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Report refused for session {session_id}: {reason}")]
    ReportRefused {
        session_id: SessionId,
        reason: ReportRefusal,
    },
}

impl SessionStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionStoreError::NotFound(_))
    }
}

/// Port for session state.
///
/// Every operation is atomic with respect to every other. Methods returning
/// `bool` report whether the call changed anything.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create the session unless it exists; returns a snapshot either way.
    async fn create_if_absent(&self, id: &SessionId) -> Result<Session, SessionStoreError>;

    /// Snapshot of a session, if present.
    async fn get(&self, id: &SessionId) -> Result<Option<Session>, SessionStoreError>;

    async fn exists(&self, id: &SessionId) -> Result<bool, SessionStoreError>;

    /// Append a message; returns the idle epoch after the append.
    async fn append_message(
        &self,
        id: &SessionId,
        message: Message,
    ) -> Result<u64, SessionStoreError>;

    /// Replace the history if `messages` is strictly longer than the current log.
    async fn replace_messages(
        &self,
        id: &SessionId,
        messages: Vec<Message>,
    ) -> Result<bool, SessionStoreError>;

    async fn update_detection(
        &self,
        id: &SessionId,
        detection: DetectionState,
    ) -> Result<bool, SessionStoreError>;

    async fn update_persona(
        &self,
        id: &SessionId,
        persona_id: PersonaId,
    ) -> Result<bool, SessionStoreError>;

    async fn add_extracted(
        &self,
        id: &SessionId,
        category: IntelCategory,
        value: &str,
    ) -> Result<bool, SessionStoreError>;

    /// Idempotent; returns true only on the transition.
    async fn mark_completed(&self, id: &SessionId) -> Result<bool, SessionStoreError>;

    async fn idle_epoch(&self, id: &SessionId) -> Result<u64, SessionStoreError>;

    /// Take the report lease and return the snapshot to report on.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session is absent
    /// - `ReportRefused` if completed, not a scam, already in flight, or the
    ///   idle epoch no longer matches `expected_epoch`
    async fn begin_report(
        &self,
        id: &SessionId,
        expected_epoch: Option<u64>,
    ) -> Result<Session, SessionStoreError>;

    /// Release the lease; `delivered` completes the session.
    async fn finish_report(&self, id: &SessionId, delivered: bool)
        -> Result<bool, SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SessionStore) {}
    }

    #[test]
    fn refusal_renders_reason() {
        let err = SessionStoreError::ReportRefused {
            session_id: SessionId::new("abc").unwrap(),
            reason: ReportRefusal::InFlight,
        };
        assert_eq!(
            err.to_string(),
            "Report refused for session abc: report already in flight"
        );
        assert!(!err.is_not_found());
    }
}
