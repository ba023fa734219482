//! ReportDispatcher - delivers a session's final report exactly once.
//!
//! The session store grants a report lease atomically. Whoever holds it builds
//! the report from the leased snapshot, hands it to the sink and releases the
//! lease with the delivery result. Only a delivered report completes the
//! session; a failed one leaves it open for the next trigger.

use std::sync::Arc;

use crate::domain::engagement::{IntelligenceReport, TerminationReason};
use crate::domain::foundation::SessionId;
use crate::domain::session::ReportRefusal;
use crate::ports::{CallbackOutcome, ReportSink, SessionStore, SessionStoreError};

/// What happened when a report was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The sink accepted the report and the session is now completed.
    Delivered(CallbackOutcome),
    /// The sink was tried and failed; the session stays open.
    Failed(CallbackOutcome),
    /// The lease was refused; nothing was sent.
    Refused(ReportRefusal),
}

impl DispatchOutcome {
    /// The sink outcome, when the sink was invoked.
    pub fn callback(&self) -> Option<&CallbackOutcome> {
        match self {
            DispatchOutcome::Delivered(outcome) | DispatchOutcome::Failed(outcome) => Some(outcome),
            DispatchOutcome::Refused(_) => None,
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered(_))
    }
}

/// Leases, delivers and releases session reports.
pub struct ReportDispatcher {
    store: Arc<dyn SessionStore>,
    sink: Arc<dyn ReportSink>,
}

impl ReportDispatcher {
    pub fn new(store: Arc<dyn SessionStore>, sink: Arc<dyn ReportSink>) -> Self {
        Self { store, sink }
    }

    /// Attempt to report `session_id`.
    ///
    /// With `expected_epoch` set, the lease is refused if a counterparty
    /// message arrived since that epoch was captured.
    ///
    /// The lease, delivery and release run on a spawned task, so a caller that
    /// is dropped mid-delivery never leaves the lease held.
    pub async fn dispatch(
        &self,
        session_id: &SessionId,
        expected_epoch: Option<u64>,
        reason: TerminationReason,
    ) -> Result<DispatchOutcome, SessionStoreError> {
        let store = Arc::clone(&self.store);
        let sink = Arc::clone(&self.sink);
        let id = session_id.clone();

        let task = tokio::spawn(async move {
            run_dispatch(store.as_ref(), sink.as_ref(), &id, expected_epoch, reason).await
        });

        match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Report task cancelled");
                Ok(DispatchOutcome::Failed(CallbackOutcome::failed(
                    "report task cancelled",
                )))
            }
        }
    }
}

async fn run_dispatch(
    store: &dyn SessionStore,
    sink: &dyn ReportSink,
    session_id: &SessionId,
    expected_epoch: Option<u64>,
    reason: TerminationReason,
) -> Result<DispatchOutcome, SessionStoreError> {
    let snapshot = match store.begin_report(session_id, expected_epoch).await {
        Ok(snapshot) => snapshot,
        Err(SessionStoreError::ReportRefused { reason: refusal, .. }) => {
            tracing::debug!(
                session_id = %session_id,
                reason = reason.as_str(),
                refusal = %refusal,
                "Report lease refused"
            );
            return Ok(DispatchOutcome::Refused(refusal));
        }
        Err(e) => return Err(e),
    };

    let report = IntelligenceReport::from_session(&snapshot);
    let outcome = sink.deliver(&report).await;
    store.finish_report(session_id, outcome.ok).await?;

    if outcome.ok {
        tracing::info!(
            session_id = %session_id,
            reason = reason.as_str(),
            total_messages = report.total_messages_exchanged,
            "Session reported and completed"
        );
        Ok(DispatchOutcome::Delivered(outcome))
    } else {
        tracing::warn!(
            session_id = %session_id,
            reason = reason.as_str(),
            error = outcome.error.as_deref().unwrap_or("unknown"),
            "Report delivery failed, session stays open"
        );
        Ok(DispatchOutcome::Failed(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::domain::session::{DetectionState, Message};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingSink {
        delivered: Mutex<Vec<IntelligenceReport>>,
        succeed: bool,
    }

    impl RecordingSink {
        fn new(succeed: bool) -> Self {
            Self {
                delivered: Mutex::new(Vec::new()),
                succeed,
            }
        }

        fn reports(&self) -> Vec<IntelligenceReport> {
            self.delivered.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReportSink for RecordingSink {
        async fn deliver(&self, report: &IntelligenceReport) -> CallbackOutcome {
            self.delivered.lock().unwrap().push(report.clone());
            if self.succeed {
                CallbackOutcome::delivered(200)
            } else {
                CallbackOutcome::failed("HTTP 503: busy")
            }
        }
    }

    async fn scam_session(store: &InMemorySessionStore, id: &str) -> SessionId {
        let id = SessionId::new(id).unwrap();
        store.create_if_absent(&id).await.unwrap();
        store.append_message(&id, Message::scammer("pay now")).await.unwrap();
        store
            .update_detection(&id, DetectionState::new(true, "phishing", 0.9))
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    async fn delivered_report_completes_session() {
        let store = Arc::new(InMemorySessionStore::new());
        let sink = Arc::new(RecordingSink::new(true));
        let dispatcher = ReportDispatcher::new(store.clone(), sink.clone());
        let id = scam_session(&store, "ok").await;

        let outcome = dispatcher
            .dispatch(&id, None, TerminationReason::EnoughIntelligence)
            .await
            .unwrap();

        assert!(outcome.is_delivered());
        assert_eq!(outcome.callback(), Some(&CallbackOutcome::delivered(200)));
        assert!(store.get(&id).await.unwrap().unwrap().is_completed());

        let reports = sink.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].session_id, "ok");
        assert!(reports[0].scam_detected);
        assert_eq!(reports[0].total_messages_exchanged, 1);
    }

    #[tokio::test]
    async fn failed_delivery_leaves_session_open_and_retriable() {
        let store = Arc::new(InMemorySessionStore::new());
        let sink = Arc::new(RecordingSink::new(false));
        let dispatcher = ReportDispatcher::new(store.clone(), sink.clone());
        let id = scam_session(&store, "fail").await;

        let first = dispatcher
            .dispatch(&id, None, TerminationReason::MessageCap)
            .await
            .unwrap();
        assert!(matches!(first, DispatchOutcome::Failed(_)));

        let session = store.get(&id).await.unwrap().unwrap();
        assert!(!session.is_completed());
        assert!(!session.is_report_in_flight());

        let second = dispatcher
            .dispatch(&id, None, TerminationReason::MessageCap)
            .await
            .unwrap();
        assert!(matches!(second, DispatchOutcome::Failed(_)));
        assert_eq!(sink.reports().len(), 2);
    }

    #[tokio::test]
    async fn completed_session_is_not_reported_twice() {
        let store = Arc::new(InMemorySessionStore::new());
        let sink = Arc::new(RecordingSink::new(true));
        let dispatcher = ReportDispatcher::new(store.clone(), sink.clone());
        let id = scam_session(&store, "twice").await;

        dispatcher
            .dispatch(&id, None, TerminationReason::ScammerTurnCap)
            .await
            .unwrap();
        let again = dispatcher
            .dispatch(&id, None, TerminationReason::Idle)
            .await
            .unwrap();

        assert_eq!(again, DispatchOutcome::Refused(ReportRefusal::Completed));
        assert_eq!(sink.reports().len(), 1);
    }

    #[tokio::test]
    async fn stale_epoch_is_refused() {
        let store = Arc::new(InMemorySessionStore::new());
        let sink = Arc::new(RecordingSink::new(true));
        let dispatcher = ReportDispatcher::new(store.clone(), sink.clone());
        let id = scam_session(&store, "stale").await;
        store.append_message(&id, Message::scammer("still here")).await.unwrap();

        let outcome = dispatcher
            .dispatch(&id, Some(1), TerminationReason::Idle)
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            DispatchOutcome::Refused(ReportRefusal::StaleEpoch { .. })
        ));
        assert!(sink.reports().is_empty());
    }

    struct SlowSink {
        delay: std::time::Duration,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl ReportSink for SlowSink {
        async fn deliver(&self, _report: &IntelligenceReport) -> CallbackOutcome {
            *self.calls.lock().unwrap() += 1;
            tokio::time::sleep(self.delay).await;
            CallbackOutcome::delivered(200)
        }
    }

    #[tokio::test]
    async fn dropped_caller_still_completes_delivery_and_releases_lease() {
        let store = Arc::new(InMemorySessionStore::new());
        let sink = Arc::new(SlowSink {
            delay: std::time::Duration::from_millis(200),
            calls: Mutex::new(0),
        });
        let dispatcher = ReportDispatcher::new(store.clone(), sink.clone());
        let id = scam_session(&store, "dropped").await;

        let cut_short = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            dispatcher.dispatch(&id, None, TerminationReason::ScammerTurnCap),
        )
        .await;
        assert!(cut_short.is_err());

        tokio::time::sleep(std::time::Duration::from_millis(400)).await;

        let session = store.get(&id).await.unwrap().unwrap();
        assert!(session.is_completed());
        assert!(!session.is_report_in_flight());
        assert_eq!(*sink.calls.lock().unwrap(), 1);

        let again = dispatcher
            .dispatch(&id, None, TerminationReason::Idle)
            .await
            .unwrap();
        assert_eq!(again, DispatchOutcome::Refused(ReportRefusal::Completed));
    }

    #[tokio::test]
    async fn unknown_session_is_an_error() {
        let store = Arc::new(InMemorySessionStore::new());
        let dispatcher = ReportDispatcher::new(store, Arc::new(RecordingSink::new(true)));

        let err = dispatcher
            .dispatch(&SessionId::new("ghost").unwrap(), None, TerminationReason::Idle)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
