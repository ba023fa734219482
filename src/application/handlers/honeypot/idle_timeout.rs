//! IdleTimeoutScheduler - reports sessions whose counterparty went quiet.
//!
//! Every counterparty message schedules a one-shot check holding the session
//! id and the idle epoch at that moment. Checks are never cancelled; a newer
//! message simply makes older checks stale.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::domain::engagement::TerminationReason;
use crate::domain::foundation::SessionId;
use crate::ports::SessionStore;

use super::report_dispatcher::{DispatchOutcome, ReportDispatcher};

/// Result of a fired idle check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdleCheckOutcome {
    SessionMissing,
    AlreadyCompleted,
    NotScam,
    /// A newer counterparty message moved the epoch.
    Superseded,
    /// The counterparty was active more recently than the idle duration.
    StillActive,
    /// The report dispatcher ran.
    Dispatched(DispatchOutcome),
    /// The store failed while checking.
    StoreError(String),
}

/// Schedules deferred idle checks.
#[derive(Clone)]
pub struct IdleTimeoutScheduler {
    store: Arc<dyn SessionStore>,
    dispatcher: Arc<ReportDispatcher>,
    idle_after: Duration,
}

impl IdleTimeoutScheduler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        dispatcher: Arc<ReportDispatcher>,
        idle_after: Duration,
    ) -> Self {
        Self {
            store,
            dispatcher,
            idle_after,
        }
    }

    pub fn idle_after(&self) -> Duration {
        self.idle_after
    }

    /// Spawn a check that fires after the idle duration.
    pub fn schedule(&self, session_id: SessionId, epoch: u64) -> JoinHandle<IdleCheckOutcome> {
        let scheduler = self.clone();
        tracing::debug!(session_id = %session_id, epoch, "Idle check scheduled");

        tokio::spawn(async move {
            tokio::time::sleep(scheduler.idle_after).await;
            let outcome = scheduler.check(&session_id, epoch).await;
            tracing::debug!(
                session_id = %session_id,
                epoch,
                outcome = ?outcome,
                "Idle check fired"
            );
            outcome
        })
    }

    /// Run the check immediately.
    pub async fn check(&self, session_id: &SessionId, epoch: u64) -> IdleCheckOutcome {
        let session = match self.store.get(session_id).await {
            Ok(Some(session)) => session,
            Ok(None) => return IdleCheckOutcome::SessionMissing,
            Err(e) => return IdleCheckOutcome::StoreError(e.to_string()),
        };

        if session.is_completed() {
            return IdleCheckOutcome::AlreadyCompleted;
        }
        if !session.detection().is_scam() {
            return IdleCheckOutcome::NotScam;
        }
        if session.idle_epoch() != epoch {
            return IdleCheckOutcome::Superseded;
        }
        if let Some(quiet_for) = session.counterparty_quiet_for() {
            if quiet_for < self.idle_after {
                return IdleCheckOutcome::StillActive;
            }
        }

        match self
            .dispatcher
            .dispatch(session_id, Some(epoch), TerminationReason::Idle)
            .await
        {
            Ok(outcome) => IdleCheckOutcome::Dispatched(outcome),
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "Idle report failed");
                IdleCheckOutcome::StoreError(e.to_string())
            }
        }
    }
}
