//! ProcessMessageHandler - runs one inbound message through the engagement flow.
//!
//! Per turn: ensure the session, adopt a longer caller history, append the
//! message (scheduling an idle check for counterparty messages), detect,
//! apply the non-scam lock-in, harvest intelligence, reply in character and
//! finally check whether the engagement should be closed and reported.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::detection::{DetectionMethod, DetectionPipeline};
use crate::domain::engagement::TerminationPolicy;
use crate::domain::extraction::IntelligenceExtractor;
use crate::domain::foundation::SessionId;
use crate::domain::persona::{PersonaId, PersonaSelector};
use crate::domain::session::{DetectionState, ExtractedIntelligence, IntelCategory, Message, Session};
use crate::ports::{
    CallbackOutcome, ReplyError, ReplyGenerator, ReplyRequest, SessionStore, SessionStoreError,
};

use super::idle_timeout::IdleTimeoutScheduler;
use super::report_dispatcher::ReportDispatcher;

/// Note attached to responses for sessions that are already closed.
pub const NOTE_SESSION_COMPLETED: &str = "session_completed";

/// Command to process one inbound channel message.
#[derive(Debug, Clone)]
pub struct ProcessMessageCommand {
    pub session_id: SessionId,
    pub message: Message,
    /// Caller-supplied history, oldest first. Adopted only if longer than ours.
    pub history: Vec<Message>,
}

/// Outcome of a processed turn.
#[derive(Debug, Clone)]
pub struct ProcessMessageResult {
    pub session_id: SessionId,
    /// The agent's reply; empty when the agent is no longer engaging.
    pub reply: String,
    pub detection: DetectionState,
    /// Set when detection ran on this turn.
    pub method: Option<DetectionMethod>,
    pub persona: Option<PersonaId>,
    pub intelligence: ExtractedIntelligence,
    pub agent_active: bool,
    pub note: Option<String>,
    /// Set when a report delivery was attempted on this turn.
    pub callback: Option<CallbackOutcome>,
}

impl ProcessMessageResult {
    fn closed(session: &Session, detection: DetectionState, note: String) -> Self {
        Self {
            session_id: session.id().clone(),
            reply: String::new(),
            detection,
            method: None,
            persona: session.persona_id().cloned(),
            intelligence: session.extracted().clone(),
            agent_active: false,
            note: Some(note),
            callback: None,
        }
    }
}

/// Errors that can occur when processing a message.
#[derive(Debug, Clone, Error)]
pub enum ProcessMessageError {
    /// The reply model is out of quota or rate limited.
    #[error("Reply generation quota exceeded")]
    QuotaExceeded { retry_after_secs: Option<u32> },

    #[error("Reply generation failed: {0}")]
    ReplyFailed(String),

    #[error("Session store error: {0}")]
    Store(#[from] SessionStoreError),
}

impl From<ReplyError> for ProcessMessageError {
    fn from(err: ReplyError) -> Self {
        match err {
            ReplyError::QuotaExceeded { retry_after_secs } => {
                ProcessMessageError::QuotaExceeded { retry_after_secs }
            }
            ReplyError::Failed(message) => ProcessMessageError::ReplyFailed(message),
        }
    }
}

/// Thresholds the handler applies on each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementSettings {
    pub termination: TerminationPolicy,
    /// Counterparty messages without a confirmed scam before the agent stops.
    pub non_scam_max_messages: usize,
}

impl Default for EngagementSettings {
    fn default() -> Self {
        Self {
            termination: TerminationPolicy::default(),
            non_scam_max_messages: 3,
        }
    }
}

/// Handler for inbound channel messages.
pub struct ProcessMessageHandler {
    store: Arc<dyn SessionStore>,
    pipeline: Arc<DetectionPipeline>,
    extractor: Arc<IntelligenceExtractor>,
    selector: PersonaSelector,
    reply_generator: Arc<dyn ReplyGenerator>,
    dispatcher: Arc<ReportDispatcher>,
    idle_scheduler: Option<IdleTimeoutScheduler>,
    settings: EngagementSettings,
}

impl ProcessMessageHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        pipeline: Arc<DetectionPipeline>,
        extractor: Arc<IntelligenceExtractor>,
        selector: PersonaSelector,
        reply_generator: Arc<dyn ReplyGenerator>,
        dispatcher: Arc<ReportDispatcher>,
    ) -> Self {
        Self {
            store,
            pipeline,
            extractor,
            selector,
            reply_generator,
            dispatcher,
            idle_scheduler: None,
            settings: EngagementSettings::default(),
        }
    }

    /// Enables idle checks after counterparty messages.
    pub fn with_idle_scheduler(mut self, scheduler: IdleTimeoutScheduler) -> Self {
        self.idle_scheduler = Some(scheduler);
        self
    }

    pub fn with_settings(mut self, settings: EngagementSettings) -> Self {
        self.settings = settings;
        self
    }

    pub async fn handle(
        &self,
        cmd: ProcessMessageCommand,
    ) -> Result<ProcessMessageResult, ProcessMessageError> {
        let id = cmd.session_id;

        // 1. Ensure session
        self.store.create_if_absent(&id).await?;

        // 2. Adopt a longer caller history
        if !cmd.history.is_empty() {
            let supplied = cmd.history.len();
            if self.store.replace_messages(&id, cmd.history).await? {
                debug!(session_id = %id, messages = supplied, "Adopted caller history");
            }
        }
        let prior = self.require(&id).await?;

        // 3. Append and schedule the idle check
        let from_counterparty = cmd.message.is_from_counterparty();
        let text = cmd.message.text.clone();
        let epoch = self.store.append_message(&id, cmd.message).await?;
        if from_counterparty {
            if let Some(scheduler) = &self.idle_scheduler {
                scheduler.schedule(id.clone(), epoch);
            }
        }

        // 4. Closed sessions get no reply
        let session = self.require(&id).await?;
        if session.is_completed() {
            return Ok(ProcessMessageResult::closed(
                &session,
                session.detection().clone(),
                NOTE_SESSION_COMPLETED.to_string(),
            ));
        }

        // 5. Detect until a scam is confirmed
        let mut detection = session.detection().clone();
        let mut method = None;
        if !detection.is_scam() {
            let verdict = self.pipeline.classify(&text, prior.messages()).await;
            method = Some(verdict.method);
            detection = verdict.to_detection_state();

            if detection.is_scam() {
                self.store.update_detection(&id, detection.clone()).await?;
                info!(
                    session_id = %id,
                    scam_type = detection.scam_type(),
                    confidence = detection.confidence(),
                    method = verdict.method.as_str(),
                    "Scam confirmed"
                );
            }
        }

        // 6. Non-scam lock-in
        if !detection.is_scam() && session.scammer_turns() >= self.settings.non_scam_max_messages {
            self.store.mark_completed(&id).await?;
            let session = self.require(&id).await?;
            info!(
                session_id = %id,
                counterparty_messages = session.scammer_turns(),
                "No scam detected, disengaging"
            );
            let mut result = ProcessMessageResult::closed(
                &session,
                DetectionState::not_scam(),
                format!("non_scam_after_{}_messages", self.settings.non_scam_max_messages),
            );
            result.method = method;
            return Ok(result);
        }

        // 7. Harvest intelligence
        if detection.is_scam() && from_counterparty {
            self.harvest(&id, &text).await?;
        }

        // 8. Persona and reply
        let selection = self.selector.select(&detection, session.persona_id());
        if selection.is_new_assignment {
            self.store
                .update_persona(&id, selection.persona.id.clone())
                .await?;
            debug!(session_id = %id, persona = %selection.persona.id, "Persona assigned");
        }

        let reply = self
            .reply_generator
            .generate(ReplyRequest {
                session_id: id.clone(),
                message: text,
                history: prior.messages().to_vec(),
                persona: selection.persona,
                detection: detection.clone(),
            })
            .await?;

        // 9. Store the reply
        self.store
            .append_message(&id, Message::agent_reply(reply.clone()))
            .await?;

        // 10. Close the engagement when the policy says so
        let session = self.require(&id).await?;
        let callback = match self.settings.termination.should_terminate(&session) {
            Some(reason) => {
                info!(session_id = %id, reason = reason.as_str(), "Terminating engagement");
                self.dispatcher
                    .dispatch(&id, None, reason)
                    .await?
                    .callback()
                    .cloned()
            }
            None => None,
        };

        // 11. Compose from current state
        let session = self.require(&id).await?;
        let detection = if session.detection().is_scam() {
            session.detection().clone()
        } else {
            detection
        };

        Ok(ProcessMessageResult {
            session_id: id,
            reply,
            detection,
            method,
            persona: session.persona_id().cloned(),
            intelligence: session.extracted().clone(),
            agent_active: !session.is_completed(),
            note: None,
            callback,
        })
    }

    async fn harvest(&self, id: &SessionId, text: &str) -> Result<(), SessionStoreError> {
        let found = match self.extractor.extract(text) {
            Ok(found) => found,
            Err(e) => {
                warn!(session_id = %id, error = %e, "Extraction failed");
                return Ok(());
            }
        };

        let mut added = 0;
        for category in IntelCategory::ALL {
            for value in found.get(category) {
                if self.store.add_extracted(id, category, value).await? {
                    added += 1;
                }
            }
        }
        if added > 0 {
            debug!(session_id = %id, added, "Intelligence harvested");
        }
        Ok(())
    }

    async fn require(&self, id: &SessionId) -> Result<Session, SessionStoreError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| SessionStoreError::NotFound(id.clone()))
    }
}
