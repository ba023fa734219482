//! Application handlers.
//!
//! Command handlers that orchestrate domain operations across ports.

pub mod honeypot;

pub use honeypot::{
    DispatchOutcome, EngagementSettings, IdleCheckOutcome, IdleTimeoutScheduler,
    ProcessMessageCommand, ProcessMessageError, ProcessMessageHandler, ProcessMessageResult,
    ReportDispatcher, NOTE_SESSION_COMPLETED,
};
