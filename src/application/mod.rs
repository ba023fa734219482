//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    DispatchOutcome, EngagementSettings, IdleCheckOutcome, IdleTimeoutScheduler,
    ProcessMessageCommand, ProcessMessageError, ProcessMessageHandler, ProcessMessageResult,
    ReportDispatcher, NOTE_SESSION_COMPLETED,
};
