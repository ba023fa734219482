//! Honeypot handlers.
//!
//! - `ProcessMessageHandler` - per-turn engagement flow
//! - `ReportDispatcher` - exactly-once final report delivery
//! - `IdleTimeoutScheduler` - reports sessions whose counterparty went quiet

mod idle_timeout;
mod process_message;
mod report_dispatcher;

pub use idle_timeout::{IdleCheckOutcome, IdleTimeoutScheduler};
pub use process_message::{
    EngagementSettings, ProcessMessageCommand, ProcessMessageError, ProcessMessageHandler,
    ProcessMessageResult, NOTE_SESSION_COMPLETED,
};
pub use report_dispatcher::{DispatchOutcome, ReportDispatcher};
