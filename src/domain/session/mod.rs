//! Session module - per-conversation engagement state.
//!
//! A session tracks one counterparty conversation: the message log, the
//! detection verdict, the persona in use, harvested intelligence and the
//! bookkeeping used by idle detection and reporting.

mod aggregate;
mod detection_state;
mod intelligence;
mod message;

pub use aggregate::{ReportRefusal, Session};
pub use detection_state::{DetectionState, SCAM_TYPE_NONE};
pub use intelligence::{ExtractedIntelligence, IntelCategory};
pub use message::{Message, Sender};
