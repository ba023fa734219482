//! Foundation module - Shared domain primitives.
//!
//! Contains the identifiers, timestamps and error types that form the
//! vocabulary of the honeypot domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::SessionId;
pub use timestamp::Timestamp;
