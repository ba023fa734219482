//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `session` - Session aggregate, messages, detection state, intelligence
//! - `detection` - Rule tables, rule scorer and the two-stage pipeline
//! - `extraction` - Pattern-based intelligence harvesting
//! - `persona` - Persona library and selection state machine
//! - `engagement` - Termination policy and final report

pub mod detection;
pub mod engagement;
pub mod extraction;
pub mod foundation;
pub mod persona;
pub mod session;
