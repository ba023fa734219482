//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Chat-completions provider, semantic classifier, reply generator
//! - `callback` - HTTP report sink
//! - `http` - Axum router, DTOs and API-key middleware
//! - `storage` - In-memory session store, YAML persona loader

pub mod ai;
pub mod callback;
pub mod http;
pub mod storage;
