//! HTTP adapters - REST API implementations.

pub mod honeypot;
pub mod middleware;

pub use honeypot::{honeypot_router, HoneypotAppState};
pub use middleware::ApiKeyState;
