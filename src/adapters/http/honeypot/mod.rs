//! HTTP adapter for the honeypot endpoint.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ErrorResponse, HoneypotRequest, HoneypotResponse, LivenessResponse, MessagePayload,
};
pub use handlers::{HoneypotApiError, HoneypotAppState};
pub use routes::honeypot_router;
