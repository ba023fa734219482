//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SessionStore` - Concurrent session state
//! - `SemanticClassifier` - Stage-2 scam classification
//! - `ReplyGenerator` - In-character decoy replies
//! - `ReportSink` - Final intelligence report delivery
//! - `AIProvider` - Chat-completion LLM access used by the AI adapters

mod ai_provider;
mod reply_generator;
mod report_sink;
mod semantic_classifier;
mod session_store;

pub use ai_provider::{
    AIError, AIProvider, ChatMessage, ChatRole, CompletionRequest, CompletionResponse,
    FinishReason, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use reply_generator::{ReplyError, ReplyGenerator, ReplyRequest};
pub use report_sink::{CallbackOutcome, ReportSink};
pub use semantic_classifier::{ClassifierError, SemanticClassifier, SemanticVerdict};
pub use session_store::{SessionStore, SessionStoreError};
