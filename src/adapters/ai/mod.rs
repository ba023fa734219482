//! AI Adapters.
//!
//! ## Available Adapters
//!
//! - `OpenAIProvider` - OpenAI-compatible chat completions (OpenRouter by default)
//! - `MockAIProvider` - Configurable mock for testing and offline runs
//! - `LlmSemanticClassifier` - Stage-2 scam classifier on top of an `AIProvider`
//! - `LlmReplyGenerator` - Persona reply generation on top of an `AIProvider`

mod llm_classifier;
mod llm_reply_generator;
mod mock_provider;
mod openai_provider;

pub use llm_classifier::{LlmSemanticClassifier, SEMANTIC_SCAM_TYPES};
pub use llm_reply_generator::LlmReplyGenerator;
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider, DEFAULT_BASE_URL, DEFAULT_MODEL};
