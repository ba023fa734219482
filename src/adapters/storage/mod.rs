//! Storage Adapters
//!
//! ## Available Adapters
//!
//! - **InMemorySessionStore** - Process-local `SessionStore`
//! - **load_persona_library** - Reads a YAML persona library from disk
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{load_persona_library, InMemorySessionStore};
//!
//! let store = InMemorySessionStore::new();
//! let library = load_persona_library("./personas.yaml").await?;
//! ```

mod in_memory_session_store;
mod yaml_persona_loader;

pub use in_memory_session_store::InMemorySessionStore;
pub use yaml_persona_loader::load_persona_library;
