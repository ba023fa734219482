//! Intelligence harvesting from counterparty messages.

mod extractor;

pub use extractor::{ExtractionError, IntelligenceExtractor, DEFAULT_WATCH_LIST, MAX_SCAN_LENGTH};
