//! Report callback adapters.
//!
//! - **HttpReportSink** - POSTs the final report to the configured URL with retries

mod http_report_sink;

pub use http_report_sink::{HttpReportSink, HttpReportSinkConfig};
