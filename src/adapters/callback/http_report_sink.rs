//! HTTP Report Sink - posts the final intelligence report to a callback URL.
//!
//! Each attempt is bounded by the client timeout. Between attempts the sink
//! waits `backoff * attempt`. Any 2xx status is success; otherwise the last
//! error is returned in the outcome.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::engagement::IntelligenceReport;
use crate::ports::{CallbackOutcome, ReportSink};

/// Error bodies are truncated to this many characters.
const ERROR_BODY_LIMIT: usize = 300;

/// Configuration for the HTTP report sink.
#[derive(Debug, Clone)]
pub struct HttpReportSinkConfig {
    pub url: String,
    api_key: Option<Secret<String>>,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub backoff: Duration,
    /// Log the full payload at debug level before sending.
    pub log_payload: bool,
}

impl HttpReportSinkConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            timeout: Duration::from_secs(5),
            max_attempts: 3,
            backoff: Duration::from_millis(500),
            log_payload: false,
        }
    }

    /// Sent as the `x-api-key` header.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_payload_logging(mut self, enabled: bool) -> Self {
        self.log_payload = enabled;
        self
    }
}

/// Report sink delivering over HTTP POST.
pub struct HttpReportSink {
    config: HttpReportSinkConfig,
    client: Client,
}

impl HttpReportSink {
    pub fn new(config: HttpReportSinkConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    async fn attempt(&self, report: &IntelligenceReport) -> Result<u16, String> {
        let mut request = self.client.post(&self.config.url).json(report);
        if let Some(ref key) = self.config.api_key {
            request = request.header("x-api-key", key.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                format!("timed out after {}s", self.config.timeout.as_secs_f32())
            } else {
                format!("request failed: {}", e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(status.as_u16());
        }

        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        Err(format!("HTTP {}: {}", status.as_u16(), body))
    }
}

#[async_trait]
impl ReportSink for HttpReportSink {
    async fn deliver(&self, report: &IntelligenceReport) -> CallbackOutcome {
        if self.config.log_payload {
            match serde_json::to_string_pretty(report) {
                Ok(payload) => tracing::debug!(
                    session_id = %report.session_id,
                    url = %self.config.url,
                    %payload,
                    "Report payload"
                ),
                Err(e) => tracing::debug!(error = %e, "Report payload not serializable"),
            }
        }

        let mut last_error = String::from("no delivery attempted");

        for attempt in 1..=self.config.max_attempts {
            match self.attempt(report).await {
                Ok(status_code) => {
                    tracing::info!(
                        session_id = %report.session_id,
                        status_code,
                        attempt,
                        "Report delivered"
                    );
                    return CallbackOutcome::delivered(status_code);
                }
                Err(error) => {
                    tracing::warn!(
                        session_id = %report.session_id,
                        attempt,
                        error = %error,
                        "Report delivery attempt failed"
                    );
                    last_error = error;
                }
            }

            if attempt < self.config.max_attempts {
                sleep(self.config.backoff * attempt).await;
            }
        }

        CallbackOutcome::failed(last_error)
    }
}
