//! Scam Honeypot server
//!
//! Loads configuration from `HONEYPOT__*` environment variables, wires the
//! adapters into the per-turn orchestrator and serves `POST /honeypot`.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scam_honeypot::adapters::ai::{
    LlmReplyGenerator, LlmSemanticClassifier, MockAIProvider, OpenAIConfig, OpenAIProvider,
};
use scam_honeypot::adapters::callback::{HttpReportSink, HttpReportSinkConfig};
use scam_honeypot::adapters::http::{honeypot_router, ApiKeyState, HoneypotAppState};
use scam_honeypot::adapters::storage::{load_persona_library, InMemorySessionStore};
use scam_honeypot::application::{
    EngagementSettings, IdleTimeoutScheduler, ProcessMessageHandler, ReportDispatcher,
};
use scam_honeypot::config::{AppConfig, ServerConfig};
use scam_honeypot::domain::detection::{DetectionPipeline, DetectionRules};
use scam_honeypot::domain::extraction::IntelligenceExtractor;
use scam_honeypot::domain::persona::{PersonaLibrary, PersonaSelector};
use scam_honeypot::ports::{AIProvider, SemanticClassifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.server);
    config.validate().context("Invalid configuration")?;

    let personas = load_personas(&config).await?;
    let app = build_router(&config, personas)?;

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, environment = ?config.server.environment, "Honeypot listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// `RUST_LOG` wins over `server.log_level` when set.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn load_personas(config: &AppConfig) -> anyhow::Result<PersonaLibrary> {
    match config.personas.path {
        Some(ref path) => {
            info!(path = %path.display(), "Loading persona library");
            Ok(load_persona_library(path).await?)
        }
        None => {
            info!("Using built-in persona library");
            Ok(PersonaLibrary::builtin())
        }
    }
}

/// Wire every adapter into the orchestrator and build the router.
fn build_router(config: &AppConfig, personas: PersonaLibrary) -> anyhow::Result<Router> {
    let (provider, classifier): (Arc<dyn AIProvider>, Option<Arc<dyn SemanticClassifier>>) =
        match config.ai.api_key() {
            Some(key) => {
                let provider: Arc<dyn AIProvider> = Arc::new(OpenAIProvider::new(
                    OpenAIConfig::new(key)
                        .with_base_url(&config.ai.base_url)
                        .with_model(&config.ai.model)
                        .with_timeout(config.ai.timeout())
                        .with_max_retries(config.ai.max_retries),
                )?);
                let classifier: Arc<dyn SemanticClassifier> = Arc::new(
                    LlmSemanticClassifier::new(provider.clone(), config.ai.classifier_timeout())
                        .with_temperature(config.ai.classifier_temperature),
                );
                (provider, Some(classifier))
            }
            None => {
                warn!("No AI API key configured, running with rule-based detection and canned replies");
                let provider: Arc<dyn AIProvider> = Arc::new(MockAIProvider::new());
                (provider, None)
            }
        };

    let store = Arc::new(InMemorySessionStore::new());
    let pipeline = Arc::new(DetectionPipeline::new(&DetectionRules::default(), classifier)?);
    let extractor = Arc::new(IntelligenceExtractor::new()?);
    let selector = PersonaSelector::new(Arc::new(personas));
    let reply_generator = Arc::new(
        LlmReplyGenerator::new(provider).with_temperature(config.ai.reply_temperature),
    );

    let mut sink_config = HttpReportSinkConfig::new(&config.callback.url)
        .with_timeout(config.callback.timeout())
        .with_max_attempts(config.callback.max_attempts)
        .with_backoff(config.callback.backoff())
        .with_payload_logging(config.callback.log_payload);
    if let Some(key) = config.callback.api_key() {
        sink_config = sink_config.with_api_key(key);
    }
    let sink = Arc::new(HttpReportSink::new(sink_config)?);

    let dispatcher = Arc::new(ReportDispatcher::new(store.clone(), sink));
    let scheduler = IdleTimeoutScheduler::new(
        store.clone(),
        dispatcher.clone(),
        config.engagement.idle_timeout(),
    );

    let handler = ProcessMessageHandler::new(
        store,
        pipeline,
        extractor,
        selector,
        reply_generator,
        dispatcher,
    )
    .with_idle_scheduler(scheduler)
    .with_settings(EngagementSettings {
        termination: config.engagement.termination_policy(),
        non_scam_max_messages: config.engagement.non_scam_max_messages,
    });

    if config.auth.api_key().is_none() {
        warn!("No inbound API key configured, every request will be rejected");
    }

    let app = honeypot_router(
        HoneypotAppState::new(Arc::new(handler)),
        ApiKeyState::new(config.auth.api_key()),
    )
    .layer(TimeoutLayer::new(config.server.request_timeout()))
    .layer(TraceLayer::new_for_http());

    Ok(app)
}
