//! HTTP surface: `/api/transcript`, `/api/health`, `/api/test` and an
//! optional static index page.

use anyhow::Context;
use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::Instrument;

use crate::config::Config;
use crate::error::{ErrorKind, TranscriptError};
use crate::platform::VideoReference;
use crate::sources::{build_sources, http_client, OEmbedProbe};
use crate::transcript::{FallbackOrchestrator, Normalizer};
use crate::Result;

pub mod handlers;

/// Shared, read-only request state
pub struct AppState {
    pub orchestrator: FallbackOrchestrator,
    pub default_languages: Vec<String>,
    pub api_key_configured: bool,
    pub api_endpoint: String,
    pub api_host: Option<String>,
}

impl AppState {
    /// Wire sources, probe and normalizer from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = http_client(&config.upstream).context("Failed to build HTTP client")?;

        let mut orchestrator = FallbackOrchestrator::new(build_sources(&config.upstream, &client))
            .with_fallback_languages(config.transcript.fallback_languages.clone())
            .with_normalizer(Normalizer::new().with_min_words(config.transcript.min_words));

        if config.upstream.youtube_precheck {
            orchestrator = orchestrator.with_probe(Arc::new(OEmbedProbe::new(client)));
        }

        Ok(Self {
            orchestrator,
            default_languages: config.transcript.default_languages.clone(),
            api_key_configured: config.upstream.api_key.is_some(),
            api_endpoint: config.upstream.base_url.clone(),
            api_host: config.api_host(),
        })
    }
}

/// Build the router
pub fn router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .route("/api/transcript", post(handlers::transcript))
        .route("/api/health", get(handlers::health))
        .route("/api/test", get(handlers::self_test))
        .with_state(state);

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    app.layer(middleware::from_fn(trace_requests))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::permissive())
}

/// Run the HTTP server until Ctrl-C
pub async fn serve(config: &Config) -> Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    tracing::info!(
        "Transcript backends: {}",
        state.orchestrator.backend_names().join(", ")
    );

    let app = router(state, config.server.static_dir.as_deref());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

async fn trace_requests(request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!(
        "request",
        id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let started = Instant::now();
        let response = next.run(request).await;
        tracing::info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request finished"
        );
        response
    }
    .instrument(span)
    .await
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "application/json")],
        Json(json!({
            "success": false,
            "error": "Internal server error",
            "error_kind": "internal",
        })),
    )
        .into_response()
}

/// HTTP status for a failure kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Unauthorized | ErrorKind::NetworkError | ErrorKind::UpstreamError => {
            StatusCode::BAD_GATEWAY
        }
        ErrorKind::MalformedPayload | ErrorKind::EmptyContent | ErrorKind::ContentTooShort => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorKind::AsyncProcessingRequired => StatusCode::ACCEPTED,
        ErrorKind::AllStrategiesExhausted => StatusCode::BAD_GATEWAY,
    }
}

/// A failure on its way out of a handler
pub struct ApiError {
    pub error: TranscriptError,
    pub reference: Option<VideoReference>,
}

impl ApiError {
    pub fn new(error: TranscriptError, reference: Option<VideoReference>) -> Self {
        Self { error, reference }
    }

    /// Message for humans. An exhausted strategy list also names the most
    /// useful underlying failure.
    pub fn message(&self) -> String {
        match &self.error {
            TranscriptError::AllStrategiesExhausted(attempts) => {
                let primary = self.error.primary_kind();
                let detail = attempts.iter().find_map(|attempt| match &attempt.outcome {
                    crate::transcript::AttemptOutcome::Failed { kind, message }
                        if *kind == primary =>
                    {
                        Some(message.as_str())
                    }
                    _ => None,
                });
                match detail {
                    Some(detail) => format!("{}: {}", self.error, detail),
                    None => self.error.to_string(),
                }
            }
            other => other.to_string(),
        }
    }
}

impl From<TranscriptError> for ApiError {
    fn from(error: TranscriptError) -> Self {
        Self::new(error, None)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.error.primary_kind();
        let platform = self
            .reference
            .as_ref()
            .map(VideoReference::platform)
            .unwrap_or(crate::platform::Platform::Unknown);

        tracing::warn!(kind = %kind, "Request failed: {}", self.error);

        let mut body = json!({
            "success": false,
            "error": self.message(),
            "error_kind": kind,
            "suggestions": self.error.suggestions(platform),
        });

        if let Some(reference) = &self.reference {
            body["platform"] = json!(reference.platform());
            body["video_url"] = json!(reference.canonical());
        }

        match &self.error {
            TranscriptError::AllStrategiesExhausted(attempts) => {
                body["attempts"] = json!(attempts);
            }
            TranscriptError::AsyncProcessingRequired(job_id) => {
                body["job_id"] = json!(job_id);
            }
            _ => {}
        }

        (status_for(kind), Json(body)).into_response()
    }
}
