//! Transcript backends.
//!
//! Every backend turns a [`VideoReference`] plus a language preference into a
//! [`RawTranscript`], the one shape the normalizer understands. Format
//! sniffing of upstream payloads stays inside the backend that owns the
//! format.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{BackendKind, UpstreamConfig};
use crate::error::TranscriptError;
use crate::platform::VideoReference;

pub mod api;
pub mod captions;
pub mod oembed;

pub use api::ApiSource;
pub use captions::CaptionsSource;
pub use oembed::OEmbedProbe;

/// User agent sent with every outbound request
pub const USER_AGENT: &str = concat!("vidscribe/", env!("CARGO_PKG_VERSION"));

/// Unit the upstream uses for offsets and durations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
}

impl TimeUnit {
    pub fn to_seconds(&self, value: f64) -> f64 {
        match self {
            TimeUnit::Seconds => value,
            TimeUnit::Milliseconds => value / 1000.0,
        }
    }
}

/// One upstream entry before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub text: String,
    pub offset: Option<f64>,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawContent {
    /// The whole transcript as one string
    Text(String),
    /// Entries in upstream order
    Entries(Vec<RawEntry>),
}

/// What a backend hands to the normalizer
#[derive(Debug, Clone, PartialEq)]
pub struct RawTranscript {
    pub content: RawContent,
    pub time_unit: TimeUnit,
    /// Language the upstream says it served
    pub language: Option<String>,
    pub available_languages: Vec<String>,
}

impl RawTranscript {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: RawContent::Text(text.into()),
            time_unit: TimeUnit::Seconds,
            language: None,
            available_languages: Vec::new(),
        }
    }
}

/// Trait for fetching transcripts from one backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch a transcript once. An empty `languages` slice means "whatever
    /// the upstream considers the default track".
    async fn fetch(
        &self,
        reference: &VideoReference,
        languages: &[String],
    ) -> Result<RawTranscript, TranscriptError>;

    /// Whether this backend can serve the reference at all. Backends that
    /// cannot are left out of the strategy list.
    fn supports(&self, reference: &VideoReference) -> bool;

    /// Short backend name used in strategy labels and responses
    fn name(&self) -> &'static str;
}

/// Result of a YouTube availability lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available { title: Option<String> },
    /// Removed, private or otherwise restricted
    Unavailable,
    /// The lookup itself failed; callers should carry on
    Unknown,
}

/// Cheap metadata lookup run before spending upstream quota
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityProbe: Send + Sync {
    async fn check(&self, video_id: &str) -> Availability;
}

/// Build the shared HTTP client with the configured timeout
pub fn http_client(config: &UpstreamConfig) -> crate::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Instantiate the configured backends, in configured order
pub fn build_sources(
    config: &UpstreamConfig,
    client: &reqwest::Client,
) -> Vec<Arc<dyn TranscriptSource>> {
    config
        .backends
        .iter()
        .map(|kind| -> Arc<dyn TranscriptSource> {
            match kind {
                BackendKind::Api => Arc::new(ApiSource::new(
                    client.clone(),
                    config.base_url.clone(),
                    config.api_key.clone(),
                )),
                BackendKind::Captions => Arc::new(CaptionsSource::new(client.clone())),
            }
        })
        .collect()
}

/// Map a non-success HTTP status onto the error taxonomy
pub(crate) fn status_error(code: u16, body: &str, what: &str) -> TranscriptError {
    match code {
        401 | 403 => TranscriptError::Unauthorized(format!("{} answered HTTP {}", what, code)),
        404 => TranscriptError::NotFound(format!("{} has no transcript for this video", what)),
        429 => TranscriptError::RateLimited(format!("{} quota exhausted", what)),
        _ => TranscriptError::Upstream {
            code,
            body: truncate(body, 500),
        },
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Serve `app` on an ephemeral local port and return its base URL
#[cfg(test)]
pub(crate) async fn spawn_upstream(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_time_unit_conversion() {
        assert_eq!(TimeUnit::Milliseconds.to_seconds(1500.0), 1.5);
        assert_eq!(TimeUnit::Seconds.to_seconds(1.5), 1.5);
    }

    #[test]
    fn test_status_error_mapping() {
        assert_eq!(status_error(401, "", "API").kind(), ErrorKind::Unauthorized);
        assert_eq!(status_error(429, "", "API").kind(), ErrorKind::RateLimited);
        assert_eq!(status_error(404, "", "API").kind(), ErrorKind::NotFound);
        match status_error(405, "method not allowed", "API") {
            TranscriptError::Upstream { code, body } => {
                assert_eq!(code, 405);
                assert_eq!(body, "method not allowed");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
        assert_eq!(truncate("ééé", 2), "éé...");
    }

    #[test]
    fn test_build_sources_follows_config_order() {
        let config = UpstreamConfig {
            backends: vec![BackendKind::Captions, BackendKind::Api],
            ..UpstreamConfig::default()
        };
        let client = http_client(&config).unwrap();
        let names: Vec<&str> = build_sources(&config, &client)
            .iter()
            .map(|source| source.name())
            .collect();
        assert_eq!(names, vec!["captions", "api"]);
    }
}
