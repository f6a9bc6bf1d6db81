use serde::Serialize;
use std::fmt;

use crate::platform::Platform;
use crate::transcript::FetchAttempt;

/// Coarse classification of a [`TranscriptError`], used for logging,
/// HTTP status mapping and attempt diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Unauthorized,
    RateLimited,
    Timeout,
    NetworkError,
    UpstreamError,
    MalformedPayload,
    EmptyContent,
    ContentTooShort,
    AsyncProcessingRequired,
    AllStrategiesExhausted,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Timeout => "timeout",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::UpstreamError => "upstream_error",
            ErrorKind::MalformedPayload => "malformed_payload",
            ErrorKind::EmptyContent => "empty_content",
            ErrorKind::ContentTooShort => "content_too_short",
            ErrorKind::AsyncProcessingRequired => "async_processing_required",
            ErrorKind::AllStrategiesExhausted => "all_strategies_exhausted",
        }
    }

    /// Transient failures where asking the user to retry later makes sense
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::NetworkError | ErrorKind::RateLimited
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every failure the classify -> fetch -> normalize chain can produce
#[derive(thiserror::Error, Debug, Clone)]
pub enum TranscriptError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Video not found or has no transcript: {0}")]
    NotFound(String),

    #[error("Upstream rejected the API key: {0}")]
    Unauthorized(String),

    #[error("Upstream rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Upstream request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream error {code}: {body}")]
    Upstream { code: u16, body: String },

    #[error("Malformed upstream payload: {0}")]
    MalformedPayload(String),

    #[error("Upstream returned no transcript text")]
    EmptyContent,

    #[error("Transcript too short ({words} words): '{text}'")]
    ContentTooShort { words: usize, text: String },

    #[error("Upstream is processing the video asynchronously (job id {0})")]
    AsyncProcessingRequired(String),

    #[error("All {} transcript strategies failed", .0.len())]
    AllStrategiesExhausted(Vec<FetchAttempt>),
}

impl TranscriptError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranscriptError::InvalidInput(_) => ErrorKind::InvalidInput,
            TranscriptError::NotFound(_) => ErrorKind::NotFound,
            TranscriptError::Unauthorized(_) => ErrorKind::Unauthorized,
            TranscriptError::RateLimited(_) => ErrorKind::RateLimited,
            TranscriptError::Timeout(_) => ErrorKind::Timeout,
            TranscriptError::Network(_) => ErrorKind::NetworkError,
            TranscriptError::Upstream { .. } => ErrorKind::UpstreamError,
            TranscriptError::MalformedPayload(_) => ErrorKind::MalformedPayload,
            TranscriptError::EmptyContent => ErrorKind::EmptyContent,
            TranscriptError::ContentTooShort { .. } => ErrorKind::ContentTooShort,
            TranscriptError::AsyncProcessingRequired(_) => ErrorKind::AsyncProcessingRequired,
            TranscriptError::AllStrategiesExhausted(_) => ErrorKind::AllStrategiesExhausted,
        }
    }

    /// Map a transport-level reqwest failure onto the taxonomy.
    ///
    /// The error is rendered without its URL so query strings never end up
    /// in responses or logs.
    pub fn from_transport(err: reqwest::Error) -> Self {
        let timed_out = err.is_timeout();
        let decode = err.is_decode();
        let message = err.without_url().to_string();
        if timed_out {
            TranscriptError::Timeout(message)
        } else if decode {
            TranscriptError::MalformedPayload(message)
        } else {
            TranscriptError::Network(message)
        }
    }

    /// The kind that best describes this failure to a user. For an exhausted
    /// strategy list this is the most actionable underlying failure.
    pub fn primary_kind(&self) -> ErrorKind {
        match self {
            TranscriptError::AllStrategiesExhausted(attempts) => attempts
                .iter()
                .filter_map(|attempt| attempt.failure_kind())
                .min_by_key(|kind| kind_priority(*kind))
                .unwrap_or(ErrorKind::AllStrategiesExhausted),
            other => other.kind(),
        }
    }

    /// Actionable hints shown next to the error message
    pub fn suggestions(&self, platform: Platform) -> Vec<String> {
        let name = platform.display_name();
        match self.primary_kind() {
            ErrorKind::InvalidInput => vec![
                "Paste a full YouTube, TikTok or X/Twitter video URL".to_string(),
                "Pass `languages` as a JSON array of codes, e.g. [\"vi\", \"en\"]".to_string(),
            ],
            ErrorKind::NotFound | ErrorKind::EmptyContent | ErrorKind::ContentTooShort => vec![
                format!("Make sure the {} video has subtitles or captions", name),
                format!("Check that the {} video is public", name),
                "Try a different language preference".to_string(),
                format!("Some {} videos do not have a transcript at all", name),
            ],
            ErrorKind::Unauthorized => vec![
                "Check the transcript API key configured on the server".to_string(),
            ],
            ErrorKind::RateLimited => vec![
                "The transcript API quota is exhausted, try again later".to_string(),
            ],
            ErrorKind::Timeout | ErrorKind::NetworkError => vec![
                "The upstream service did not respond, try again in a moment".to_string(),
            ],
            ErrorKind::AsyncProcessingRequired => vec![
                "The video is long and is being processed upstream, try again later".to_string(),
            ],
            ErrorKind::UpstreamError
            | ErrorKind::MalformedPayload
            | ErrorKind::AllStrategiesExhausted => vec![
                "Try another URL to check the service is working".to_string(),
                format!("Some {} videos do not have a transcript at all", name),
            ],
        }
    }
}

/// Lower is more actionable for the caller.
fn kind_priority(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Unauthorized => 0,
        ErrorKind::RateLimited => 1,
        ErrorKind::NotFound => 2,
        ErrorKind::ContentTooShort => 3,
        ErrorKind::EmptyContent => 4,
        ErrorKind::MalformedPayload => 5,
        ErrorKind::UpstreamError => 6,
        ErrorKind::Timeout => 7,
        ErrorKind::NetworkError => 8,
        _ => 9,
    }
}
