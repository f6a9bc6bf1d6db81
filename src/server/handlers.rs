use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::error::TranscriptError;
use crate::output::TranscriptResponse;
use crate::platform::{classify, Platform};
use crate::utils::validate_language_code;

/// Canned video used by `/api/test`
pub const SELF_TEST_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct TranscriptRequest {
    #[serde(default)]
    pub url: Option<String>,

    /// Kept loose so a comma-separated string can be rejected with a useful
    /// message instead of a generic deserialization error
    #[serde(default)]
    pub languages: Option<Value>,

    #[serde(default)]
    pub include_timestamps: bool,
}

/// `POST /api/transcript`
pub async fn transcript(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranscriptRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return ApiError::from(TranscriptError::InvalidInput(rejection.body_text()))
                .into_response()
        }
    };

    let reference = match classify(request.url.as_deref().unwrap_or_default()) {
        Ok(reference) => reference,
        Err(err) => return ApiError::from(err).into_response(),
    };

    let languages = match parse_languages(request.languages.as_ref(), &state.default_languages) {
        Ok(languages) => languages,
        Err(err) => return ApiError::new(err, Some(reference)).into_response(),
    };

    tracing::info!(
        platform = %reference.platform(),
        languages = %languages.join(","),
        "Transcript requested for {}",
        reference.canonical()
    );

    match state.orchestrator.resolve(&reference, &languages).await {
        Ok(resolution) => Json(TranscriptResponse::new(
            &resolution,
            reference.canonical(),
            request.include_timestamps,
        ))
        .into_response(),
        Err(err) => ApiError::new(err, Some(reference)).into_response(),
    }
}

/// Accepts only a JSON array of language codes. Absent or null means the
/// configured defaults, an empty array means no preference.
pub fn parse_languages(
    value: Option<&Value>,
    defaults: &[String],
) -> Result<Vec<String>, TranscriptError> {
    let items = match value {
        None | Some(Value::Null) => return Ok(defaults.to_vec()),
        Some(Value::Array(items)) => items,
        Some(Value::String(s)) => {
            return Err(TranscriptError::InvalidInput(format!(
                "`languages` must be a JSON array such as [\"vi\", \"en\"], got the string \"{}\"",
                s
            )))
        }
        Some(_) => {
            return Err(TranscriptError::InvalidInput(
                "`languages` must be a JSON array of language codes".to_string(),
            ))
        }
    };

    let mut languages: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let code = item.as_str().map(str::trim).ok_or_else(|| {
            TranscriptError::InvalidInput(format!("Language code must be a string, got {}", item))
        })?;
        validate_language_code(code)?;
        if !languages.iter().any(|existing| existing == code) {
            languages.push(code.to_string());
        }
    }
    Ok(languages)
}

/// `GET /api/health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "backends": state.orchestrator.backend_names(),
        "api_host": state.api_host,
        "supported_platforms": supported_platform_names(),
    }))
}

fn supported_platform_names() -> Vec<&'static str> {
    Platform::supported()
        .iter()
        .map(Platform::display_name)
        .collect()
}

/// `GET /api/test`: fetch a known video end to end
pub async fn self_test(State(state): State<Arc<AppState>>) -> Json<Value> {
    let api_key_status = if state.api_key_configured {
        "configured"
    } else {
        "missing"
    };

    let youtube = match classify(SELF_TEST_URL) {
        Ok(reference) => match state
            .orchestrator
            .resolve(&reference, &["en".to_string()])
            .await
        {
            Ok(resolution) => {
                let preview: String = resolution
                    .result
                    .full_text()
                    .chars()
                    .take(PREVIEW_CHARS)
                    .collect();
                json!({
                    "test_status": "success",
                    "platform": resolution.result.platform(),
                    "method": resolution.backend,
                    "word_count": resolution.result.word_count(),
                    "preview": preview,
                })
            }
            Err(err) => json!({
                "test_status": "failed",
                "platform": reference.platform(),
                "error": err.to_string(),
                "error_kind": err.primary_kind(),
            }),
        },
        Err(err) => json!({
            "test_status": "failed",
            "error": err.to_string(),
        }),
    };

    let overall_status = if youtube["test_status"] == "success" {
        "success"
    } else {
        "failed"
    };

    Json(json!({
        "overall_status": overall_status,
        "api_key_status": api_key_status,
        "api_endpoint": state.api_endpoint,
        "supported_platforms": supported_platform_names(),
        "test_results": { "youtube": youtube },
    }))
}
