use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{status_error, RawContent, RawEntry, RawTranscript, TimeUnit, TranscriptSource};
use crate::error::TranscriptError;
use crate::platform::VideoReference;

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-api-key";

/// Remote transcript-extraction API.
///
/// One GET per fetch: `<base_url>?url=<video>&text=false[&lang=<code>]`.
/// The API answers with millisecond offsets and may hand back a job id
/// instead of content for long videos.
pub struct ApiSource {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Option<ApiContent>,
    lang: Option<String>,
    #[serde(rename = "availableLangs", default)]
    available_langs: Vec<String>,
    #[serde(rename = "jobId")]
    job_id: Option<Value>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiContent {
    Text(String),
    Entries(Vec<ApiEntry>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiEntry {
    Plain(String),
    Timed(TimedEntry),
}

#[derive(Debug, Deserialize)]
struct TimedEntry {
    #[serde(default)]
    text: String,
    offset: Option<f64>,
    duration: Option<f64>,
}

impl ApiSource {
    pub fn new(client: reqwest::Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl TranscriptSource for ApiSource {
    async fn fetch(
        &self,
        reference: &VideoReference,
        languages: &[String],
    ) -> Result<RawTranscript, TranscriptError> {
        let mut request = self
            .client
            .get(&self.base_url)
            .query(&[("url", reference.canonical()), ("text", "false")]);

        // The API takes a single language; the fallback strategies cover the rest.
        if let Some(lang) = languages.first() {
            request = request.query(&[("lang", lang.as_str())]);
        }

        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        tracing::debug!(
            platform = %reference.platform(),
            lang = languages.first().map(String::as_str).unwrap_or("auto"),
            "Calling transcript API for {}",
            reference.canonical()
        );

        let response = request
            .send()
            .await
            .map_err(TranscriptError::from_transport)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(TranscriptError::from_transport)?;

        tracing::debug!("Transcript API answered {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body, "transcript API"));
        }

        parse_payload(&body)
    }

    fn supports(&self, _reference: &VideoReference) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "api"
    }
}

/// Parse an API body into the canonical raw shape
pub fn parse_payload(body: &str) -> Result<RawTranscript, TranscriptError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        TranscriptError::MalformedPayload(format!("response is not valid JSON: {}", e))
    })?;

    if !value.is_object() {
        return Err(TranscriptError::MalformedPayload(
            "response is not a JSON object".to_string(),
        ));
    }

    let response: ApiResponse = serde_json::from_value(value).map_err(|e| {
        TranscriptError::MalformedPayload(format!("unexpected response shape: {}", e))
    })?;

    if let Some(error) = response.error {
        return Err(TranscriptError::Upstream {
            code: 200,
            body: value_text(&error),
        });
    }

    if let Some(job_id) = response.job_id {
        return Err(TranscriptError::AsyncProcessingRequired(value_text(&job_id)));
    }

    let content = match response.content {
        Some(ApiContent::Text(text)) => RawContent::Text(text),
        Some(ApiContent::Entries(entries)) => RawContent::Entries(
            entries
                .into_iter()
                .map(|entry| match entry {
                    ApiEntry::Plain(text) => RawEntry {
                        text,
                        offset: None,
                        duration: None,
                    },
                    ApiEntry::Timed(timed) => RawEntry {
                        text: timed.text,
                        offset: timed.offset,
                        duration: timed.duration,
                    },
                })
                .collect(),
        ),
        None => {
            return Err(TranscriptError::MalformedPayload(
                "response has no content field".to_string(),
            ))
        }
    };

    Ok(RawTranscript {
        content,
        time_unit: TimeUnit::Milliseconds,
        language: response.lang,
        available_languages: response.available_langs,
    })
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
