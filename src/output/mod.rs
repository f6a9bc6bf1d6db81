use serde::Serialize;

use crate::cli::OutputFormat;
use crate::transcript::{Resolution, TranscriptResult};
use crate::utils::format_timestamp;
use crate::Result;

/// Plain text, or one `[MM:SS] text` line per segment
pub fn format_as_text(result: &TranscriptResult, include_timestamps: bool) -> String {
    if include_timestamps && !result.segments().is_empty() {
        result
            .segments()
            .iter()
            .map(|segment| format!("[{}] {}", format_timestamp(segment.start), segment.text))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        result.full_text().to_string()
    }
}

/// Successful transcript response body
#[derive(Debug, Serialize)]
pub struct TranscriptResponse<'a> {
    pub success: bool,
    pub text: String,
    pub platform: &'a str,
    pub video_url: &'a str,
    pub language: &'a str,
    pub word_count: usize,
    pub char_count: usize,
    pub total_entries: usize,
    pub available_languages: &'a [String],
    pub method: &'a str,
    pub attempts: &'a [crate::transcript::FetchAttempt],
    pub fetched_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> TranscriptResponse<'a> {
    pub fn new(resolution: &'a Resolution, video_url: &'a str, include_timestamps: bool) -> Self {
        let result = &resolution.result;
        Self {
            success: true,
            text: format_as_text(result, include_timestamps),
            platform: result.platform().as_str(),
            video_url,
            language: result.language(),
            word_count: result.word_count(),
            char_count: result.char_count(),
            total_entries: result.segments().len(),
            available_languages: result.available_languages(),
            method: resolution.backend,
            attempts: &resolution.attempts,
            fetched_at: chrono::Utc::now(),
        }
    }
}

/// Print a resolved transcript to the console
pub fn print_to_console(
    resolution: &Resolution,
    video_url: &str,
    format: &OutputFormat,
    include_timestamps: bool,
) -> Result<()> {
    let content = match format {
        OutputFormat::Text => format_as_text(&resolution.result, include_timestamps),
        OutputFormat::Json => serde_json::to_string_pretty(&TranscriptResponse::new(
            resolution,
            video_url,
            include_timestamps,
        ))?,
    };

    println!("{}", content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::transcript::{FetchAttempt, TranscriptSegment};

    fn sample() -> TranscriptResult {
        TranscriptResult::new(
            vec![
                TranscriptSegment {
                    text: "We're no strangers to love".to_string(),
                    start: 18.9,
                    duration: 3.0,
                },
                TranscriptSegment {
                    text: "You know the rules and so do I".to_string(),
                    start: 65.4,
                    duration: 3.0,
                },
            ],
            "en",
            vec!["en".to_string()],
            Platform::Youtube,
        )
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            format_as_text(&sample(), false),
            "We're no strangers to love You know the rules and so do I"
        );
    }

    #[test]
    fn test_timestamped_text() {
        assert_eq!(
            format_as_text(&sample(), true),
            "[00:18] We're no strangers to love\n[01:05] You know the rules and so do I"
        );
    }

    #[test]
    fn test_response_fields() {
        let resolution = Resolution {
            result: sample(),
            backend: "api",
            attempts: vec![FetchAttempt::succeeded("api[en]", &sample())],
        };
        let response = TranscriptResponse::new(
            &resolution,
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            false,
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["platform"], "youtube");
        assert_eq!(json["word_count"], 13);
        assert_eq!(json["total_entries"], 2);
        assert_eq!(json["method"], "api");
        assert_eq!(json["attempts"][0]["status"], "succeeded");
        assert_eq!(json["attempts"][0]["strategy"], "api[en]");
    }
}
