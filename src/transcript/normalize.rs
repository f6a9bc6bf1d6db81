use crate::error::TranscriptError;
use crate::platform::Platform;
use crate::sources::{RawContent, RawTranscript};

use super::{TranscriptResult, TranscriptSegment};

/// Spacing between synthetic start times when the upstream sends no offsets
pub const PLACEHOLDER_SPACING_SECS: f64 = 3.0;

/// Duration given to entries that arrive without one
pub const PLACEHOLDER_DURATION_SECS: f64 = 3.0;

/// Anything shorter is treated as an upstream placeholder, not a transcript
pub const DEFAULT_MIN_WORDS: usize = 3;

/// Language reported when neither the payload nor the caller names one
pub const AUTO_LANGUAGE: &str = "auto";

/// Turns a [`RawTranscript`] into a [`TranscriptResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    min_words: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            min_words: DEFAULT_MIN_WORDS,
        }
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.min_words = min_words;
        self
    }

    pub fn min_words(&self) -> usize {
        self.min_words
    }

    pub fn normalize(
        &self,
        raw: &RawTranscript,
        platform: Platform,
        requested_language: Option<&str>,
    ) -> Result<TranscriptResult, TranscriptError> {
        let segments = match &raw.content {
            RawContent::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![TranscriptSegment {
                        text: text.to_string(),
                        start: 0.0,
                        duration: 0.0,
                    }]
                }
            }
            RawContent::Entries(entries) => {
                let mut segments = Vec::with_capacity(entries.len());
                for entry in entries {
                    let text = entry.text.trim();
                    if text.is_empty() {
                        continue;
                    }

                    let start = match entry.offset {
                        Some(offset) => checked_seconds(raw.time_unit.to_seconds(offset), "offset")?,
                        None => synthetic_start(&segments),
                    };
                    let duration = match entry.duration {
                        Some(duration) => {
                            checked_seconds(raw.time_unit.to_seconds(duration), "duration")?
                        }
                        None => PLACEHOLDER_DURATION_SECS,
                    };

                    segments.push(TranscriptSegment {
                        text: text.to_string(),
                        start,
                        duration,
                    });
                }
                segments
            }
        };

        let language = raw
            .language
            .as_deref()
            .filter(|lang| !lang.trim().is_empty())
            .or(requested_language)
            .unwrap_or(AUTO_LANGUAGE);

        let result = TranscriptResult::new(
            segments,
            language,
            raw.available_languages.clone(),
            platform,
        );

        if result.full_text().is_empty() {
            return Err(TranscriptError::EmptyContent);
        }

        if result.word_count() < self.min_words {
            return Err(TranscriptError::ContentTooShort {
                words: result.word_count(),
                text: result.full_text().to_string(),
            });
        }

        Ok(result)
    }
}

/// Evenly spaced by position, but never before the end of the previous segment
fn synthetic_start(previous: &[TranscriptSegment]) -> f64 {
    let spaced = previous.len() as f64 * PLACEHOLDER_SPACING_SECS;
    previous
        .last()
        .map_or(spaced, |prev| spaced.max(prev.start + prev.duration))
}

/// Normalize with the default settings
pub fn normalize(
    raw: &RawTranscript,
    platform: Platform,
    requested_language: Option<&str>,
) -> Result<TranscriptResult, TranscriptError> {
    Normalizer::default().normalize(raw, platform, requested_language)
}

fn checked_seconds(value: f64, field: &str) -> Result<f64, TranscriptError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(TranscriptError::MalformedPayload(format!(
            "segment {} must be a non-negative number, got {}",
            field, value
        )))
    }
}
