use serde::{Deserialize, Serialize};

use crate::platform::Platform;

pub mod fallback;
pub mod normalize;

pub use fallback::{AttemptOutcome, FallbackOrchestrator, FetchAttempt, Resolution, Strategy};
pub use normalize::{normalize, Normalizer};

/// Individual transcript segment with timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Segment text, never empty
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

/// A normalized transcript.
///
/// Built only through [`TranscriptResult::new`], which derives the full text
/// and its counts from the segments so they cannot drift apart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptResult {
    segments: Vec<TranscriptSegment>,
    full_text: String,
    language: String,
    available_languages: Vec<String>,
    platform: Platform,
    word_count: usize,
    char_count: usize,
}

impl TranscriptResult {
    pub fn new(
        segments: Vec<TranscriptSegment>,
        language: impl Into<String>,
        available_languages: Vec<String>,
        platform: Platform,
    ) -> Self {
        let full_text = segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();
        let word_count = full_text.split_whitespace().count();
        let char_count = full_text.chars().count();

        Self {
            segments,
            full_text,
            language: language.into(),
            available_languages,
            platform,
            word_count,
            char_count,
        }
    }

    /// Segments in playback order
    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn available_languages(&self) -> &[String] {
        &self.available_languages
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, start: f64) -> TranscriptSegment {
        TranscriptSegment {
            text: text.to_string(),
            start,
            duration: 1.0,
        }
    }

    #[test]
    fn test_counts_follow_full_text() {
        let result = TranscriptResult::new(
            vec![segment("hello there", 0.0), segment("general kenobi", 1.0)],
            "vi",
            vec!["vi".to_string(), "en".to_string()],
            Platform::Youtube,
        );
        assert_eq!(result.full_text(), "hello there general kenobi");
        assert_eq!(result.word_count(), 4);
        assert_eq!(result.char_count(), 26);
        assert_eq!(result.language(), "vi");
        assert_eq!(result.segments().len(), 2);
    }

    #[test]
    fn test_empty_segments_give_empty_text() {
        let result = TranscriptResult::new(Vec::new(), "en", Vec::new(), Platform::Unknown);
        assert_eq!(result.full_text(), "");
        assert_eq!(result.word_count(), 0);
        assert_eq!(result.char_count(), 0);
    }
}
