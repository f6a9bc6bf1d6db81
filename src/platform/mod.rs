//! Input classification: which platform a pasted URL belongs to and which
//! reference should be handed to the transcript sources.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TranscriptError;

/// Canonical watch URL prefix for YouTube ids
pub const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Length of a YouTube video id
pub const YOUTUBE_ID_LEN: usize = 11;

/// Video platforms the service recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    TikTok,
    Twitter,
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::TikTok => "tiktok",
            Platform::Twitter => "twitter",
            Platform::Unknown => "unknown",
        }
    }

    /// Human readable name for messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Youtube => "YouTube",
            Platform::TikTok => "TikTok",
            Platform::Twitter => "X (Twitter)",
            Platform::Unknown => "video",
        }
    }

    /// Platforms a user can expect transcripts for
    pub fn supported() -> [Platform; 3] {
        [Platform::Youtube, Platform::TikTok, Platform::Twitter]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified input, immutable once built by [`classify`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoReference {
    raw_input: String,
    canonical: String,
    platform: Platform,
    video_id: Option<String>,
}

impl VideoReference {
    /// The string exactly as the caller supplied it
    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    /// The URL (or id) sent downstream
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The 11-character YouTube id, when one could be extracted
    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    fn passthrough(raw: &str, trimmed: &str, platform: Platform) -> Self {
        Self {
            raw_input: raw.to_string(),
            canonical: trimmed.to_string(),
            platform,
            video_id: None,
        }
    }

    fn youtube(raw: &str, id: &str) -> Self {
        Self {
            raw_input: raw.to_string(),
            canonical: format!("{}{}", YOUTUBE_WATCH_URL, id),
            platform: Platform::Youtube,
            video_id: Some(id.to_string()),
        }
    }
}

// Tried in order, first hit wins. The trailing group makes sure exactly
// eleven id characters were captured.
static YOUTUBE_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"[?&]v=([0-9A-Za-z_-]{11})(?:[^0-9A-Za-z_-]|$)",
        r"/embed/([0-9A-Za-z_-]{11})(?:[^0-9A-Za-z_-]|$)",
        r"youtu\.be/([0-9A-Za-z_-]{11})(?:[^0-9A-Za-z_-]|$)",
        r"/shorts/([0-9A-Za-z_-]{11})(?:[^0-9A-Za-z_-]|$)",
        r"/live/([0-9A-Za-z_-]{11})(?:[^0-9A-Za-z_-]|$)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

static URL_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("valid regex"));

/// Classify a pasted URL or bare id.
///
/// Platform signals are checked from most to least specific: TikTok, then
/// X/Twitter, then YouTube. Anything else is passed through as
/// [`Platform::Unknown`] and left for the upstream to judge.
pub fn classify(input: &str) -> Result<VideoReference, TranscriptError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TranscriptError::InvalidInput("URL must not be empty".to_string()));
    }

    let lower = trimmed.to_lowercase();

    if lower.contains("tiktok.com") {
        return Ok(VideoReference::passthrough(input, trimmed, Platform::TikTok));
    }

    if is_twitter(&lower) {
        return Ok(VideoReference::passthrough(input, trimmed, Platform::Twitter));
    }

    if trimmed.chars().count() == YOUTUBE_ID_LEN && !has_url_scheme(trimmed) {
        return Ok(VideoReference::youtube(input, trimmed));
    }

    if let Some(id) = extract_youtube_id(trimmed) {
        return Ok(VideoReference::youtube(input, id));
    }

    if lower.contains("youtube.com") || lower.contains("youtu.be") {
        tracing::debug!("YouTube URL without a recognizable video id: {}", trimmed);
        return Ok(VideoReference::passthrough(input, trimmed, Platform::Youtube));
    }

    Ok(VideoReference::passthrough(input, trimmed, Platform::Unknown))
}

/// Pull a YouTube id out of a URL using the ordered pattern list
pub fn extract_youtube_id(url: &str) -> Option<&str> {
    YOUTUBE_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn has_url_scheme(input: &str) -> bool {
    URL_SCHEME.is_match(input)
}

fn is_twitter(lower: &str) -> bool {
    lower.contains("twitter.com") || contains_domain(lower, "x.com")
}

/// `domain` appears as a whole host label sequence, so `x.com` does not fire
/// on `netflix.com` or `x.company`.
fn contains_domain(haystack: &str, domain: &str) -> bool {
    haystack.match_indices(domain).any(|(idx, _)| {
        let before = haystack[..idx].chars().next_back();
        let after = haystack[idx + domain.len()..].chars().next();
        let starts_label = matches!(before, None | Some('/') | Some('.') | Some('@'));
        let ends_host = matches!(after, None | Some('/') | Some(':') | Some('?') | Some('#'));
        starts_label && ends_host
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_id_pattern_compiles() {
        assert_eq!(YOUTUBE_ID_PATTERNS.len(), 5);
        assert!(has_url_scheme("https://youtu.be/x"));
    }

    #[test]
    fn test_empty_input_is_invalid() {
        assert!(matches!(classify("   "), Err(TranscriptError::InvalidInput(_))));
        assert!(matches!(classify(""), Err(TranscriptError::InvalidInput(_))));
    }

    #[test]
    fn test_bare_id_is_youtube() {
        let reference = classify("dQw4w9WgXcQ").unwrap();
        assert_eq!(reference.platform(), Platform::Youtube);
        assert_eq!(reference.canonical(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(reference.video_id(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_any_eleven_chars_without_scheme_is_youtube() {
        for input in ["hello_world", "AAAAAAAAAAA", "a-b_c-d_e-f", "12345678901", "ab.cd/ef?gh"] {
            let reference = classify(input).unwrap();
            assert_eq!(reference.platform(), Platform::Youtube, "{}", input);
            assert_eq!(reference.canonical(), format!("{}{}", YOUTUBE_WATCH_URL, input));
        }
    }

    #[test]
    fn test_youtube_url_forms() {
        let cases = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "  https://youtu.be/dQw4w9WgXcQ  ",
        ];
        for url in cases {
            let reference = classify(url).unwrap();
            assert_eq!(reference.platform(), Platform::Youtube, "{}", url);
            assert_eq!(reference.video_id(), Some("dQw4w9WgXcQ"), "{}", url);
            assert_eq!(reference.canonical(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        }
    }

    #[test]
    fn test_query_parameter_pattern_wins_over_later_patterns() {
        let url = "https://www.youtube.com/embed/AAAAAAAAAAA?v=BBBBBBBBBBB";
        assert_eq!(extract_youtube_id(url), Some("BBBBBBBBBBB"));
    }

    #[test]
    fn test_overlong_id_is_not_matched() {
        assert_eq!(extract_youtube_id("https://youtu.be/dQw4w9WgXcQxyz"), None);
        let reference = classify("https://youtu.be/dQw4w9WgXcQxyz").unwrap();
        assert_eq!(reference.platform(), Platform::Youtube);
        assert_eq!(reference.video_id(), None);
        assert_eq!(reference.canonical(), "https://youtu.be/dQw4w9WgXcQxyz");
    }

    #[test]
    fn test_youtube_domain_without_id_passes_through() {
        let reference = classify("https://www.youtube.com/@SomeChannel").unwrap();
        assert_eq!(reference.platform(), Platform::Youtube);
        assert_eq!(reference.canonical(), "https://www.youtube.com/@SomeChannel");
    }

    #[test]
    fn test_tiktok_any_case() {
        for url in [
            "https://www.tiktok.com/@user/video/7234567890123456789",
            "HTTPS://VM.TIKTOK.COM/ZMabc/",
            "  www.TikTok.com/@x/video/1 ",
            "tiktok.com",
        ] {
            let reference = classify(url).unwrap();
            assert_eq!(reference.platform(), Platform::TikTok, "{}", url);
            assert_eq!(reference.canonical(), url.trim());
            assert_eq!(reference.raw_input(), url);
        }
    }

    #[test]
    fn test_tiktok_beats_youtube_markers() {
        let reference = classify("https://www.tiktok.com/share?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(reference.platform(), Platform::TikTok);
    }

    #[test]
    fn test_twitter_and_x() {
        for url in [
            "https://twitter.com/user/status/1234567890",
            "https://x.com/user/status/1234567890",
            "https://mobile.twitter.com/user/status/1",
            "x.com/someone/status/42",
        ] {
            let reference = classify(url).unwrap();
            assert_eq!(reference.platform(), Platform::Twitter, "{}", url);
            assert_eq!(reference.canonical(), url);
        }
    }

    #[test]
    fn test_x_domain_needs_boundary() {
        let reference = classify("https://www.netflix.com/title/80100172").unwrap();
        assert_eq!(reference.platform(), Platform::Unknown);
    }

    #[test]
    fn test_unknown_passes_through() {
        let reference = classify("  https://vimeo.com/76979871  ").unwrap();
        assert_eq!(reference.platform(), Platform::Unknown);
        assert_eq!(reference.canonical(), "https://vimeo.com/76979871");
        assert_eq!(reference.video_id(), None);
    }

    #[test]
    fn test_eleven_chars_with_scheme_is_not_bare_id() {
        let reference = classify("http://a.bc").unwrap();
        assert_eq!(reference.platform(), Platform::Unknown);
    }
}
