use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::TranscriptError;

static LANGUAGE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$").expect("valid regex"));

/// Format a start offset as `MM:SS`, truncating fractions.
/// Minutes keep growing past 59, there is no hour field.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Hide most of a secret for display
pub fn redact_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(3).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

/// Check a BCP-47 style language code such as `en`, `vi` or `pt-BR`
pub fn validate_language_code(code: &str) -> Result<(), TranscriptError> {
    if LANGUAGE_CODE.is_match(code) {
        Ok(())
    } else {
        Err(TranscriptError::InvalidInput(format!(
            "'{}' is not a language code (expected something like \"en\" or \"pt-BR\")",
            code
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(5.9), "00:05");
        assert_eq!(format_timestamp(65.2), "01:05");
        assert_eq!(format_timestamp(3725.0), "62:05");
        assert_eq!(format_timestamp(-1.0), "00:00");
    }

    #[test]
    fn test_redact_secret() {
        assert_eq!(redact_secret("sd_e9a4b528d641fd89"), "sd_****");
        assert_eq!(redact_secret("short"), "****");
    }

    #[test]
    fn test_validate_language_code() {
        for code in ["en", "vi", "pt-BR", "zh-Hans", "fil"] {
            assert!(validate_language_code(code).is_ok(), "{}", code);
        }
        for code in ["", "vi,en", "english", "e", "en_US", " en"] {
            assert!(validate_language_code(code).is_err(), "{}", code);
        }
    }
}
