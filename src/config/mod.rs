use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::utils::{redact_secret, validate_language_code};
use crate::Result;

pub const ENV_API_KEY: &str = "VIDSCRIBE_API_KEY";
pub const ENV_API_URL: &str = "VIDSCRIBE_API_URL";
pub const ENV_TIMEOUT: &str = "VIDSCRIBE_TIMEOUT_SECS";
pub const ENV_BACKENDS: &str = "VIDSCRIBE_BACKENDS";
pub const ENV_HOST: &str = "VIDSCRIBE_HOST";
pub const ENV_PORT: &str = "VIDSCRIBE_PORT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transcript upstream settings
    pub upstream: UpstreamConfig,

    /// Language and content settings
    pub transcript: TranscriptConfig,

    /// HTTP listener settings
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Key for the transcript API, sent as `x-api-key`
    pub api_key: Option<String>,

    /// Transcript API endpoint
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Backends to try, in order
    pub backends: Vec<BackendKind>,

    /// Check YouTube videos through oEmbed before fetching
    pub youtube_precheck: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Languages used when a request names none
    pub default_languages: Vec<String>,

    /// Secondary and tertiary languages tried after the caller's preference
    pub fallback_languages: Vec<String>,

    /// Transcripts with fewer words are rejected as placeholders
    pub min_words: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Directory holding `index.html` served at `/`
    pub static_dir: Option<PathBuf>,
}

/// Transcript backend implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Api,
    Captions,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Api => "api",
            BackendKind::Captions => "captions",
        }
    }
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "api" => Ok(BackendKind::Api),
            "captions" => Ok(BackendKind::Captions),
            other => anyhow::bail!("Unknown backend '{}' (expected 'api' or 'captions')", other),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.supadata.ai/v1/transcript".to_string(),
            timeout_secs: 30,
            backends: vec![BackendKind::Api],
            youtube_precheck: true,
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            default_languages: vec!["vi".to_string(), "en".to_string()],
            fallback_languages: vec!["en".to_string(), "vi".to_string()],
            min_words: crate::transcript::normalize::DEFAULT_MIN_WORDS,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from file (if any) and the environment
    pub async fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                let content = fs_err::read_to_string(&path)
                    .context("Failed to read config file")?;
                Self::from_yaml(&content)?
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document; missing fields take their defaults
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse config file")
    }

    /// Get configuration file path, if one exists
    fn config_path() -> Option<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("vidscribe").join("config.yaml"))
            .filter(|path| path.exists())
    }

    /// Apply overrides from an environment-like lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.upstream.api_key = Some(key.trim().to_string());
        }
        if let Some(url) = lookup(ENV_API_URL) {
            self.upstream.base_url = url;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT) {
            self.upstream.timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of seconds", ENV_TIMEOUT))?;
        }
        if let Some(backends) = lookup(ENV_BACKENDS) {
            self.upstream.backends = backends
                .split(',')
                .filter(|b| !b.trim().is_empty())
                .map(BackendKind::from_str)
                .collect::<Result<Vec<_>>>()?;
        }
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("{} must be a port number", ENV_PORT))?;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.upstream.base_url)
            .with_context(|| format!("Invalid transcript API URL: {}", self.upstream.base_url))?;

        if self.upstream.timeout_secs == 0 {
            anyhow::bail!("Upstream timeout must be at least one second");
        }

        if self.upstream.backends.is_empty() {
            anyhow::bail!("At least one transcript backend must be configured");
        }

        for lang in self
            .transcript
            .default_languages
            .iter()
            .chain(&self.transcript.fallback_languages)
        {
            validate_language_code(lang)
                .map_err(|e| anyhow::anyhow!("Invalid configured language: {}", e))?;
        }

        if self.uses_api() && self.upstream.api_key.is_none() {
            tracing::warn!(
                "No transcript API key configured (set {}); API requests will be rejected",
                ENV_API_KEY
            );
        }

        Ok(())
    }

    pub fn uses_api(&self) -> bool {
        self.upstream.backends.contains(&BackendKind::Api)
    }

    /// Host part of the transcript API URL, for status pages
    pub fn api_host(&self) -> Option<String> {
        url::Url::parse(&self.upstream.base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  API URL: {}", self.upstream.base_url);
        println!(
            "  API Key: {}",
            self.upstream
                .api_key
                .as_deref()
                .map(redact_secret)
                .unwrap_or_else(|| "(not set)".to_string())
        );
        println!("  Timeout: {}s", self.upstream.timeout_secs);
        println!(
            "  Backends: {}",
            self.upstream
                .backends
                .iter()
                .map(BackendKind::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  YouTube Pre-check: {}", self.upstream.youtube_precheck);
        println!("  Default Languages: {}", self.transcript.default_languages.join(", "));
        println!("  Fallback Languages: {}", self.transcript.fallback_languages.join(", "));
        println!("  Minimum Words: {}", self.transcript.min_words);
        println!("  Listen: {}:{}", self.server.host, self.server.port);
        if let Some(dir) = &self.server.static_dir {
            println!("  Static Dir: {}", dir.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
upstream:
  api_key: sd_test
  backends: [captions, api]
transcript:
  default_languages: [en]
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.upstream.api_key.as_deref(), Some("sd_test"));
        assert_eq!(
            config.upstream.backends,
            vec![BackendKind::Captions, BackendKind::Api]
        );
        assert_eq!(config.upstream.timeout_secs, 30);
        assert_eq!(config.transcript.default_languages, vec!["en"]);
        assert_eq!(config.transcript.min_words, 3);
        assert_eq!(config.server.port, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.transcript.default_languages, vec!["vi", "en"]);
        assert_eq!(config.upstream.backends, vec![BackendKind::Api]);
    }

    #[test]
    fn test_config_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 8080\n  host: 127.0.0.1").unwrap();
        let content = fs_err::read_to_string(file.path()).unwrap();
        let config = Config::from_yaml(&content).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, " secret-key "),
            (ENV_TIMEOUT, "12"),
            (ENV_BACKENDS, "captions, api"),
            (ENV_PORT, "9000"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.upstream.api_key.as_deref(), Some("secret-key"));
        assert_eq!(config.upstream.timeout_secs, 12);
        assert_eq!(
            config.upstream.backends,
            vec![BackendKind::Captions, BackendKind::Api]
        );
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_bad_overrides_are_errors() {
        let mut config = Config::default();
        assert!(config
            .apply_overrides(|key| (key == ENV_BACKENDS).then(|| "ftp".to_string()))
            .is_err());
        assert!(config
            .apply_overrides(|key| (key == ENV_TIMEOUT).then(|| "soon".to_string()))
            .is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.upstream.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.upstream.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.upstream.backends.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.transcript.fallback_languages = vec!["vi,en".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_host() {
        assert_eq!(Config::default().api_host().as_deref(), Some("api.supadata.ai"));
    }
}
