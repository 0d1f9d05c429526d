//! Configuration loading
//!
//! Bootstrap settings come from a TOML file. Resolution priority for each value:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Levels 1 and 2 are applied by the binary on top of the [`TomlConfig`] returned here.
//! A missing default config file is not an error: a warning is logged and compiled
//! defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Environment variable holding the inference API token
pub const API_TOKEN_ENV: &str = "EMOSCOPE_HF_TOKEN";

/// Default HTTP port for the dashboard
pub const DEFAULT_PORT: u16 = 5730;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Address to bind the HTTP server to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest batch accepted in one analysis
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,

    /// Request body limit in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            max_messages: default_max_messages(),
            max_body_bytes: default_max_body_bytes(),
            logging: LoggingConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Which classifier implementation serves the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    /// Hosted pretrained models over HTTP
    #[default]
    Inference,
    /// Offline word-list classifier
    Lexicon,
}

impl ClassifierBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierBackend::Inference => "inference",
            ClassifierBackend::Lexicon => "lexicon",
        }
    }
}

impl fmt::Display for ClassifierBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassifierBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inference" => Ok(ClassifierBackend::Inference),
            "lexicon" => Ok(ClassifierBackend::Lexicon),
            other => Err(format!(
                "unknown classifier backend '{}' (expected 'inference' or 'lexicon')",
                other
            )),
        }
    }
}

/// Classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub backend: ClassifierBackend,

    /// Base URL of the inference API; the model id is appended
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_sentiment_model")]
    pub sentiment_model: String,

    #[serde(default = "default_emotion_model")]
    pub emotion_model: String,

    /// Bearer token for the inference API (optional)
    #[serde(default)]
    pub api_token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Outbound request rate limit
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::default(),
            endpoint: default_endpoint(),
            sentiment_model: default_sentiment_model(),
            emotion_model: default_emotion_model(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_messages() -> usize {
    500
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_endpoint() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_sentiment_model() -> String {
    "distilbert-base-uncased-finetuned-sst-2-english".to_string()
}

fn default_emotion_model() -> String {
    "SamLowe/roberta-base-go_emotions".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_requests_per_second() -> u32 {
    5
}

/// Platform config file location: `<config_dir>/emoscope/emoscope.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("emoscope").join("emoscope.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
    validate(&config)?;
    Ok(config)
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// No file found; compiled defaults in use. Holds the path that was probed.
    Defaults(Option<PathBuf>),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults(Some(path)) => {
                write!(f, "compiled defaults ({} not found)", path.display())
            }
            ConfigSource::Defaults(None) => write!(f, "compiled defaults (no config directory)"),
        }
    }
}

/// Load configuration from an explicit path or the platform default
///
/// An explicit path must exist. A missing default file yields compiled defaults.
/// Runs before logging is initialised, so the source is returned for the caller to log.
pub fn load_config(explicit: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    if let Some(path) = explicit {
        let config = load_toml_config(path)?;
        return Ok((config, ConfigSource::File(path.to_path_buf())));
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            let config = load_toml_config(&path)?;
            Ok((config, ConfigSource::File(path)))
        }
        probed => Ok((TomlConfig::default(), ConfigSource::Defaults(probed))),
    }
}

fn validate(config: &TomlConfig) -> Result<()> {
    if config.max_messages == 0 {
        return Err(Error::Config("max_messages must be at least 1".to_string()));
    }
    if config.classifier.requests_per_second == 0 {
        return Err(Error::Config(
            "classifier.requests_per_second must be at least 1".to_string(),
        ));
    }
    if config.classifier.timeout_secs == 0 {
        return Err(Error::Config(
            "classifier.timeout_secs must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Resolve the inference API token
///
/// **Priority:** ENV → TOML. Blank values are ignored.
pub fn resolve_api_token(config: &ClassifierConfig) -> Option<String> {
    let env_token = std::env::var(API_TOKEN_ENV).ok().filter(|t| is_valid_key(t));
    let toml_token = config.api_token.clone().filter(|t| is_valid_key(t));

    if env_token.is_some() && toml_token.is_some() {
        warn!(
            "API token found in both {} and TOML config. Using environment variable.",
            API_TOKEN_ENV
        );
    }

    if let Some(token) = env_token {
        info!("API token loaded from environment variable");
        return Some(token);
    }
    if let Some(token) = toml_token {
        info!("API token loaded from TOML config");
        return Some(token);
    }
    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// User-Agent for outbound HTTP requests
pub fn get_user_agent() -> String {
    format!(
        "Emoscope/{} (https://github.com/emoscope/emoscope)",
        env!("CARGO_PKG_VERSION")
    )
}
