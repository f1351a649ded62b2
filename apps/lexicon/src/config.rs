//! Application configuration.
//!
//! Values come from the environment (after `.env` has been loaded by the
//! binary) and are passed explicitly to the components that need them.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Credential baked in at build time, if any.
const BUILD_API_KEY: Option<&str> = option_env!("LEXICON_BUILD_API_KEY");

/// API credential for the generation service. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Accept a configured value, ignoring blanks and unfilled placeholders.
    pub fn new(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() || value == "your-api-key-here" || value.starts_with("$(") {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Settings for the exercise generation service.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: Option<ApiKey>,
    pub model: String,
    pub endpoint: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GenerationConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: resolve_api_key(env_string("LEXICON_API_KEY").as_deref(), BUILD_API_KEY),
            model: env_string("LEXICON_MODEL").unwrap_or(defaults.model),
            endpoint: env_string("LEXICON_API_ENDPOINT").unwrap_or(defaults.endpoint),
            temperature: env_parse("LEXICON_TEMPERATURE").unwrap_or(defaults.temperature),
            timeout: env_parse("LEXICON_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// The user-set value wins over the build-time one.
pub fn resolve_api_key(user_override: Option<&str>, build_time: Option<&str>) -> Option<ApiKey> {
    user_override
        .and_then(ApiKey::new)
        .or_else(|| build_time.and_then(ApiKey::new))
}

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub generation: GenerationConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_path: env_string("LEXICON_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_database_path),
            generation: GenerationConfig::from_env(),
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lexicon")
        .join("lexicon.db")
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key)?.trim().parse().ok()
}
