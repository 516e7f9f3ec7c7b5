//! Parley Configuration Management
//!
//! Handles NLU pipeline configuration and classifier credentials from
//! explicit structs, with an environment-variable loader for credentials.
//! All validation happens at construction time, before any network call.

use serde::{Deserialize, Serialize};

/// Default base URL of the classification service
pub const DEFAULT_BASE_URL: &str = "https://api.parley.dev/nlp/v1/";

/// Environment variable holding the application token
pub const ENV_APP_TOKEN: &str = "PARLEY_APP_TOKEN";
/// Environment variable holding the application id
pub const ENV_APP_ID: &str = "PARLEY_APP_ID";
/// Environment variable holding the application key
pub const ENV_APP_KEY: &str = "PARLEY_APP_KEY";
/// Environment variable overriding the classification service base URL
pub const ENV_API_URL: &str = "PARLEY_API_URL";

/// NLU pipeline configuration
///
/// Immutable for the lifetime of one pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NluConfig {
    /// Locale of the bot (lexicon selection for built-in extractors)
    pub locale: String,

    /// QnA precedence mode
    pub qna: QnaMode,

    /// Spellchecking key; `None` disables spellchecking
    pub spellchecking: Option<String>,

    /// Allow up to two intents in the final result when a filter is set
    pub multi_intent: bool,
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            qna: QnaMode::Off,
            spellchecking: None,
            multi_intent: false,
        }
    }
}

/// QnA precedence relative to local classification
///
/// This is the explicit three-state form of the fallback machine: QnA
/// first with local fallback, local first with QnA fallback, or local only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QnaMode {
    /// Never consult the QnA service
    #[default]
    Off,
    /// QnA first; fall back to local classification on an empty match list
    Before,
    /// Local classification first; fall back to QnA on empty intents
    After,
}

impl std::str::FromStr for QnaMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            _ => Err(ConfigError::InvalidValue {
                key: "qna".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for QnaMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Before => write!(f, "before"),
            Self::After => write!(f, "after"),
        }
    }
}

/// Credentials and endpoint for the remote classification service
///
/// All three credentials are required; their absence is a fatal
/// construction-time error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierCredentials {
    /// Bot/application token header value
    pub app_token: String,

    /// Application id header value
    pub app_id: String,

    /// Application key header value
    pub app_key: String,

    /// Base URL of the classification service
    pub base_url: String,
}

impl ClassifierCredentials {
    /// Create credentials with the default base URL
    pub fn new(
        app_token: impl Into<String>,
        app_id: impl Into<String>,
        app_key: impl Into<String>,
    ) -> Self {
        Self {
            app_token: app_token.into(),
            app_id: app_id.into(),
            app_key: app_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the service base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Load credentials from environment variables
    ///
    /// `PARLEY_APP_TOKEN`, `PARLEY_APP_ID`, and `PARLEY_APP_KEY` are
    /// required; `PARLEY_API_URL` optionally overrides the base URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_token = require_env(ENV_APP_TOKEN)?;
        let app_id = require_env(ENV_APP_ID)?;
        let app_key = require_env(ENV_APP_KEY)?;

        let mut credentials = Self::new(app_token, app_id, app_key);
        if let Ok(url) = std::env::var(ENV_API_URL) {
            credentials.base_url = url;
        }

        credentials.validate()?;
        Ok(credentials)
    }

    /// Check that all required credential fields are present and non-empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_token.is_empty() {
            return Err(ConfigError::MissingRequired(ENV_APP_TOKEN.to_string()));
        }
        if self.app_id.is_empty() {
            return Err(ConfigError::MissingRequired(ENV_APP_ID.to_string()));
        }
        if self.app_key.is_empty() {
            return Err(ConfigError::MissingRequired(ENV_APP_KEY.to_string()));
        }
        Ok(())
    }

    /// Base URL normalized to end with exactly one trailing slash
    pub fn endpoint_base(&self) -> String {
        normalize_base_url(&self.base_url)
    }
}

/// Normalize a base URL to end with exactly one `/`
pub fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingRequired(key.to_string())),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
