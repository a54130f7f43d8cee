//! Configuration types.
//!
//! Everything here is loaded once at startup and passed explicitly into the
//! classifier. Nothing in the pipeline reads the environment.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default decision threshold.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.70;

/// Default outbound timeout for backend calls.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(45);

/// Default zero-shot model on the Hugging Face inference API.
pub const DEFAULT_ZERO_SHOT_MODEL: &str = "facebook/bart-large-mnli";

/// Default chat model for the generative backend.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

const DEFAULT_ZERO_SHOT_BASE_URL: &str = "https://api-inference.huggingface.co";
const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";

/// Which inference backend shape to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Ranked `(label, score)` pairs from a zero-shot classifier.
    ZeroShot,
    /// Chat-completion model asked to emit a JSON object.
    Chat,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroShot => "zero_shot",
            Self::Chat => "chat",
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zero_shot" | "zero-shot" | "zeroshot" => Ok(Self::ZeroShot),
            "chat" | "openai" => Ok(Self::Chat),
            other => Err(ConfigError::InvalidValue {
                key: "MAIL_TRIAGE_BACKEND".into(),
                message: format!("unknown backend '{other}' (expected zero_shot or chat)"),
            }),
        }
    }
}

/// Thresholds for the gibberish gate.
#[derive(Debug, Clone)]
pub struct GibberishConfig {
    /// Minimum normalized length, in characters.
    pub min_length: usize,
    /// Minimum number of alphabetic characters.
    pub min_alphabetic: usize,
    /// Reject when the most frequent non-whitespace char reaches this share.
    pub max_repeat_ratio: f64,
}

impl Default for GibberishConfig {
    fn default() -> Self {
        Self {
            min_length: 15,
            min_alphabetic: 10,
            max_repeat_ratio: 0.60,
        }
    }
}

/// Decision policy configuration.
#[derive(Debug, Clone)]
pub struct DecisionConfig {
    /// Minimum backend confidence to accept its category as-is.
    pub confidence_threshold: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Connection settings for the inference backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub timeout: Duration,
}

impl BackendConfig {
    /// Zero-shot backend with default model and endpoint.
    pub fn zero_shot() -> Self {
        Self {
            kind: BackendKind::ZeroShot,
            model: DEFAULT_ZERO_SHOT_MODEL.to_string(),
            base_url: DEFAULT_ZERO_SHOT_BASE_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }

    /// Chat backend with default model and endpoint.
    pub fn chat(api_key: SecretString) -> Self {
        Self {
            kind: BackendKind::Chat,
            model: DEFAULT_CHAT_MODEL.to_string(),
            base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            api_key: Some(api_key),
            timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Immutable configuration handed to the classifier.
#[derive(Debug, Clone, Default)]
pub struct ClassifierConfig {
    pub gibberish: GibberishConfig,
    pub decision: DecisionConfig,
}

/// Full service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    pub backend: BackendConfig,
    /// HTTP listen port.
    pub port: u16,
    /// Minimum trimmed length of `text` accepted by `POST /analyze`.
    pub min_request_chars: usize,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kind = match lookup("MAIL_TRIAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => BackendKind::ZeroShot,
        };

        let mut backend = match kind {
            BackendKind::ZeroShot => {
                let mut cfg = BackendConfig::zero_shot();
                cfg.api_key = lookup("HF_API_TOKEN")
                    .filter(|s| !s.trim().is_empty())
                    .map(SecretString::from);
                cfg
            }
            BackendKind::Chat => {
                let key = lookup("OPENAI_API_KEY")
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".into()))?;
                BackendConfig::chat(SecretString::from(key))
            }
        };

        if let Some(model) = lookup("MAIL_TRIAGE_MODEL") {
            backend.model = model;
        }
        if let Some(url) = lookup("MAIL_TRIAGE_BASE_URL") {
            backend.base_url = url.trim_end_matches('/').to_string();
        }
        let timeout_secs: u64 = parse_or(&lookup, "MAIL_TRIAGE_TIMEOUT_SECS", 45)?;
        backend.timeout = Duration::from_secs(timeout_secs);

        let defaults = GibberishConfig::default();
        let gibberish = GibberishConfig {
            min_length: parse_or(&lookup, "MAIL_TRIAGE_MIN_LENGTH", defaults.min_length)?,
            min_alphabetic: parse_or(&lookup, "MAIL_TRIAGE_MIN_LETTERS", defaults.min_alphabetic)?,
            max_repeat_ratio: unit_interval(
                "MAIL_TRIAGE_MAX_REPEAT_RATIO",
                parse_or(&lookup, "MAIL_TRIAGE_MAX_REPEAT_RATIO", defaults.max_repeat_ratio)?,
            )?,
        };

        let decision = DecisionConfig {
            confidence_threshold: unit_interval(
                "MAIL_TRIAGE_THRESHOLD",
                parse_or(&lookup, "MAIL_TRIAGE_THRESHOLD", DEFAULT_CONFIDENCE_THRESHOLD)?,
            )?,
        };

        Ok(Self {
            classifier: ClassifierConfig {
                gibberish,
                decision,
            },
            backend,
            port: parse_or(&lookup, "MAIL_TRIAGE_PORT", 8000)?,
            min_request_chars: parse_or(&lookup, "MAIL_TRIAGE_MIN_REQUEST_CHARS", 5)?,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{raw}': {e}"),
        }),
        None => Ok(default),
    }
}

fn unit_interval(key: &str, value: f64) -> Result<f64, ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{value} is outside [0, 1]"),
        })
    }
}
