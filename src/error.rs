//! Error types for mail-triage.

use std::time::Duration;

/// Maximum number of characters of a raw backend payload carried in an error.
pub const SNIPPET_MAX_CHARS: usize = 200;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Configuration-related errors. Only raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// The inference backend broke its contract.
///
/// This is the only error that crosses the classification pipeline boundary.
/// Every variant carries a bounded excerpt of what the backend sent back.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend {backend} request failed: {snippet}")]
    Transport { backend: String, snippet: String },

    #[error("Backend {backend} timed out after {timeout:?}")]
    Timeout { backend: String, timeout: Duration },

    #[error("Backend {backend} returned HTTP {status}: {snippet}")]
    Status {
        backend: String,
        status: u16,
        snippet: String,
    },

    #[error("Backend {backend} returned an unparseable body: {snippet}")]
    Unparseable { backend: String, snippet: String },

    #[error("Backend {backend} returned an invalid response ({reason}): {snippet}")]
    InvalidShape {
        backend: String,
        reason: String,
        snippet: String,
    },

    #[error("Backend {backend} returned unknown label '{label}': {snippet}")]
    UnknownLabel {
        backend: String,
        label: String,
        snippet: String,
    },

    #[error("Backend {backend} returned no JSON object: {snippet}")]
    NoJsonObject { backend: String, snippet: String },
}

impl BackendError {
    /// Build a `Transport` error, mapping reqwest timeouts to `Timeout`.
    pub fn from_reqwest(backend: &str, err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                backend: backend.to_string(),
                timeout,
            }
        } else {
            Self::Transport {
                backend: backend.to_string(),
                snippet: truncate_snippet(&err.to_string()),
            }
        }
    }

    /// The bounded excerpt of the offending payload, if any.
    pub fn snippet(&self) -> Option<&str> {
        match self {
            Self::Timeout { .. } => None,
            Self::Transport { snippet, .. }
            | Self::Status { snippet, .. }
            | Self::Unparseable { snippet, .. }
            | Self::InvalidShape { snippet, .. }
            | Self::UnknownLabel { snippet, .. }
            | Self::NoJsonObject { snippet, .. } => Some(snippet),
        }
    }
}

/// Truncate a raw payload to [`SNIPPET_MAX_CHARS`] characters.
///
/// Cuts on a char boundary; appends `…` when something was dropped.
pub fn truncate_snippet(raw: &str) -> String {
    let mut chars = raw.chars();
    let head: String = chars.by_ref().take(SNIPPET_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
