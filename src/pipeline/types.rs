//! Shared types for the classification pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Request ─────────────────────────────────────────────────────────

/// One email to classify.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    /// Generated per request; only used to correlate log lines.
    pub id: Uuid,
    /// Email body as submitted.
    pub text: String,
}

impl ClassificationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
        }
    }
}

// ── Category ────────────────────────────────────────────────────────

/// The two mutually exclusive outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Contains a request or action the recipient needs to handle.
    Productive,
    /// Greeting, thanks, newsletter, spam: nothing to do.
    NonProductive,
}

impl Category {
    /// Candidate labels sent to zero-shot backends, in a fixed order.
    pub const LABELS: [&'static str; 2] = ["productive", "non_productive"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Productive => "productive",
            Self::NonProductive => "non_productive",
        }
    }

    /// Strict match against [`Self::LABELS`] after trimming and lower-casing.
    ///
    /// Used for zero-shot output, where the backend only ever sees the
    /// canonical candidate labels.
    pub fn from_canonical(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "productive" => Some(Self::Productive),
            "non_productive" => Some(Self::NonProductive),
            _ => None,
        }
    }

    /// Lenient parse for model-written JSON. Case-insensitive, ignores
    /// surrounding whitespace.
    ///
    /// Accepts the Portuguese labels the service was first deployed with.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "productive" | "produtivo" => Some(Self::Productive),
            "non_productive" | "non-productive" | "improdutivo" => Some(Self::NonProductive),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Backend output ──────────────────────────────────────────────────

/// What an inference backend handed back, before any normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInferenceResult {
    /// Zero-shot shape: labels and scores ranked by descending score.
    RankedLabels {
        labels: Vec<String>,
        scores: Vec<f64>,
        /// Truncated raw response body, carried for error reporting.
        snippet: String,
    },
    /// Generative shape: free text that should embed one JSON object.
    FreeformJson(String),
}

impl RawInferenceResult {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RankedLabels { .. } => "ranked_labels",
            Self::FreeformJson(_) => "freeform_json",
        }
    }
}

/// Canonical model opinion, shared by both backend shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelJudgement {
    pub category: Category,
    /// Always within [0.0, 1.0].
    pub confidence: f64,
    /// Model-written reply (generative backends only).
    pub suggested_reply: Option<String>,
    /// Model-written justification (generative backends only).
    pub reason: Option<String>,
}

// ── Gate ────────────────────────────────────────────────────────────

/// Outcome of the gibberish gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GibberishVerdict {
    Clean,
    Rejected { reason: &'static str },
}

impl GibberishVerdict {
    pub fn is_gibberish(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

// ── Final verdict ───────────────────────────────────────────────────

/// Pipeline output, returned to the caller as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedVerdict {
    pub category: Category,
    pub confidence: f64,
    pub suggested_reply: String,
    pub reason: String,
}
