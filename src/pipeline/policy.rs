//! Decision policy: confidence threshold plus an action-keyword override.
//!
//! Below the threshold the policy leans towards `non_productive`. The only
//! exception is a `productive` guess backed by an action-intent keyword in
//! the text. A sub-threshold `non_productive` guess is never reconsidered.

use tracing::debug;

use crate::config::DecisionConfig;
use crate::pipeline::types::Category;

/// Lexical cues that count as evidence of a request, English and Portuguese.
///
/// Matched as plain substrings of the lower-cased normalized text.
pub const ACTION_KEYWORDS: &[&str] = &[
    "schedule",
    "meeting",
    "follow up",
    "contact",
    "can you",
    "could you",
    "would like",
    "want",
    "agendar",
    "reunião",
    "retorno",
    "contato",
    "pode",
    "poderia",
    "gostaria",
    "quero",
];

/// Which rule produced the final category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// Confidence met the threshold; backend category kept.
    Accepted,
    /// Low confidence, but a keyword backed the `productive` guess.
    KeywordOverride,
    /// Low confidence; forced to `non_productive`.
    Demoted,
}

impl DecisionOutcome {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::KeywordOverride => "keyword_override",
            Self::Demoted => "demoted",
        }
    }
}

/// Result of applying the policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub category: Category,
    pub outcome: DecisionOutcome,
}

/// Threshold-based decision policy.
#[derive(Debug, Clone)]
pub struct DecisionPolicy {
    config: DecisionConfig,
}

impl DecisionPolicy {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    pub fn threshold(&self) -> f64 {
        self.config.confidence_threshold
    }

    /// Finalize the backend's `(category, confidence)` against normalized text.
    pub fn decide(&self, category: Category, confidence: f64, text: &str) -> Decision {
        if confidence >= self.config.confidence_threshold {
            return Decision {
                category,
                outcome: DecisionOutcome::Accepted,
            };
        }

        if category == Category::Productive
            && let Some(keyword) = find_action_keyword(text)
        {
            debug!(keyword, confidence, "Low confidence rescued by action keyword");
            return Decision {
                category: Category::Productive,
                outcome: DecisionOutcome::KeywordOverride,
            };
        }

        Decision {
            category: Category::NonProductive,
            outcome: DecisionOutcome::Demoted,
        }
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self::new(DecisionConfig::default())
    }
}

/// First action keyword contained in `text`, if any.
pub fn find_action_keyword(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    ACTION_KEYWORDS
        .iter()
        .copied()
        .find(|kw| lowered.contains(kw))
}
