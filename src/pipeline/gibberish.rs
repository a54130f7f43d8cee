//! Gibberish gate: rejects low-signal input before any backend call.
//!
//! Checks, in order (first match wins):
//! - too short
//! - too few letters
//! - one character dominates the text
//!
//! A rejection short-circuits the pipeline with a rule-based verdict.

use tracing::debug;

use crate::config::GibberishConfig;
use crate::pipeline::normalize::{alphabetic_count, dominant_char_ratio};
use crate::pipeline::types::GibberishVerdict;

pub const REASON_TOO_SHORT: &str = "too short to analyze.";
pub const REASON_TOO_FEW_LETTERS: &str = "too few letters to analyze.";
pub const REASON_REPETITIVE: &str = "repetitive text.";

/// Heuristic pre-filter over normalized text.
#[derive(Debug, Clone)]
pub struct GibberishGate {
    config: GibberishConfig,
}

impl GibberishGate {
    pub fn new(config: GibberishConfig) -> Self {
        Self { config }
    }

    /// Evaluate already-normalized text.
    pub fn evaluate(&self, text: &str) -> GibberishVerdict {
        let length = text.chars().count();
        if length < self.config.min_length {
            debug!(length, min = self.config.min_length, "Gate: input too short");
            return GibberishVerdict::Rejected {
                reason: REASON_TOO_SHORT,
            };
        }

        let letters = alphabetic_count(text);
        if letters < self.config.min_alphabetic {
            debug!(letters, min = self.config.min_alphabetic, "Gate: too few letters");
            return GibberishVerdict::Rejected {
                reason: REASON_TOO_FEW_LETTERS,
            };
        }

        let ratio = dominant_char_ratio(text);
        if ratio >= self.config.max_repeat_ratio {
            debug!(ratio, max = self.config.max_repeat_ratio, "Gate: repetitive text");
            return GibberishVerdict::Rejected {
                reason: REASON_REPETITIVE,
            };
        }

        GibberishVerdict::Clean
    }
}

impl Default for GibberishGate {
    fn default() -> Self {
        Self::new(GibberishConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_with(text: &str) -> Option<&'static str> {
        match GibberishGate::default().evaluate(text) {
            GibberishVerdict::Rejected { reason } => Some(reason),
            GibberishVerdict::Clean => None,
        }
    }

    #[test]
    fn rejects_short_text() {
        assert_eq!(rejected_with("hi there"), Some(REASON_TOO_SHORT));
        assert_eq!(rejected_with(""), Some(REASON_TOO_SHORT));
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        // 14 chars, 20+ bytes.
        assert_eq!(rejected_with("ção ção ção çã"), Some(REASON_TOO_SHORT));
    }

    #[test]
    fn rejects_mostly_digits() {
        assert_eq!(rejected_with("1234 5678 9012 abc"), Some(REASON_TOO_FEW_LETTERS));
    }

    #[test]
    fn rejects_repeated_character() {
        assert_eq!(rejected_with("aaaaaaaaaaaaaaaa"), Some(REASON_REPETITIVE));
        assert_eq!(rejected_with("AAAA aaaa AAAA aaaa b"), Some(REASON_REPETITIVE));
    }

    #[test]
    fn short_check_wins_over_letters() {
        assert_eq!(rejected_with("12345"), Some(REASON_TOO_SHORT));
    }

    #[test]
    fn accepts_normal_email() {
        assert_eq!(
            rejected_with("Could you send me the updated quote by Friday?"),
            None
        );
    }

    #[test]
    fn accepts_accented_text() {
        assert_eq!(
            rejected_with("Olá, poderia me enviar a cotação atualizada?"),
            None
        );
    }

    #[test]
    fn thresholds_are_configurable() {
        let gate = GibberishGate::new(GibberishConfig {
            min_length: 3,
            min_alphabetic: 2,
            max_repeat_ratio: 0.9,
        });
        assert!(!gate.evaluate("abc ok").is_gibberish());
        assert!(gate.evaluate("ab").is_gibberish());
    }
}
