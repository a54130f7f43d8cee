//! Text normalization and signal-density measures.

use std::collections::HashMap;

/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of alphabetic characters, accented Latin letters included.
pub fn alphabetic_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_alphabetic()).count()
}

/// Share of the most frequent lower-cased non-whitespace character.
///
/// Returns `0.0` when the text has no non-whitespace characters.
pub fn dominant_char_ratio(text: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        for lower in c.to_lowercase() {
            *counts.entry(lower).or_default() += 1;
            total += 1;
        }
    }

    match counts.values().max() {
        Some(&top) if total > 0 => top as f64 / total as f64,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_mixed_whitespace() {
        assert_eq!(
            normalize_whitespace("  Hello,\n\n\tteam \r\n  please   reply "),
            "Hello, team please reply"
        );
    }

    #[test]
    fn empty_and_blank_normalize_to_empty() {
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace(" \n\t "), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_whitespace("a \u{00a0} b\u{2003}c");
        assert_eq!(normalize_whitespace(&once), once);
        assert_eq!(once, "a b c");
    }

    #[test]
    fn counts_accented_letters() {
        assert_eq!(alphabetic_count("Olá, ação 123!"), 7);
    }

    #[test]
    fn dominant_ratio_ignores_whitespace_and_case() {
        assert!((dominant_char_ratio("aA a  A") - 1.0).abs() < f64::EPSILON);
        assert!((dominant_char_ratio("abab") - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn dominant_ratio_of_blank_is_zero() {
        assert_eq!(dominant_char_ratio("   "), 0.0);
    }
}
