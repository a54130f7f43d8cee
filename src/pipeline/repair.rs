//! Result repair for generative backends.
//!
//! A chat model is asked for a bare JSON object but may wrap it in prose or
//! markdown, or fill fields with the wrong types. Extraction fails only when
//! no JSON object can be found at all; individual fields never fail, they
//! fall back to defaults through [`FIELD_RULES`].

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{BackendError, truncate_snippet};
use crate::pipeline::types::{Category, ModelJudgement};

/// Reply used when the model left `suggested_reply` empty.
pub const FALLBACK_REPLY: &str =
    "Hello! We received your message and will get back to you shortly.";

/// Justification used when the model left `reason` empty.
pub const FALLBACK_REASON: &str = "Automatic classification based on the email content.";

/// Confidence used when the model's value is missing or not numeric.
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Category used when the model's label is missing or unrecognized.
pub const FALLBACK_CATEGORY: Category = Category::Productive;

// ── Extraction ──────────────────────────────────────────────────────

/// Pull a JSON object out of raw model output.
///
/// Strict parse of the whole text first, then the span from the first `{`
/// to the last `}`.
pub fn extract_json_object(raw: &str, backend: &str) -> Result<Map<String, Value>, BackendError> {
    let trimmed = raw.trim();

    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(object);
    }

    let span = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => {
            return Err(BackendError::NoJsonObject {
                backend: backend.to_string(),
                snippet: truncate_snippet(raw),
            });
        }
    };

    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(object)) => Ok(object),
        _ => Err(BackendError::Unparseable {
            backend: backend.to_string(),
            snippet: truncate_snippet(raw),
        }),
    }
}

// ── Field coercion ──────────────────────────────────────────────────

/// One row of the coercion table.
pub struct FieldRule {
    pub field: &'static str,
    /// Returns `None` when the value cannot be used.
    pub coerce: fn(&Value) -> Option<Value>,
    pub fallback: fn() -> Value,
}

/// Every field of the generative response, with its coercion and fallback.
pub const FIELD_RULES: [FieldRule; 4] = [
    FieldRule {
        field: "category",
        coerce: coerce_category,
        fallback: fallback_category,
    },
    FieldRule {
        field: "confidence",
        coerce: coerce_confidence,
        fallback: fallback_confidence,
    },
    FieldRule {
        field: "suggested_reply",
        coerce: coerce_text,
        fallback: fallback_reply,
    },
    FieldRule {
        field: "reason",
        coerce: coerce_text,
        fallback: fallback_reason,
    },
];

fn coerce_category(value: &Value) -> Option<Value> {
    value
        .as_str()
        .and_then(Category::parse)
        .map(|c| Value::from(c.as_str()))
}

fn coerce_confidence(value: &Value) -> Option<Value> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number
        .is_finite()
        .then(|| Value::from(number.clamp(0.0, 1.0)))
}

fn coerce_text(value: &Value) -> Option<Value> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then(|| Value::from(text))
}

fn fallback_category() -> Value {
    Value::from(FALLBACK_CATEGORY.as_str())
}

fn fallback_confidence() -> Value {
    Value::from(FALLBACK_CONFIDENCE)
}

fn fallback_reply() -> Value {
    Value::from(FALLBACK_REPLY)
}

fn fallback_reason() -> Value {
    Value::from(FALLBACK_REASON)
}

/// Apply [`FIELD_RULES`] to a parsed object. Every rule field is present in
/// the result; unknown fields are dropped.
pub fn coerce_fields(object: &Map<String, Value>) -> Map<String, Value> {
    FIELD_RULES
        .iter()
        .map(|rule| {
            let value = object
                .get(rule.field)
                .and_then(rule.coerce)
                .unwrap_or_else(|| {
                    debug!(field = rule.field, "Generative field unusable, applying fallback");
                    (rule.fallback)()
                });
            (rule.field.to_string(), value)
        })
        .collect()
}

/// Repair a raw generative response into a judgement.
pub fn repair_generative(raw: &str, backend: &str) -> Result<ModelJudgement, BackendError> {
    let object = extract_json_object(raw, backend)?;
    let fields = coerce_fields(&object);

    let text = |key: &str| {
        fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    Ok(ModelJudgement {
        category: fields
            .get("category")
            .and_then(Value::as_str)
            .and_then(Category::parse)
            .unwrap_or(FALLBACK_CATEGORY),
        confidence: fields
            .get("confidence")
            .and_then(Value::as_f64)
            .unwrap_or(FALLBACK_CONFIDENCE),
        suggested_reply: text("suggested_reply"),
        reason: text("reason"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Extraction ──────────────────────────────────────────────────

    #[test]
    fn strict_object_is_accepted() {
        let obj = extract_json_object(r#"{"category": "productive"}"#, "chat").unwrap();
        assert_eq!(obj["category"], "productive");
    }

    #[test]
    fn object_wrapped_in_prose_is_extracted() {
        let raw = "Here is the result: {\"category\": \"non_productive\"} hope it helps";
        let obj = extract_json_object(raw, "chat").unwrap();
        assert_eq!(obj["category"], "non_productive");
    }

    #[test]
    fn object_in_markdown_fence_is_extracted() {
        let raw = "```json\n{\n  \"confidence\": 0.9\n}\n```";
        let obj = extract_json_object(raw, "chat").unwrap();
        assert_eq!(obj["confidence"], 0.9);
    }

    #[test]
    fn no_braces_is_no_json_object() {
        let err = extract_json_object("I am unable to classify this email.", "chat").unwrap_err();
        match err {
            BackendError::NoJsonObject { snippet, .. } => {
                assert_eq!(snippet, "I am unable to classify this email.");
            }
            other => panic!("Expected NoJsonObject, got {:?}", other),
        }
    }

    #[test]
    fn broken_span_is_unparseable() {
        let err = extract_json_object("result: {category: productive}", "chat").unwrap_err();
        assert!(matches!(err, BackendError::Unparseable { .. }));
    }

    #[test]
    fn top_level_array_is_not_an_object() {
        let err = extract_json_object("[1, 2, 3]", "chat").unwrap_err();
        assert!(matches!(err, BackendError::NoJsonObject { .. }));
    }

    #[test]
    fn error_snippet_is_bounded() {
        let raw = "no json here ".repeat(100);
        let err = extract_json_object(&raw, "chat").unwrap_err();
        let snippet = err.snippet().unwrap();
        assert!(snippet.chars().count() <= crate::error::SNIPPET_MAX_CHARS + 1);
    }

    // ── Coercion ────────────────────────────────────────────────────

    #[test]
    fn prose_wrapped_response_is_fully_repaired() {
        let raw = r#"Here is the result: {"category":"Produtivo","confidence":1.5,"suggested_reply":"","reason":""}"#;
        let judgement = repair_generative(raw, "chat").unwrap();
        assert_eq!(judgement.category, Category::Productive);
        assert_eq!(judgement.confidence, 1.0);
        assert_eq!(judgement.suggested_reply.as_deref(), Some(FALLBACK_REPLY));
        assert_eq!(judgement.reason.as_deref(), Some(FALLBACK_REASON));
    }

    #[test]
    fn unknown_category_defaults_to_productive() {
        let judgement = repair_generative(r#"{"category": "urgent"}"#, "chat").unwrap();
        assert_eq!(judgement.category, Category::Productive);
    }

    #[test]
    fn localized_non_productive_is_recognized() {
        let judgement =
            repair_generative(r#"{"category": " Improdutivo ", "confidence": 0.9}"#, "chat")
                .unwrap();
        assert_eq!(judgement.category, Category::NonProductive);
    }

    #[test]
    fn non_numeric_confidence_defaults_to_midpoint() {
        let judgement =
            repair_generative(r#"{"category": "productive", "confidence": "high"}"#, "chat")
                .unwrap();
        assert_eq!(judgement.confidence, FALLBACK_CONFIDENCE);
    }

    #[test]
    fn numeric_string_confidence_is_parsed_and_clamped() {
        let judgement = repair_generative(r#"{"confidence": " 0.82 "}"#, "chat").unwrap();
        assert!((judgement.confidence - 0.82).abs() < 1e-9);

        let judgement = repair_generative(r#"{"confidence": -3}"#, "chat").unwrap();
        assert_eq!(judgement.confidence, 0.0);
    }

    #[test]
    fn missing_fields_all_fall_back() {
        let judgement = repair_generative("{}", "chat").unwrap();
        assert_eq!(judgement.category, FALLBACK_CATEGORY);
        assert_eq!(judgement.confidence, FALLBACK_CONFIDENCE);
        assert_eq!(judgement.suggested_reply.as_deref(), Some(FALLBACK_REPLY));
        assert_eq!(judgement.reason.as_deref(), Some(FALLBACK_REASON));
    }

    #[test]
    fn text_fields_are_trimmed() {
        let judgement = repair_generative(
            r#"{"suggested_reply": "  Thanks, we'll send it today.  ", "reason": "\nAsks for a document.\n"}"#,
            "chat",
        )
        .unwrap();
        assert_eq!(
            judgement.suggested_reply.as_deref(),
            Some("Thanks, we'll send it today.")
        );
        assert_eq!(judgement.reason.as_deref(), Some("Asks for a document."));
    }

    #[test]
    fn wrong_typed_text_field_falls_back() {
        let judgement =
            repair_generative(r#"{"suggested_reply": ["a"], "reason": null}"#, "chat").unwrap();
        assert_eq!(judgement.suggested_reply.as_deref(), Some(FALLBACK_REPLY));
        assert_eq!(judgement.reason.as_deref(), Some(FALLBACK_REASON));
    }

    #[test]
    fn coerce_fields_covers_every_rule() {
        let fields = coerce_fields(&Map::new());
        for rule in &FIELD_RULES {
            assert!(fields.contains_key(rule.field), "missing {}", rule.field);
        }
        assert_eq!(fields.len(), FIELD_RULES.len());
    }
}
