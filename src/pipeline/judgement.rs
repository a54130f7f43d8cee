//! Converts either backend shape into one [`ModelJudgement`].
//!
//! The zero-shot shape is strict: an unrecognized top label is a backend
//! contract violation. The generative shape goes through repair and never
//! fails on individual fields.

use crate::error::BackendError;
use crate::pipeline::repair::repair_generative;
use crate::pipeline::types::{Category, ModelJudgement, RawInferenceResult};

/// Normalize a raw backend result.
pub fn into_judgement(
    raw: RawInferenceResult,
    backend: &str,
) -> Result<ModelJudgement, BackendError> {
    match raw {
        RawInferenceResult::RankedLabels {
            labels,
            scores,
            snippet,
        } => from_ranked(&labels, &scores, snippet, backend),
        RawInferenceResult::FreeformJson(text) => repair_generative(&text, backend),
    }
}

fn from_ranked(
    labels: &[String],
    scores: &[f64],
    snippet: String,
    backend: &str,
) -> Result<ModelJudgement, BackendError> {
    let (Some(top_label), Some(&top_score)) = (labels.first(), scores.first()) else {
        return Err(BackendError::InvalidShape {
            backend: backend.to_string(),
            reason: "empty labels or scores".into(),
            snippet,
        });
    };

    let Some(category) = Category::from_canonical(top_label) else {
        return Err(BackendError::UnknownLabel {
            backend: backend.to_string(),
            label: top_label.trim().to_lowercase(),
            snippet,
        });
    };

    let confidence = if top_score.is_finite() {
        top_score.clamp(0.0, 1.0)
    } else {
        0.0
    };

    Ok(ModelJudgement {
        category,
        confidence,
        suggested_reply: None,
        reason: None,
    })
}
