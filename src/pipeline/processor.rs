//! Email classifier: runs one email through the full pipeline.
//!
//! Flow:
//! 1. Normalize whitespace
//! 2. Gibberish gate (fast, no backend call) → may short-circuit
//! 3. Backend inference → raw result
//! 4. Normalize/repair into a model judgement
//! 5. Decision policy → final category
//! 6. Compose reply and reason
//!
//! Only [`BackendError`] escapes; everything else resolves to a verdict.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ClassifierConfig;
use crate::error::BackendError;
use crate::llm::InferenceBackend;
use crate::pipeline::gibberish::GibberishGate;
use crate::pipeline::judgement::into_judgement;
use crate::pipeline::normalize::normalize_whitespace;
use crate::pipeline::policy::{Decision, DecisionOutcome, DecisionPolicy};
use crate::pipeline::reply::compose_reply;
use crate::pipeline::types::{
    Category, ClassificationRequest, GibberishVerdict, ModelJudgement, NormalizedVerdict,
};

/// Prefix marking verdicts decided by rules rather than the model.
pub const RULE_BASED_PREFIX: &str = "Rule-based: ";

/// Stateless classifier; share it behind an `Arc`.
pub struct Classifier {
    backend: Arc<dyn InferenceBackend>,
    gate: GibberishGate,
    policy: DecisionPolicy,
}

impl Classifier {
    pub fn new(backend: Arc<dyn InferenceBackend>, config: ClassifierConfig) -> Self {
        Self {
            backend,
            gate: GibberishGate::new(config.gibberish),
            policy: DecisionPolicy::new(config.decision),
        }
    }

    /// Active decision threshold.
    pub fn threshold(&self) -> f64 {
        self.policy.threshold()
    }

    /// Model identifier of the backend.
    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Backend name ("zero_shot" or "chat").
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Classify raw email text.
    pub async fn classify(&self, text: &str) -> Result<NormalizedVerdict, BackendError> {
        self.process(&ClassificationRequest::new(text)).await
    }

    /// Process a single request through the full pipeline.
    pub async fn process(
        &self,
        request: &ClassificationRequest,
    ) -> Result<NormalizedVerdict, BackendError> {
        let text = normalize_whitespace(&request.text);

        // Step 1: Gibberish gate (no backend call)
        if let GibberishVerdict::Rejected { reason } = self.gate.evaluate(&text) {
            info!(
                id = %request.id,
                reason,
                "Input rejected by gibberish gate, skipping backend"
            );
            return Ok(rule_based_verdict(reason));
        }

        // Step 2: Backend inference
        let raw = self.backend.infer(&text).await.inspect_err(|e| {
            warn!(id = %request.id, backend = self.backend.name(), error = %e, "Backend call failed");
        })?;
        debug!(id = %request.id, shape = raw.label(), "Backend responded");

        // Step 3: Normalize / repair
        let judgement = into_judgement(raw, self.backend.name()).inspect_err(|e| {
            warn!(id = %request.id, error = %e, "Backend response violated contract");
        })?;

        // Step 4: Decide
        let decision = self
            .policy
            .decide(judgement.category, judgement.confidence, &text);

        let verdict = self.compose(&judgement, decision);
        info!(
            id = %request.id,
            category = %verdict.category,
            confidence = verdict.confidence,
            model_category = %judgement.category,
            outcome = decision.outcome.label(),
            "Email classified"
        );
        Ok(verdict)
    }

    /// Build the final verdict from the model judgement and the decision.
    ///
    /// Model-written text is kept only when the policy agreed with the model.
    fn compose(&self, judgement: &ModelJudgement, decision: Decision) -> NormalizedVerdict {
        let agreed = decision.category == judgement.category;

        let suggested_reply = match (&judgement.suggested_reply, agreed) {
            (Some(reply), true) => reply.clone(),
            _ => compose_reply(decision.category).to_string(),
        };

        let reason = match (&judgement.reason, decision.outcome) {
            (Some(reason), DecisionOutcome::Accepted) => reason.clone(),
            _ => self.explain(judgement, decision),
        };

        NormalizedVerdict {
            category: decision.category,
            confidence: judgement.confidence,
            suggested_reply,
            reason,
        }
    }

    fn explain(&self, judgement: &ModelJudgement, decision: Decision) -> String {
        let pct = judgement.confidence * 100.0;
        match decision.outcome {
            DecisionOutcome::Accepted => format!(
                "Model classified the email as {} with {:.0}% confidence.",
                judgement.category, pct
            ),
            DecisionOutcome::KeywordOverride => format!(
                "Model confidence ({:.0}%) is below the {:.0}% threshold, but the text contains \
                 an explicit request, so it stays {}.",
                pct,
                self.threshold() * 100.0,
                Category::Productive
            ),
            DecisionOutcome::Demoted => format!(
                "Model confidence ({:.0}%) for {} is below the {:.0}% threshold; treated as {}.",
                pct,
                judgement.category,
                self.threshold() * 100.0,
                Category::NonProductive
            ),
        }
    }
}

/// Verdict for input the gibberish gate rejected. Confidence `0.0` marks
/// that the model was never consulted.
pub fn rule_based_verdict(reason: &str) -> NormalizedVerdict {
    NormalizedVerdict {
        category: Category::NonProductive,
        confidence: 0.0,
        suggested_reply: compose_reply(Category::NonProductive).to_string(),
        reason: format!("{RULE_BASED_PREFIX}{reason}"),
    }
}
