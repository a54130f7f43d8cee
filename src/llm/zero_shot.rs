//! Zero-shot classification backend.
//!
//! Talks to a Hugging Face style inference endpoint:
//! `POST {base_url}/models/{model}` with the text, the two candidate labels
//! and a hypothesis template. The response carries `labels` and `scores`
//! ranked by descending score, either as one object or wrapped in a
//! one-element array.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use super::{InferenceBackend, send_for_text};
use crate::config::BackendConfig;
use crate::error::{BackendError, truncate_snippet};
use crate::pipeline::types::{Category, RawInferenceResult};

const BACKEND_NAME: &str = "zero_shot";

/// Hypothesis template; `{}` is replaced by each candidate label.
pub const HYPOTHESIS_TEMPLATE: &str = "This email is {}. A productive email contains a clear \
     request or action such as a quote, support, a deadline, a meeting or a document. A \
     non_productive email is a greeting, compliment, casual note, newsletter or spam with no \
     request.";

/// Zero-shot classifier over HTTP.
pub struct ZeroShotBackend {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
    timeout: Duration,
}

impl ZeroShotBackend {
    pub fn new(client: reqwest::Client, config: &BackendConfig) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/models/{}",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Request body sent to the zero-shot endpoint.
pub fn build_request_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "inputs": text,
        "parameters": {
            "candidate_labels": Category::LABELS,
            "hypothesis_template": HYPOTHESIS_TEMPLATE,
            "multi_label": false,
        }
    })
}

#[async_trait]
impl InferenceBackend for ZeroShotBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn infer(&self, text: &str) -> Result<RawInferenceResult, BackendError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&build_request_body(text));
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        debug!(endpoint = %self.endpoint, chars = text.chars().count(), "Calling zero-shot backend");
        let body = send_for_text(BACKEND_NAME, request, self.timeout).await?;
        parse_ranked_body(&body)
    }
}

// ── Response parsing ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RankedResponse {
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    scores: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RankedBody {
    Single(RankedResponse),
    Batch(Vec<RankedResponse>),
}

/// Parse a zero-shot response body into ranked labels.
pub fn parse_ranked_body(body: &str) -> Result<RawInferenceResult, BackendError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|_| BackendError::Unparseable {
            backend: BACKEND_NAME.to_string(),
            snippet: truncate_snippet(body),
        })?;

    let invalid = |reason: &str| BackendError::InvalidShape {
        backend: BACKEND_NAME.to_string(),
        reason: reason.to_string(),
        snippet: truncate_snippet(body),
    };

    let ranked = match serde_json::from_value::<RankedBody>(value) {
        Ok(RankedBody::Single(ranked)) => ranked,
        Ok(RankedBody::Batch(batch)) => batch
            .into_iter()
            .next()
            .ok_or_else(|| invalid("empty response array"))?,
        Err(_) => return Err(invalid("labels/scores have unexpected types")),
    };

    if ranked.labels.is_empty() {
        return Err(invalid("missing or empty labels"));
    }
    if ranked.scores.is_empty() {
        return Err(invalid("missing or empty scores"));
    }
    if ranked.labels.len() != ranked.scores.len() {
        tracing::warn!(
            labels = ranked.labels.len(),
            scores = ranked.scores.len(),
            "Zero-shot labels and scores differ in length"
        );
    }

    Ok(RawInferenceResult::RankedLabels {
        labels: ranked.labels,
        scores: ranked.scores,
        snippet: truncate_snippet(body),
    })
}
