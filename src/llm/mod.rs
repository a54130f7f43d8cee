//! Inference backends for mail-triage.
//!
//! Supports:
//! - **Zero-shot**: Hugging Face style zero-shot classification endpoint
//!   returning ranked `labels` / `scores`
//! - **Chat**: OpenAI-compatible chat completions asked to emit one JSON object
//!
//! Both return a [`RawInferenceResult`]; normalization happens in the pipeline.

pub mod chat;
pub mod zero_shot;

pub use chat::ChatBackend;
pub use zero_shot::ZeroShotBackend;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{BackendConfig, BackendKind};
use crate::error::{BackendError, Error, truncate_snippet};
use crate::pipeline::types::RawInferenceResult;

/// An external classification service.
///
/// Implementations make exactly one outbound call per `infer` and never retry.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Backend name used in errors and logs (e.g. "zero_shot").
    fn name(&self) -> &str;

    /// Model identifier reported by `GET /status`.
    fn model_name(&self) -> &str;

    /// Classify normalized email text.
    async fn infer(&self, text: &str) -> Result<RawInferenceResult, BackendError>;
}

/// Create a backend from configuration.
pub fn create_backend(config: &BackendConfig) -> Result<Arc<dyn InferenceBackend>, Error> {
    let client = build_http_client(config.timeout, config.kind)?;
    let backend: Arc<dyn InferenceBackend> = match config.kind {
        BackendKind::ZeroShot => Arc::new(ZeroShotBackend::new(client, config)),
        BackendKind::Chat => Arc::new(ChatBackend::new(client, config)),
    };
    tracing::info!(
        backend = config.kind.as_str(),
        model = %config.model,
        timeout_secs = config.timeout.as_secs(),
        "Inference backend ready"
    );
    Ok(backend)
}

fn build_http_client(timeout: Duration, kind: BackendKind) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BackendError::Transport {
            backend: kind.as_str().to_string(),
            snippet: truncate_snippet(&format!("Failed to build HTTP client: {e}")),
        })
}

/// Send a prepared request and return the body text of a successful response.
///
/// Transport errors, timeouts and HTTP status >= 400 become [`BackendError`].
pub(crate) async fn send_for_text(
    backend: &str,
    request: reqwest::RequestBuilder,
    timeout: Duration,
) -> Result<String, BackendError> {
    let response = request
        .send()
        .await
        .map_err(|e| BackendError::from_reqwest(backend, &e, timeout))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BackendError::from_reqwest(backend, &e, timeout))?;

    if status.as_u16() >= 400 {
        tracing::warn!(
            backend,
            status = status.as_u16(),
            body = %truncate_snippet(&body),
            "Backend returned error status"
        );
        return Err(BackendError::Status {
            backend: backend.to_string(),
            status: status.as_u16(),
            snippet: truncate_snippet(&body),
        });
    }

    Ok(body)
}
