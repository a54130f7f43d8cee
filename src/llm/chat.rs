//! Generative backend over an OpenAI-compatible chat completions API.
//!
//! The model is asked to answer with a single JSON object. Nothing is
//! validated here beyond the HTTP envelope; the message content goes to the
//! repair step as-is.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use super::{InferenceBackend, send_for_text};
use crate::config::BackendConfig;
use crate::error::{BackendError, truncate_snippet};
use crate::pipeline::types::RawInferenceResult;

const BACKEND_NAME: &str = "chat";

/// Temperature for classification (near-deterministic).
const CHAT_TEMPERATURE: f32 = 0.2;

const SYSTEM_PROMPT: &str = "Respond only with valid JSON, no extra text.";

/// Chat-completions classifier.
pub struct ChatBackend {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
    timeout: Duration,
}

impl ChatBackend {
    pub fn new(client: reqwest::Client, config: &BackendConfig) -> Self {
        Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(&self, text: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "temperature": CHAT_TEMPERATURE,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_user_prompt(text)},
            ],
        })
    }
}

// ── Prompt construction ─────────────────────────────────────────────

/// Build the classification prompt for one email. The whole text is embedded.
pub fn build_user_prompt(email: &str) -> String {
    format!(
        "You are an assistant for a company in the financial sector.\n\n\
         Task:\n\
         1) Classify the email as \"productive\" or \"non_productive\". A productive email \
         contains a clear request or action (quote, support, deadline, meeting, document). \
         A non_productive email is a greeting, compliment, casual note, newsletter or spam.\n\
         2) Suggest a short, polite, corporate reply.\n\
         3) Give a confidence between 0 and 1.\n\
         4) Give a short justification (1 sentence).\n\n\
         Answer ONLY with valid JSON exactly in this format:\n\
         {{\n  \"category\": \"productive\" or \"non_productive\",\n  \"confidence\": 0.0,\n  \
         \"suggested_reply\": \"string\",\n  \"reason\": \"string\"\n}}\n\n\
         EMAIL:\n\"\"\"{email}\"\"\""
    )
}

// ── Response parsing ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Extract `choices[0].message.content` from a chat completions body.
pub fn parse_chat_body(body: &str) -> Result<RawInferenceResult, BackendError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|_| BackendError::Unparseable {
            backend: BACKEND_NAME.to_string(),
            snippet: truncate_snippet(body),
        })?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::InvalidShape {
            backend: BACKEND_NAME.to_string(),
            reason: "no choices".into(),
            snippet: truncate_snippet(body),
        })?;

    let content = choice.message.content.unwrap_or_default().trim().to_string();
    Ok(RawInferenceResult::FreeformJson(content))
}

#[async_trait]
impl InferenceBackend for ChatBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn infer(&self, text: &str) -> Result<RawInferenceResult, BackendError> {
        let mut request = self.client.post(&self.endpoint).json(&self.request_body(text));
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        debug!(endpoint = %self.endpoint, model = %self.model, "Calling chat backend");
        let body = send_for_text(BACKEND_NAME, request, self.timeout).await?;
        parse_chat_body(&body)
    }
}
