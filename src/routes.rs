//! REST endpoints for email analysis.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::pipeline::Classifier;
use crate::pipeline::types::ClassificationRequest;

/// Shared state for the analysis routes.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<Classifier>,
    /// Minimum trimmed length of `text`; shorter bodies get a 422.
    pub min_request_chars: usize,
}

/// Body of `POST /analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

/// Body of `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub threshold: f64,
    pub model: String,
    pub backend: String,
}

/// Build the Axum router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/status", get(status))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "mail-triage"
    }))
}

/// GET /status
///
/// Echoes static configuration: threshold and active model.
async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        threshold: state.classifier.threshold(),
        model: state.classifier.model_name().to_string(),
        backend: state.classifier.backend_name().to_string(),
    })
}

/// POST /analyze
///
/// Returns the four-field verdict, 422 for a malformed body or too-short
/// text, 502 when the backend broke its contract.
async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> impl IntoResponse {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return unprocessable(rejection.body_text()).into_response(),
    };

    let chars = body.text.trim().chars().count();
    if chars < state.min_request_chars {
        return unprocessable(format!(
            "text must contain at least {} characters",
            state.min_request_chars
        ))
        .into_response();
    }

    let request = ClassificationRequest::new(body.text);
    match state.classifier.process(&request).await {
        Ok(verdict) => Json(verdict).into_response(),
        Err(e) => {
            warn!(id = %request.id, error = %e, "Analysis failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "detail": e.to_string() })),
            )
                .into_response()
        }
    }
}

fn unprocessable(detail: String) -> impl IntoResponse {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(serde_json::json!({ "detail": detail })),
    )
}
