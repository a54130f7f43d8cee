use std::sync::Arc;

use anyhow::Context;

use mail_triage::config::AppConfig;
use mail_triage::llm::create_backend;
use mail_triage::pipeline::Classifier;
use mail_triage::routes::{AppState, api_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  For the chat backend: export OPENAI_API_KEY=sk-...");
        std::process::exit(1);
    });

    eprintln!("📬 Mail Triage v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.backend.kind.as_str());
    eprintln!("   Model: {}", config.backend.model);
    eprintln!(
        "   Threshold: {:.2}",
        config.classifier.decision.confidence_threshold
    );
    eprintln!("   Timeout: {}s", config.backend.timeout.as_secs());
    eprintln!("   API: http://0.0.0.0:{}/analyze\n", config.port);

    let backend = create_backend(&config.backend)?;
    let classifier = Arc::new(Classifier::new(backend, config.classifier.clone()));

    let app = api_routes(AppState {
        classifier,
        min_request_chars: config.min_request_chars,
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Mail triage server started");
    axum::serve(listener, app).await?;

    Ok(())
}
