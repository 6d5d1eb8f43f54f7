use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use universe_api::config::Config;
use universe_api::handlers::AppState;
use universe_api::llm_client::LlmClient;
use universe_api::server::build_rate_limited_router;

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, builds the model client and
/// serves the router with a per-IP rate limit on the generation routes.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "universe_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let llm = LlmClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize model client: {}", e))?;
    tracing::info!(
        "✓ Model client initialized: {} ({})",
        config.openai_base_url,
        config.openai_model
    );

    let port = config.port;
    let app_state = Arc::new(AppState::new(config, llm));

    // Rate limiting: 10 req/sec per IP, burst of 20 on generation routes
    let app = build_rate_limited_router(app_state, 10, 20)?;

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
