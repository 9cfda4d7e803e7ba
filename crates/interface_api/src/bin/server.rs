//! Quote Builder - API Server Binary
//!
//! This binary starts the HTTP API server for the quote builder.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin quote-api
//!
//! # Run with environment variables
//! QUOTE_PORT=9000 QUOTE_DATA_DIR=/var/lib/quotes QUOTE_ASSISTANT_API_KEY=... cargo run --bin quote-api
//! ```
//!
//! # Environment Variables
//!
//! * `QUOTE_HOST` - Server host (default: 0.0.0.0)
//! * `QUOTE_PORT` - Server port (default: 8080)
//! * `QUOTE_DATA_DIR` - Directory of the workspace JSON files (default: ./data)
//! * `QUOTE_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `QUOTE_ASSISTANT_BASE_URL` - Completion service API root
//! * `QUOTE_ASSISTANT_API_KEY` - Completion service key
//! * `QUOTE_ASSISTANT_MODEL` - Model name (default: gemini-2.5-flash)
//! * `QUOTE_ASSISTANT_TIMEOUT_SECS` - Completion request timeout (default: 60)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_assistant::{GeminiAdapter, SuggestionService};
use infra_store::{JsonFileStore, WorkspaceStore};
use interface_api::{config::ApiConfig, create_router, AppState};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, opens the workspace store and
/// starts the HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The workspace store cannot be opened or a stored file is corrupt
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("Invalid QUOTE_* configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        data_dir = %config.data_dir,
        "Starting Quote Builder API Server"
    );

    let store = JsonFileStore::open(&config.data_dir)
        .await
        .context("Workspace store could not be opened")?;
    let workspace = store
        .load_workspace()
        .await
        .context("Workspace could not be loaded")?;

    if config.assistant_api_key.is_empty() {
        tracing::warn!("QUOTE_ASSISTANT_API_KEY is not set; suggestion endpoints will fail");
    }
    let adapter = GeminiAdapter::new(config.assistant()).context("Completion client could not be built")?;
    let assistant = SuggestionService::new(Arc::new(adapter));

    let state = AppState::new(workspace, Arc::new(store), assistant, config.clone());
    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse().context("Invalid server address")?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
