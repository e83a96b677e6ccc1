//! Data API server implementation
//!
//! HTTP API using Axum over a shared load cache. Every data endpoint reads
//! the memoized load result; `POST /api/v1/reload` invalidates it.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::cache::LoadCache;
use crate::config::LoaderConfig;

/// API Server configuration
#[derive(Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub config: LoaderConfig,
    pub cache: Arc<LoadCache>,
}

impl AppState {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config,
            cache: Arc::new(LoadCache::new()),
        }
    }
}

/// Build the router with CORS and request tracing.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        .route("/api/v1/columns", get(handlers::columns))
        .route("/api/v1/options", get(handlers::options))
        .route("/api/v1/kpis", get(handlers::kpis))
        .route("/api/v1/charts", get(handlers::charts))
        .route("/api/v1/preview", get(handlers::preview))
        .route("/api/v1/reload", post(handlers::reload))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig, loader: LoaderConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "royalbit_sitebw=info,tower_http=info".into()),
        )
        .init();

    let state = Arc::new(AppState::new(loader));

    // Warm the cache so the first request doesn't pay for the load
    let warm = Arc::clone(&state);
    let outcome = tokio::task::spawn_blocking(move || warm.cache.fetch(&warm.config)).await?;
    match outcome.fatal() {
        Some(fatal) => tracing::warn!("initial load failed: {}", fatal.message),
        None => info!(rows = outcome.table.row_count(), "initial load complete"),
    }

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("📡 Site bandwidth API starting on http://{}", addr);
    info!("   Endpoints: /api/v1/columns, /api/v1/options, /api/v1/kpis, /api/v1/charts, /api/v1/preview, /api/v1/reload");
    info!("   Health: /health, Version: /version");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Site bandwidth API shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
