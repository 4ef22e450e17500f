//! TutorHub Presence Server
//!
//! Main entry point: loads configuration, wires the presence engine and
//! HTTP surface together, and runs until a shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use tutorhub_core::config::AppConfig;
use tutorhub_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("TUTORHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting TutorHub v{}", env!("CARGO_PKG_VERSION"));
    let config = Arc::new(config);

    // ── Step 1: Presence engine + background tasks ───────────────
    let engine = Arc::new(tutorhub_realtime::PresenceEngine::new(
        config.realtime.clone(),
    ));
    let heartbeat_handle = tutorhub_realtime::heartbeat::spawn(Arc::clone(&engine));
    let broadcast_handle = tutorhub_realtime::broadcast::spawn(Arc::clone(&engine));
    tracing::info!(
        heartbeat_seconds = config.realtime.heartbeat_interval_seconds,
        refresh_seconds = config.realtime.broadcast_interval_seconds,
        "Presence engine started"
    );

    // ── Step 2: Gemini client ────────────────────────────────────
    if config.gemini.api_key.is_empty() {
        tracing::warn!("Gemini API key is not configured; chat and quiz routes will fail");
    }
    let gemini = Arc::new(tutorhub_gemini::GeminiClient::new(config.gemini.clone())?);

    // ── Step 3: Router ───────────────────────────────────────────
    let state = tutorhub_api::AppState::new(
        Arc::clone(&config),
        Arc::clone(&engine),
        Arc::clone(&gemini),
    );
    let app = tutorhub_api::build_router(state);

    // ── Step 4: Serve with graceful shutdown ─────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("TutorHub server listening on {}", addr);

    let shutdown_engine = Arc::clone(&engine);
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        shutdown_engine.shutdown();
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 5: Wait for background tasks ────────────────────────
    let grace = std::time::Duration::from_secs(config.server.shutdown_grace_seconds);
    let _ = tokio::time::timeout(grace, heartbeat_handle).await;
    let _ = tokio::time::timeout(grace, broadcast_handle).await;

    tracing::info!("TutorHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::error!("Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => {
                tracing::error!("Failed to install SIGTERM handler");
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
}
