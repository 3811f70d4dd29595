//! modaudit — structural fingerprint audit service
//!
//! Computes a deterministic structural fingerprint for arbitrary positive
//! integers and classifies each against a statistical or calibrated
//! baseline. The engine performs no factorization and no cryptographic
//! verification; its labels are heuristic statistical opinions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       MODAUDIT                           │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌────────────────┐   ┌──────────────┐  │
//! │  │  API      │   │  Audit Engine  │   │  Report      │  │
//! │  │  (Axum)   │──▶│  (pure, sync)  │──▶│  Documents   │  │
//! │  └───────────┘   └────────────────┘   └──────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod engine;
mod error;
mod export;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::engine::{AuditEngine, EngineConfig};

pub use crate::error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging; production gets structured JSON lines
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "modaudit=debug,tower_http=debug".into());
    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("modaudit server starting...");
    tracing::info!("Baseline mode: {:?}", config.baseline_mode);

    // Construct the engine once; its configuration is immutable from here on
    let mut engine_config = EngineConfig {
        mode: config.baseline_mode,
        ..EngineConfig::default()
    };
    if let Some(moduli) = &config.moduli {
        engine_config.moduli = moduli.clone();
    }
    let engine = AuditEngine::new(engine_config)
        .map_err(|e| anyhow::anyhow!("invalid engine configuration: {}", e))?;

    let state = AppState {
        engine: Arc::new(engine),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AuditEngine>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/compute", post(handlers::audit::compute))
        .route("/api/v1/audit", post(handlers::audit::run))
        .route("/api/v1/audit/document", post(handlers::audit::document))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
