//! ForeFinder Backend Service
//!
//! Main entry point for the ForeFinder tee-time backend.
//! This service provides:
//! - JSON HTTP API for players, events, invitations and the community feed
//! - PostgreSQL persistence with embedded migrations
//! - An in-memory store for local development without a database

use forefinder_backend::api;
use forefinder_backend::config::AppConfig;
use forefinder_backend::database::{create_pool, run_migrations, Database};
use forefinder_backend::error::{AppError, AppResult};
use forefinder_backend::store::{MemoryStore, PgStore};
use forefinder_backend::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "forefinder_backend={},sqlx=warn,tower_http=info",
            config.log_level
        )
        .into()
    });

    if config.log_format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    init_tracing(&config);

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           ForeFinder Backend Service Starting            ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("HTTP port: {}", config.http_port);

    // =========================================================================
    // STORAGE SETUP
    // =========================================================================
    let state = match &config.database {
        Some(database_config) => {
            info!("Connecting to database...");
            let pool = create_pool(database_config).await.map_err(|e| {
                error!("Failed to create database pool: {}", e);
                AppError::Database(e)
            })?;
            info!("Database connection pool created successfully");
            info!("Max connections: {}", database_config.max_connections);

            info!("Running database migrations...");
            run_migrations(&pool).await.map_err(|e| {
                error!("Database migration failed: {}", e);
                AppError::Database(e)
            })?;
            info!("Database migrations completed successfully");

            let store = Arc::new(PgStore::new(pool.clone()));
            AppState::new(config.clone(), store, Some(Database::new(pool)))
        }
        None => {
            warn!("DATABASE_URL not set - using the in-memory store; data is lost on exit");
            let store = Arc::new(MemoryStore::with_default_courses());
            AppState::new(config.clone(), store, None)
        }
    };
    info!("✓ Application state initialized");

    if config.is_development() {
        warn!("POST /api/v1/sessions issues tokens without credentials (development only)");
    }

    // =========================================================================
    // START SERVER
    // =========================================================================
    let app = api::router(Arc::new(state));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid HTTP address: {}", e)))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Message(format!("Failed to bind HTTP server: {}", e)))?;

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           ForeFinder Backend Service Ready!              ║");
    info!("╠══════════════════════════════════════════════════════════╣");
    info!("║  HTTP API:     0.0.0.0:{}/api/v1                        ║", config.http_port);
    info!("║  Environment:  {}                                 ║", config.environment);
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    axum::serve(listener, app)
        .with_graceful_shutdown(api::shutdown_signal())
        .await
        .map_err(|e| AppError::Message(format!("HTTP server error: {}", e)))?;

    info!("ForeFinder backend service shutdown complete");
    Ok(())
}
