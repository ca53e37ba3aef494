use crate::config::DatabaseConfig;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, info};

/// Schema and course seed, compiled into the binary
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Failures reaching or preparing PostgreSQL
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to create database pool: {0}")]
    PoolCreation(sqlx::Error),

    #[error("Database connection timeout")]
    ConnectionTimeout,

    #[error("Database unreachable: {0}")]
    Unreachable(sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migration(#[from] MigrateError),
}

impl DatabaseError {
    /// Sort a connect-time failure into a timeout or a hard failure
    fn from_connect(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DatabaseError::ConnectionTimeout,
            other => DatabaseError::PoolCreation(other),
        }
    }
}

/// Handle on the live pool, kept in `AppState` for health checks
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Round-trip a trivial query
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::PoolTimedOut => DatabaseError::ConnectionTimeout,
                other => DatabaseError::Unreachable(other),
            })?;
        Ok(())
    }
}

/// Open the pool described by `config` and make sure it answers.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    debug!(
        "Opening pool: max_connections={}, acquire_timeout={:?}",
        config.max_connections,
        config.acquire_timeout()
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .test_before_acquire(config.test_before_acquire)
        .connect(&config.url)
        .await
        .map_err(DatabaseError::from_connect)?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(DatabaseError::from_connect)?;

    Ok(pool)
}

/// Apply every pending migration from [`MIGRATOR`]
pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    MIGRATOR.run(pool).await?;
    info!("{} migrations applied or already present", MIGRATOR.iter().count());
    Ok(())
}
