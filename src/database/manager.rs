use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Centralized connection pool for the application database
pub struct DatabaseManager;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

impl DatabaseManager {
    /// Get the shared application pool, connecting lazily on first use
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        let pool = POOL
            .get_or_try_init(|| async {
                let connection_string = Self::build_connection_string()?;
                let db_config = &config::config().database;

                let pool = PgPoolOptions::new()
                    .max_connections(db_config.max_connections)
                    .acquire_timeout(Duration::from_secs(db_config.connection_timeout))
                    .connect(&connection_string)
                    .await?;

                info!("Created database pool");
                Ok::<_, DatabaseError>(pool)
            })
            .await?;
        Ok(pool.clone())
    }

    /// Build the connection string from DATABASE_URL, optionally swapping the
    /// database name (APP_DATABASE_NAME) so tests can target a scratch database
    fn build_connection_string() -> Result<String, DatabaseError> {
        let base = std::env::var("DATABASE_URL")
            .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;

        match std::env::var("APP_DATABASE_NAME") {
            Ok(name) if !name.is_empty() => {
                let mut url =
                    url::Url::parse(&base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
                url.set_path(&format!("/{}", name));
                Ok(url.into())
            }
            _ => Ok(base),
        }
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }
}
