pub mod memory;
pub mod models;
pub mod postgres;
pub mod rate_limit;
pub mod repository;
pub mod retention;
pub mod store;
pub mod validation;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::error::DomainError;

pub use store::{ContactStore, GuestbookStore, Page, PostStore, StatsStore};

/// Embedded schema migrations (`migrations/`)
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const UNIQUE_VIOLATION: &str = "23505";

/// Errors from the storage adapters
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let constraint = db.constraint().unwrap_or_default().to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        StoreError::Sqlx(err)
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        DomainError::internal(err)
    }
}

/// Open the connection pool
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!(max_connections, "database pool ready");
    Ok(pool)
}

/// Apply all pending migrations
pub async fn migrate_up(pool: &PgPool) -> Result<(), StoreError> {
    MIGRATOR.run(pool).await?;
    info!("migrations applied");
    Ok(())
}

/// Revert every applied migration
pub async fn migrate_down(pool: &PgPool) -> Result<(), StoreError> {
    MIGRATOR.undo(pool, 0).await?;
    info!("migrations reverted");
    Ok(())
}
