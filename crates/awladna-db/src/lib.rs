//! # Awladna DB
//!
//! Database pool and the Postgres-backed identity store.
//!
//! This crate provides connection pool initialization, schema migrations
//! and [`PgCredentialStore`], the production [`CredentialStore`](awladna_models::CredentialStore).
//!
//! # Example
//!
//! ```ignore
//! use awladna_db::{PgCredentialStore, init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&std::env::var("DATABASE_URL")?).await?;
//! run_migrations(&pool).await?;
//! let credentials = PgCredentialStore::new(pool);
//! ```

pub mod credentials;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub use credentials::PgCredentialStore;

/// Initializes a PostgreSQL connection pool.
///
/// The returned pool is cheaply cloneable and should be passed to the
/// application state rather than re-created per call.
///
/// # Errors
///
/// Returns the underlying `sqlx::Error` if the URL is invalid or the
/// database cannot be reached.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("Database pool initialized");
    Ok(pool)
}

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

// Re-export PgPool for convenience
pub use sqlx::PgPool;
