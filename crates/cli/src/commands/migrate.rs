//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! eko-cli migrate
//! ```
//!
//! Applies `crates/api/migrations/` (the `documents` table) and then creates
//! the tower-sessions table used by the session layer.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use tower_sessions_sqlx_store::PostgresStore;

use super::{CommandError, database_url};

/// Run every migration the API needs.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = eko_store_api::db::create_pool(&database_url).await?;

    tracing::info!("Running document store migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
