//! Database migration command.
//!
//! Runs the embedded storefront migrations from `crates/storefront/migrations/`
//! and creates the session table used by `tower-sessions`.

use super::{CliError, connect};

/// Run storefront database migrations.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    merch_storefront::db::migrate(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
