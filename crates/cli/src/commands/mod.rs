//! CLI command implementations.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

pub mod catalog;
pub mod migrate;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use merch_core::{PriceError, SlugError};
use merch_storefront::db::{MigrationError, RepositoryError, create_pool};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Invalid slug: {0}")]
    InvalidSlug(#[from] SlugError),

    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] PriceError),

    #[error("No category with slug: {0}")]
    CategoryNotFound(String),

    #[error("No product with ID: {0}")]
    ProductNotFound(i64),
}

/// Connect to the storefront database.
pub async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    Ok(create_pool(&database_url).await?)
}
