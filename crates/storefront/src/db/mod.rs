//! Database operations for the storefront `PostgreSQL` database.
//!
//! ## Tables (schema `storefront`)
//!
//! - `users` - Accounts (username = email, argon2 password hash)
//! - `profiles` - One row per user, extended account attributes
//! - `categories` - Product categories
//! - `products` - Catalog entries, cascade-deleted with their category
//!
//! Sessions live in `tower_sessions.session`, managed by the session store.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p merch-cli -- migrate
//! ```

pub mod accounts;
pub mod catalog;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use merch_core::{Email, PersonName, UserId};

use crate::models::{NewAccount, Profile, ProfileUpdate, User};

pub use accounts::PgAccountStore;
pub use catalog::CatalogRepository;

/// `PostgreSQL` error code for values too long for their column.
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Uniqueness violation (e.g., username already taken).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Value rejected by a column limit or check constraint.
    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl RepositoryError {
    /// Classify a sqlx error raised by a write.
    ///
    /// Unique violations become [`Self::Conflict`], length and check
    /// violations become [`Self::Constraint`]; everything else stays a
    /// database error.
    pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(format!("{what} already exists"));
            }
            if db_err.is_check_violation()
                || db_err.code().as_deref() == Some(STRING_DATA_RIGHT_TRUNCATION)
            {
                return Self::Constraint(format!("{what}: {}", db_err.message()));
            }
        }
        Self::Database(err)
    }
}

/// Persistence operations needed by the account service.
///
/// [`PgAccountStore`] is the production implementation. Multi-row writes
/// (`create_account`, `update_profile`) must be atomic.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Whether a user with this username exists.
    async fn username_exists(&self, username: &str) -> Result<bool, RepositoryError>;

    /// Whether a user with this email exists.
    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError>;

    /// Create a user and their profile together, or neither.
    ///
    /// Returns [`RepositoryError::Conflict`] when the username or email is
    /// already taken.
    async fn create_account(&self, account: &NewAccount) -> Result<User, RepositoryError>;

    /// Look up a user and their password hash by username.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Current password hash of a user, `None` if the user is gone.
    async fn password_hash(&self, user_id: UserId) -> Result<Option<String>, RepositoryError>;

    /// Replace a user's password hash.
    async fn set_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError>;

    /// Stamp `last_login` with the current time.
    async fn record_login(&self, user_id: UserId) -> Result<(), RepositoryError>;

    /// Fetch the user's profile, creating an empty one if none exists.
    async fn get_or_create_profile(&self, user_id: UserId) -> Result<Profile, RepositoryError>;

    /// Overwrite all profile fields and the user's first/last name atomically.
    async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
        name: &PersonName,
    ) -> Result<Profile, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Errors from running migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("schema migration failed: {0}")]
    Schema(#[from] sqlx::migrate::MigrateError),

    #[error("session store migration failed: {0}")]
    SessionStore(#[from] sqlx::Error),
}

/// Run the storefront schema migrations and create the session table.
///
/// # Errors
///
/// Returns [`MigrationError`] if either migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrationError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    PostgresStore::new(pool.clone()).migrate().await?;
    Ok(())
}
