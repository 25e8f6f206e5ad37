//! Argon2id password hashing.
//!
//! Hashing is CPU-bound, so both operations run on the blocking thread pool.

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Hashing failed or the blocking task was cancelled.
#[derive(Debug, Error)]
#[error("password hashing failed")]
pub struct PasswordHashError;

/// Hash verified when no account matches a login attempt.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_blocking("merch-dummy-password").ok());

fn hash_blocking(password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordHashError)
}

fn verify_blocking(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        tracing::warn!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Hash a password into a PHC string.
///
/// # Errors
///
/// Returns [`PasswordHashError`] if hashing fails.
pub async fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_blocking(&password))
        .await
        .map_err(|_| PasswordHashError)?
}

/// Check a password against a stored hash.
///
/// An unparseable hash never matches.
///
/// # Errors
///
/// Returns [`PasswordHashError`] if the blocking task fails.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordHashError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || verify_blocking(&password, &hash))
        .await
        .map_err(|_| PasswordHashError)
}

/// Spend the same work as a real verification, for unknown accounts.
pub async fn verify_dummy(password: &str) {
    let password = password.to_owned();
    let _ = tokio::task::spawn_blocking(move || {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            verify_blocking(&password, hash);
        }
    })
    .await;
}
