//! Authentication extractors and session helpers.
//!
//! A logged-in session stores a [`CurrentUser`] whose `auth_hash` is derived
//! from the session secret and the user's password hash. Both extractors
//! re-derive the marker on every request, so changing a password logs out
//! every session that was not refreshed by the change.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use tower_sessions::Session;

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::models::{CurrentUser, User, session_keys};
use crate::state::AppState;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/login/";

/// Derive the session authentication marker for a password hash.
#[must_use]
pub fn session_auth_hash(session_secret: &secrecy::SecretString, password_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(session_secret.expose_secret().as_bytes());
    hasher.update(b"\0");
    hasher.update(password_hash.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Extractor that requires a logged-in user.
///
/// Redirects to the login page when the session has no user or its marker
/// no longer matches the stored password.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but missing or stale.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// The account store could not be reached.
    Internal(RepositoryError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Internal(err) => AppError::Database(err).into_response(),
        }
    }
}

/// The logged-in user of `session`, if its marker still matches the stored
/// password hash.
///
/// A stale session is flushed so it stays logged out.
async fn authenticated_user(
    session: &Session,
    state: &AppState,
) -> Result<Option<CurrentUser>, RepositoryError> {
    let Some(user) = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
    else {
        return Ok(None);
    };

    let stored_hash = state.accounts().password_hash(user.id).await?;
    let valid = stored_hash.is_some_and(|hash| {
        session_auth_hash(&state.config().session_secret, &hash) == user.auth_hash
    });

    if !valid {
        tracing::info!(user_id = %user.id, "stale session, logging out");
        if let Err(e) = session.flush().await {
            tracing::warn!(error = %e, "failed to flush stale session");
        }
        return Ok(None);
    }

    Ok(Some(user))
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::RedirectToLogin)?;

        authenticated_user(&session, state)
            .await
            .map_err(AuthRejection::Internal)?
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

/// Extractor that optionally gets the current user from the session.
///
/// Used for navigation state on public pages. Sessions invalidated by a
/// password change read as logged out, and a store failure is logged and
/// treated the same way.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(Self(None));
        };

        let user = authenticated_user(&session, state)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "could not check session user");
                None
            });

        Ok(Self(user))
    }
}

/// Log `user` into `session`, issuing a new session ID.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    session_secret: &secrecy::SecretString,
    user: &User,
    password_hash: &str,
) -> Result<CurrentUser, tower_sessions::session::Error> {
    let current = CurrentUser {
        id: user.id,
        username: user.username.clone(),
        display_name: user.display_name(),
        auth_hash: session_auth_hash(session_secret, password_hash),
    };
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, &current).await?;
    Ok(current)
}

/// Replace the marker after a password change, issuing a new session ID.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn refresh_auth_hash(
    session: &Session,
    session_secret: &secrecy::SecretString,
    mut current: CurrentUser,
    password_hash: &str,
) -> Result<(), tower_sessions::session::Error> {
    current.auth_hash = session_auth_hash(session_secret, password_hash);
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, &current).await
}

/// End the session entirely (logout).
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
