//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use merch_core::UserId;

/// Session-stored user identity.
///
/// `auth_hash` is derived from the user's password hash at login. When the
/// password changes the stored marker no longer matches and the session is
/// treated as logged out, unless it was refreshed by the password change
/// itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Login username (email).
    pub username: String,
    /// Name shown in the navigation bar.
    pub display_name: String,
    /// Session authentication marker.
    pub auth_hash: String,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
