//! User domain types.

use chrono::{DateTime, Utc};

use merch_core::{Email, PersonName, UserId};

/// Column limit for `users.first_name` / `users.last_name`.
pub const MAX_NAME_PART_LENGTH: usize = 150;

/// A storefront account.
///
/// The username is always the email address the account signed up with.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login identifier (the signup email).
    pub username: String,
    /// Contact email.
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    /// Inactive accounts cannot log in.
    pub is_active: bool,
    /// When the account was created.
    pub date_joined: DateTime<Utc>,
    /// Last successful login.
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Display name for page headers, falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name, &self.username)
    }
}

/// "First Last", or the username when both parts are blank.
#[must_use]
pub fn display_name(first_name: &str, last_name: &str, username: &str) -> String {
    let full = format!("{first_name} {last_name}");
    match full.trim() {
        "" => username.to_owned(),
        name => name.to_owned(),
    }
}

/// Everything needed to create a user and their profile in one transaction.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: Email,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub name: PersonName,
    /// Profile full name, as entered.
    pub full_name: String,
    /// Mobile including the country code prefix.
    pub mobile: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("Jane", "Doe", "jane@x.com"), "Jane Doe");
        assert_eq!(display_name("Cher", "", "cher@x.com"), "Cher");
        assert_eq!(display_name("", "", "anon@x.com"), "anon@x.com");
    }
}
