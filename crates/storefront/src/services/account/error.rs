//! Account service error types.
//!
//! Each user-facing error has a stable `code()` carried in redirect query
//! strings and a `message()` shown on the page. Pages only render messages
//! for codes they recognize.

use thiserror::Error;

use merch_core::PasswordPolicyError;

use super::password::PasswordHashError;
use crate::db::RepositoryError;

/// Failures the user cannot fix: storage or hashing.
#[derive(Debug, Error)]
pub enum InternalError {
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    PasswordHash(#[from] PasswordHashError),
}

// =============================================================================
// Signup
// =============================================================================

/// Reasons a signup is rejected.
#[derive(Debug, Error)]
pub enum SignupError {
    #[error("required field missing")]
    MissingFields,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("email already registered")]
    EmailTaken,

    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}

impl SignupError {
    const CODES: &'static [(&'static str, &'static str)] = &[
        ("missing_fields", "All fields are required"),
        ("password_mismatch", "Passwords do not match"),
        ("invalid_email", "Enter a valid email address"),
        ("email_taken", "Email already registered"),
        ("signup_failed", "Error creating account. Please try again."),
    ];

    /// Stable code for redirect query strings.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingFields => "missing_fields",
            Self::PasswordMismatch => "password_mismatch",
            Self::InvalidEmail => "invalid_email",
            Self::EmailTaken => "email_taken",
            Self::Internal(_) => "signup_failed",
        }
    }

    /// Message shown to the user.
    #[must_use]
    pub fn message(&self) -> &'static str {
        Self::message_for_code(self.code()).unwrap_or_default()
    }

    /// Message for a code taken from a query string.
    #[must_use]
    pub fn message_for_code(code: &str) -> Option<&'static str> {
        lookup(Self::CODES, code)
    }
}

impl From<RepositoryError> for SignupError {
    fn from(err: RepositoryError) -> Self {
        Self::Internal(err.into())
    }
}

impl From<PasswordHashError> for SignupError {
    fn from(err: PasswordHashError) -> Self {
        Self::Internal(err.into())
    }
}

// =============================================================================
// Login
// =============================================================================

/// Reasons a login is rejected.
///
/// Unknown email, wrong password and inactive account all collapse into
/// [`LoginError::InvalidCredentials`].
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}

impl LoginError {
    /// Message shown on the re-rendered login form.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid email or password",
            Self::Internal(_) => "Something went wrong. Please try again.",
        }
    }
}

impl From<RepositoryError> for LoginError {
    fn from(err: RepositoryError) -> Self {
        Self::Internal(err.into())
    }
}

impl From<PasswordHashError> for LoginError {
    fn from(err: PasswordHashError) -> Self {
        Self::Internal(err.into())
    }
}

// =============================================================================
// Profile
// =============================================================================

/// A profile update that could not be stored.
#[derive(Debug, Error)]
#[error("profile update failed: {0}")]
pub struct ProfileUpdateError(#[from] pub RepositoryError);

impl ProfileUpdateError {
    const CODE: &'static str = "update_failed";

    /// Stable code for redirect query strings.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        Self::CODE
    }

    /// Message shown to the user.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        "Error updating profile"
    }

    /// Message for a code taken from a query string.
    #[must_use]
    pub fn message_for_code(code: &str) -> Option<&'static str> {
        (code == Self::CODE).then_some("Error updating profile")
    }

    /// Whether the store rejected the values rather than failing.
    #[must_use]
    pub const fn is_rejected_input(&self) -> bool {
        matches!(self.0, RepositoryError::Constraint(_))
    }
}

// =============================================================================
// Password change
// =============================================================================

/// Reasons a password change is rejected.
#[derive(Debug, Error)]
pub enum PasswordChangeError {
    #[error("old password incorrect")]
    IncorrectOldPassword,

    #[error("new passwords do not match")]
    Mismatch,

    #[error(transparent)]
    Weak(#[from] PasswordPolicyError),

    #[error("new password equals old password")]
    Unchanged,

    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}

impl PasswordChangeError {
    const CODES: &'static [(&'static str, &'static str)] = &[
        (
            "incorrect_old_password",
            "Your old password was entered incorrectly. Please enter it again.",
        ),
        ("password_mismatch", "The two new passwords do not match"),
        ("password_too_short", "Password must be at least 8 characters long"),
        (
            "password_missing_uppercase",
            "Password must contain at least one uppercase letter",
        ),
        (
            "password_missing_lowercase",
            "Password must contain at least one lowercase letter",
        ),
        ("password_missing_digit", "Password must contain at least one number"),
        (
            "password_missing_special",
            "Password must contain at least one special character",
        ),
        (
            "password_unchanged",
            "New password must be different from your old password",
        ),
        ("password_change_failed", "Error changing password. Please try again."),
    ];

    /// Stable code for redirect query strings.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::IncorrectOldPassword => "incorrect_old_password",
            Self::Mismatch => "password_mismatch",
            Self::Weak(PasswordPolicyError::TooShort { .. }) => "password_too_short",
            Self::Weak(PasswordPolicyError::MissingUppercase) => "password_missing_uppercase",
            Self::Weak(PasswordPolicyError::MissingLowercase) => "password_missing_lowercase",
            Self::Weak(PasswordPolicyError::MissingDigit) => "password_missing_digit",
            Self::Weak(PasswordPolicyError::MissingSpecial) => "password_missing_special",
            Self::Unchanged => "password_unchanged",
            Self::Internal(_) => "password_change_failed",
        }
    }

    /// Message shown to the user.
    #[must_use]
    pub fn message(&self) -> &'static str {
        Self::message_for_code(self.code()).unwrap_or_default()
    }

    /// Message for a code taken from a query string.
    #[must_use]
    pub fn message_for_code(code: &str) -> Option<&'static str> {
        lookup(Self::CODES, code)
    }
}

impl From<RepositoryError> for PasswordChangeError {
    fn from(err: RepositoryError) -> Self {
        Self::Internal(err.into())
    }
}

impl From<PasswordHashError> for PasswordChangeError {
    fn from(err: PasswordHashError) -> Self {
        Self::Internal(err.into())
    }
}

fn lookup(table: &[(&'static str, &'static str)], code: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, message)| *message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_codes_round_trip_to_messages() {
        let errors = [
            SignupError::MissingFields,
            SignupError::PasswordMismatch,
            SignupError::InvalidEmail,
            SignupError::EmailTaken,
            SignupError::Internal(RepositoryError::NotFound.into()),
        ];
        for err in errors {
            assert_eq!(
                SignupError::message_for_code(err.code()),
                Some(err.message())
            );
        }
    }

    #[test]
    fn test_internal_signup_error_hides_cause() {
        let err = SignupError::from(RepositoryError::DataCorruption("bad row".to_owned()));
        assert_eq!(err.message(), "Error creating account. Please try again.");
    }

    #[test]
    fn test_password_policy_codes() {
        let err = PasswordChangeError::from(PasswordPolicyError::MissingSpecial);
        assert_eq!(err.code(), "password_missing_special");
        assert_eq!(
            err.message(),
            "Password must contain at least one special character"
        );
    }

    #[test]
    fn test_unknown_codes_are_ignored() {
        assert_eq!(SignupError::message_for_code("<script>"), None);
        assert_eq!(PasswordChangeError::message_for_code(""), None);
        assert_eq!(ProfileUpdateError::message_for_code("missing_fields"), None);
    }

    #[test]
    fn test_login_errors_share_message() {
        assert_eq!(
            LoginError::InvalidCredentials.message(),
            "Invalid email or password"
        );
    }
}
