//! Password strength policy.
//!
//! Applied when a user changes their password. Rules are checked in a
//! fixed order and the first failure is reported, so users fix one thing at
//! a time.

use thiserror::Error;

/// Characters that satisfy the "special character" rule.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

/// A password strength rule that was not met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },
    #[error("password must contain at least one uppercase letter")]
    MissingUppercase,
    #[error("password must contain at least one lowercase letter")]
    MissingLowercase,
    #[error("password must contain at least one number")]
    MissingDigit,
    #[error("password must contain at least one special character")]
    MissingSpecial,
}

/// Password strength requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum length in characters (not bytes).
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

impl PasswordPolicy {
    /// Check a candidate password against the policy.
    ///
    /// Order: length, uppercase, lowercase, digit, special character.
    ///
    /// # Errors
    ///
    /// Returns the first [`PasswordPolicyError`] the password triggers.
    pub fn check(&self, password: &str) -> Result<(), PasswordPolicyError> {
        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min: self.min_length,
            });
        }
        if !password.chars().any(char::is_uppercase) {
            return Err(PasswordPolicyError::MissingUppercase);
        }
        if !password.chars().any(char::is_lowercase) {
            return Err(PasswordPolicyError::MissingLowercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyError::MissingDigit);
        }
        if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
            return Err(PasswordPolicyError::MissingSpecial);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(password: &str) -> Result<(), PasswordPolicyError> {
        PasswordPolicy::default().check(password)
    }

    #[test]
    fn test_rejects_short() {
        assert_eq!(check("short1"), Err(PasswordPolicyError::TooShort { min: 8 }));
    }

    #[test]
    fn test_rejects_missing_uppercase() {
        assert_eq!(
            check("alllowercase1!"),
            Err(PasswordPolicyError::MissingUppercase)
        );
    }

    #[test]
    fn test_rejects_missing_lowercase() {
        assert_eq!(
            check("ALLUPPER1!"),
            Err(PasswordPolicyError::MissingLowercase)
        );
    }

    #[test]
    fn test_rejects_missing_digit() {
        assert_eq!(check("NoDigits!"), Err(PasswordPolicyError::MissingDigit));
    }

    #[test]
    fn test_rejects_missing_special() {
        assert_eq!(check("NoSpecial1"), Err(PasswordPolicyError::MissingSpecial));
    }

    #[test]
    fn test_accepts_strong_passwords() {
        assert_eq!(check("NewPass2@"), Ok(()));
        assert_eq!(check("OldPass1!"), Ok(()));
        assert_eq!(check("Quote\"Mark9"), Ok(()));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // Seven characters, more than eight bytes.
        assert!(matches!(
            check("Ää1!aaa"),
            Err(PasswordPolicyError::TooShort { .. })
        ));
    }

    #[test]
    fn test_every_listed_special_character_counts() {
        for c in SPECIAL_CHARACTERS.chars() {
            let candidate = format!("Abcdefg1{c}");
            assert_eq!(check(&candidate), Ok(()), "special char {c:?}");
        }
    }
}
