//! Account service.
//!
//! Signup, login, profile maintenance and password changes. Handlers own the
//! session; this service only talks to the [`AccountStore`].

mod error;
pub mod password;

pub use error::{
    InternalError, LoginError, PasswordChangeError, ProfileUpdateError, SignupError,
};

use merch_core::{DEFAULT_COUNTRY_CODE, Email, PasswordPolicy, PersonName, UserId, format_mobile};
use tracing::instrument;

use crate::db::{AccountStore, RepositoryError};
use crate::models::{NewAccount, Profile, ProfileUpdate, User};

/// Signup form values, untrimmed.
#[derive(Debug, Clone, Default)]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    /// Dialing prefix; blank means [`DEFAULT_COUNTRY_CODE`].
    pub country_code: Option<String>,
    pub mobile: String,
    pub password: String,
    pub confirm_password: String,
}

/// Account operations over an [`AccountStore`].
pub struct AccountService<'a> {
    store: &'a dyn AccountStore,
    policy: PasswordPolicy,
}

impl<'a> AccountService<'a> {
    /// Create a service using the default password policy.
    #[must_use]
    pub fn new(store: &'a dyn AccountStore) -> Self {
        Self {
            store,
            policy: PasswordPolicy::default(),
        }
    }

    // =========================================================================
    // Signup & Login
    // =========================================================================

    /// Create a user and their profile.
    ///
    /// Checks run in order: required fields, password confirmation, email
    /// syntax, then whether the email is already used as a username or as
    /// an email.
    ///
    /// # Errors
    ///
    /// Returns the first [`SignupError`] the request triggers.
    #[instrument(skip(self, request), fields(email = %request.email.trim()))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<User, SignupError> {
        let full_name = request.full_name.trim();
        let email = request.email.trim();
        let mobile = request.mobile.trim();

        if [full_name, email, mobile, request.password.trim()]
            .iter()
            .any(|field| field.is_empty())
        {
            return Err(SignupError::MissingFields);
        }
        if request.password != request.confirm_password {
            return Err(SignupError::PasswordMismatch);
        }
        let email = Email::parse(email).map_err(|_| SignupError::InvalidEmail)?;

        if self.store.username_exists(email.as_str()).await? {
            return Err(SignupError::EmailTaken);
        }
        if self.store.email_exists(&email).await? {
            return Err(SignupError::EmailTaken);
        }

        let country_code = request.country_code.as_deref().unwrap_or(DEFAULT_COUNTRY_CODE);
        let account = NewAccount {
            password_hash: password::hash_password(&request.password).await?,
            name: PersonName::split(full_name),
            full_name: full_name.to_owned(),
            mobile: format_mobile(country_code, mobile),
            email,
        };

        match self.store.create_account(&account).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "account created");
                Ok(user)
            }
            // Lost a race with a concurrent signup for the same email.
            Err(RepositoryError::Conflict(_)) => Err(SignupError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    /// Authenticate with email and password.
    ///
    /// Returns the user and their current password hash.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::InvalidCredentials`] for an unknown email, a
    /// wrong password or an inactive account.
    #[instrument(skip(self, email, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), LoginError> {
        let username = email.trim();

        let Some((user, hash)) = self.store.find_credentials(username).await? else {
            password::verify_dummy(password).await;
            return Err(LoginError::InvalidCredentials);
        };

        if !password::verify_password(password, &hash).await? || !user.is_active {
            return Err(LoginError::InvalidCredentials);
        }

        self.store.record_login(user.id).await?;
        tracing::info!(user_id = %user.id, "user logged in");

        Ok((user, hash))
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// The user's profile, created empty on first access.
    ///
    /// # Errors
    ///
    /// Returns [`InternalError`] if the store fails.
    pub async fn profile(&self, user_id: UserId) -> Result<Profile, InternalError> {
        Ok(self.store.get_or_create_profile(user_id).await?)
    }

    /// Overwrite the profile and re-derive the user's first and last name.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileUpdateError`] if the write fails; nothing is stored
    /// in that case.
    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Profile, ProfileUpdateError> {
        let name = PersonName::split(&update.full_name);
        let profile = self.store.update_profile(user_id, update, &name).await?;
        tracing::info!(%user_id, "profile updated");
        Ok(profile)
    }

    // =========================================================================
    // Password
    // =========================================================================

    /// Replace the user's password.
    ///
    /// Returns the new hash so the caller can refresh the session marker.
    ///
    /// # Errors
    ///
    /// Returns the first [`PasswordChangeError`] in this order: old password
    /// wrong, confirmation mismatch, policy violation, unchanged password.
    #[instrument(skip(self, old_password, new_password1, new_password2))]
    pub async fn change_password(
        &self,
        user_id: UserId,
        old_password: &str,
        new_password1: &str,
        new_password2: &str,
    ) -> Result<String, PasswordChangeError> {
        let current = self
            .store
            .password_hash(user_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        if !password::verify_password(old_password, &current).await? {
            return Err(PasswordChangeError::IncorrectOldPassword);
        }
        if new_password1 != new_password2 {
            return Err(PasswordChangeError::Mismatch);
        }
        self.policy.check(new_password1)?;
        if new_password1 == old_password {
            return Err(PasswordChangeError::Unchanged);
        }

        let hash = password::hash_password(new_password1).await?;
        self.store.set_password_hash(user_id, &hash).await?;
        tracing::info!(%user_id, "password changed");

        Ok(hash)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::db::memory::MemoryAccountStore;

    /// A store that sees no existing account but loses every insert to a
    /// concurrent signup.
    #[derive(Default)]
    struct ConflictingStore {
        create_calls: AtomicUsize,
    }

    #[async_trait]
    impl AccountStore for ConflictingStore {
        async fn ping(&self) -> Result<(), RepositoryError> {
            Ok(())
        }

        async fn username_exists(&self, _username: &str) -> Result<bool, RepositoryError> {
            Ok(false)
        }

        async fn email_exists(&self, _email: &Email) -> Result<bool, RepositoryError> {
            Ok(false)
        }

        async fn create_account(&self, _account: &NewAccount) -> Result<User, RepositoryError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            Err(RepositoryError::Conflict("user already exists".to_owned()))
        }

        async fn find_credentials(
            &self,
            _username: &str,
        ) -> Result<Option<(User, String)>, RepositoryError> {
            Ok(None)
        }

        async fn password_hash(&self, _user_id: UserId) -> Result<Option<String>, RepositoryError> {
            Ok(None)
        }

        async fn set_password_hash(
            &self,
            _user_id: UserId,
            _password_hash: &str,
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::NotFound)
        }

        async fn record_login(&self, _user_id: UserId) -> Result<(), RepositoryError> {
            Ok(())
        }

        async fn get_or_create_profile(
            &self,
            _user_id: UserId,
        ) -> Result<Profile, RepositoryError> {
            Err(RepositoryError::NotFound)
        }

        async fn update_profile(
            &self,
            _user_id: UserId,
            _update: &ProfileUpdate,
            _name: &PersonName,
        ) -> Result<Profile, RepositoryError> {
            Err(RepositoryError::NotFound)
        }
    }

    fn jane() -> SignupRequest {
        SignupRequest {
            full_name: "Jane Doe".to_owned(),
            email: "jane@x.com".to_owned(),
            country_code: None,
            mobile: "5551234".to_owned(),
            password: "Secret1!".to_owned(),
            confirm_password: "Secret1!".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_signup_creates_user_and_profile() {
        let store = MemoryAccountStore::new();
        let user = AccountService::new(&store).signup(&jane()).await.unwrap();

        assert_eq!(user.username, "jane@x.com");
        assert_eq!(user.email.as_str(), "jane@x.com");
        assert_eq!(user.first_name, "Jane");
        assert_eq!(user.last_name, "Doe");

        let profile = store.find_profile(user.id).unwrap();
        assert_eq!(profile.full_name, "Jane Doe");
        assert_eq!(profile.mobile, "+91 5551234");
    }

    #[tokio::test]
    async fn test_signup_uses_given_country_code() {
        let store = MemoryAccountStore::new();
        let request = SignupRequest {
            country_code: Some("+44".to_owned()),
            ..jane()
        };
        let user = AccountService::new(&store).signup(&request).await.unwrap();
        assert_eq!(store.find_profile(user.id).unwrap().mobile, "+44 5551234");
    }

    #[tokio::test]
    async fn test_signup_validation_order() {
        let store = MemoryAccountStore::new();
        let service = AccountService::new(&store);

        let blank_and_mismatched = SignupRequest {
            mobile: "   ".to_owned(),
            confirm_password: "Other1!".to_owned(),
            ..jane()
        };
        assert!(matches!(
            service.signup(&blank_and_mismatched).await,
            Err(SignupError::MissingFields)
        ));

        let mismatched_and_invalid = SignupRequest {
            email: "not-an-email".to_owned(),
            confirm_password: "Other1!".to_owned(),
            ..jane()
        };
        assert!(matches!(
            service.signup(&mismatched_and_invalid).await,
            Err(SignupError::PasswordMismatch)
        ));

        let invalid = SignupRequest {
            email: "not-an-email".to_owned(),
            ..jane()
        };
        assert!(matches!(
            service.signup(&invalid).await,
            Err(SignupError::InvalidEmail)
        ));
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicate_email() {
        let store = MemoryAccountStore::new();
        let service = AccountService::new(&store);
        service.signup(&jane()).await.unwrap();

        let again = SignupRequest {
            full_name: "Janet Doe".to_owned(),
            email: "  jane@x.com ".to_owned(),
            ..jane()
        };
        assert!(matches!(
            service.signup(&again).await,
            Err(SignupError::EmailTaken)
        ));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_signup_rejects_email_held_by_other_username() {
        let store = MemoryAccountStore::new();
        let service = AccountService::new(&store);
        let existing = service.signup(&jane()).await.unwrap();
        store.rename_user(existing.id, "jane-doe");

        assert!(!store.username_exists("jane@x.com").await.unwrap());
        assert!(matches!(
            service.signup(&jane()).await,
            Err(SignupError::EmailTaken)
        ));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_signup_conflict_on_insert_is_email_taken() {
        let store = ConflictingStore::default();
        let err = AccountService::new(&store).signup(&jane()).await.unwrap_err();

        assert!(matches!(err, SignupError::EmailTaken));
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_signup_failure_leaves_no_user() {
        let store = MemoryAccountStore::new();
        let request = SignupRequest {
            mobile: "9".repeat(25),
            ..jane()
        };
        let err = AccountService::new(&store).signup(&request).await.unwrap_err();

        assert!(matches!(err, SignupError::Internal(_)));
        assert_eq!(store.user_count(), 0);
        assert_eq!(store.profile_count(), 0);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let store = MemoryAccountStore::new();
        let service = AccountService::new(&store);
        service.signup(&jane()).await.unwrap();

        let wrong_password = service.login("jane@x.com", "Secret2!").await.unwrap_err();
        let unknown_user = service.login("john@x.com", "Secret1!").await.unwrap_err();

        assert!(matches!(wrong_password, LoginError::InvalidCredentials));
        assert!(matches!(unknown_user, LoginError::InvalidCredentials));
        assert_eq!(wrong_password.message(), unknown_user.message());
    }

    #[tokio::test]
    async fn test_login_records_last_login() {
        let store = MemoryAccountStore::new();
        let service = AccountService::new(&store);
        service.signup(&jane()).await.unwrap();

        let (user, _) = service.login(" jane@x.com ", "Secret1!").await.unwrap();
        assert_eq!(user.username, "jane@x.com");
        assert!(store.find_user("jane@x.com").unwrap().last_login.is_some());
    }

    #[tokio::test]
    async fn test_login_rejects_inactive_user() {
        let store = MemoryAccountStore::new();
        let service = AccountService::new(&store);
        let user = service.signup(&jane()).await.unwrap();
        store.deactivate(user.id);

        assert!(matches!(
            service.login("jane@x.com", "Secret1!").await,
            Err(LoginError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_update_profile_rederives_names() {
        let store = MemoryAccountStore::new();
        let service = AccountService::new(&store);
        let user = service.signup(&jane()).await.unwrap();

        let update = ProfileUpdate::from_optional(
            Some("Mary   Ann Smith"),
            Some("+91 5550000"),
            None,
            None,
            Some("Pune"),
            None,
        );
        let profile = service.update_profile(user.id, &update).await.unwrap();

        assert_eq!(profile.city, "Pune");
        assert_eq!(profile.gender, "");
        let user = store.find_user("jane@x.com").unwrap();
        assert_eq!(user.first_name, "Mary");
        assert_eq!(user.last_name, "Ann Smith");
    }

    async fn signed_up() -> (MemoryAccountStore, UserId) {
        let store = MemoryAccountStore::new();
        let request = SignupRequest {
            password: "OldPass1!".to_owned(),
            confirm_password: "OldPass1!".to_owned(),
            ..jane()
        };
        let user = AccountService::new(&store).signup(&request).await.unwrap();
        (store, user.id)
    }

    #[tokio::test]
    async fn test_change_password_rejections() {
        let (store, user_id) = signed_up().await;
        let service = AccountService::new(&store);

        let cases: [(&str, &str, &str, &str); 8] = [
            ("Wrong1!!", "NewPass2@", "NewPass2@", "incorrect_old_password"),
            ("OldPass1!", "NewPass2@", "NewPass3@", "password_mismatch"),
            ("OldPass1!", "short1", "short1", "password_too_short"),
            ("OldPass1!", "alllowercase1!", "alllowercase1!", "password_missing_uppercase"),
            ("OldPass1!", "ALLUPPER1!", "ALLUPPER1!", "password_missing_lowercase"),
            ("OldPass1!", "NoDigits!", "NoDigits!", "password_missing_digit"),
            ("OldPass1!", "NoSpecial1", "NoSpecial1", "password_missing_special"),
            ("OldPass1!", "OldPass1!", "OldPass1!", "password_unchanged"),
        ];
        for (old, new1, new2, code) in cases {
            let err = service
                .change_password(user_id, old, new1, new2)
                .await
                .unwrap_err();
            assert_eq!(err.code(), code, "new password {new1:?}");
        }

        service.login("jane@x.com", "OldPass1!").await.unwrap();
    }

    #[tokio::test]
    async fn test_change_password_accepts_strong_password() {
        let (store, user_id) = signed_up().await;
        let service = AccountService::new(&store);

        let hash = service
            .change_password(user_id, "OldPass1!", "NewPass2@", "NewPass2@")
            .await
            .unwrap();

        assert_eq!(store.password_hash(user_id).await.unwrap(), Some(hash));
        assert!(service.login("jane@x.com", "OldPass1!").await.is_err());
        service.login("jane@x.com", "NewPass2@").await.unwrap();
    }
}
