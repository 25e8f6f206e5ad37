//! In-memory account store for tests.
//!
//! Mirrors the `PostgreSQL` schema closely enough for end-to-end tests:
//! usernames and emails are unique, one profile per user, and values longer
//! than their column limit are rejected. Multi-row writes operate on a copy
//! of the state that only replaces the original on success.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use merch_core::{Email, PersonName, ProfileId, UserId};

use super::{AccountStore, RepositoryError};
use crate::models::profile::{
    MAX_CITY_LENGTH, MAX_FULL_NAME_LENGTH, MAX_GENDER_LENGTH, MAX_MOBILE_LENGTH,
    MAX_POSTAL_CODE_LENGTH,
};
use crate::models::user::MAX_NAME_PART_LENGTH;
use crate::models::{NewAccount, Profile, ProfileUpdate, User};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    next_user_id: i64,
    next_profile_id: i64,
    users: BTreeMap<UserId, StoredUser>,
    profiles: BTreeMap<UserId, Profile>,
}

impl MemoryState {
    fn insert_profile(&mut self, profile: Profile) -> Result<(), RepositoryError> {
        check_profile_limits(&profile)?;
        if self.profiles.contains_key(&profile.user_id) {
            return Err(RepositoryError::Conflict("profile already exists".to_owned()));
        }
        self.profiles.insert(profile.user_id, profile);
        Ok(())
    }

    fn empty_profile(&mut self, user_id: UserId) -> Profile {
        self.next_profile_id += 1;
        Profile {
            id: ProfileId::new(self.next_profile_id),
            user_id,
            full_name: String::new(),
            mobile: String::new(),
            gender: String::new(),
            address: String::new(),
            city: String::new(),
            postal_code: String::new(),
        }
    }
}

fn check_length(value: &str, max: usize, column: &str) -> Result<(), RepositoryError> {
    if value.chars().count() > max {
        return Err(RepositoryError::Constraint(format!(
            "{column}: value too long for type character varying({max})"
        )));
    }
    Ok(())
}

fn check_profile_limits(profile: &Profile) -> Result<(), RepositoryError> {
    check_length(&profile.full_name, MAX_FULL_NAME_LENGTH, "profile full_name")?;
    check_length(&profile.mobile, MAX_MOBILE_LENGTH, "profile mobile")?;
    check_length(&profile.gender, MAX_GENDER_LENGTH, "profile gender")?;
    check_length(&profile.city, MAX_CITY_LENGTH, "profile city")?;
    check_length(&profile.postal_code, MAX_POSTAL_CODE_LENGTH, "profile postal_code")
}

fn check_name_limits(name: &PersonName) -> Result<(), RepositoryError> {
    check_length(&name.first, MAX_NAME_PART_LENGTH, "user first_name")?;
    check_length(&name.last, MAX_NAME_PART_LENGTH, "user last_name")
}

/// Account store holding everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    state: Mutex<MemoryState>,
}

impl MemoryAccountStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding the lock leaves the state untouched, since
        // writes go through `transaction`.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Apply `f` to a copy of the state and keep the copy only on success.
    fn transaction<T>(
        &self,
        f: impl FnOnce(&mut MemoryState) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut guard = self.lock();
        let mut working = guard.clone();
        let value = f(&mut working)?;
        *guard = working;
        Ok(value)
    }

    /// Number of stored users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    /// Number of stored profiles.
    #[must_use]
    pub fn profile_count(&self) -> usize {
        self.lock().profiles.len()
    }

    /// Find a user by username.
    #[must_use]
    pub fn find_user(&self, username: &str) -> Option<User> {
        self.lock()
            .users
            .values()
            .find(|stored| stored.user.username == username)
            .map(|stored| stored.user.clone())
    }

    /// Profile of a user, without creating one.
    #[must_use]
    pub fn find_profile(&self, user_id: UserId) -> Option<Profile> {
        self.lock().profiles.get(&user_id).cloned()
    }

    /// Change a user's login name, leaving the email as it was.
    pub fn rename_user(&self, user_id: UserId, username: &str) {
        if let Some(stored) = self.lock().users.get_mut(&user_id) {
            stored.user.username = username.to_owned();
        }
    }

    /// Mark a user inactive.
    pub fn deactivate(&self, user_id: UserId) {
        if let Some(stored) = self.lock().users.get_mut(&user_id) {
            stored.user.is_active = false;
        }
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .lock()
            .users
            .values()
            .any(|stored| stored.user.username == username))
    }

    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        Ok(self
            .lock()
            .users
            .values()
            .any(|stored| stored.user.email == *email))
    }

    async fn create_account(&self, account: &NewAccount) -> Result<User, RepositoryError> {
        self.transaction(|state| {
            let taken = state.users.values().any(|stored| {
                stored.user.username == account.email.as_str() || stored.user.email == account.email
            });
            if taken {
                return Err(RepositoryError::Conflict("user already exists".to_owned()));
            }
            check_name_limits(&account.name)?;

            state.next_user_id += 1;
            let user = User {
                id: UserId::new(state.next_user_id),
                username: account.email.as_str().to_owned(),
                email: account.email.clone(),
                first_name: account.name.first.clone(),
                last_name: account.name.last.clone(),
                is_active: true,
                date_joined: Utc::now(),
                last_login: None,
            };
            state.users.insert(
                user.id,
                StoredUser {
                    user: user.clone(),
                    password_hash: account.password_hash.clone(),
                },
            );

            let mut profile = state.empty_profile(user.id);
            profile.full_name.clone_from(&account.full_name);
            profile.mobile.clone_from(&account.mobile);
            state.insert_profile(profile)?;

            Ok(user)
        })
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|stored| stored.user.username == username)
            .map(|stored| (stored.user.clone(), stored.password_hash.clone())))
    }

    async fn password_hash(&self, user_id: UserId) -> Result<Option<String>, RepositoryError> {
        Ok(self
            .lock()
            .users
            .get(&user_id)
            .map(|stored| stored.password_hash.clone()))
    }

    async fn set_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let mut state = self.lock();
        let stored = state
            .users
            .get_mut(&user_id)
            .ok_or(RepositoryError::NotFound)?;
        password_hash.clone_into(&mut stored.password_hash);
        Ok(())
    }

    async fn record_login(&self, user_id: UserId) -> Result<(), RepositoryError> {
        if let Some(stored) = self.lock().users.get_mut(&user_id) {
            stored.user.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn get_or_create_profile(&self, user_id: UserId) -> Result<Profile, RepositoryError> {
        self.transaction(|state| {
            if !state.users.contains_key(&user_id) {
                return Err(RepositoryError::NotFound);
            }
            if let Some(profile) = state.profiles.get(&user_id) {
                return Ok(profile.clone());
            }
            let profile = state.empty_profile(user_id);
            state.insert_profile(profile.clone())?;
            Ok(profile)
        })
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
        name: &PersonName,
    ) -> Result<Profile, RepositoryError> {
        self.transaction(|state| {
            if !state.profiles.contains_key(&user_id) {
                let profile = state.empty_profile(user_id);
                state.insert_profile(profile)?;
            }

            let profile = state
                .profiles
                .get_mut(&user_id)
                .ok_or(RepositoryError::NotFound)?;
            profile.full_name.clone_from(&update.full_name);
            profile.mobile.clone_from(&update.mobile);
            profile.gender.clone_from(&update.gender);
            profile.address.clone_from(&update.address);
            profile.city.clone_from(&update.city);
            profile.postal_code.clone_from(&update.postal_code);
            let profile = profile.clone();
            check_profile_limits(&profile)?;

            check_name_limits(name)?;
            let stored = state
                .users
                .get_mut(&user_id)
                .ok_or(RepositoryError::NotFound)?;
            stored.user.first_name.clone_from(&name.first);
            stored.user.last_name.clone_from(&name.last);

            Ok(profile)
        })
    }
}
