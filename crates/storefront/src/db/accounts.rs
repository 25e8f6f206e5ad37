//! `PostgreSQL` account store.
//!
//! Users and profiles are written together; every multi-statement write runs
//! inside a single transaction so a failure leaves no partial rows behind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use merch_core::{Email, PersonName, ProfileId, UserId};

use super::{AccountStore, RepositoryError};
use crate::models::{NewAccount, Profile, ProfileUpdate, User};

// =============================================================================
// Internal Row Types
// =============================================================================

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, is_active, date_joined, last_login";

const PROFILE_COLUMNS: &str =
    "id, user_id, full_name, mobile, gender, address, city, postal_code";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    is_active: bool,
    date_joined: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username: row.username,
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            is_active: row.is_active,
            date_joined: row.date_joined,
            last_login: row.last_login,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: i64,
    user_id: i64,
    full_name: String,
    mobile: String,
    gender: String,
    address: String,
    city: String,
    postal_code: String,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: ProfileId::new(row.id),
            user_id: UserId::new(row.user_id),
            full_name: row.full_name,
            mobile: row.mobile,
            gender: row.gender,
            address: row.address,
            city: row.city,
            postal_code: row.postal_code,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Account store backed by the storefront database.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Insert an empty profile for `user_id` unless one already exists.
async fn ensure_profile<'e, E>(executor: E, user_id: UserId) -> Result<(), RepositoryError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r"
        INSERT INTO storefront.profiles (user_id)
        VALUES ($1)
        ON CONFLICT (user_id) DO NOTHING
        ",
    )
    .bind(user_id)
    .execute(executor)
    .await
    .map_err(|e| RepositoryError::from_write(e, "profile"))?;
    Ok(())
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM storefront.users WHERE username = $1)",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM storefront.users WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_account(&self, account: &NewAccount) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO storefront.users
                (username, email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(account.email.as_str())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.name.first)
        .bind(&account.name.last)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "user"))?;

        let user = User::try_from(row)?;

        sqlx::query(
            r"
            INSERT INTO storefront.profiles (user_id, full_name, mobile)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(user.id)
        .bind(&account.full_name)
        .bind(&account.mobile)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "profile"))?;

        tx.commit().await?;

        Ok(user)
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            r"
            SELECT {USER_COLUMNS}, password_hash
            FROM storefront.users
            WHERE username = $1
            "
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Ok((User::try_from(r.user)?, r.password_hash)))
            .transpose()
    }

    async fn password_hash(&self, user_id: UserId) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM storefront.users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(hash)
    }

    async fn set_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE storefront.users SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn record_login(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE storefront.users SET last_login = now() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_or_create_profile(&self, user_id: UserId) -> Result<Profile, RepositoryError> {
        ensure_profile(&self.pool, user_id).await?;

        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM storefront.profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
        name: &PersonName,
    ) -> Result<Profile, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        ensure_profile(&mut *tx, user_id).await?;

        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r"
            UPDATE storefront.profiles
            SET full_name = $2, mobile = $3, gender = $4,
                address = $5, city = $6, postal_code = $7
            WHERE user_id = $1
            RETURNING {PROFILE_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(&update.full_name)
        .bind(&update.mobile)
        .bind(&update.gender)
        .bind(&update.address)
        .bind(&update.city)
        .bind(&update.postal_code)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "profile"))?;

        let result = sqlx::query(
            "UPDATE storefront.users SET first_name = $2, last_name = $3 WHERE id = $1",
        )
        .bind(user_id)
        .bind(&name.first)
        .bind(&name.last)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "user name"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        Ok(row.into())
    }
}
