//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use minimart_core::{Email, Login, UserId};

use super::RepositoryError;
use crate::models::user::{NewUser, User, UserPatch};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    login: String,
    email: String,
    age: i64,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let login = Login::parse(&self.login).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid login in database: {e}"))
        })?;
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            login,
            email,
            age: self.age,
            created_at: self.created_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, login, email, age, created_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all users in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Whether a user with this id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: UserId) -> Result<bool, RepositoryError> {
        let found = sqlx::query_scalar::<_, i64>("SELECT EXISTS (SELECT 1 FROM users WHERE id = ?1)")
            .bind(id.as_i64())
            .fetch_one(self.pool)
            .await?;

        Ok(found != 0)
    }

    /// Whether a user with this login exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn login_exists(&self, login: &Login) -> Result<bool, RepositoryError> {
        let found =
            sqlx::query_scalar::<_, i64>("SELECT EXISTS (SELECT 1 FROM users WHERE login = ?1)")
                .bind(login.as_str())
                .fetch_one(self.pool)
                .await?;

        Ok(found != 0)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the login is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (login, email, age) VALUES (?1, ?2, ?3) \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(user.login.as_str())
        .bind(user.email.as_str())
        .bind(user.age)
        .fetch_one(self.pool)
        .await
        .map_err(map_login_conflict)?;

        row.into_user()
    }

    /// Replace all fields of an existing user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new login is taken.
    pub async fn update(&self, id: UserId, user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET login = ?1, email = ?2, age = ?3 WHERE id = ?4 \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(user.login.as_str())
        .bind(user.email.as_str())
        .bind(user.age)
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await
        .map_err(map_login_conflict)?;

        row.ok_or(RepositoryError::NotFound)?.into_user()
    }

    /// Apply a partial update; absent fields keep their current value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new login is taken.
    pub async fn patch(&self, id: UserId, patch: &UserPatch) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET \
                 login = COALESCE(?1, login), \
                 email = COALESCE(?2, email), \
                 age = COALESCE(?3, age) \
             WHERE id = ?4 \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(patch.login.as_ref().map(Login::as_str))
        .bind(patch.email.as_ref().map(Email::as_str))
        .bind(patch.age)
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await
        .map_err(map_login_conflict)?;

        row.ok_or(RepositoryError::NotFound)?.into_user()
    }

    /// Delete a user. Cart lines cascade with the user.
    ///
    /// # Returns
    ///
    /// `true` if the user was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_login_conflict(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("login already exists".to_owned());
    }
    RepositoryError::Database(e)
}
