//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use minimart_core::{Email, EmailError, Login, LoginError, UserId};

/// Oldest accepted age. Nothing below zero makes sense; the upper bound
/// guards against unit mistakes (ages in months, years typed as birth years).
pub const MAX_AGE: i64 = 130;

/// A registered user.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID (server-assigned).
    pub id: UserId,
    /// Unique login name.
    pub login: Login,
    /// Email address.
    pub email: Email,
    /// Age in years.
    pub age: i64,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// Errors produced when validating user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error(transparent)]
    Email(#[from] EmailError),
    #[error("age must be between 0 and {MAX_AGE}")]
    AgeOutOfRange,
}

/// A validated new user, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: Login,
    pub email: Email,
    pub age: i64,
}

impl NewUser {
    /// Validate raw input into a `NewUser`.
    ///
    /// # Errors
    ///
    /// Returns a [`UserValidationError`] for a malformed login or email, or
    /// an age outside `0..=130`.
    pub fn parse(login: &str, email: &str, age: i64) -> Result<Self, UserValidationError> {
        let login = Login::parse(login)?;
        let email = Email::parse(email)?;
        validate_age(age)?;

        Ok(Self { login, email, age })
    }
}

/// A validated partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub login: Option<Login>,
    pub email: Option<Email>,
    pub age: Option<i64>,
}

impl UserPatch {
    /// Validate raw optional input into a `UserPatch`.
    ///
    /// # Errors
    ///
    /// Returns a [`UserValidationError`] if any supplied field is invalid.
    pub fn parse(
        login: Option<&str>,
        email: Option<&str>,
        age: Option<i64>,
    ) -> Result<Self, UserValidationError> {
        let login = login.map(Login::parse).transpose()?;
        let email = email.map(Email::parse).transpose()?;
        if let Some(age) = age {
            validate_age(age)?;
        }

        Ok(Self { login, email, age })
    }

    /// Whether the patch changes anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.login.is_none() && self.email.is_none() && self.age.is_none()
    }
}

fn validate_age(age: i64) -> Result<(), UserValidationError> {
    if (0..=MAX_AGE).contains(&age) {
        Ok(())
    } else {
        Err(UserValidationError::AgeOutOfRange)
    }
}
