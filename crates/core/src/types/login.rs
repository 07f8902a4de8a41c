//! User login name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Login`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// The input string is empty.
    #[error("login cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("login must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[A-Za-z0-9_]`.
    #[error("login may only contain latin letters, digits and underscores")]
    InvalidCharacter,
}

/// A validated login name.
///
/// ## Constraints
///
/// - Length: 1-20 characters
/// - Characters: ASCII letters, digits and underscores only
///
/// ## Examples
///
/// ```
/// use minimart_core::Login;
///
/// assert!(Login::parse("alice_01").is_ok());
/// assert!(Login::parse("").is_err());        // empty
/// assert!(Login::parse("петя").is_err());    // non-latin
/// assert!(Login::parse("has space").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Login(String);

impl Login {
    /// Maximum length of a login name.
    pub const MAX_LENGTH: usize = 20;

    /// Parse a `Login` from a string.
    ///
    /// # Errors
    ///
    /// Returns a [`LoginError`] if the input is empty, longer than 20
    /// characters, or contains anything besides ASCII letters, digits and
    /// underscores.
    pub fn parse(s: &str) -> Result<Self, LoginError> {
        if s.is_empty() {
            return Err(LoginError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(LoginError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(LoginError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the login as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Login {
    type Err = LoginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Login {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
