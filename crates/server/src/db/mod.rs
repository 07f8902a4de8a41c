//! Database operations for the minimart SQLite store.
//!
//! ## Tables
//!
//! - `users` - Registered users
//! - `products` - Catalog products with tracked stock
//! - `cart_lines` - Per-user cart lines, one per (user, product)
//!
//! One repository struct per table; repositories borrow the pool and map
//! row types to the domain types in [`crate::models`].
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p minimart-cli -- migrate
//! ```

pub mod carts;
pub mod products;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub use carts::CartRepository;
pub use products::{ProductRepository, StockDecrement};
pub use users::UserRepository;

/// Embedded migrations for the minimart schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g. duplicate login).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a SQLite connection pool with sensible defaults.
///
/// The database file is created if missing and foreign-key enforcement is
/// enabled on every connection (cart lines cascade with their user).
///
/// # Arguments
///
/// * `database_url` - SQLite connection string, e.g. `sqlite://minimart.db`
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is malformed or the connection cannot
/// be established.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}
