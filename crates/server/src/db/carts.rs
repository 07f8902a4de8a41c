//! Cart repository: per-user cart lines keyed on (user, product).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use minimart_core::{CartLineId, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::CartLine;

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: i64,
    user_id: i64,
    product_id: i64,
    product_name: String,
    quantity: i64,
    created_at: DateTime<Utc>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: CartLineId::new(row.id),
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            quantity: row.quantity,
            created_at: row.created_at,
        }
    }
}

const SELECT_COLUMNS: &str = "id, user_id, product_id, product_name, quantity, created_at";

/// Repository for cart line database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All cart lines for a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM cart_lines WHERE user_id = ?1 ORDER BY id"
        ))
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    /// Insert a cart line, or accumulate quantity onto the existing line
    /// for the same (user, product) pair.
    ///
    /// `product_name` is only written on first insert; the existing
    /// snapshot is kept when the line already exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, including
    /// foreign-key failures for a missing user or product.
    pub async fn upsert_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
        product_name: &str,
        quantity: i64,
    ) -> Result<CartLine, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(&format!(
            "INSERT INTO cart_lines (user_id, product_id, product_name, quantity) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(user_id, product_id) \
             DO UPDATE SET quantity = quantity + excluded.quantity \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .bind(product_name)
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Delete a single cart line by its id.
    ///
    /// # Returns
    ///
    /// `true` if the line was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_line(&self, id: CartLineId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE id = ?1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every cart line belonging to a user.
    ///
    /// # Returns
    ///
    /// The number of lines removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = ?1")
            .bind(user_id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
