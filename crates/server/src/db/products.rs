//! Product repository: inventory reads, writes, and the stock decrement
//! primitive used by checkout.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use minimart_core::ProductId;

use super::RepositoryError;
use crate::models::product::{NewProduct, Product, ProductPatch};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    stock: i64,
    is_available: bool,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            stock: row.stock,
            is_available: row.is_available,
            created_at: row.created_at,
        }
    }
}

const SELECT_COLUMNS: &str = "id, name, stock, is_available, created_at";

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDecrement {
    /// The decrement was applied.
    Applied {
        /// Stock remaining after the decrement.
        stock: i64,
        /// Availability flag after the decrement (`stock > 0`).
        is_available: bool,
    },
    /// The product exists but has less stock than requested.
    Insufficient,
    /// No product with this id.
    NotFound,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all products in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Create a new product.
    ///
    /// The availability flag follows [`NewProduct::resolved_availability`]:
    /// derived from stock unless explicitly supplied.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products (name, stock, is_available) VALUES (?1, ?2, ?3) \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(product.stock)
        .bind(product.resolved_availability())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replace all fields of an existing product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(&self, id: ProductId, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET name = ?1, stock = ?2, is_available = ?3 WHERE id = ?4 \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(product.stock)
        .bind(product.resolved_availability())
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::from).ok_or(RepositoryError::NotFound)
    }

    /// Apply a partial update; absent fields keep their current value.
    ///
    /// When the patch changes stock without an explicit availability flag,
    /// the flag is re-derived from the new stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn patch(&self, id: ProductId, patch: &ProductPatch) -> Result<Product, RepositoryError> {
        let current = self.get(id).await?.ok_or(RepositoryError::NotFound)?;

        let name = patch.name.clone().unwrap_or(current.name);
        let stock = patch.stock.unwrap_or(current.stock);
        let is_available = match (patch.is_available, patch.stock) {
            (Some(flag), _) => flag,
            (None, Some(new_stock)) => new_stock > 0,
            (None, None) => current.is_available,
        };

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET name = ?1, stock = ?2, is_available = ?3 WHERE id = ?4 \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(&name)
        .bind(stock)
        .bind(is_available)
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Cart lines referencing it cascade.
    ///
    /// # Returns
    ///
    /// `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Atomically decrement stock by `amount` (must be positive).
    ///
    /// This is a single conditional UPDATE: it only applies when the product
    /// holds at least `amount` units, so two concurrent checkouts cannot
    /// both succeed past available stock. The availability flag is
    /// recomputed from the resulting stock as a side effect.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn decrement_stock(
        &self,
        id: ProductId,
        amount: i64,
    ) -> Result<StockDecrement, RepositoryError> {
        debug_assert!(amount > 0, "decrement amount must be positive");

        let row = sqlx::query_as::<_, (i64, bool)>(
            "UPDATE products \
             SET stock = stock - ?1, \
                 is_available = CASE WHEN stock - ?1 > 0 THEN 1 ELSE 0 END \
             WHERE id = ?2 AND stock >= ?1 \
             RETURNING stock, is_available",
        )
        .bind(amount)
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some((stock, is_available)) => Ok(StockDecrement::Applied {
                stock,
                is_available,
            }),
            // Nothing matched: distinguish "not enough stock" from "no row".
            None => {
                if self.get(id).await?.is_some() {
                    Ok(StockDecrement::Insufficient)
                } else {
                    Ok(StockDecrement::NotFound)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MIGRATOR;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        MIGRATOR.run(&pool).await.expect("migrations");
        pool
    }

    async fn seed_product(pool: &SqlitePool, stock: i64) -> Product {
        ProductRepository::new(pool)
            .create(&NewProduct::parse("Table", stock, None).expect("valid"))
            .await
            .expect("create product")
    }

    #[tokio::test]
    async fn test_decrement_applies_and_derives_availability() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);
        let product = seed_product(&pool, 10).await;

        let outcome = repo.decrement_stock(product.id, 4).await.expect("decrement");
        assert_eq!(
            outcome,
            StockDecrement::Applied {
                stock: 6,
                is_available: true
            }
        );

        let outcome = repo.decrement_stock(product.id, 6).await.expect("decrement");
        assert_eq!(
            outcome,
            StockDecrement::Applied {
                stock: 0,
                is_available: false
            }
        );
    }

    #[tokio::test]
    async fn test_decrement_insufficient_leaves_state_unchanged() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);
        let product = seed_product(&pool, 3).await;

        let outcome = repo.decrement_stock(product.id, 4).await.expect("decrement");
        assert_eq!(outcome, StockDecrement::Insufficient);

        let after = repo.get(product.id).await.expect("get").expect("present");
        assert_eq!(after.stock, 3);
        assert!(after.is_available);
    }

    #[tokio::test]
    async fn test_decrement_missing_product() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);

        let outcome = repo
            .decrement_stock(ProductId::new(999), 1)
            .await
            .expect("decrement");
        assert_eq!(outcome, StockDecrement::NotFound);
    }

    #[tokio::test]
    async fn test_patch_rederives_availability_from_stock() {
        let pool = test_pool().await;
        let repo = ProductRepository::new(&pool);
        let product = seed_product(&pool, 5).await;

        let patch = ProductPatch::parse(None, Some(0), None).expect("valid");
        let updated = repo.patch(product.id, &patch).await.expect("patch");
        assert_eq!(updated.stock, 0);
        assert!(!updated.is_available);

        // Explicit flag wins over the derived value.
        let patch = ProductPatch::parse(None, None, Some(true)).expect("valid");
        let updated = repo.patch(product.id, &patch).await.expect("patch");
        assert_eq!(updated.stock, 0);
        assert!(updated.is_available);
    }
}
