//! Checkout coordinator: reserves stock and records the cart line.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, instrument, warn};

use minimart_core::{ProductId, UserId};

use crate::db::{CartRepository, ProductRepository, RepositoryError, StockDecrement, UserRepository};
use crate::models::cart::CartLine;

/// Errors produced by a checkout attempt.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Requested quantity was zero or negative.
    #[error("quantity must be positive")]
    InvalidQuantity,

    /// The user does not exist.
    #[error("user not found")]
    UserNotFound,

    /// The product does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// The product is flagged unavailable.
    #[error("product is not available")]
    ProductUnavailable,

    /// The product exists but has less stock than requested.
    #[error("insufficient stock")]
    InsufficientStock,

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Coordinates the checkout sequence across the user, product, and cart
/// repositories.
pub struct CheckoutService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Reserve `quantity` units of a product for a user's cart.
    ///
    /// Sequence: validate the quantity, confirm the user exists, load the
    /// product and check its availability flag, then atomically decrement
    /// stock and upsert the cart line. The decrement is the gate: two
    /// concurrent checkouts for the same product serialize on the
    /// conditional UPDATE, so stock never goes negative.
    ///
    /// The stock decrement and the cart line write are separate statements;
    /// a crash between them loses the reservation record but never
    /// oversells.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] describing the first failed step.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartLine, CheckoutError> {
        if quantity <= 0 {
            return Err(CheckoutError::InvalidQuantity);
        }

        let users = UserRepository::new(self.pool);
        if !users.exists(user_id).await? {
            return Err(CheckoutError::UserNotFound);
        }

        let products = ProductRepository::new(self.pool);
        let product = products
            .get(product_id)
            .await?
            .ok_or(CheckoutError::ProductNotFound)?;
        if !product.is_available {
            return Err(CheckoutError::ProductUnavailable);
        }

        match products.decrement_stock(product_id, quantity).await? {
            StockDecrement::Applied {
                stock,
                is_available,
            } => {
                info!(remaining = stock, is_available, "stock reserved");
            }
            StockDecrement::Insufficient => {
                warn!(requested = quantity, "insufficient stock");
                return Err(CheckoutError::InsufficientStock);
            }
            // Deleted between the availability check and the decrement.
            StockDecrement::NotFound => return Err(CheckoutError::ProductNotFound),
        }

        let line = CartRepository::new(self.pool)
            .upsert_line(user_id, product_id, &product.name, quantity)
            .await?;

        Ok(line)
    }
}
