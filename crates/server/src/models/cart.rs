//! Cart domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use minimart_core::{CartLineId, ProductId, UserId};

/// A line in a user's cart.
///
/// `product_name` is a snapshot taken when the line was first inserted; a
/// later product rename does not propagate here.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    /// Unique line ID (server-assigned).
    pub id: CartLineId,
    /// Owning user.
    pub user_id: UserId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Product name at the time the line was created.
    pub product_name: String,
    /// Reserved quantity; always positive.
    pub quantity: i64,
    /// When the line was first created.
    pub created_at: DateTime<Utc>,
}
