//! Product domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use minimart_core::ProductId;

/// Maximum length of a product name.
pub const MAX_NAME_LENGTH: usize = 150;

/// A catalog product with tracked stock.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID (server-assigned).
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Units in stock; never negative.
    pub stock: i64,
    /// Availability flag. Derived from stock on stock writes unless
    /// explicitly overridden by an administrative update.
    pub is_available: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

/// Errors produced when validating product input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProductValidationError {
    #[error("product name cannot be empty")]
    EmptyName,
    #[error("product name must be at most {MAX_NAME_LENGTH} characters")]
    NameTooLong,
    #[error("stock cannot be negative")]
    NegativeStock,
}

/// A validated new product (also used for full replacement via PUT).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub stock: i64,
    /// `None` means "derive from stock" (`stock > 0`).
    pub is_available: Option<bool>,
}

impl NewProduct {
    /// Validate raw input into a `NewProduct`.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductValidationError`] for an empty or oversized name,
    /// or negative stock.
    pub fn parse(
        name: &str,
        stock: i64,
        is_available: Option<bool>,
    ) -> Result<Self, ProductValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProductValidationError::EmptyName);
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(ProductValidationError::NameTooLong);
        }
        if stock < 0 {
            return Err(ProductValidationError::NegativeStock);
        }

        Ok(Self {
            name: name.to_owned(),
            stock,
            is_available,
        })
    }

    /// The availability flag to store: the explicit override if given,
    /// otherwise derived from stock.
    #[must_use]
    pub fn resolved_availability(&self) -> bool {
        self.is_available.unwrap_or(self.stock > 0)
    }
}

/// A validated partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub stock: Option<i64>,
    pub is_available: Option<bool>,
}

impl ProductPatch {
    /// Validate raw optional input into a `ProductPatch`.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductValidationError`] if any supplied field is invalid.
    pub fn parse(
        name: Option<&str>,
        stock: Option<i64>,
        is_available: Option<bool>,
    ) -> Result<Self, ProductValidationError> {
        let name = match name {
            Some(n) => {
                let n = n.trim();
                if n.is_empty() {
                    return Err(ProductValidationError::EmptyName);
                }
                if n.len() > MAX_NAME_LENGTH {
                    return Err(ProductValidationError::NameTooLong);
                }
                Some(n.to_owned())
            }
            None => None,
        };
        if let Some(stock) = stock
            && stock < 0
        {
            return Err(ProductValidationError::NegativeStock);
        }

        Ok(Self {
            name,
            stock,
            is_available,
        })
    }

    /// Whether the patch changes anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.stock.is_none() && self.is_available.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_product() {
        let product = NewProduct::parse("Table", 10, None).expect("valid");
        assert_eq!(product.name, "Table");
        assert!(product.resolved_availability());
    }

    #[test]
    fn test_availability_derived_from_stock() {
        assert!(!NewProduct::parse("Table", 0, None)
            .expect("valid")
            .resolved_availability());
        assert!(NewProduct::parse("Table", 1, None)
            .expect("valid")
            .resolved_availability());
    }

    #[test]
    fn test_explicit_availability_wins() {
        let product = NewProduct::parse("Table", 10, Some(false)).expect("valid");
        assert!(!product.resolved_availability());
    }

    #[test]
    fn test_parse_rejects_bad_fields() {
        assert!(matches!(
            NewProduct::parse("   ", 1, None),
            Err(ProductValidationError::EmptyName)
        ));
        assert!(matches!(
            NewProduct::parse(&"x".repeat(151), 1, None),
            Err(ProductValidationError::NameTooLong)
        ));
        assert!(matches!(
            NewProduct::parse("Table", -1, None),
            Err(ProductValidationError::NegativeStock)
        ));
    }
}
