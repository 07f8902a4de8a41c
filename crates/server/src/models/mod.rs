//! Domain types.
//!
//! These are validated domain objects, separate from the database row types
//! kept inside the repository modules and from the request payloads kept
//! with the route handlers.

pub mod cart;
pub mod product;
pub mod user;

pub use cart::CartLine;
pub use product::{NewProduct, Product, ProductPatch, ProductValidationError};
pub use user::{NewUser, User, UserPatch, UserValidationError};
