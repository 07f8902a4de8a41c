//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the database)
//!
//! # Users
//! GET    /users                - List users
//! POST   /users                - Create user
//! GET    /users/{id}           - Get user
//! PUT    /users/{id}           - Replace user
//! PATCH  /users/{id}           - Partially update user
//! DELETE /users/{id}           - Delete user (cart lines cascade)
//!
//! # Products
//! GET    /products             - List products
//! POST   /products             - Create product
//! GET    /products/{id}        - Get product
//! PUT    /products/{id}        - Replace product
//! PATCH  /products/{id}        - Partially update product
//! DELETE /products/{id}        - Delete product
//!
//! # Carts
//! GET    /carts/{userId}       - List the user's cart lines
//! POST   /carts/{userId}       - Checkout: reserve stock, add a line
//! PUT    /carts/{userId}       - Checkout (same effect)
//! DELETE /carts/{userId}       - Clear the user's cart
//! DELETE /carts/lines/{lineId} - Remove a single cart line
//! ```

pub mod carts;
pub mod products;
pub mod users;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route(
            "/{id}",
            get(users::get)
                .put(users::update)
                .patch(users::patch)
                .delete(users::delete),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::get)
                .put(products::update)
                .patch(products::patch)
                .delete(products::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{user_id}",
            get(carts::list)
                .post(carts::checkout)
                .put(carts::checkout)
                .delete(carts::clear),
        )
        .route("/lines/{line_id}", axum::routing::delete(carts::delete_line))
}

/// Liveness check.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness check: confirms the database answers.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(state.pool())
        .await
    {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
            tracing::error!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
