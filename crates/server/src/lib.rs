//! Minimart server library.
//!
//! This crate provides the store API as a library, allowing it to be
//! tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
#[must_use]
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/health/ready", get(routes::readiness))
        .nest("/users", routes::user_routes())
        .nest("/products", routes::product_routes())
        .nest("/carts", routes::cart_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
