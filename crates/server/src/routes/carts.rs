//! Cart handlers: listing, checkout, and removal.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use minimart_core::{CartLineId, ProductId, UserId};

use crate::db::{CartRepository, UserRepository};
use crate::error::AppError;
use crate::models::CartLine;
use crate::services::CheckoutService;
use crate::state::AppState;

/// Request body for checkout; the user comes from the path.
#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub product_id: i64,
    pub quantity: i64,
}

/// `GET /carts/{userId}`
///
/// An empty cart is `200 []`; only a missing user is a 404.
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<CartLine>>, AppError> {
    let user_id = UserId::new(user_id);
    ensure_user_exists(&state, user_id).await?;

    let lines = CartRepository::new(state.pool())
        .lines_for_user(user_id)
        .await?;
    Ok(Json(lines))
}

/// `POST /carts/{userId}` and `PUT /carts/{userId}`
pub async fn checkout(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(body): Json<CheckoutBody>,
) -> Result<Json<CartLine>, AppError> {
    let line = CheckoutService::new(state.pool())
        .add_to_cart(
            UserId::new(user_id),
            ProductId::new(body.product_id),
            body.quantity,
        )
        .await?;
    Ok(Json(line))
}

/// `DELETE /carts/{userId}`
///
/// Clearing an already-empty cart still succeeds.
pub async fn clear(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let user_id = UserId::new(user_id);
    ensure_user_exists(&state, user_id).await?;

    CartRepository::new(state.pool())
        .clear_for_user(user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /carts/lines/{lineId}`
pub async fn delete_line(
    State(state): State<AppState>,
    Path(line_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = CartRepository::new(state.pool())
        .delete_line(CartLineId::new(line_id))
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("cart line not found".to_owned()))
    }
}

async fn ensure_user_exists(state: &AppState, user_id: UserId) -> Result<(), AppError> {
    if UserRepository::new(state.pool()).exists(user_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("user not found".to_owned()))
    }
}
