//! Product CRUD handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use minimart_core::ProductId;

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::models::{NewProduct, Product, ProductPatch};
use crate::state::AppState;

/// Request body for creating or replacing a product.
#[derive(Debug, Deserialize)]
pub struct ProductBody {
    pub name: String,
    pub stock: i64,
    /// Omit to derive availability from stock.
    pub is_available: Option<bool>,
}

impl ProductBody {
    fn parse(&self) -> Result<NewProduct, AppError> {
        NewProduct::parse(&self.name, self.stock, self.is_available)
            .map_err(|e| AppError::Validation(e.to_string()))
    }
}

/// Request body for partially updating a product.
#[derive(Debug, Deserialize)]
pub struct ProductPatchBody {
    pub name: Option<String>,
    pub stock: Option<i64>,
    pub is_available: Option<bool>,
}

impl ProductPatchBody {
    fn parse(&self) -> Result<ProductPatch, AppError> {
        ProductPatch::parse(self.name.as_deref(), self.stock, self.is_available)
            .map_err(|e| AppError::Validation(e.to_string()))
    }
}

/// `GET /products`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// `GET /products/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;
    Ok(Json(product))
}

/// `POST /products`
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<ProductBody>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let new_product = body.parse()?;
    let product = ProductRepository::new(state.pool())
        .create(&new_product)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /products/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ProductBody>,
) -> Result<Json<Product>, AppError> {
    let new_product = body.parse()?;
    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &new_product)
        .await?;
    Ok(Json(product))
}

/// `PATCH /products/{id}`
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ProductPatchBody>,
) -> Result<Json<Product>, AppError> {
    let patch = body.parse()?;
    let product = ProductRepository::new(state.pool())
        .patch(ProductId::new(id), &patch)
        .await?;
    Ok(Json(product))
}

/// `DELETE /products/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("product not found".to_owned()))
    }
}
