//! User CRUD handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use minimart_core::UserId;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{NewUser, User, UserPatch};
use crate::state::AppState;

/// Request body for creating or replacing a user.
#[derive(Debug, Deserialize)]
pub struct UserBody {
    pub login: String,
    pub email: String,
    pub age: i64,
}

impl UserBody {
    fn parse(&self) -> Result<NewUser, AppError> {
        NewUser::parse(&self.login, &self.email, self.age)
            .map_err(|e| AppError::Validation(e.to_string()))
    }
}

/// Request body for partially updating a user.
#[derive(Debug, Deserialize)]
pub struct UserPatchBody {
    pub login: Option<String>,
    pub email: Option<String>,
    pub age: Option<i64>,
}

impl UserPatchBody {
    fn parse(&self) -> Result<UserPatch, AppError> {
        UserPatch::parse(self.login.as_deref(), self.email.as_deref(), self.age)
            .map_err(|e| AppError::Validation(e.to_string()))
    }
}

/// `GET /users`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users))
}

/// `GET /users/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    let user = UserRepository::new(state.pool())
        .get(UserId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;
    Ok(Json(user))
}

/// `POST /users`
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<UserBody>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let new_user = body.parse()?;
    let user = UserRepository::new(state.pool()).create(&new_user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `PUT /users/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UserBody>,
) -> Result<Json<User>, AppError> {
    let new_user = body.parse()?;
    let user = UserRepository::new(state.pool())
        .update(UserId::new(id), &new_user)
        .await?;
    Ok(Json(user))
}

/// `PATCH /users/{id}`
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UserPatchBody>,
) -> Result<Json<User>, AppError> {
    let patch = body.parse()?;
    let user = UserRepository::new(state.pool())
        .patch(UserId::new(id), &patch)
        .await?;
    Ok(Json(user))
}

/// `DELETE /users/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = UserRepository::new(state.pool())
        .delete(UserId::new(id))
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("user not found".to_owned()))
    }
}
