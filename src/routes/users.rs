// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User registration.

use crate::db::StoreError;
use crate::error::{AppError, Result};
use crate::models::user::NewUser;
use crate::routes::envelope::UserEnvelope;
use crate::services::PasswordHash;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/users", post(register_user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 50, message = "username must be 1 to 50 characters"))]
    pub username: String,
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "password cannot be empty"))]
    pub password: String,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Register a new user.
async fn register_user(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserEnvelope>)> {
    let Json(request) = payload?;
    request.validate()?;

    // bcrypt blocks; run it off the async workers.
    let cost = state.config.bcrypt_cost;
    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || PasswordHash::new(&password, cost))
        .await
        .map_err(anyhow::Error::from)?
        .map_err(anyhow::Error::from)?;

    let new_user = NewUser {
        username: request.username,
        email: request.email,
        bio: request.bio.unwrap_or_default(),
        password_hash,
    };

    let user = state.db.create_user(&new_user).await.map_err(|err| match err {
        StoreError::Conflict(_) => {
            AppError::BadRequest("a user with that username or email already exists".to_string())
        }
        other => {
            tracing::error!(operation = "create_user", username = %new_user.username, error = %other, "User storage failure");
            other.into()
        }
    })?;

    Ok((StatusCode::CREATED, Json(UserEnvelope { user })))
}
