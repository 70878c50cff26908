// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication token issuance and revocation.

use crate::error::{AppError, Result};
use crate::middleware::{require_user, AuthUser};
use crate::models::TokenScope;
use crate::routes::envelope::{AuthTokenEnvelope, MessageEnvelope};
use crate::services::PasswordHash;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    handler::Handler,
    http::StatusCode,
    middleware,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/tokens/authentication",
        post(create_authentication_token).delete(
            revoke_authentication_tokens.layer(middleware::from_fn(require_user)),
        ),
    )
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTokenRequest {
    #[validate(length(min = 1, message = "username cannot be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "password cannot be empty"))]
    pub password: String,
}

/// Exchange a username and password for an authentication token.
async fn create_authentication_token(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CreateTokenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthTokenEnvelope>)> {
    let Json(request) = payload?;
    request.validate()?;

    let user = state
        .db
        .get_user_by_username(&request.username)
        .await
        .inspect_err(|err| {
            tracing::error!(operation = "get_user_by_username", error = %err, "User lookup failure");
        })?;

    let stored = user.as_ref().map(|user| user.password_hash.clone());
    let password = request.password;
    let cost = state.config.bcrypt_cost;
    let matches =
        tokio::task::spawn_blocking(move || check_password(stored.as_ref(), &password, cost))
            .await
            .map_err(anyhow::Error::from)?
            .map_err(anyhow::Error::from)?;

    let user = match user {
        Some(user) if matches => user,
        Some(user) => {
            tracing::info!(user_id = user.id, "Login attempt with wrong password");
            return Err(AppError::InvalidCredentials);
        }
        None => {
            tracing::info!(username = %request.username, "Login attempt for unknown user");
            return Err(AppError::InvalidCredentials);
        }
    };

    let token = state
        .db
        .create_new_token(user.id, state.config.auth_token_ttl, TokenScope::Authentication)
        .await
        .inspect_err(|err| {
            tracing::error!(operation = "create_new_token", user_id = user.id, error = %err, "Token storage failure");
        })?;

    Ok((
        StatusCode::CREATED,
        Json(AuthTokenEnvelope { auth_token: token }),
    ))
}

/// Verify `candidate` against the stored hash. An unknown user still pays for
/// one bcrypt round at `cost` and never matches.
fn check_password(
    stored: Option<&PasswordHash>,
    candidate: &str,
    cost: u32,
) -> std::result::Result<bool, bcrypt::BcryptError> {
    match stored {
        Some(hash) => hash.matches(candidate),
        None => PasswordHash::new(candidate, cost).map(|_| false),
    }
}

/// Log out everywhere: revoke every authentication token of the caller.
async fn revoke_authentication_tokens(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<MessageEnvelope>> {
    state
        .db
        .delete_all_tokens_for_user(user.id, TokenScope::Authentication)
        .await
        .inspect_err(|err| {
            tracing::error!(operation = "delete_all_tokens_for_user", user_id = user.id, error = %err, "Token storage failure");
        })?;

    Ok(Json(MessageEnvelope {
        message: "all authentication tokens revoked".to_string(),
    }))
}
