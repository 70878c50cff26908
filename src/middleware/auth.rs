// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token authentication middleware.
//!
//! Two gates:
//! - [`authenticate`] runs on every request and resolves the `Authorization`
//!   header to an [`Identity`] (anonymous when the header is absent), or
//!   rejects the request outright when the header is malformed or the token
//!   is not valid.
//! - [`require_user`] runs only on login-required routes and turns an
//!   anonymous identity away.
//!
//! Handlers read the identity through the [`AuthUser`] or [`Identity`]
//! extractors.

use crate::error::AppError;
use crate::models::{Identity, TokenScope, User};
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, Extensions, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// The authenticated caller on a login-required route.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// An identity was requested on a route the authentication gate never ran on.
#[derive(Debug, thiserror::Error)]
#[error("request identity not resolved: authentication middleware is not installed on this route")]
pub struct IdentityNotResolved;

impl From<IdentityNotResolved> for AppError {
    fn from(err: IdentityNotResolved) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

/// First gate: resolve the bearer token, if any, to an identity.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let resolved = resolve_identity(&state, request.headers()).await;
    let mut response = match resolved {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    };

    // Responses differ per caller; keep shared caches from mixing them up.
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("authorization"));
    response
}

/// Second gate: reject anonymous callers.
pub async fn require_user(request: Request, next: Next) -> Result<Response, AppError> {
    if resolved_identity(request.extensions())?.is_anonymous() {
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(request).await)
}

async fn resolve_identity(state: &AppState, headers: &HeaderMap) -> Result<Identity, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(Identity::Anonymous);
    };

    let token = parse_bearer(value)?;

    let user = state
        .db
        .get_user_for_token(TokenScope::Authentication, token)
        .await
        .inspect_err(|err| {
            tracing::error!(operation = "get_user_for_token", error = %err, "Token lookup failure");
        })?;

    match user {
        Some(user) => {
            tracing::debug!(user_id = user.id, "Request authenticated");
            Ok(Identity::User(user))
        }
        None => {
            tracing::debug!("Rejected unknown or expired token");
            Err(AppError::InvalidToken)
        }
    }
}

/// Extract `<token>` from a header that must be exactly `Bearer <token>`.
fn parse_bearer(value: &HeaderValue) -> Result<&str, AppError> {
    let invalid = || AppError::BadRequest("invalid authorization header".to_string());

    let raw = value.to_str().map_err(|_| invalid())?;
    let mut parts = raw.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(invalid()),
    }
}

fn resolved_identity(extensions: &Extensions) -> Result<&Identity, IdentityNotResolved> {
    extensions.get::<Identity>().ok_or(IdentityNotResolved)
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(resolved_identity(&parts.extensions)?.clone())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match resolved_identity(&parts.extensions)? {
            Identity::User(user) => Ok(AuthUser(user.clone())),
            Identity::Anonymous => Err(AppError::Unauthorized),
        }
    }
}
