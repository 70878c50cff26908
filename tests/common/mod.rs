// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use zenith_tracker::config::Config;
use zenith_tracker::db::Db;
use zenith_tracker::models::user::NewUser;
use zenith_tracker::models::{TokenScope, UserId};
use zenith_tracker::routes::create_router;
use zenith_tracker::services::PasswordHash;
use zenith_tracker::AppState;

/// Create a test app backed by a fresh in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = Db::in_memory()
        .await
        .expect("Failed to create in-memory database");

    let state = Arc::new(AppState { config, db });
    (create_router(state.clone()), state)
}

/// Insert a user directly and issue them a one-hour authentication token.
#[allow(dead_code)]
pub async fn create_user_with_token(state: &AppState, username: &str) -> (UserId, String) {
    let user = state
        .db
        .create_user(&NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            bio: String::new(),
            password_hash: PasswordHash::new("password123", 4).unwrap(),
        })
        .await
        .unwrap();

    let token = state
        .db
        .create_new_token(user.id, Duration::from_secs(3600), TokenScope::Authentication)
        .await
        .unwrap();

    (user.id, token.plaintext)
}

/// Send one request through the router.
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
