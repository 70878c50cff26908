// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API input validation tests.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{create_test_app, create_user_with_token, json_body, send};

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let (app, _) = create_test_app().await;

    let cases = [
        json!({"username": "", "email": "a@example.com", "password": "pw"}),
        json!({"username": "a".repeat(51), "email": "a@example.com", "password": "pw"}),
        json!({"username": "alice", "email": "not-an-email", "password": "pw"}),
        json!({"username": "alice", "email": "a@example.com", "password": ""}),
        json!({"username": "alice", "email": "a@example.com"}),
    ];

    for body in cases {
        let response = send(&app, "POST", "/users", None, Some(body.clone())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert!(json_body(response).await["error"].is_string());
    }
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let (app, state) = create_test_app().await;
    create_user_with_token(&state, "alice").await;

    let response = send(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({"username": "alice", "email": "new@example.com", "password": "pw"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_workout_rejects_bad_entries() {
    let (app, state) = create_test_app().await;
    let (_, token) = create_user_with_token(&state, "alice").await;

    let bad_entries = [
        json!({"exercise_name": "", "sets": 3, "reps": 10, "order_index": 1}),
        json!({"exercise_name": "Squat", "sets": 0, "reps": 10, "order_index": 1}),
        json!({"exercise_name": "Plank", "sets": 3, "reps": 10, "duration_seconds": 60, "order_index": 1}),
        json!({"exercise_name": "Plank", "sets": 3, "order_index": 1}),
    ];

    for entry in bad_entries {
        let response = send(
            &app,
            "POST",
            "/workouts",
            Some(&token),
            Some(json!({
                "title": "Full body",
                "description": "",
                "duration_minutes": 90,
                "calories_burned": 500,
                "entries": [entry]
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "entry: {entry}");
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workouts")
        .fetch_one(state.db.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_malformed_json_body() {
    let (app, state) = create_test_app().await;
    let (_, token) = create_user_with_token(&state, "alice").await;

    let response = send(
        &app,
        "POST",
        "/workouts",
        Some(&token),
        Some(json!({"title": "No numbers"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn test_non_numeric_workout_id() {
    let (app, state) = create_test_app().await;
    let (_, token) = create_user_with_token(&state, "alice").await;

    let response = send(&app, "GET", "/workouts/abc", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "invalid id parameter");
}
