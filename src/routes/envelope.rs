// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Single-key JSON response envelopes.
//!
//! Each success payload gets its own wrapper type so the key name is fixed at
//! compile time. Errors use [`crate::error::ErrorEnvelope`].

use crate::models::{Token, User, Workout};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct WorkoutEnvelope {
    pub workout: Workout,
}

#[derive(Debug, Serialize)]
pub struct AuthTokenEnvelope {
    #[serde(rename = "authToken")]
    pub auth_token: Token,
}

#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub message: String,
}
