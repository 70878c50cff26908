// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod password;
pub mod tokens;

pub use password::PasswordHash;
pub use tokens::{generate_token, hash_token, TokenError, Ttl};
