// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Opaque bearer token generation and hashing.
//!
//! Tokens are 32 bytes from the OS CSPRNG, encoded as unpadded URL-safe
//! base64. Storage only ever sees the SHA-256 digest of the encoded string.

use crate::models::{Token, TokenScope, UserId};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use std::time::Duration;

const TOKEN_BYTES: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("secure random source unavailable")]
    RandomUnavailable,

    #[error("token lifetime out of range")]
    InvalidTtl,
}

/// Signed token lifetime. Negative values issue an already-expired token,
/// which is only useful in tests.
#[derive(Debug, Clone, Copy)]
pub enum Ttl {
    Future(Duration),
    Past(Duration),
}

impl From<Duration> for Ttl {
    fn from(duration: Duration) -> Self {
        Ttl::Future(duration)
    }
}

/// Generate a new token for `user_id`, expiring `ttl` from now.
pub fn generate_token(
    user_id: UserId,
    ttl: impl Into<Ttl>,
    scope: TokenScope,
) -> Result<Token, TokenError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| TokenError::RandomUnavailable)?;
    let plaintext = URL_SAFE_NO_PAD.encode(bytes);

    let now = Utc::now();
    let expiry = match ttl.into() {
        Ttl::Future(d) => chrono::Duration::from_std(d)
            .ok()
            .and_then(|d| now.checked_add_signed(d)),
        Ttl::Past(d) => chrono::Duration::from_std(d)
            .ok()
            .and_then(|d| now.checked_sub_signed(d)),
    }
    .ok_or(TokenError::InvalidTtl)?;

    Ok(Token {
        hash: hash_token(&plaintext),
        plaintext,
        user_id,
        expiry,
        scope,
    })
}

/// SHA-256 digest of a token's plaintext.
pub fn hash_token(plaintext: &str) -> Vec<u8> {
    Sha256::digest(plaintext.as_bytes()).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_shape() {
        let token = generate_token(7, Duration::from_secs(3600), TokenScope::Authentication).unwrap();

        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(token.plaintext.len(), 43);
        assert_eq!(token.hash.len(), 32);
        assert_eq!(token.hash, hash_token(&token.plaintext));
        assert_eq!(token.user_id, 7);
        assert_eq!(token.scope, TokenScope::Authentication);
        assert!(token.expiry > Utc::now());
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_token(1, Duration::from_secs(60), TokenScope::Authentication).unwrap();
        let b = generate_token(1, Duration::from_secs(60), TokenScope::Authentication).unwrap();
        assert_ne!(a.plaintext, b.plaintext);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_past_ttl_is_already_expired() {
        let token = generate_token(
            1,
            Ttl::Past(Duration::from_secs(1)),
            TokenScope::Authentication,
        )
        .unwrap();
        assert!(token.expiry < Utc::now());
    }

    #[test]
    fn test_serialized_token_hides_hash() {
        let token = generate_token(1, Duration::from_secs(60), TokenScope::Authentication).unwrap();
        let json = serde_json::to_value(&token).unwrap();

        assert_eq!(json["token"], token.plaintext);
        assert!(json.get("expiry").is_some());
        assert!(json.get("hash").is_none());
        assert!(json.get("user_id").is_none());
        assert!(!format!("{:?}", token).contains(&token.plaintext));
    }
}
