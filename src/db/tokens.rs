// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token persistence and validation.
//!
//! Rows hold only the SHA-256 digest of a token. A presented token is hashed
//! and matched on the full digest, never on a prefix of the plaintext.

use super::users::{user_from_row, USER_COLUMNS};
use super::{Db, StoreError};
use crate::models::{Token, TokenScope, User, UserId};
use crate::services::{generate_token, hash_token, Ttl};
use chrono::Utc;

impl Db {
    /// Persist a token's digest, owner, expiry and scope.
    pub async fn insert_token(&self, token: &Token) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO tokens (hash, user_id, expiry, scope) VALUES (?, ?, ?, ?)")
            .bind(&token.hash)
            .bind(token.user_id)
            .bind(token.expiry.timestamp())
            .bind(token.scope.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Generate and persist a token in one step.
    ///
    /// If the insert fails the generated plaintext is dropped with the error.
    pub async fn create_new_token(
        &self,
        user_id: UserId,
        ttl: impl Into<Ttl>,
        scope: TokenScope,
    ) -> Result<Token, StoreError> {
        let token = generate_token(user_id, ttl, scope)?;
        self.insert_token(&token).await?;

        tracing::info!(user_id, scope = %scope, expiry = %token.expiry, "Token issued");
        Ok(token)
    }

    /// Revoke every token of `scope` held by `user_id`. Revoking nothing is not an error.
    pub async fn delete_all_tokens_for_user(
        &self,
        user_id: UserId,
        scope: TokenScope,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM tokens WHERE user_id = ? AND scope = ?")
            .bind(user_id)
            .bind(scope.as_str())
            .execute(&self.pool)
            .await?;

        tracing::info!(
            user_id,
            scope = %scope,
            revoked = result.rows_affected(),
            "Tokens revoked"
        );
        Ok(result.rows_affected())
    }

    /// Resolve a presented token to its user.
    ///
    /// `Ok(None)` covers unknown, expired and wrong-scope tokens alike.
    pub async fn get_user_for_token(
        &self,
        scope: TokenScope,
        plaintext: &str,
    ) -> Result<Option<User>, StoreError> {
        let hash = hash_token(plaintext);

        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}
             FROM users
             INNER JOIN tokens ON tokens.user_id = users.id
             WHERE tokens.hash = ? AND tokens.scope = ? AND tokens.expiry > ?"
        ))
        .bind(hash)
        .bind(scope.as_str())
        .bind(Utc::now().timestamp())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }
}
