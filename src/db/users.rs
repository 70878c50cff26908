// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User records and credential lookup.

use super::{Db, StoreError};
use crate::models::user::NewUser;
use crate::models::{User, UserId};
use crate::services::PasswordHash;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row};

pub(super) const USER_COLUMNS: &str =
    "users.id AS id, users.username AS username, users.email AS email, users.bio AS bio, \
     users.password_hash AS password_hash, users.created_at AS created_at, users.updated_at AS updated_at";

impl Db {
    /// Insert a new user. Duplicate username or email is a `Conflict`.
    pub async fn create_user(&self, new_user: &NewUser) -> Result<User, StoreError> {
        let now = Utc::now();

        let id: UserId = sqlx::query_scalar(
            "INSERT INTO users (username, email, bio, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.bio)
        .bind(new_user.password_hash.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = id, username = %new_user.username, "User created");

        Ok(User {
            id,
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            bio: new_user.bio.clone(),
            password_hash: new_user.password_hash.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Look up a user by username.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE users.username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }
}

pub(super) fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        bio: row.try_get("bio")?,
        password_hash: PasswordHash::from_stored(row.try_get("password_hash")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
