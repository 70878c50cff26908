//! User model for storage and API.

use crate::services::password::PasswordHash;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub type UserId = i64;

/// Registered user.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub bio: String,
    #[serde(skip)]
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to register a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub bio: String,
    pub password_hash: PasswordHash,
}

/// Who is making the current request, as resolved by the authentication gate.
#[derive(Debug, Clone)]
pub enum Identity {
    /// No `Authorization` header was sent. Owns nothing.
    Anonymous,
    /// Bearer token resolved to this user.
    User(User),
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Anonymous => None,
            Identity::User(user) => Some(user),
        }
    }
}
