// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Salted password hashing (bcrypt).

/// A bcrypt hash of a user's password. The plaintext is never kept.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PasswordHash {
    hash: String,
}

impl PasswordHash {
    /// Hash `plaintext` with a fresh salt.
    pub fn new(plaintext: &str, cost: u32) -> Result<Self, bcrypt::BcryptError> {
        Ok(Self {
            hash: bcrypt::hash(plaintext, cost)?,
        })
    }

    /// Wrap a hash loaded from storage.
    pub fn from_stored(hash: String) -> Self {
        Self { hash }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Check a candidate password. A malformed stored hash is an error, not a mismatch.
    pub fn matches(&self, candidate: &str) -> Result<bool, bcrypt::BcryptError> {
        bcrypt::verify(candidate, &self.hash)
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}
