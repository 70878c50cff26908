// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration, loaded once at startup and passed to every component.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL
    pub database_url: String,
    /// Upper bound on pooled database connections
    pub db_max_connections: u32,
    /// Server port
    pub port: u16,
    /// Lifetime of tokens issued by `POST /tokens/authentication`
    pub auth_token_ttl: Duration,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    /// Deadline for a single HTTP request
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables, reading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://zenith.db".to_string()),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 10)?,
            port: parse_var("PORT", 8080)?,
            auth_token_ttl: token_ttl()?,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 30)?),
        })
    }

    /// Config for tests: in-memory database and the cheapest bcrypt cost.
    pub fn test_default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            port: 8080,
            auth_token_ttl: Duration::from_secs(24 * 3600),
            bcrypt_cost: 4,
            request_timeout: Duration::from_secs(30),
        }
    }
}

fn token_ttl() -> Result<Duration, ConfigError> {
    const NAME: &str = "AUTH_TOKEN_TTL_HOURS";
    let hours: u64 = parse_var(NAME, 24)?;
    hours
        .checked_mul(3600)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::Invalid {
            name: NAME,
            value: hours.to_string(),
        })
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("DATABASE_URL", "sqlite://test.db");
        env::set_var("PORT", "9090");
        env::set_var("AUTH_TOKEN_TTL_HOURS", "2");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.database_url, "sqlite://test.db");
        assert_eq!(config.port, 9090);
        assert_eq!(config.auth_token_ttl, Duration::from_secs(7200));
        assert_eq!(config.db_max_connections, 10);

        env::set_var("PORT", "not-a-port");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
        env::set_var("PORT", "9090");

        env::set_var("AUTH_TOKEN_TTL_HOURS", u64::MAX.to_string());
        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "AUTH_TOKEN_TTL_HOURS",
                ..
            }
        ));

        env::remove_var("PORT");
        env::remove_var("DATABASE_URL");
        env::remove_var("AUTH_TOKEN_TTL_HOURS");
    }
}
