//! Application configuration loaded from environment variables.

use std::env;

use chrono::TimeDelta;

use postboard_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub session: SessionConfig,
}

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl: TimeDelta,
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "postboard.sid".to_string(),
            ttl: TimeDelta::hours(24),
            secure: false,
        }
    }
}

/// Parse a session lifetime in hours. Values that do not fit a `TimeDelta` are rejected.
fn ttl_from_hours(raw: &str) -> Option<TimeDelta> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|hours| *hours > 0)
        .and_then(TimeDelta::try_hours)
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cookie_name: env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.cookie_name),
            ttl: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|h| ttl_from_hours(&h))
                .unwrap_or(defaults.ttl),
            secure: env::var("SESSION_COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.secure),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
            session: SessionConfig::from_env(),
        }
    }
}
