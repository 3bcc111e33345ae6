//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use blogicum_infra::{DatabaseConfig, JwtConfig};

/// Number of posts per page on each listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub index: u64,
    pub category: u64,
    pub profile: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            index: 10,
            category: 5,
            profile: 10,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub pagination: PaginationConfig,
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 100),
            min_connections: parse_var("DB_MIN_CONNECTIONS", 10),
            connect_timeout: Duration::from_secs(parse_var("DB_CONNECT_TIMEOUT_SECS", 10)),
        });

        let defaults = PaginationConfig::default();
        let pagination = PaginationConfig {
            index: parse_var("INDEX_PAGE_SIZE", defaults.index).max(1),
            category: parse_var("CATEGORY_PAGE_SIZE", defaults.category).max(1),
            profile: parse_var("PROFILE_PAGE_SIZE", defaults.profile).max(1),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            database,
            jwt: JwtConfig::from_env(),
            pagination,
        }
    }
}
