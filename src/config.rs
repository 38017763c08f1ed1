// src/config.rs

use std::env;
use std::time::Duration;

use dotenvy::dotenv;

/// Default TTL for cached question pools (1 hour).
const DEFAULT_POOL_CACHE_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    /// How long a generated question pool stays valid in the cache.
    pub pool_cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let pool_cache_ttl = env::var("POOL_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_POOL_CACHE_TTL_SECS));

        Self {
            database_url,
            rust_log,
            pool_cache_ttl,
        }
    }
}
