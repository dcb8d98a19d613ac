use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub session_ttl_days: i64,
    pub db_pool_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            bind_addr: "0.0.0.0:3000".to_string(),
            session_ttl_days: 30,
            db_pool_size: 10,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            session_ttl_days: try_load("SESSION_TTL_DAYS", defaults.session_ttl_days),
            db_pool_size: try_load("DB_POOL_SIZE", defaults.db_pool_size),
        })
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => parse_or(key, &raw, default),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

fn parse_or<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}; using default: {default}");
        default
    })
}
