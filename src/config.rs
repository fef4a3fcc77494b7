//! Runtime settings read from the environment (and `.env`, when the binary loads it).

use crate::error::ConfigError;
use crate::model::DEFAULT_IMAGE;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/cupcakes";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub default_image: String,
    /// Largest accepted request body, in bytes.
    pub body_limit: usize,
}

impl AppConfig {
    /// `DATABASE_URL`, `BIND_ADDR`, `DB_MAX_CONNECTIONS`, `CUPCAKE_DEFAULT_IMAGE`, `BODY_LIMIT_BYTES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Ok(AppConfig {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            bind_addr: parse(
                "BIND_ADDR",
                get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            )?,
            max_connections: match get("DB_MAX_CONNECTIONS") {
                Some(v) => parse("DB_MAX_CONNECTIONS", v)?,
                None => DEFAULT_MAX_CONNECTIONS,
            },
            default_image: get("CUPCAKE_DEFAULT_IMAGE").unwrap_or_else(|| DEFAULT_IMAGE.into()),
            body_limit: match get("BODY_LIMIT_BYTES") {
                Some(v) => parse("BODY_LIMIT_BYTES", v)?,
                None => DEFAULT_BODY_LIMIT,
            },
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: DEFAULT_DATABASE_URL.into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            default_image: DEFAULT_IMAGE.into(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
