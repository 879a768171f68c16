use std::env;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a valid number, got '{value}'")]
    NotANumber { name: &'static str, value: String },
}

/// Everything the server needs at startup, read once and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let port = lookup("PORT").unwrap_or_else(|| "8080".to_string());
        let port = port
            .parse()
            .map_err(|_| ConfigError::NotANumber { name: "PORT", value: port })?;

        let ttl = lookup("EXPIRATION_TIME_IN_HOURS").unwrap_or_else(|| "24".to_string());
        let token_ttl_hours = ttl.parse().map_err(|_| ConfigError::NotANumber {
            name: "EXPIRATION_TIME_IN_HOURS",
            value: ttl,
        })?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            jwt_secret: required("JWT_SECRET")?,
            token_ttl_hours,
        })
    }
}
