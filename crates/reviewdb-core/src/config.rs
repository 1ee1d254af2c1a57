use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::reviews::InvalidRatingPolicy;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be driven by a plain
/// `HashMap` in tests.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<std::net::SocketAddr, ConfigError> {
        parse_var(var, &or_default(var, default))
    };
    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        parse_var(var, &or_default(var, default))
    };
    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_var(var, &or_default(var, default))
    };
    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        parse_var(var, &or_default(var, default))
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("REVIEWDB_ENV", "development"))?;
    let bind_addr = parse("REVIEWDB_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("REVIEWDB_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("REVIEWDB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("REVIEWDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("REVIEWDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let import_max_bytes = parse_usize("REVIEWDB_IMPORT_MAX_BYTES", "5000000")?;
    let import_batch_size = parse_usize("REVIEWDB_IMPORT_BATCH_SIZE", "50")?;
    if import_batch_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "REVIEWDB_IMPORT_BATCH_SIZE".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let import_on_invalid_rating = parse_var::<InvalidRatingPolicy>(
        "REVIEWDB_IMPORT_ON_INVALID_RATING",
        &or_default("REVIEWDB_IMPORT_ON_INVALID_RATING", "default"),
    )?;

    let resolver_max_handles = parse_usize("REVIEWDB_RESOLVER_MAX_HANDLES", "50")?;
    let resolver_max_titles = parse_usize("REVIEWDB_RESOLVER_MAX_TITLES", "20")?;

    let shopify_access_token = lookup("SHOPIFY_ACCESS_TOKEN")
        .ok()
        .filter(|token| !token.trim().is_empty());
    let shopify_api_version = or_default("SHOPIFY_API_VERSION", "2024-10");
    let catalog_request_timeout_secs = parse_u64("REVIEWDB_CATALOG_REQUEST_TIMEOUT_SECS", "30")?;
    let catalog_max_retries = parse_u32("REVIEWDB_CATALOG_MAX_RETRIES", "3")?;
    let catalog_retry_backoff_base_secs =
        parse_u64("REVIEWDB_CATALOG_RETRY_BACKOFF_BASE_SECS", "2")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        import_max_bytes,
        import_batch_size,
        import_on_invalid_rating,
        resolver_max_handles,
        resolver_max_titles,
        shopify_access_token,
        shopify_api_version,
        catalog_request_timeout_secs,
        catalog_max_retries,
        catalog_retry_backoff_base_secs,
    })
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REVIEWDB_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
