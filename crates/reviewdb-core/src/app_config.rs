use std::net::SocketAddr;

use crate::reviews::InvalidRatingPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Upload ceiling for a single CSV import, in bytes.
    pub import_max_bytes: usize,
    /// Rows per bulk `INSERT` statement for simple reviews.
    pub import_batch_size: usize,
    pub import_on_invalid_rating: InvalidRatingPolicy,
    pub resolver_max_handles: usize,
    pub resolver_max_titles: usize,
    /// Admin API token; `None` disables catalog resolution entirely.
    pub shopify_access_token: Option<String>,
    pub shopify_api_version: String,
    pub catalog_request_timeout_secs: u64,
    pub catalog_max_retries: u32,
    pub catalog_retry_backoff_base_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("import_max_bytes", &self.import_max_bytes)
            .field("import_batch_size", &self.import_batch_size)
            .field("import_on_invalid_rating", &self.import_on_invalid_rating)
            .field("resolver_max_handles", &self.resolver_max_handles)
            .field("resolver_max_titles", &self.resolver_max_titles)
            .field(
                "shopify_access_token",
                &self.shopify_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("shopify_api_version", &self.shopify_api_version)
            .field(
                "catalog_request_timeout_secs",
                &self.catalog_request_timeout_secs,
            )
            .field("catalog_max_retries", &self.catalog_max_retries)
            .field(
                "catalog_retry_backoff_base_secs",
                &self.catalog_retry_backoff_base_secs,
            )
            .finish()
    }
}
