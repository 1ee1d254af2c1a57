use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {shop} (retry after {retry_after_secs}s)")]
    RateLimited { shop: String, retry_after_secs: u64 },

    #[error("query cost throttled by {shop}")]
    Throttled { shop: String },

    #[error("access token rejected by {shop} (HTTP {status})")]
    Unauthorized { shop: String, status: u16 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("GraphQL error from {shop}: {message}")]
    GraphQl { shop: String, message: String },

    #[error("invalid shop \"{shop}\": {reason}")]
    InvalidShop { shop: String, reason: String },
}
