pub mod app_config;
pub mod catalog;
pub mod config;
pub mod reviews;
pub mod sink;

pub use app_config::{AppConfig, Environment};
pub use catalog::{
    ProductLookups, ProductResolver, ResolvedProducts, ResolverError, UnresolvedCatalog,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use reviews::{
    InvalidRatingPolicy, MediaAttachment, MediaKind, NormalizedReview, ProductReference,
    SentimentBucket,
};
pub use sink::{CommitSummary, ReviewSink, SinkError, WritePlan};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
