pub mod client;
pub mod error;
pub mod query;
pub mod resolver;
pub(crate) mod retry;
pub mod types;

pub use client::ShopifyAdminClient;
pub use error::CatalogError;
pub use query::{search_query, MAX_HANDLE_TERMS, MAX_TITLE_TERMS};
pub use resolver::CatalogResolver;
pub use types::{ProductNode, ProductsData};
