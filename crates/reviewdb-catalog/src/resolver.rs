//! Resolver selection from configuration.

use reviewdb_core::{
    AppConfig, ProductLookups, ProductResolver, ResolvedProducts, ResolverError, UnresolvedCatalog,
};

use crate::client::ShopifyAdminClient;
use crate::error::CatalogError;

/// The resolver an import runs against: the Admin API when a token is
/// configured, otherwise a catalog that resolves nothing.
#[derive(Debug)]
pub enum CatalogResolver {
    Shopify(ShopifyAdminClient),
    Unresolved(UnresolvedCatalog),
}

impl CatalogResolver {
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, CatalogError> {
        match ShopifyAdminClient::from_app_config(config)? {
            Some(client) => Ok(Self::Shopify(client)),
            None => {
                tracing::warn!(
                    "SHOPIFY_ACCESS_TOKEN not set; product references will not be resolved"
                );
                Ok(Self::Unresolved(UnresolvedCatalog))
            }
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Shopify(_))
    }
}

impl ProductResolver for CatalogResolver {
    async fn resolve(
        &self,
        shop: &str,
        lookups: &ProductLookups,
    ) -> Result<ResolvedProducts, ResolverError> {
        match self {
            Self::Shopify(client) => client.resolve(shop, lookups).await,
            Self::Unresolved(catalog) => catalog.resolve(shop, lookups).await,
        }
    }
}
