use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;

use reviewdb_core::{AppConfig, ProductLookups, ProductResolver, ResolvedProducts, ResolverError};

use crate::error::CatalogError;
use crate::query::{search_query, MAX_HANDLE_TERMS, MAX_TITLE_TERMS};
use crate::retry::retry_with_backoff;
use crate::types::{GraphQlRequest, GraphQlResponse, ProductNode, ProductsData, SearchVariables};

const SEARCH_PRODUCTS: &str = "query searchProducts($query: String!, $first: Int!) {
  products(first: $first, query: $query) {
    nodes { id handle title }
  }
}";

/// Nodes requested per search; the API maximum.
const SEARCH_PAGE_SIZE: u32 = 250;

/// Client for the Shopify Admin GraphQL API, used to resolve product handles
/// and titles to canonical product ids.
///
/// Transient failures (429, cost throttling, gateway errors, network errors)
/// are retried with exponential backoff up to `max_retries` extra attempts.
pub struct ShopifyAdminClient {
    client: Client,
    access_token: String,
    api_version: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl std::fmt::Debug for ShopifyAdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAdminClient")
            .field("access_token", &"[redacted]")
            .field("api_version", &self.api_version)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_secs", &self.backoff_base_secs)
            .finish_non_exhaustive()
    }
}

impl ShopifyAdminClient {
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        access_token: impl Into<String>,
        api_version: impl Into<String>,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("reviewdb/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            access_token: access_token.into(),
            api_version: api_version.into(),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Builds a client from configuration, or `None` when no access token is
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Option<Self>, CatalogError> {
        config
            .shopify_access_token
            .as_deref()
            .map(|token| {
                Self::new(
                    token,
                    config.shopify_api_version.as_str(),
                    config.catalog_request_timeout_secs,
                    config.catalog_max_retries,
                    config.catalog_retry_backoff_base_secs,
                )
            })
            .transpose()
    }

    /// GraphQL endpoint for `shop`.
    ///
    /// A bare domain (`demo.myshopify.com`) is served over HTTPS; a value that
    /// already carries a scheme is used as the origin as-is.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidShop`] for blank shops or shops
    /// containing whitespace.
    pub fn graphql_url(&self, shop: &str) -> Result<String, CatalogError> {
        let shop = shop.trim().trim_end_matches('/');
        if shop.is_empty() || shop.chars().any(char::is_whitespace) {
            return Err(CatalogError::InvalidShop {
                shop: shop.to_owned(),
                reason: "expected a shop domain such as demo.myshopify.com".to_owned(),
            });
        }
        let origin = if shop.starts_with("http://") || shop.starts_with("https://") {
            shop.to_owned()
        } else {
            format!("https://{shop}")
        };
        Ok(format!("{origin}/admin/api/{}/graphql.json", self.api_version))
    }

    /// Runs one `products(query:)` search, with retries on transient errors.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::RateLimited`] / [`CatalogError::Throttled`] after all
    ///   retries are exhausted.
    /// - [`CatalogError::Unauthorized`] on 401/403 (not retried).
    /// - [`CatalogError::UnexpectedStatus`] on other non-2xx statuses.
    /// - [`CatalogError::GraphQl`] when the response carries errors and no data.
    /// - [`CatalogError::Deserialize`] when the body does not match the
    ///   expected shape.
    pub async fn search_products(
        &self,
        shop: &str,
        query: &str,
    ) -> Result<Vec<ProductNode>, CatalogError> {
        let url = self.graphql_url(shop)?;
        let body = GraphQlRequest {
            query: SEARCH_PRODUCTS,
            variables: SearchVariables {
                query,
                first: SEARCH_PAGE_SIZE,
            },
        };

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let body = &body;
            async move {
                let response = self
                    .client
                    .post(&url)
                    .header("X-Shopify-Access-Token", &self.access_token)
                    .json(body)
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.trim().parse::<u64>().ok())
                        .unwrap_or(2);
                    return Err(CatalogError::RateLimited {
                        shop: shop.to_owned(),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::UNAUTHORIZED
                    || status == reqwest::StatusCode::FORBIDDEN
                {
                    return Err(CatalogError::Unauthorized {
                        shop: shop.to_owned(),
                        status: status.as_u16(),
                    });
                }

                if !status.is_success() {
                    return Err(CatalogError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let text = response.text().await?;
                let parsed = serde_json::from_str::<GraphQlResponse<ProductsData>>(&text)
                    .map_err(|e| CatalogError::Deserialize {
                        context: format!("product search from {shop}"),
                        source: e,
                    })?;

                if parsed.errors.iter().any(|e| e.is_throttled()) {
                    return Err(CatalogError::Throttled {
                        shop: shop.to_owned(),
                    });
                }

                match parsed.data {
                    Some(data) => {
                        if !parsed.errors.is_empty() {
                            tracing::warn!(
                                shop,
                                errors = parsed.errors.len(),
                                "partial GraphQL errors in product search"
                            );
                        }
                        Ok(data.products.nodes)
                    }
                    None => Err(CatalogError::GraphQl {
                        shop: shop.to_owned(),
                        message: parsed
                            .errors
                            .iter()
                            .map(|e| e.message.as_str())
                            .collect::<Vec<_>>()
                            .join("; "),
                    }),
                }
            }
        })
        .await
    }

    /// Resolves up to [`MAX_HANDLE_TERMS`] handles in one search. Only exact
    /// handle matches are returned.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::search_products`].
    pub async fn resolve_handles(
        &self,
        shop: &str,
        handles: &[String],
    ) -> Result<HashMap<String, String>, CatalogError> {
        let handles = &handles[..handles.len().min(MAX_HANDLE_TERMS)];
        if handles.is_empty() {
            return Ok(HashMap::new());
        }
        let nodes = self
            .search_products(shop, &search_query("handle", handles))
            .await?;

        Ok(handles
            .iter()
            .filter_map(|handle| {
                nodes
                    .iter()
                    .find(|node| node.handle == *handle)
                    .map(|node| (handle.clone(), node.id.clone()))
            })
            .collect())
    }

    /// Resolves up to [`MAX_TITLE_TERMS`] titles in one search. Titles match
    /// case-insensitively; the first matching node wins.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::search_products`].
    pub async fn resolve_titles(
        &self,
        shop: &str,
        titles: &[String],
    ) -> Result<HashMap<String, String>, CatalogError> {
        let titles = &titles[..titles.len().min(MAX_TITLE_TERMS)];
        if titles.is_empty() {
            return Ok(HashMap::new());
        }
        let nodes = self
            .search_products(shop, &search_query("title", titles))
            .await?;

        Ok(titles
            .iter()
            .filter_map(|title| {
                let wanted = title.trim().to_lowercase();
                nodes
                    .iter()
                    .find(|node| node.title.trim().to_lowercase() == wanted)
                    .map(|node| (title.clone(), node.id.clone()))
            })
            .collect())
    }
}

impl ProductResolver for ShopifyAdminClient {
    /// Runs the handle search and the title search independently. A failed
    /// search is logged and contributes nothing; the call only fails when
    /// every search it attempted failed.
    async fn resolve(
        &self,
        shop: &str,
        lookups: &ProductLookups,
    ) -> Result<ResolvedProducts, ResolverError> {
        let mut resolved = ResolvedProducts::default();
        let mut attempted = 0usize;
        let mut failures: Vec<String> = Vec::new();

        if !lookups.handles.is_empty() {
            attempted += 1;
            match self.resolve_handles(shop, &lookups.handles).await {
                Ok(map) => resolved.by_handle = map,
                Err(e) => {
                    tracing::warn!(shop, error = %e, "handle lookup failed");
                    failures.push(e.to_string());
                }
            }
        }

        if !lookups.titles.is_empty() {
            attempted += 1;
            match self.resolve_titles(shop, &lookups.titles).await {
                Ok(map) => resolved.by_title = map,
                Err(e) => {
                    tracing::warn!(shop, error = %e, "title lookup failed");
                    failures.push(e.to_string());
                }
            }
        }

        if attempted > 0 && failures.len() == attempted {
            return Err(ResolverError {
                shop: shop.to_owned(),
                message: failures.join("; "),
            });
        }
        Ok(resolved)
    }
}
