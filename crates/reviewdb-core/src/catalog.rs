//! Contract between the importer and whatever resolves product handles and
//! titles to canonical catalog ids.

use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Distinct product identifiers collected from one import, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLookups {
    pub handles: Vec<String>,
    pub titles: Vec<String>,
}

impl ProductLookups {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty() && self.titles.is_empty()
    }
}

/// Lookup results keyed by the identifier that was searched for.
///
/// Missing keys mean "unresolved"; a partial map is a valid answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedProducts {
    pub by_handle: HashMap<String, String>,
    pub by_title: HashMap<String, String>,
}

impl ResolvedProducts {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty() && self.by_title.is_empty()
    }

    #[must_use]
    pub fn handle(&self, handle: &str) -> Option<&str> {
        self.by_handle.get(handle).map(String::as_str)
    }

    #[must_use]
    pub fn title(&self, title: &str) -> Option<&str> {
        self.by_title.get(title).map(String::as_str)
    }
}

#[derive(Debug, Error)]
#[error("product resolution failed for {shop}: {message}")]
pub struct ResolverError {
    pub shop: String,
    pub message: String,
}

/// Batch-resolves store product handles and titles to canonical ids.
///
/// Implementations should return whatever they managed to resolve; the
/// importer treats an `Err` as an empty result.
pub trait ProductResolver {
    fn resolve(
        &self,
        shop: &str,
        lookups: &ProductLookups,
    ) -> impl Future<Output = Result<ResolvedProducts, ResolverError>> + Send;
}

/// Resolver used when no catalog credentials are configured: every lookup
/// stays unresolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnresolvedCatalog;

impl ProductResolver for UnresolvedCatalog {
    async fn resolve(
        &self,
        _shop: &str,
        _lookups: &ProductLookups,
    ) -> Result<ResolvedProducts, ResolverError> {
        Ok(ResolvedProducts::default())
    }
}
