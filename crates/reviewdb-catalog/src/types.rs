//! Wire types for the Admin GraphQL `products` search.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchVariables<'a> {
    pub query: &'a str,
    pub first: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphQlErrorExtensions>,
}

impl GraphQlError {
    /// `true` when Shopify rejected the query for exceeding the cost budget.
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.code.as_deref())
            == Some("THROTTLED")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlErrorExtensions {
    pub code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductsData {
    pub products: ProductConnection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductConnection {
    #[serde(default)]
    pub nodes: Vec<ProductNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductNode {
    /// Canonical id, e.g. `"gid://shopify/Product/8666576847085"`.
    pub id: String,
    pub handle: String,
    pub title: String,
}
