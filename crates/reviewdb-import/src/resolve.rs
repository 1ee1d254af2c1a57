//! Second pass over normalized reviews: batch product lookups, then rewrite
//! every handle/title reference to a canonical id or `Absent`.

use std::collections::HashSet;

use reviewdb_core::{
    NormalizedReview, ProductLookups, ProductReference, ProductResolver, ResolvedProducts,
};

/// Upper bounds on distinct identifiers sent to the catalog per import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupLimits {
    pub max_handles: usize,
    pub max_titles: usize,
}

impl Default for LookupLimits {
    fn default() -> Self {
        Self {
            max_handles: 50,
            max_titles: 20,
        }
    }
}

/// Collects distinct handles and titles in first-seen order, truncated to
/// `limits`. Reviews whose identifier was cut off stay unresolved.
#[must_use]
pub fn collect_lookups(reviews: &[NormalizedReview], limits: LookupLimits) -> ProductLookups {
    let mut seen_handles = HashSet::new();
    let mut seen_titles = HashSet::new();
    let mut lookups = ProductLookups::default();

    for review in reviews {
        match &review.product_reference {
            ProductReference::Handle(handle) if seen_handles.insert(handle.as_str()) => {
                lookups.handles.push(handle.clone());
            }
            ProductReference::Title(title) if seen_titles.insert(title.as_str()) => {
                lookups.titles.push(title.clone());
            }
            _ => {}
        }
    }

    if lookups.handles.len() > limits.max_handles {
        tracing::warn!(
            distinct = lookups.handles.len(),
            limit = limits.max_handles,
            "too many distinct product handles; extra handles stay unresolved"
        );
        lookups.handles.truncate(limits.max_handles);
    }
    if lookups.titles.len() > limits.max_titles {
        tracing::warn!(
            distinct = lookups.titles.len(),
            limit = limits.max_titles,
            "too many distinct product titles; extra titles stay unresolved"
        );
        lookups.titles.truncate(limits.max_titles);
    }

    lookups
}

/// Performs the single resolver round-trip for an import.
///
/// Resolver errors are logged and treated as "nothing resolved" so the import
/// proceeds with unresolved references.
pub async fn resolve_products<R: ProductResolver>(
    resolver: &R,
    shop: &str,
    lookups: &ProductLookups,
) -> ResolvedProducts {
    if lookups.is_empty() {
        return ResolvedProducts::default();
    }

    match resolver.resolve(shop, lookups).await {
        Ok(resolved) => {
            tracing::info!(
                shop,
                handles = lookups.handles.len(),
                titles = lookups.titles.len(),
                resolved_handles = resolved.by_handle.len(),
                resolved_titles = resolved.by_title.len(),
                "product lookups resolved"
            );
            resolved
        }
        Err(e) => {
            tracing::warn!(
                shop,
                error = %e,
                "product resolution failed; continuing with unresolved references"
            );
            ResolvedProducts::default()
        }
    }
}

/// Rewrites every `Handle`/`Title` reference to `Resolved(id)` when the map
/// has it, otherwise to `Absent`. `Resolved` and `Absent` are left alone.
pub fn apply_resolution(reviews: &mut [NormalizedReview], resolved: &ResolvedProducts) {
    for review in reviews {
        let rewritten = match &review.product_reference {
            ProductReference::Handle(handle) => resolved.handle(handle),
            ProductReference::Title(title) => resolved.title(title),
            ProductReference::Resolved(_) | ProductReference::Absent => continue,
        }
        .map_or(ProductReference::Absent, |id| {
            ProductReference::Resolved(id.to_owned())
        });
        review.product_reference = rewritten;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use reviewdb_core::{ResolverError, SentimentBucket};

    use super::*;

    fn review(reference: ProductReference) -> NormalizedReview {
        NormalizedReview {
            rating: 4,
            body: "Nice".to_owned(),
            customer_name: "Anonymous".to_owned(),
            customer_email: None,
            title: None,
            created_at: Utc::now(),
            product_reference: reference,
            media: vec![],
            reply_body: None,
            sentiment: SentimentBucket::Positive,
            source_row: 1,
        }
    }

    fn handle(h: &str) -> ProductReference {
        ProductReference::Handle(h.to_owned())
    }

    fn title(t: &str) -> ProductReference {
        ProductReference::Title(t.to_owned())
    }

    struct FailingResolver;

    impl ProductResolver for FailingResolver {
        async fn resolve(
            &self,
            shop: &str,
            _lookups: &ProductLookups,
        ) -> Result<ResolvedProducts, ResolverError> {
            Err(ResolverError {
                shop: shop.to_owned(),
                message: "connection refused".to_owned(),
            })
        }
    }

    #[test]
    fn collect_lookups_dedupes_in_first_seen_order() {
        let reviews = vec![
            review(handle("b")),
            review(title("Red Shirt")),
            review(handle("a")),
            review(handle("b")),
            review(ProductReference::Absent),
            review(ProductReference::Resolved("gid://shopify/Product/1".to_owned())),
            review(title("Red Shirt")),
        ];
        let lookups = collect_lookups(&reviews, LookupLimits::default());
        assert_eq!(lookups.handles, vec!["b", "a"]);
        assert_eq!(lookups.titles, vec!["Red Shirt"]);
    }

    #[test]
    fn collect_lookups_respects_limits() {
        let reviews: Vec<_> = (0..5)
            .map(|i| review(handle(&format!("h{i}"))))
            .chain((0..4).map(|i| review(title(&format!("T {i}")))))
            .collect();
        let limits = LookupLimits {
            max_handles: 3,
            max_titles: 2,
        };
        let lookups = collect_lookups(&reviews, limits);
        assert_eq!(lookups.handles, vec!["h0", "h1", "h2"]);
        assert_eq!(lookups.titles, vec!["T 0", "T 1"]);
    }

    #[test]
    fn apply_resolution_rewrites_or_clears_references() {
        let mut reviews = vec![
            review(handle("red-shirt")),
            review(handle("gone")),
            review(title("Blue Hat")),
            review(ProductReference::Resolved("gid://shopify/Product/9".to_owned())),
            review(ProductReference::Absent),
        ];
        let mut resolved = ResolvedProducts::default();
        resolved
            .by_handle
            .insert("red-shirt".to_owned(), "gid://shopify/Product/1".to_owned());
        resolved
            .by_title
            .insert("Blue Hat".to_owned(), "gid://shopify/Product/2".to_owned());

        apply_resolution(&mut reviews, &resolved);

        let refs: Vec<_> = reviews.iter().map(|r| r.product_reference.clone()).collect();
        assert_eq!(
            refs,
            vec![
                ProductReference::Resolved("gid://shopify/Product/1".to_owned()),
                ProductReference::Absent,
                ProductReference::Resolved("gid://shopify/Product/2".to_owned()),
                ProductReference::Resolved("gid://shopify/Product/9".to_owned()),
                ProductReference::Absent,
            ]
        );
        assert!(reviews.iter().all(|r| matches!(
            r.product_reference,
            ProductReference::Resolved(_) | ProductReference::Absent
        )));
    }

    #[tokio::test]
    async fn resolver_failure_degrades_to_empty_map() {
        let lookups = ProductLookups {
            handles: vec!["red-shirt".to_owned()],
            titles: vec![],
        };
        let resolved = resolve_products(&FailingResolver, "demo.myshopify.com", &lookups).await;
        assert!(resolved.is_empty());
    }

    #[tokio::test]
    async fn empty_lookups_skip_the_resolver() {
        let resolved =
            resolve_products(&FailingResolver, "demo.myshopify.com", &ProductLookups::default())
                .await;
        assert!(resolved.is_empty());
    }
}
