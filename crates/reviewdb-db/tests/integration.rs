//! Offline tests for reviewdb-db configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::Utc;
use reviewdb_core::{AppConfig, Environment, InvalidRatingPolicy};
use reviewdb_db::{PoolConfig, ReviewMediaRow, ReviewRow, ReviewWithRelations};
use uuid::Uuid;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        import_max_bytes: 5_000_000,
        import_batch_size: 50,
        import_on_invalid_rating: InvalidRatingPolicy::Default,
        resolver_max_handles: 50,
        resolver_max_titles: 20,
        shopify_access_token: None,
        shopify_api_version: "2024-10".to_string(),
        catalog_request_timeout_secs: 30,
        catalog_max_retries: 3,
        catalog_retry_backoff_base_secs: 2,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn review_json_exposes_public_id_and_hides_internal_ids() {
    let public_id = Uuid::new_v4();
    let review = ReviewWithRelations {
        review: ReviewRow {
            id: 17,
            public_id,
            shop: "demo.myshopify.com".to_string(),
            product_id: Some("gid://shopify/Product/1".to_string()),
            rating: 5,
            title: None,
            body: "Love it!".to_string(),
            customer_name: "Jane".to_string(),
            customer_email: None,
            sentiment: "positive".to_string(),
            status: "approved".to_string(),
            verified: false,
            created_at: Utc::now(),
        },
        media: vec![ReviewMediaRow {
            id: 3,
            review_id: 17,
            url: "http://img1.jpg".to_string(),
            media_type: "image".to_string(),
        }],
        replies: vec![],
    };

    let json = serde_json::to_value(&review).unwrap();
    assert_eq!(json["id"], public_id.to_string());
    assert_eq!(json["body"], "Love it!");
    assert_eq!(json["media"][0]["url"], "http://img1.jpg");
    assert!(json["media"][0].get("review_id").is_none());
    assert!(json["replies"].as_array().unwrap().is_empty());
}
