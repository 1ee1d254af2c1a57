mod imports;
mod reviews;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use reviewdb_catalog::CatalogResolver;
use reviewdb_db::reviews::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use reviewdb_import::ImportSettings;

use crate::middleware::{request_id, RequestId};

/// Room for multipart boundaries and the non-file fields on top of the
/// configured upload ceiling.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub resolver: Arc<CatalogResolver>,
    pub settings: ImportSettings,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    catalog: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT)
}

pub(super) fn map_db_error(request_id: String, error: &reviewdb_db::DbError) -> ApiError {
    tracing::error!(request_id = %request_id, error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn import_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/v1/imports", post(imports::create_import))
        .route("/api/v1/imports/preview", post(imports::preview_import))
        .route("/api/v1/imports/template", get(imports::download_template))
        .layer(DefaultBodyLimit::max(
            max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
        ))
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/reviews", get(reviews::list_reviews))
        .merge(import_router(state.settings.max_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let catalog = if state.resolver.is_enabled() {
        "enabled"
    } else {
        "disabled"
    };

    match reviewdb_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                    catalog,
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                        catalog,
                    },
                    meta,
                }),
            )
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{json_body, offline_state, state_with_pool};
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 250);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_codes_map_to_statuses() {
        let cases = [
            ("validation_error", StatusCode::BAD_REQUEST),
            ("bad_request", StatusCode::BAD_REQUEST),
            ("payload_too_large", StatusCode::PAYLOAD_TOO_LARGE),
            ("not_found", StatusCode::NOT_FOUND),
            ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, status) in cases {
            let response = ApiError::new("req-1", code, "message").into_response();
            assert_eq!(response.status(), status, "code {code}");
        }
    }

    #[tokio::test]
    async fn request_id_is_echoed_when_supplied() {
        let app = build_app(offline_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/imports/template")
                    .header("x-request-id", "req-abc")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("req-abc")
        );
    }

    #[tokio::test]
    async fn request_id_is_generated_when_absent() {
        let app = build_app(offline_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/imports/template")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        let id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .expect("request id header");
        assert!(uuid::Uuid::parse_str(id).is_ok(), "{id}");
    }

    #[tokio::test]
    async fn health_reports_degraded_without_database() {
        let app = build_app(offline_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = json_body(response).await;
        assert_eq!(json["data"]["status"], "degraded");
        assert_eq!(json["data"]["catalog"], "disabled");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_reports_ok_with_database(pool: sqlx::PgPool) {
        let app = build_app(state_with_pool(pool));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["database"], "ok");
    }
}
