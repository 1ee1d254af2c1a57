use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use reviewdb_db::{ReviewListFilters, ReviewStats, ReviewWithRelations};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ReviewsPage {
    reviews: Vec<ReviewWithRelations>,
    stats: ReviewStats,
}

#[derive(Debug, Deserialize)]
pub(super) struct ReviewQuery {
    pub shop: Option<String>,
    pub product_id: Option<String>,
    pub min_rating: Option<u8>,
    #[serde(default)]
    pub media_only: bool,
    pub limit: Option<i64>,
}

pub(super) async fn list_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<ApiResponse<ReviewsPage>>, ApiError> {
    let shop = query
        .shop
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "validation_error", "shop is required"))?;

    if let Some(min_rating) = query.min_rating {
        if !(1..=5).contains(&min_rating) {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "min_rating must be between 1 and 5",
            ));
        }
    }

    let filters = ReviewListFilters {
        shop: shop.to_owned(),
        product_id: query.product_id.clone(),
        min_rating: query.min_rating,
        media_only: query.media_only,
        limit: normalize_limit(query.limit),
    };

    let reviews = reviewdb_db::list_reviews(&state.pool, &filters)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let stats = reviewdb_db::review_stats(&state.pool, shop, query.product_id.as_deref())
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ReviewsPage { reviews, stats },
        meta: ResponseMeta::new(req_id.0),
    }))
}
