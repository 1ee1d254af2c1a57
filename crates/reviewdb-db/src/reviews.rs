//! Database operations for `reviews`, `review_media`, and `review_replies`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use reviewdb_core::{CommitSummary, NormalizedReview, ProductReference, WritePlan};

use crate::DbError;

/// Rows per multi-row `INSERT`; keeps bind parameters well under the
/// Postgres limit of 65535 regardless of the configured batch size.
const MAX_ROWS_PER_STATEMENT: usize = 1000;

/// Imported reviews come from the shop's own export and are stored as verified.
const IMPORTED_REVIEWS_VERIFIED: bool = true;

/// Default and maximum page size for [`list_reviews`].
pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 250;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `reviews` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ReviewRow {
    #[serde(skip)]
    pub id: i64,
    #[serde(rename = "id")]
    pub public_id: Uuid,
    pub shop: String,
    /// `NULL` when the product reference never resolved.
    pub product_id: Option<String>,
    pub rating: i16,
    pub title: Option<String>,
    pub body: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub sentiment: String,
    pub status: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// A row from the `review_media` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ReviewMediaRow {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub review_id: i64,
    pub url: String,
    pub media_type: String,
}

/// A row from the `review_replies` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct ReviewReplyRow {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub review_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithRelations {
    #[serde(flatten)]
    pub review: ReviewRow,
    pub media: Vec<ReviewMediaRow>,
    pub replies: Vec<ReviewReplyRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReviewStats {
    pub total: i64,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewListFilters {
    pub shop: String,
    /// Numeric product id or `gid://` form.
    pub product_id: Option<String>,
    pub min_rating: Option<u8>,
    pub media_only: bool,
    pub limit: i64,
}

impl ReviewListFilters {
    #[must_use]
    pub fn for_shop(shop: impl Into<String>) -> Self {
        Self {
            shop: shop.into(),
            product_id: None,
            min_rating: None,
            media_only: false,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// Canonical id for a product filter value; blank input means no filter.
/// Values that are not ids are matched verbatim and so select nothing.
fn product_filter(raw: Option<&str>) -> Option<String> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty())?;
    Some(
        ProductReference::from_product_id(raw)
            .and_then(|reference| reference.stored_product_id().map(str::to_owned))
            .unwrap_or_else(|| raw.to_owned()),
    )
}

// ---------------------------------------------------------------------------
// write path
// ---------------------------------------------------------------------------

/// Inserts reviews without related rows using multi-row `INSERT`s.
///
/// Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails.
pub async fn bulk_insert_reviews(
    conn: &mut PgConnection,
    shop: &str,
    reviews: &[NormalizedReview],
) -> Result<u64, DbError> {
    let mut inserted = 0u64;

    for chunk in reviews.chunks(MAX_ROWS_PER_STATEMENT) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO reviews \
                 (shop, product_id, rating, title, body, customer_name, customer_email, \
                  sentiment, created_at, verified) ",
        );
        qb.push_values(chunk, |mut row, review| {
            row.push_bind(shop.to_owned())
                .push_bind(
                    review
                        .product_reference
                        .stored_product_id()
                        .map(str::to_owned),
                )
                .push_bind(i16::from(review.rating))
                .push_bind(review.title.clone())
                .push_bind(review.body.clone())
                .push_bind(review.customer_name.clone())
                .push_bind(review.customer_email.clone())
                .push_bind(review.sentiment.as_str())
                .push_bind(review.created_at)
                .push_bind(IMPORTED_REVIEWS_VERIFIED);
        });

        let result = qb.build().execute(&mut *conn).await?;
        inserted += result.rows_affected();
    }

    Ok(inserted)
}

/// Inserts one review together with its media and reply rows.
///
/// Returns the internal `id` of the review and the counts written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails.
pub async fn insert_review_with_relations(
    conn: &mut PgConnection,
    shop: &str,
    review: &NormalizedReview,
) -> Result<(i64, CommitSummary), DbError> {
    let review_id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO reviews \
             (shop, product_id, rating, title, body, customer_name, customer_email, \
              sentiment, created_at, verified) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING id",
    )
    .bind(shop)
    .bind(review.product_reference.stored_product_id())
    .bind(i16::from(review.rating))
    .bind(&review.title)
    .bind(&review.body)
    .bind(&review.customer_name)
    .bind(&review.customer_email)
    .bind(review.sentiment.as_str())
    .bind(review.created_at)
    .bind(IMPORTED_REVIEWS_VERIFIED)
    .fetch_one(&mut *conn)
    .await?;

    for media in &review.media {
        sqlx::query("INSERT INTO review_media (review_id, url, media_type) VALUES ($1, $2, $3)")
            .bind(review_id)
            .bind(&media.url)
            .bind(media.kind.as_str())
            .execute(&mut *conn)
            .await?;
    }

    if let Some(reply) = &review.reply_body {
        sqlx::query("INSERT INTO review_replies (review_id, body) VALUES ($1, $2)")
            .bind(review_id)
            .bind(reply)
            .execute(&mut *conn)
            .await?;
    }

    Ok((
        review_id,
        CommitSummary {
            reviews: 1,
            media: review.media.len(),
            replies: usize::from(review.reply_body.is_some()),
        },
    ))
}

/// Writes a whole [`WritePlan`] in one transaction: every bulk chunk, then
/// every complex review. Any failure rolls the import back entirely.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement or the commit fails.
pub async fn commit_import(
    pool: &PgPool,
    shop: &str,
    plan: &WritePlan,
) -> Result<CommitSummary, DbError> {
    let mut tx = pool.begin().await?;
    let mut summary = CommitSummary::default();

    for chunk in &plan.bulk_chunks {
        let inserted = bulk_insert_reviews(&mut tx, shop, chunk).await?;
        summary.reviews += usize::try_from(inserted).unwrap_or(chunk.len());
    }

    for review in &plan.complex {
        let (_, written) = insert_review_with_relations(&mut tx, shop, review).await?;
        summary.reviews += written.reviews;
        summary.media += written.media;
        summary.replies += written.replies;
    }

    tx.commit().await?;

    tracing::debug!(
        shop,
        reviews = summary.reviews,
        media = summary.media,
        replies = summary.replies,
        "import transaction committed"
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// read path
// ---------------------------------------------------------------------------

/// Lists reviews for a shop, newest first, with media and replies attached.
///
/// `limit` is clamped to `1..=MAX_LIST_LIMIT`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn list_reviews(
    pool: &PgPool,
    filters: &ReviewListFilters,
) -> Result<Vec<ReviewWithRelations>, DbError> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT r.id, r.public_id, r.shop, r.product_id, r.rating, r.title, r.body, \
                r.customer_name, r.customer_email, r.sentiment, r.status, r.verified, \
                r.created_at \
         FROM reviews r \
         WHERE r.shop = ",
    );
    qb.push_bind(filters.shop.clone());

    if let Some(product_id) = product_filter(filters.product_id.as_deref()) {
        qb.push(" AND r.product_id = ").push_bind(product_id);
    }
    if let Some(min_rating) = filters.min_rating {
        qb.push(" AND r.rating >= ").push_bind(i16::from(min_rating));
    }
    if filters.media_only {
        qb.push(" AND EXISTS (SELECT 1 FROM review_media m WHERE m.review_id = r.id)");
    }
    qb.push(" ORDER BY r.created_at DESC, r.id DESC LIMIT ")
        .push_bind(filters.limit.clamp(1, MAX_LIST_LIMIT));

    let rows: Vec<ReviewRow> = qb.build_query_as::<ReviewRow>().fetch_all(pool).await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

    let media = sqlx::query_as::<_, ReviewMediaRow>(
        "SELECT id, review_id, url, media_type FROM review_media \
         WHERE review_id = ANY($1) ORDER BY id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let replies = sqlx::query_as::<_, ReviewReplyRow>(
        "SELECT id, review_id, body, created_at FROM review_replies \
         WHERE review_id = ANY($1) ORDER BY id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut media_by_review: HashMap<i64, Vec<ReviewMediaRow>> = HashMap::new();
    for m in media {
        media_by_review.entry(m.review_id).or_default().push(m);
    }
    let mut replies_by_review: HashMap<i64, Vec<ReviewReplyRow>> = HashMap::new();
    for r in replies {
        replies_by_review.entry(r.review_id).or_default().push(r);
    }

    Ok(rows
        .into_iter()
        .map(|review| ReviewWithRelations {
            media: media_by_review.remove(&review.id).unwrap_or_default(),
            replies: replies_by_review.remove(&review.id).unwrap_or_default(),
            review,
        })
        .collect())
}

/// Review count and mean rating for a shop, optionally narrowed to one
/// product. The average is `0.0` when there are no reviews.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn review_stats(
    pool: &PgPool,
    shop: &str,
    product_id: Option<&str>,
) -> Result<ReviewStats, DbError> {
    let (total, average): (i64, f64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(AVG(rating), 0)::float8 \
         FROM reviews \
         WHERE shop = $1 AND ($2::text IS NULL OR product_id = $2)",
    )
    .bind(shop)
    .bind(product_filter(product_id))
    .fetch_one(pool)
    .await?;

    Ok(ReviewStats { total, average })
}
