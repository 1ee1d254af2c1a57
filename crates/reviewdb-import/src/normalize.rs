//! Row normalization from a [`RawGrid`] into [`NormalizedReview`] records.
//!
//! Column order is never assumed. Each cell is routed through the
//! [`HeaderMap`] into a [`ReviewBuilder`] slot; the builder then applies the
//! defaulting rules (rating, date, body fallback) to produce one review or a
//! [`SkipReason`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use reviewdb_core::reviews::{ANONYMOUS_CUSTOMER, PLACEHOLDER_BODY};
use reviewdb_core::{
    InvalidRatingPolicy, MediaAttachment, NormalizedReview, ProductReference, SentimentBucket,
};

use crate::headers::{FieldTag, HeaderMap};
use crate::tokenize::RawGrid;

/// Unmapped columns must hold more than this many characters to be taken as
/// the review body.
pub const FALLBACK_BODY_MIN_CHARS: usize = 10;

const DEFAULT_RATING: u8 = 5;

#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    pub on_invalid_rating: InvalidRatingPolicy,
    /// Timestamp used for every row whose date is missing or unparseable.
    /// Captured once per import.
    pub imported_at: DateTime<Utc>,
}

impl NormalizeOptions {
    #[must_use]
    pub fn new(on_invalid_rating: InvalidRatingPolicy) -> Self {
        Self {
            on_invalid_rating,
            imported_at: Utc::now(),
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::new(InvalidRatingPolicy::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    InvalidRating { raw: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRating { raw } => write!(f, "invalid rating \"{raw}\""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeOutcome {
    pub reviews: Vec<NormalizedReview>,
    pub skipped: Vec<SkippedRow>,
    /// Normalized header tokens, in column order.
    pub detected_headers: Vec<String>,
}

impl NormalizeOutcome {
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Normalizes every non-blank data row of `grid`.
///
/// A bad row never aborts the pass: it either degrades to defaults or is
/// recorded in [`NormalizeOutcome::skipped`]. Rows whose cells are all blank
/// are not data and are neither imported nor counted as skipped.
#[must_use]
pub fn normalize_grid(grid: &RawGrid, options: &NormalizeOptions) -> NormalizeOutcome {
    let Some(header_row) = grid.header() else {
        return NormalizeOutcome::default();
    };
    let headers = HeaderMap::from_header_row(header_row);

    if !headers.has_tag(FieldTag::Body) {
        tracing::info!(
            unmapped = ?headers.unmapped(),
            "no recognized body column; falling back to long unmapped values"
        );
    }

    let mut outcome = NormalizeOutcome {
        detected_headers: headers.tokens(),
        ..NormalizeOutcome::default()
    };

    for (row_index, row) in grid.data_rows() {
        if is_blank_row(row) {
            continue;
        }
        match normalize_row(&headers, row, row_index, options) {
            Ok(review) => {
                if outcome.reviews.is_empty() {
                    tracing::debug!(
                        row = row_index,
                        headers = ?outcome.detected_headers,
                        review = ?review,
                        "first parsed record"
                    );
                }
                outcome.reviews.push(review);
            }
            Err(reason) => {
                tracing::debug!(row = row_index, %reason, "skipping row");
                outcome.skipped.push(SkippedRow {
                    row: row_index,
                    reason,
                });
            }
        }
    }

    outcome
}

/// Normalizes one data row against `headers`.
///
/// # Errors
///
/// Returns a [`SkipReason`] when the row must not be imported under the
/// configured [`InvalidRatingPolicy`].
pub fn normalize_row(
    headers: &HeaderMap,
    row: &[String],
    row_index: usize,
    options: &NormalizeOptions,
) -> Result<NormalizedReview, SkipReason> {
    let mut builder = ReviewBuilder::default();
    for (col, column) in headers.columns().iter().enumerate() {
        let value = row.get(col).map_or("", |v| v.trim());
        match column.tag {
            Some(tag) => builder.offer(tag, value),
            None => builder.offer_unmapped(&column.raw, value),
        }
    }
    builder.build(row_index, options)
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Accumulates one row's candidate values, one slot per [`FieldTag`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewBuilder {
    rating: Option<String>,
    body: Option<String>,
    customer_name: Option<String>,
    email: Option<String>,
    title: Option<String>,
    date: Option<String>,
    reply: Option<String>,
    media_urls: Option<String>,
    product_id: Option<String>,
    product_identifier: Option<String>,
    /// First long value from an unmapped column, with its header.
    fallback_body: Option<(String, String)>,
}

impl ReviewBuilder {
    /// Offers `value` for `tag`. Empty values are ignored; when several
    /// columns feed the same field the longest value wins, and the earlier
    /// column keeps the slot on a tie.
    pub fn offer(&mut self, tag: FieldTag, value: &str) {
        if value.is_empty() {
            return;
        }
        let slot = self.slot_mut(tag);
        let longer = slot
            .as_deref()
            .is_none_or(|current| value.chars().count() > current.chars().count());
        if longer {
            *slot = Some(value.to_owned());
        }
    }

    /// Offers a value from a column no synonym matched. Only the first value
    /// longer than [`FALLBACK_BODY_MIN_CHARS`] is kept.
    pub fn offer_unmapped(&mut self, header: &str, value: &str) {
        if self.fallback_body.is_none() && value.chars().count() > FALLBACK_BODY_MIN_CHARS {
            self.fallback_body = Some((header.to_owned(), value.to_owned()));
        }
    }

    fn slot_mut(&mut self, tag: FieldTag) -> &mut Option<String> {
        match tag {
            FieldTag::Rating => &mut self.rating,
            FieldTag::Body => &mut self.body,
            FieldTag::CustomerName => &mut self.customer_name,
            FieldTag::Email => &mut self.email,
            FieldTag::Title => &mut self.title,
            FieldTag::Date => &mut self.date,
            FieldTag::Reply => &mut self.reply,
            FieldTag::MediaUrls => &mut self.media_urls,
            FieldTag::ProductId => &mut self.product_id,
            FieldTag::ProductIdentifier => &mut self.product_identifier,
        }
    }

    /// Applies the defaulting rules and produces the review.
    ///
    /// # Errors
    ///
    /// Returns [`SkipReason::InvalidRating`] when the rating is present but
    /// invalid and the policy is [`InvalidRatingPolicy::Skip`].
    pub fn build(
        self,
        row_index: usize,
        options: &NormalizeOptions,
    ) -> Result<NormalizedReview, SkipReason> {
        let rating = match self.rating.as_deref() {
            None => DEFAULT_RATING,
            Some(raw) => match parse_rating(raw) {
                Some(rating) => rating,
                None => match options.on_invalid_rating {
                    InvalidRatingPolicy::Default => DEFAULT_RATING,
                    InvalidRatingPolicy::Skip => {
                        return Err(SkipReason::InvalidRating {
                            raw: raw.to_owned(),
                        })
                    }
                },
            },
        };

        let body = match (self.body, self.fallback_body) {
            (Some(body), _) => body,
            (None, Some((header, value))) => {
                tracing::warn!(
                    row = row_index,
                    header = %header,
                    "no body column value; using long unmapped column as body"
                );
                value
            }
            (None, None) => PLACEHOLDER_BODY.to_owned(),
        };

        let created_at = self
            .date
            .as_deref()
            .and_then(parse_review_date)
            .unwrap_or(options.imported_at);

        // A product id column holding something other than a canonical id is
        // looked up like any other identifier.
        let product_reference = match (self.product_id, self.product_identifier) {
            (Some(id), identifier) => ProductReference::from_product_id(&id).unwrap_or_else(|| {
                classify_product_identifier(identifier.as_deref().unwrap_or(&id))
            }),
            (None, Some(identifier)) => classify_product_identifier(&identifier),
            (None, None) => ProductReference::Absent,
        };

        let media = self
            .media_urls
            .as_deref()
            .map(split_media_urls)
            .unwrap_or_default();

        Ok(NormalizedReview {
            rating,
            body,
            customer_name: self
                .customer_name
                .unwrap_or_else(|| ANONYMOUS_CUSTOMER.to_owned()),
            customer_email: self.email,
            title: self.title,
            created_at,
            product_reference,
            media,
            reply_body: self.reply,
            sentiment: SentimentBucket::from_rating(rating),
            source_row: row_index,
        })
    }
}

/// Parses a star rating the way spreadsheet exports write it.
///
/// Takes the leading integer of the value (`"4"`, `"4.0"`, `"5 stars"` all
/// work) and accepts it only inside `1..=5`.
#[must_use]
pub fn parse_rating(raw: &str) -> Option<u8> {
    let raw = raw.trim();
    let unsigned = raw.strip_prefix('+').unwrap_or(raw);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..digits_end];
    if digits.is_empty() {
        return None;
    }
    digits
        .parse::<u8>()
        .ok()
        .filter(|rating| (1..=5).contains(rating))
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S UTC",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parses the review date formats seen in platform exports. Values without
/// an offset are taken as UTC.
#[must_use]
pub fn parse_review_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.and_utc());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Classifies a product column value for catalog lookup.
///
/// - contains `/products/` → handle taken from the path segment after the
///   last `/products/`, without query string or fragment;
/// - contains whitespace → product title;
/// - otherwise → bare handle.
#[must_use]
pub fn classify_product_identifier(raw: &str) -> ProductReference {
    const MARKER: &str = "/products/";

    let raw = raw.trim();
    if raw.is_empty() {
        return ProductReference::Absent;
    }
    if let Some(idx) = raw.rfind(MARKER) {
        let rest = &raw[idx + MARKER.len()..];
        let handle = rest.split(['?', '#', '/']).next().unwrap_or_default().trim();
        return if handle.is_empty() {
            ProductReference::Absent
        } else {
            ProductReference::Handle(handle.to_owned())
        };
    }
    if raw.chars().any(char::is_whitespace) {
        ProductReference::Title(raw.to_owned())
    } else {
        ProductReference::Handle(raw.to_owned())
    }
}

/// Splits a comma-separated media column into image attachments, dropping
/// blanks.
#[must_use]
pub fn split_media_urls(raw: &str) -> Vec<MediaAttachment> {
    raw.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(MediaAttachment::image)
        .collect()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
