use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix Shopify uses for canonical product ids.
pub const PRODUCT_GID_PREFIX: &str = "gid://shopify/Product/";

/// Body stored when a row carries no usable review text.
pub const PLACEHOLDER_BODY: &str = "No content";

/// Customer name stored when the row has none.
pub const ANONYMOUS_CUSTOMER: &str = "Anonymous";

/// A review produced by the CSV import normalizer, ready for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReview {
    /// Star rating, always within `1..=5`.
    pub rating: u8,
    pub body: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub product_reference: ProductReference,
    pub media: Vec<MediaAttachment>,
    pub reply_body: Option<String>,
    pub sentiment: SentimentBucket,
    /// 1-based index of the data row this review came from.
    pub source_row: usize,
}

impl NormalizedReview {
    /// Returns `true` if the review carries related rows (media or a reply)
    /// and must be inserted individually.
    #[must_use]
    pub fn is_complex(&self) -> bool {
        !self.media.is_empty() || self.reply_body.is_some()
    }
}

/// How a review points at a catalog product.
///
/// `Handle` and `Title` are transient: they only exist between normalization
/// and the resolution pass. Only `Resolved` ever reaches storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProductReference {
    /// Canonical catalog id, e.g. `"gid://shopify/Product/8666576847085"`.
    Resolved(String),
    /// URL slug awaiting lookup, e.g. `"red-shirt"`.
    Handle(String),
    /// Product title awaiting lookup, e.g. `"Red Shirt"`.
    Title(String),
    Absent,
}

impl ProductReference {
    /// Builds a `Resolved` reference from an explicit product id column value.
    ///
    /// Only canonical ids qualify: values already in `gid://` form are kept and
    /// all-digit values are prefixed. Anything else (blank, a handle, a title)
    /// is not an id and yields `None`.
    #[must_use]
    pub fn from_product_id(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.starts_with("gid://") {
            Some(Self::Resolved(raw.to_owned()))
        } else if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self::Resolved(format!("{PRODUCT_GID_PREFIX}{raw}")))
        } else {
            None
        }
    }

    /// The product id to persist: the canonical id when resolved, otherwise
    /// `None`. Unresolved handles and titles are never stored.
    #[must_use]
    pub fn stored_product_id(&self) -> Option<&str> {
        match self {
            Self::Resolved(id) => Some(id),
            Self::Handle(_) | Self::Title(_) | Self::Absent => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub url: String,
    pub kind: MediaKind,
}

impl MediaAttachment {
    #[must_use]
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: MediaKind::Image,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
}

impl MediaKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
        }
    }
}

/// Coarse sentiment derived from the star rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentBucket {
    Positive,
    Neutral,
    Negative,
}

impl SentimentBucket {
    #[must_use]
    pub fn from_rating(rating: u8) -> Self {
        match rating {
            4.. => Self::Positive,
            3 => Self::Neutral,
            _ => Self::Negative,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

/// What the importer does with a row whose rating is missing, unparseable,
/// or outside `1..=5`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRatingPolicy {
    /// Store the review with a rating of 5.
    #[default]
    Default,
    /// Count the row as skipped.
    Skip,
}

impl std::fmt::Display for InvalidRatingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for InvalidRatingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "skip" => Ok(Self::Skip),
            other => Err(format!(
                "unknown invalid-rating policy \"{other}\" (expected \"default\" or \"skip\")"
            )),
        }
    }
}
