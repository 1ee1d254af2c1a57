//! Contract for the persistence side of an import.

use std::future::Future;

use serde::Serialize;
use thiserror::Error;

use crate::reviews::NormalizedReview;

/// Normalized reviews split by insertion strategy.
///
/// `bulk_chunks` hold reviews with no related rows, grouped so each chunk fits
/// in one multi-row `INSERT`. `complex` reviews carry media or a reply and are
/// inserted one at a time together with their related rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WritePlan {
    pub bulk_chunks: Vec<Vec<NormalizedReview>>,
    pub complex: Vec<NormalizedReview>,
}

impl WritePlan {
    #[must_use]
    pub fn simple_count(&self) -> usize {
        self.bulk_chunks.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn complex_count(&self) -> usize {
        self.complex.len()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.simple_count() + self.complex_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Row counts written by a successful commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub reviews: usize,
    pub media: usize,
    pub replies: usize,
}

#[derive(Debug, Error)]
#[error("failed to persist imported reviews: {message}")]
pub struct SinkError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Destination for a fully normalized import.
pub trait ReviewSink {
    /// Persists every review in `plan` for `shop`.
    fn commit(
        &self,
        shop: &str,
        plan: &WritePlan,
    ) -> impl Future<Output = Result<CommitSummary, SinkError>> + Send;
}
