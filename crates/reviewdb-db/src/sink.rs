use sqlx::PgPool;

use reviewdb_core::{CommitSummary, ReviewSink, SinkError, WritePlan};

use crate::reviews::commit_import;

/// [`ReviewSink`] backed by Postgres. Each commit is one transaction.
#[derive(Debug, Clone)]
pub struct PgReviewSink {
    pool: PgPool,
}

impl PgReviewSink {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ReviewSink for PgReviewSink {
    async fn commit(&self, shop: &str, plan: &WritePlan) -> Result<CommitSummary, SinkError> {
        commit_import(&self.pool, shop, plan)
            .await
            .map_err(|e| SinkError {
                message: e.to_string(),
                source: Some(Box::new(e)),
            })
    }
}
