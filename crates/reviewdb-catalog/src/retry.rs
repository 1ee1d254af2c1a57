//! Exponential backoff for transient catalog failures.

use std::future::Future;
use std::time::Duration;

use crate::error::CatalogError;

/// Retriable: HTTP 429, GraphQL cost throttling, gateway errors (502-504),
/// and network-level failures. Everything else is returned immediately.
fn is_retriable(err: &CatalogError) -> bool {
    match err {
        CatalogError::RateLimited { .. } | CatalogError::Throttled { .. } | CatalogError::Http(_) => {
            true
        }
        CatalogError::UnexpectedStatus { status, .. } => matches!(status, 502..=504),
        _ => false,
    }
}

/// Runs `operation`, sleeping `backoff_base_secs * 2^attempt` seconds after
/// each retriable failure, for at most `max_retries` extra attempts. The last
/// error is returned once retries are exhausted.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retriable(&err) || attempt >= max_retries => return Err(err),
            Err(err) => err,
        };

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient catalog error; retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
