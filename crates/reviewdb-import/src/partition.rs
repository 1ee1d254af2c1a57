//! Splits normalized reviews by insertion strategy.

use reviewdb_core::{NormalizedReview, WritePlan};

/// Rows per multi-row `INSERT` unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Routes reviews without related rows into `batch_size` chunks and reviews
/// with media or a reply into the individual-insert list. Input order is
/// kept within each path. A `batch_size` of 0 is treated as 1.
#[must_use]
pub fn partition(reviews: Vec<NormalizedReview>, batch_size: usize) -> WritePlan {
    let batch_size = batch_size.max(1);
    let (complex, simple): (Vec<_>, Vec<_>) =
        reviews.into_iter().partition(NormalizedReview::is_complex);

    let mut bulk_chunks = Vec::with_capacity(simple.len().div_ceil(batch_size));
    let mut simple = simple.into_iter().peekable();
    while simple.peek().is_some() {
        bulk_chunks.push(simple.by_ref().take(batch_size).collect());
    }

    WritePlan {
        bulk_chunks,
        complex,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use reviewdb_core::{MediaAttachment, ProductReference, SentimentBucket};

    use super::*;

    fn review(source_row: usize, complex: bool) -> NormalizedReview {
        NormalizedReview {
            rating: 5,
            body: format!("review {source_row}"),
            customer_name: "Anonymous".to_owned(),
            customer_email: None,
            title: None,
            created_at: Utc::now(),
            product_reference: ProductReference::Absent,
            media: if complex {
                vec![MediaAttachment::image("https://img/1.jpg")]
            } else {
                vec![]
            },
            reply_body: None,
            sentiment: SentimentBucket::Positive,
            source_row,
        }
    }

    #[test]
    fn simple_reviews_are_chunked_at_batch_size() {
        let reviews = (1..=120).map(|i| review(i, false)).collect();
        let plan = partition(reviews, 50);
        let sizes: Vec<usize> = plan.bulk_chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![50, 50, 20]);
        assert!(plan.complex.is_empty());
        assert_eq!(plan.total(), 120);
    }

    #[test]
    fn complex_reviews_go_to_individual_path_in_order() {
        let reviews = vec![
            review(1, true),
            review(2, false),
            review(3, true),
            review(4, false),
        ];
        let plan = partition(reviews, 50);
        let complex_rows: Vec<usize> = plan.complex.iter().map(|r| r.source_row).collect();
        let simple_rows: Vec<usize> = plan.bulk_chunks[0].iter().map(|r| r.source_row).collect();
        assert_eq!(complex_rows, vec![1, 3]);
        assert_eq!(simple_rows, vec![2, 4]);
    }

    #[test]
    fn zero_batch_size_is_clamped_to_one() {
        let reviews = (1..=3).map(|i| review(i, false)).collect();
        let plan = partition(reviews, 0);
        assert_eq!(plan.bulk_chunks.len(), 3);
    }

    #[test]
    fn empty_input_produces_empty_plan() {
        let plan = partition(Vec::new(), DEFAULT_BATCH_SIZE);
        assert!(plan.is_empty());
        assert!(plan.bulk_chunks.is_empty());
    }
}
