//! Pre-import audit of an uploaded CSV: what would be imported, without
//! touching the catalog or the database.

use serde::Serialize;

use reviewdb_core::{InvalidRatingPolicy, NormalizedReview};

use crate::normalize::{normalize_grid, NormalizeOptions};
use crate::tokenize::tokenize;

/// Number of normalized records included in [`ImportAudit::samples`].
pub const SAMPLE_SIZE: usize = 3;

/// Platform label used when no known exporter signature is found.
pub const STANDARD_PLATFORM: &str = "Standard CSV";

const PLATFORM_SIGNATURES: &[(&str, &str)] =
    &[("judgeme", "Judge.me"), ("yotpo", "Yotpo"), ("loox", "Loox")];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportAudit {
    /// Reviews the file would produce under the lenient rating policy.
    pub row_count: usize,
    /// Mean rating rounded to one decimal; `0.0` for an empty file.
    pub average_rating: f64,
    pub platforms: Vec<String>,
    /// Header cells as written in the file.
    pub raw_headers: Vec<String>,
    pub samples: Vec<NormalizedReview>,
    /// Whether any sample carries real review text.
    pub has_body: bool,
}

/// Audits `text` as the importer would see it.
#[must_use]
pub fn audit_csv(text: &str) -> ImportAudit {
    let grid = tokenize(text);
    let outcome = normalize_grid(&grid, &NormalizeOptions::new(InvalidRatingPolicy::Default));

    let raw_headers = grid
        .header()
        .map(|row| row.iter().map(|h| h.trim().to_owned()).collect())
        .unwrap_or_default();

    let samples: Vec<NormalizedReview> =
        outcome.reviews.iter().take(SAMPLE_SIZE).cloned().collect();
    let has_body = samples
        .iter()
        .any(|r| r.body != reviewdb_core::reviews::PLACEHOLDER_BODY);

    ImportAudit {
        row_count: outcome.reviews.len(),
        average_rating: average_rating(&outcome.reviews),
        platforms: detect_platforms(text),
        raw_headers,
        samples,
        has_body,
    }
}

/// Exporter names whose signature appears anywhere in `text`
/// (case-insensitive), or `["Standard CSV"]` when none match.
#[must_use]
pub fn detect_platforms(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let platforms: Vec<String> = PLATFORM_SIGNATURES
        .iter()
        .filter(|(signature, _)| lowered.contains(signature))
        .map(|(_, label)| (*label).to_owned())
        .collect();

    if platforms.is_empty() {
        vec![STANDARD_PLATFORM.to_owned()]
    } else {
        platforms
    }
}

#[allow(clippy::cast_precision_loss)]
fn average_rating(reviews: &[NormalizedReview]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: u64 = reviews.iter().map(|r| u64::from(r.rating)).sum();
    let mean = total as f64 / reviews.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TEMPLATE_CSV;

    #[test]
    fn audit_counts_rows_and_averages_ratings() {
        let audit = audit_csv("rating,body\n5,Great\n4,Good\n4,Fine");
        assert_eq!(audit.row_count, 3);
        assert!((audit.average_rating - 4.3).abs() < f64::EPSILON);
        assert_eq!(audit.raw_headers, vec!["rating", "body"]);
        assert_eq!(audit.samples.len(), 3);
        assert!(audit.has_body);
    }

    #[test]
    fn invalid_ratings_count_as_five() {
        let audit = audit_csv("rating,body\nawesome,Great\n3,Meh");
        assert_eq!(audit.row_count, 2);
        assert!((audit.average_rating - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn samples_are_capped() {
        let audit = audit_csv(TEMPLATE_CSV);
        assert_eq!(audit.samples.len(), 2);

        let many = format!("rating\n{}", vec!["5"; 10].join("\n"));
        assert_eq!(audit_csv(&many).samples.len(), SAMPLE_SIZE);
    }

    #[test]
    fn has_body_is_false_when_only_placeholders() {
        let audit = audit_csv("rating,name\n5,Jo\n4,Al");
        assert!(!audit.has_body);
    }

    #[test]
    fn platforms_detected_from_content() {
        assert_eq!(
            detect_platforms("judgeme_id,rating\n1,5\nsource=Yotpo"),
            vec!["Judge.me", "Yotpo"]
        );
        assert_eq!(detect_platforms("rating\n5"), vec![STANDARD_PLATFORM]);
    }

    #[test]
    fn empty_file_audits_to_zero() {
        let audit = audit_csv("");
        assert_eq!(audit.row_count, 0);
        assert!(audit.average_rating.abs() < f64::EPSILON);
        assert!(audit.raw_headers.is_empty());
        assert!(!audit.has_body);
    }
}
