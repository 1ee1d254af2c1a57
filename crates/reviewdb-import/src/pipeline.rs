//! End-to-end import: validate the upload, tokenize, normalize, resolve
//! products in one round-trip, partition, and hand the plan to the sink.

use std::path::Path;

use serde::Serialize;

use reviewdb_core::{AppConfig, InvalidRatingPolicy, NormalizedReview, ProductResolver, ReviewSink};

use crate::error::ImportError;
use crate::normalize::{normalize_grid, NormalizeOptions, NormalizeOutcome, SkippedRow};
use crate::partition::{partition, DEFAULT_BATCH_SIZE};
use crate::resolve::{apply_resolution, collect_lookups, resolve_products, LookupLimits};
use crate::tokenize::tokenize;

/// Default upload ceiling in bytes.
pub const DEFAULT_MAX_BYTES: usize = 5_000_000;

/// An uploaded file as received from the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    /// Tenant the reviews belong to, e.g. `"demo.myshopify.com"`.
    pub shop: String,
    pub upload: Option<Upload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSettings {
    pub max_bytes: usize,
    pub batch_size: usize,
    pub on_invalid_rating: InvalidRatingPolicy,
    pub lookup_limits: LookupLimits,
    /// Run every stage except the final commit.
    pub dry_run: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            batch_size: DEFAULT_BATCH_SIZE,
            on_invalid_rating: InvalidRatingPolicy::default(),
            lookup_limits: LookupLimits::default(),
            dry_run: false,
        }
    }
}

impl ImportSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_bytes: config.import_max_bytes,
            batch_size: config.import_batch_size,
            on_invalid_rating: config.import_on_invalid_rating,
            lookup_limits: LookupLimits {
                max_handles: config.resolver_max_handles,
                max_titles: config.resolver_max_titles,
            },
            dry_run: false,
        }
    }
}

/// Diagnostics returned alongside a report when at least one row parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportDebug {
    pub detected_headers: Vec<String>,
    pub first_record: NormalizedReview,
}

/// Outcome of an import as reported to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub success: bool,
    /// Reviews imported (or, on a dry run, that would be imported).
    pub count: usize,
    pub skipped: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_rows: Vec<SkippedRow>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<ImportDebug>,
}

/// User-facing summary line for an import.
#[must_use]
pub fn report_message(count: usize, skipped: usize) -> String {
    if skipped == 0 {
        format!("Successfully imported {count} reviews.")
    } else {
        format!("Imported {count}. Skipped {skipped} (invalid rating).")
    }
}

/// Checks the upload before any parsing and returns its text.
///
/// A leading UTF-8 byte order mark is stripped.
///
/// # Errors
///
/// Returns [`ImportError`] when the upload is missing, not a `.csv` file,
/// empty, larger than `max_bytes`, or not UTF-8.
pub fn validate_upload(upload: Option<&Upload>, max_bytes: usize) -> Result<&str, ImportError> {
    let upload = upload.ok_or(ImportError::MissingFile)?;

    let is_csv = Path::new(upload.file_name.trim())
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(ImportError::InvalidFileType {
            file_name: upload.file_name.clone(),
        });
    }
    if upload.bytes.is_empty() {
        return Err(ImportError::EmptyFile);
    }
    if upload.bytes.len() > max_bytes {
        return Err(ImportError::FileTooLarge {
            size: upload.bytes.len(),
            max_bytes,
        });
    }

    let text = std::str::from_utf8(&upload.bytes).map_err(ImportError::InvalidEncoding)?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Runs a full import for `request.shop`.
///
/// Row-level problems never fail the import; they are defaulted or counted
/// in [`ImportReport::skipped`]. The resolver is called at most once and its
/// failure only leaves product references unresolved.
///
/// # Errors
///
/// Returns [`ImportError`] for a missing shop, a rejected upload, or a sink
/// failure. Nothing is stored in any of those cases.
pub async fn run_import<R, S>(
    resolver: &R,
    sink: &S,
    request: &ImportRequest,
    settings: &ImportSettings,
) -> Result<ImportReport, ImportError>
where
    R: ProductResolver + Sync,
    S: ReviewSink + Sync,
{
    let shop = request.shop.trim();
    if shop.is_empty() {
        return Err(ImportError::MissingShop);
    }
    let text = validate_upload(request.upload.as_ref(), settings.max_bytes)?;

    let options = NormalizeOptions::new(settings.on_invalid_rating);
    let NormalizeOutcome {
        mut reviews,
        skipped,
        detected_headers,
    } = normalize_grid(&tokenize(text), &options);

    tracing::info!(
        shop,
        parsed = reviews.len(),
        skipped = skipped.len(),
        headers = ?detected_headers,
        "csv normalized"
    );

    let lookups = collect_lookups(&reviews, settings.lookup_limits);
    let resolved = resolve_products(resolver, shop, &lookups).await;
    apply_resolution(&mut reviews, &resolved);

    let debug = reviews.first().map(|first| ImportDebug {
        detected_headers,
        first_record: first.clone(),
    });

    let plan = partition(reviews, settings.batch_size);
    let count = plan.total();

    if settings.dry_run {
        tracing::info!(shop, count, "dry run; skipping commit");
    } else if !plan.is_empty() {
        let summary = sink.commit(shop, &plan).await?;
        tracing::info!(
            shop,
            reviews = summary.reviews,
            media = summary.media,
            replies = summary.replies,
            bulk_chunks = plan.bulk_chunks.len(),
            "import committed"
        );
    }

    Ok(ImportReport {
        success: true,
        count,
        skipped: skipped.len(),
        message: report_message(count, skipped.len()),
        skipped_rows: skipped,
        dry_run: settings.dry_run,
        debug,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, body: &str) -> Upload {
        Upload {
            file_name: name.to_owned(),
            bytes: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn missing_upload_is_rejected() {
        assert!(matches!(
            validate_upload(None, DEFAULT_MAX_BYTES),
            Err(ImportError::MissingFile)
        ));
    }

    #[test]
    fn non_csv_extension_is_rejected() {
        let err = validate_upload(Some(&upload("reviews.xlsx", "rating\n5")), DEFAULT_MAX_BYTES)
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidFileType { .. }));
        assert_eq!(err.to_string(), "Invalid file type. Please upload a .csv file.");
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let file = upload("Reviews.CSV", "rating\n5");
        let text = validate_upload(Some(&file), DEFAULT_MAX_BYTES).unwrap();
        assert_eq!(text, "rating\n5");
    }

    #[test]
    fn empty_upload_is_rejected() {
        assert!(matches!(
            validate_upload(Some(&upload("r.csv", "")), DEFAULT_MAX_BYTES),
            Err(ImportError::EmptyFile)
        ));
    }

    #[test]
    fn oversized_upload_is_rejected() {
        let err = validate_upload(Some(&upload("r.csv", "rating\n5\n4")), 4).unwrap_err();
        assert!(matches!(
            err,
            ImportError::FileTooLarge {
                size: 10,
                max_bytes: 4
            }
        ));
    }

    #[test]
    fn non_utf8_upload_is_rejected() {
        let bad = Upload {
            file_name: "r.csv".to_owned(),
            bytes: vec![b'r', 0xff, 0xfe, b'\n'],
        };
        assert!(matches!(
            validate_upload(Some(&bad), DEFAULT_MAX_BYTES),
            Err(ImportError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn byte_order_mark_is_stripped() {
        let file = upload("r.csv", "\u{feff}rating\n5");
        let text = validate_upload(Some(&file), DEFAULT_MAX_BYTES).unwrap();
        assert_eq!(text, "rating\n5");
    }

    #[test]
    fn report_messages() {
        assert_eq!(report_message(3, 0), "Successfully imported 3 reviews.");
        assert_eq!(report_message(3, 2), "Imported 3. Skipped 2 (invalid rating).");
    }

    #[test]
    fn report_omits_empty_optional_fields() {
        let report = ImportReport {
            success: true,
            count: 0,
            skipped: 0,
            message: report_message(0, 0),
            skipped_rows: Vec::new(),
            dry_run: false,
            debug: None,
        };
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "count": 0,
                "skipped": 0,
                "message": "Successfully imported 0 reviews."
            })
        );
    }
}
