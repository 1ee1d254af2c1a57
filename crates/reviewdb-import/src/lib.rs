pub mod audit;
pub mod error;
pub mod headers;
pub mod normalize;
pub mod partition;
pub mod pipeline;
pub mod resolve;
pub mod template;
pub mod tokenize;

pub use audit::{audit_csv, ImportAudit};
pub use error::ImportError;
pub use headers::{normalize_header, FieldTag, HeaderMap};
pub use normalize::{normalize_grid, NormalizeOptions, NormalizeOutcome, SkipReason, SkippedRow};
pub use partition::{partition, DEFAULT_BATCH_SIZE};
pub use pipeline::{
    run_import, validate_upload, ImportDebug, ImportReport, ImportRequest, ImportSettings, Upload,
};
pub use resolve::{apply_resolution, collect_lookups, resolve_products, LookupLimits};
pub use template::{TEMPLATE_CSV, TEMPLATE_FILE_NAME};
pub use tokenize::{detect_delimiter, tokenize, tokenize_with, RawGrid};
