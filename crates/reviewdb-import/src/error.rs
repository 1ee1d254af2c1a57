use thiserror::Error;

use reviewdb_core::SinkError;

/// Reasons an import is rejected or fails as a whole.
///
/// Row-level data-quality problems never surface here; they are defaulted or
/// counted as skipped.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("No file uploaded.")]
    MissingFile,

    #[error("The uploaded file is empty.")]
    EmptyFile,

    #[error("Invalid file type. Please upload a .csv file.")]
    InvalidFileType { file_name: String },

    #[error("File too large ({size} bytes, limit {max_bytes} bytes).")]
    FileTooLarge { size: usize, max_bytes: usize },

    #[error("The uploaded file is not valid UTF-8 text.")]
    InvalidEncoding(#[source] std::str::Utf8Error),

    #[error("A shop domain is required.")]
    MissingShop,

    #[error(transparent)]
    Persistence(#[from] SinkError),
}

impl ImportError {
    /// `true` for rejections caused by the request itself rather than by the
    /// storage backend.
    #[must_use]
    pub fn is_input_rejection(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }
}
