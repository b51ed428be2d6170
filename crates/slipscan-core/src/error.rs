//! Error types for the slipscan-core library.

use thiserror::Error;

/// Main error type for the slipscan library.
#[derive(Error, Debug)]
pub enum ScanError {
    /// No usable invoice data could be recovered from the model output.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// The caller cancelled while waiting for a worker slot.
    #[error("{op}: request cancelled while waiting for a worker")]
    Cancelled { op: &'static str },

    /// Object storage or the vision model failed.
    #[error("upstream error: {0}")]
    Upstream(#[from] slipscan_vision::VisionError),

    /// Receipt storage error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse failure classes a transport layer maps to status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The image was processed but nothing could be read from it.
    Extraction,
    /// The request was cancelled or timed out before it was admitted.
    Cancelled,
    /// A dependency is misconfigured or unavailable.
    Upstream,
    /// The requested record does not exist.
    NotFound,
    /// The request itself was malformed.
    InvalidInput,
    /// Anything else.
    Internal,
}

impl ScanError {
    /// Classify the error.
    pub fn kind(&self) -> FailureKind {
        match self {
            ScanError::Extraction(ExtractionError::NoData) => FailureKind::Extraction,
            ScanError::Extraction(_) => FailureKind::InvalidInput,
            ScanError::Cancelled { .. } => FailureKind::Cancelled,
            ScanError::Upstream(_) | ScanError::Config(_) => FailureKind::Upstream,
            ScanError::Repository(RepositoryError::NotFound(_)) => FailureKind::NotFound,
            ScanError::Repository(RepositoryError::InvalidQuery(_)) => FailureKind::InvalidInput,
            ScanError::Io(_) => FailureKind::Internal,
        }
    }
}

/// Errors related to invoice extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// No decode stage produced a single recoverable field.
    #[error("failed to extract invoice data from model response")]
    NoData,

    /// A date field is not a calendar date.
    #[error("invalid date for {field}: {value}")]
    InvalidDate { field: String, value: String },

    /// Field validation failed.
    #[error("validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },
}

/// Errors related to receipt storage.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// No receipt with the given id.
    #[error("receipt not found: {0}")]
    NotFound(String),

    /// Query parameters were rejected.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// Result type for the slipscan library.
pub type Result<T> = std::result::Result<T, ScanError>;
