use thiserror::Error;

/// Convenience result type for upload pipeline operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Convenience result type for calls against the hosted backend.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Error type returned by the upload pipeline.
///
/// Parsing failures (`Io`, `Csv`, `Excel`) discard the batch; a `Submission` failure keeps it so
/// the caller can submit again.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The declared MIME type is not one of the accepted upload types.
    #[error("unsupported file type '{mime_type}' (expected CSV or Excel)")]
    UnsupportedFileType { mime_type: String },

    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV content.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    /// Malformed or unreadable workbook (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// Spreadsheet support was compiled out.
    #[error("excel ingestion not enabled (enable cargo feature 'excel')")]
    ExcelDisabled,

    /// Submit was requested with no rows to send.
    #[error("no records to upload")]
    EmptyBatch,

    /// The pipeline is not in a state that allows the requested step.
    #[error("cannot {action} while {state}")]
    InvalidState { action: &'static str, state: String },

    /// The bulk-ingestion call failed.
    #[error("submission failed: {0}")]
    Submission(#[from] RemoteError),
}

impl UploadError {
    /// `true` for failures that happened while turning file bytes into rows.
    pub fn is_parse_error(&self) -> bool {
        match self {
            UploadError::Io(_) | UploadError::Csv(_) | UploadError::ExcelDisabled => true,
            #[cfg(feature = "excel")]
            UploadError::Excel(_) => true,
            _ => false,
        }
    }
}

/// Error type returned by the hosted auth/database/function service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport-level failure (connection refused, timeout, TLS...).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A successful response was missing data the caller depends on.
    #[error("{0}")]
    MissingData(String),

    /// The request needs a logged-in session.
    #[error("not logged in")]
    Unauthenticated,

    /// Local validation refused to send the request.
    #[error("invalid request: {0}")]
    Invalid(String),
}

/// Error type for loading a [`crate::config::ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {message}")]
    Invalid { message: String },

    /// The HTTP client could not be built from the config (TLS backend, timeout...).
    #[error("http client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}
