//! Unified parsing entrypoint.
//!
//! Most callers should use [`parse_upload`], which turns a selected [`UploadFile`] into a
//! [`crate::types::ParsedBatch`].
//!
//! - The format is chosen from the declared MIME type; only CSV and xlsx are accepted and
//!   anything else is rejected before any parsing happens.
//! - If an [`super::observability::UploadObserver`] is configured, success/failure/alerts are
//!   reported to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{UploadError, UploadResult};
use crate::types::ParsedBatch;

use super::csv;
use super::observability::{severity_for_error, ParseStats, UploadContext, UploadObserver, UploadSeverity};

/// MIME type of comma-separated uploads.
pub const CSV_MIME_TYPE: &str = "text/csv";
/// MIME type of xlsx workbook uploads.
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Number of rows shown for confirmation before submit.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    /// Comma-separated values.
    Csv,
    /// xlsx workbook (feature-gated behind `excel`).
    Spreadsheet,
}

impl UploadFormat {
    /// Resolve the format from a declared MIME type.
    ///
    /// Matching ignores case and parameters (`text/csv; charset=utf-8` is CSV).
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            CSV_MIME_TYPE => Some(Self::Csv),
            XLSX_MIME_TYPE => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Guess the MIME type a file picker would declare for an extension (case-insensitive).
    pub fn mime_type_for_extension(ext: &str) -> Option<&'static str> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(CSV_MIME_TYPE),
            "xlsx" => Some(XLSX_MIME_TYPE),
            _ => None,
        }
    }

    /// The MIME type accepted for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => CSV_MIME_TYPE,
            Self::Spreadsheet => XLSX_MIME_TYPE,
        }
    }
}

/// A file picked by the user: its name, declared MIME type and content.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, declaring its MIME type from the extension.
    ///
    /// Unknown extensions are declared as `application/octet-stream`, which the pipeline rejects.
    pub fn from_path(path: impl AsRef<Path>) -> UploadResult<Self> {
        let path = path.as_ref();
        let mime_type = path
            .extension()
            .and_then(|s| s.to_str())
            .and_then(UploadFormat::mime_type_for_extension)
            .unwrap_or("application/octet-stream");
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = std::fs::read(path)?;
        Ok(Self::new(name, mime_type, bytes))
    }

    /// Observer context for this file.
    pub fn context(&self) -> UploadContext {
        UploadContext {
            file_name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            format: UploadFormat::from_mime_type(&self.mime_type),
        }
    }
}

/// Options controlling the upload pipeline.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct UploadOptions {
    /// How many rows the preview exposes.
    pub preview_rows: usize,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn UploadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: UploadSeverity,
}

impl fmt::Debug for UploadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadOptions")
            .field("preview_rows", &self.preview_rows)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
            observer: None,
            alert_at_or_above: UploadSeverity::Critical,
        }
    }
}

impl UploadOptions {
    /// Report a failure to the configured observer, alerting when at or above the threshold.
    pub(crate) fn notify_failure(&self, ctx: &UploadContext, error: &UploadError) {
        if let Some(obs) = self.observer.as_ref() {
            let sev = severity_for_error(error);
            obs.on_failure(ctx, sev, error);
            if sev >= self.alert_at_or_above {
                obs.on_alert(ctx, sev, error);
            }
        }
    }
}

/// Check that `file` has an accepted MIME type without parsing it.
pub fn check_file_type(file: &UploadFile) -> UploadResult<UploadFormat> {
    UploadFormat::from_mime_type(&file.mime_type).ok_or_else(|| UploadError::UnsupportedFileType {
        mime_type: file.mime_type.clone(),
    })
}

/// Parse a selected file into a [`ParsedBatch`].
///
/// When an observer is configured, this function reports:
///
/// - `on_parsed` on success, with row count stats
/// - `on_failure` on failure (including a rejected MIME type), with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```rust
/// use leave_ingest::ingestion::{parse_upload, UploadFile, UploadOptions, CSV_MIME_TYPE};
///
/// # fn main() -> Result<(), leave_ingest::UploadError> {
/// let file = UploadFile::new(
///     "leave.csv",
///     CSV_MIME_TYPE,
///     "Staff ID,Leave Type\nS1,Annual\nS2,Sick\n",
/// );
/// let batch = parse_upload(&file, &UploadOptions::default())?;
/// assert_eq!(batch.row_count(), 2);
/// assert_eq!(batch.rows()[1].text("Leave Type"), Some("Sick"));
/// # Ok(())
/// # }
/// ```
///
/// Anything other than CSV or xlsx is rejected up front:
///
/// ```rust
/// use leave_ingest::ingestion::{parse_upload, UploadFile, UploadOptions};
/// use leave_ingest::UploadError;
///
/// let file = UploadFile::new("leave.pdf", "application/pdf", b"%PDF-1.7".to_vec());
/// let err = parse_upload(&file, &UploadOptions::default()).unwrap_err();
/// assert!(matches!(err, UploadError::UnsupportedFileType { .. }));
/// ```
pub fn parse_upload(file: &UploadFile, options: &UploadOptions) -> UploadResult<ParsedBatch> {
    let ctx = file.context();

    let result = check_file_type(file).and_then(|fmt| parse_bytes(fmt, &file.bytes));

    match &result {
        Ok(batch) => {
            if let Some(obs) = options.observer.as_ref() {
                obs.on_parsed(&ctx, ParseStats { rows: batch.row_count() });
            }
        }
        Err(e) => options.notify_failure(&ctx, e),
    }

    result
}

/// Parse raw bytes in a known format.
pub fn parse_bytes(format: UploadFormat, bytes: &[u8]) -> UploadResult<ParsedBatch> {
    match format {
        UploadFormat::Csv => csv::parse_csv_bytes(bytes),
        UploadFormat::Spreadsheet => parse_spreadsheet_dispatch(bytes),
    }
}

fn parse_spreadsheet_dispatch(bytes: &[u8]) -> UploadResult<ParsedBatch> {
    // Avoid unused warnings when the feature is off.
    let _ = bytes;

    #[cfg(feature = "excel")]
    {
        super::excel::parse_xlsx_bytes(bytes)
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(UploadError::ExcelDisabled)
    }
}
