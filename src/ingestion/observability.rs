use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{RemoteError, UploadError};
use crate::types::UploadSummary;

use super::unified::UploadFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UploadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (I/O or transport failures).
    Critical,
}

/// Context about one uploaded file.
#[derive(Debug, Clone)]
pub struct UploadContext {
    /// Name of the selected file, as given by the caller.
    pub file_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Resolved format, `None` if the MIME type was rejected.
    pub format: Option<UploadFormat>,
}

/// Stats reported after a file was parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    /// Number of parsed rows.
    pub rows: usize,
}

/// Observer interface for upload outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait UploadObserver: Send + Sync {
    /// Called when a file was parsed into a batch.
    fn on_parsed(&self, _ctx: &UploadContext, _stats: ParseStats) {}

    /// Called when the remote bulk operation answered.
    fn on_submitted(&self, _ctx: &UploadContext, _summary: &UploadSummary) {}

    /// Called when selecting, parsing or submitting failed.
    fn on_failure(&self, _ctx: &UploadContext, _severity: UploadSeverity, _error: &UploadError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Classify an upload error for observers.
pub fn severity_for_error(e: &UploadError) -> UploadSeverity {
    match e {
        UploadError::Io(_) => UploadSeverity::Critical,
        UploadError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => UploadSeverity::Critical,
            _ => UploadSeverity::Error,
        },
        #[cfg(feature = "excel")]
        UploadError::Excel(_) => UploadSeverity::Error,
        UploadError::Submission(RemoteError::Http(_)) => UploadSeverity::Critical,
        UploadError::Submission(_) => UploadSeverity::Error,
        UploadError::UnsupportedFileType { .. } | UploadError::ExcelDisabled => UploadSeverity::Error,
        UploadError::EmptyBatch | UploadError::InvalidState { .. } => UploadSeverity::Warning,
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn UploadObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn UploadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl UploadObserver for CompositeObserver {
    fn on_parsed(&self, ctx: &UploadContext, stats: ParseStats) {
        for o in &self.observers {
            o.on_parsed(ctx, stats);
        }
    }

    fn on_submitted(&self, ctx: &UploadContext, summary: &UploadSummary) {
        for o in &self.observers {
            o.on_submitted(ctx, summary);
        }
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits upload events as `tracing` events under the `leave_ingest::upload` target.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl UploadObserver for TracingObserver {
    fn on_parsed(&self, ctx: &UploadContext, stats: ParseStats) {
        tracing::info!(
            target: "leave_ingest::upload",
            file = %ctx.file_name,
            format = ?ctx.format,
            rows = stats.rows,
            "file parsed"
        );
    }

    fn on_submitted(&self, ctx: &UploadContext, summary: &UploadSummary) {
        tracing::info!(
            target: "leave_ingest::upload",
            file = %ctx.file_name,
            total = summary.total,
            inserted = summary.inserted,
            duplicates = summary.duplicates,
            errors = summary.errors,
            "bulk upload completed"
        );
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        match severity {
            UploadSeverity::Info | UploadSeverity::Warning => tracing::warn!(
                target: "leave_ingest::upload",
                file = %ctx.file_name,
                mime = %ctx.mime_type,
                severity = ?severity,
                %error,
                "upload step refused"
            ),
            UploadSeverity::Error | UploadSeverity::Critical => tracing::error!(
                target: "leave_ingest::upload",
                file = %ctx.file_name,
                mime = %ctx.mime_type,
                severity = ?severity,
                %error,
                "upload step failed"
            ),
        }
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        tracing::error!(
            target: "leave_ingest::upload",
            alert = true,
            file = %ctx.file_name,
            mime = %ctx.mime_type,
            severity = ?severity,
            %error,
            "upload alert"
        );
    }
}

/// Appends upload events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl UploadObserver for FileObserver {
    fn on_parsed(&self, ctx: &UploadContext, stats: ParseStats) {
        self.append_line(&format!(
            "{} parsed format={:?} file={} rows={}",
            unix_ts(),
            ctx.format,
            ctx.file_name,
            stats.rows
        ));
    }

    fn on_submitted(&self, ctx: &UploadContext, summary: &UploadSummary) {
        self.append_line(&format!(
            "{} submitted file={} total={} inserted={} duplicates={} errors={}",
            unix_ts(),
            ctx.file_name,
            summary.total,
            summary.inserted,
            summary.duplicates,
            summary.errors
        ));
    }

    fn on_failure(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        self.append_line(&format!(
            "{} fail severity={:?} mime={} file={} err={}",
            unix_ts(),
            severity,
            ctx.mime_type,
            ctx.file_name,
            error
        ));
    }

    fn on_alert(&self, ctx: &UploadContext, severity: UploadSeverity, error: &UploadError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} mime={} file={} err={}",
            unix_ts(),
            severity,
            ctx.mime_type,
            ctx.file_name,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
