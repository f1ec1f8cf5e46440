//! The bulk-upload pipeline: select → parse → preview → submit → report.
//!
//! [`BulkUpload`] owns the transient state of one upload. Its state machine is
//!
//! ```text
//! Idle → FileSelected → Previewing → Submitting → { Succeeded | Failed } → Idle
//! ```
//!
//! and [`BulkUpload::reset`] returns to `Idle` from anywhere. Submitting borrows the pipeline
//! mutably for the whole remote call, so a second selection or submit cannot start mid-flight.
//!
//! ```rust
//! use leave_ingest::ingestion::{UploadFile, UploadOptions, CSV_MIME_TYPE};
//! use leave_ingest::pipeline::{BulkUpload, UploadState};
//!
//! let mut upload = BulkUpload::new(UploadOptions::default());
//! let notes = upload.select_file(UploadFile::new(
//!     "leave.csv",
//!     CSV_MIME_TYPE,
//!     "Staff ID,Start Date\nS1,2024-05-01\n",
//! ));
//! assert!(notes.is_empty());
//! assert_eq!(upload.state(), UploadState::Previewing);
//! assert_eq!(upload.preview().len(), 1);
//! ```

use std::fmt;

use crate::error::{UploadError, UploadResult};
use crate::ingestion::{check_file_type, parse_upload, UploadContext, UploadFile, UploadOptions};
use crate::remote::BulkIngestOperation;
use crate::report::{report_error, report_outcome, Notification};
use crate::types::{BulkIngestResponse, ParsedBatch, UploadRow};

/// Where a [`BulkUpload`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    FileSelected,
    Previewing,
    Submitting,
    Succeeded,
    Failed,
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UploadState::Idle => "idle",
            UploadState::FileSelected => "file selected",
            UploadState::Previewing => "previewing",
            UploadState::Submitting => "submitting",
            UploadState::Succeeded => "succeeded",
            UploadState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Send `batch` to the bulk-ingestion operation exactly once.
///
/// An empty batch is refused locally. The response is returned unmodified; there is no retry.
pub async fn submit_batch(op: &dyn BulkIngestOperation, batch: &ParsedBatch) -> UploadResult<BulkIngestResponse> {
    if batch.is_empty() {
        return Err(UploadError::EmptyBatch);
    }
    Ok(op.ingest(batch).await?)
}

/// State of one bulk upload.
#[derive(Debug)]
pub struct BulkUpload {
    options: UploadOptions,
    state: UploadState,
    file: Option<UploadFile>,
    batch: Option<ParsedBatch>,
    last_response: Option<BulkIngestResponse>,
}

impl Default for BulkUpload {
    fn default() -> Self {
        Self::new(UploadOptions::default())
    }
}

impl BulkUpload {
    pub fn new(options: UploadOptions) -> Self {
        Self {
            options,
            state: UploadState::Idle,
            file: None,
            batch: None,
            last_response: None,
        }
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn file(&self) -> Option<&UploadFile> {
        self.file.as_ref()
    }

    pub fn batch(&self) -> Option<&ParsedBatch> {
        self.batch.as_ref()
    }

    /// The first `options.preview_rows` rows; empty when nothing is parsed.
    pub fn preview(&self) -> &[UploadRow] {
        self.batch
            .as_ref()
            .map(|b| b.preview(self.options.preview_rows))
            .unwrap_or(&[])
    }

    /// Response of the last successful submit.
    pub fn last_response(&self) -> Option<&BulkIngestResponse> {
        self.last_response.as_ref()
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        matches!(self.state, UploadState::Previewing | UploadState::Failed)
            && self.batch.as_ref().is_some_and(|b| !b.is_empty())
    }

    /// [`Self::try_select_file`], with any error turned into a notification.
    pub fn select_file(&mut self, file: UploadFile) -> Vec<Notification> {
        match self.try_select_file(file) {
            Ok(_) => Vec::new(),
            Err(e) => vec![report_error(&e)],
        }
    }

    /// Check the file type, parse the file and keep the batch for preview.
    ///
    /// - Unsupported type: rejected before parsing, state unchanged.
    /// - Parse failure: the batch is discarded and the pipeline goes back to `Idle`.
    /// - Success: `Previewing`, returning the preview rows.
    pub fn try_select_file(&mut self, file: UploadFile) -> UploadResult<&[UploadRow]> {
        if self.state == UploadState::Submitting {
            return Err(self.invalid_state("select a file"));
        }
        if let Err(e) = check_file_type(&file) {
            self.options.notify_failure(&file.context(), &e);
            return Err(e);
        }

        self.state = UploadState::FileSelected;
        self.batch = None;
        self.last_response = None;

        match parse_upload(&file, &self.options) {
            Ok(batch) => {
                self.file = Some(file);
                self.batch = Some(batch);
                self.state = UploadState::Previewing;
                Ok(self.preview())
            }
            Err(e) => {
                self.file = None;
                self.state = UploadState::Idle;
                Err(e)
            }
        }
    }

    /// [`Self::try_submit`], with the outcome turned into notifications.
    pub async fn submit(&mut self, op: &dyn BulkIngestOperation) -> Vec<Notification> {
        match self.try_submit(op).await {
            Ok(response) => report_outcome(response),
            Err(e) => vec![report_error(&e)],
        }
    }

    /// Submit the parsed batch.
    ///
    /// On success the batch and file are discarded and the pipeline is `Succeeded`. On failure it
    /// is `Failed` with the batch kept, so submit can be called again. If the returned future is
    /// dropped before the call answers, the pipeline goes back to the state it was in.
    pub async fn try_submit(&mut self, op: &dyn BulkIngestOperation) -> UploadResult<&BulkIngestResponse> {
        match self.state {
            UploadState::Previewing | UploadState::Failed => {}
            UploadState::Submitting | UploadState::FileSelected => {
                return Err(self.invalid_state("submit"));
            }
            UploadState::Idle | UploadState::Succeeded => return Err(UploadError::EmptyBatch),
        }
        let ctx = self.context();
        let Some(batch) = self.batch.as_ref().filter(|b| !b.is_empty()) else {
            let e = UploadError::EmptyBatch;
            self.options.notify_failure(&ctx, &e);
            return Err(e);
        };

        let in_flight = InFlight::enter(&mut self.state);
        let result = submit_batch(op, batch).await;

        match result {
            Ok(response) => {
                in_flight.settle(UploadState::Succeeded);
                if let Some(obs) = self.options.observer.as_ref() {
                    obs.on_submitted(&ctx, &response.summary);
                }
                self.batch = None;
                self.file = None;
                Ok(self.last_response.insert(response))
            }
            Err(e) => {
                in_flight.settle(UploadState::Failed);
                self.options.notify_failure(&ctx, &e);
                Err(e)
            }
        }
    }

    /// Drop everything and go back to `Idle`.
    pub fn reset(&mut self) {
        self.state = UploadState::Idle;
        self.file = None;
        self.batch = None;
        self.last_response = None;
    }

    fn context(&self) -> UploadContext {
        match &self.file {
            Some(f) => f.context(),
            None => UploadContext {
                file_name: String::new(),
                mime_type: String::new(),
                format: None,
            },
        }
    }

    fn invalid_state(&self, action: &'static str) -> UploadError {
        UploadError::InvalidState {
            action,
            state: self.state.to_string(),
        }
    }
}

/// Holds the pipeline in `Submitting` for the duration of the remote call.
///
/// Dropping it without [`InFlight::settle`] puts the previous state back.
struct InFlight<'a> {
    state: &'a mut UploadState,
    prior: UploadState,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn enter(state: &'a mut UploadState) -> Self {
        let prior = std::mem::replace(state, UploadState::Submitting);
        Self {
            state,
            prior,
            settled: false,
        }
    }

    fn settle(mut self, next: UploadState) {
        *self.state = next;
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            *self.state = self.prior;
        }
    }
}
