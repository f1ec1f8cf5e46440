//! User-facing notifications for upload outcomes.

use std::fmt;

use crate::error::UploadError;
use crate::types::{BulkIngestResponse, RowIssue};

/// Severity/colour of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

/// A toast-style message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// How many offending rows are spelled out before the rest is summarized.
const LISTED_ROWS: usize = 10;

/// Notifications for a completed bulk upload.
///
/// Always one success summary; an error notification only if records failed and a duplicate
/// notification only if duplicates were skipped. Counts come from the lists in `details` when
/// the service filled them, otherwise from `summary`.
pub fn report_outcome(response: &BulkIngestResponse) -> Vec<Notification> {
    let summary = &response.summary;
    let details = &response.details;

    let mut out = vec![Notification::new(
        NotificationLevel::Success,
        "Upload completed",
        format!(
            "Processed {} records: {} inserted, {} duplicates, {} errors",
            summary.total, summary.inserted, summary.duplicates, summary.errors
        ),
    )];

    let errors = issue_count(&details.errors, summary.errors);
    if errors > 0 {
        let mut description = format!("{errors} records had errors.");
        if !details.errors.is_empty() {
            description.push(' ');
            description.push_str(&list_rows(&details.errors));
        }
        out.push(Notification::new(NotificationLevel::Error, "Some records failed", description));
    }

    let duplicates = issue_count(&details.duplicates, summary.duplicates);
    if duplicates > 0 {
        let mut description = format!("{duplicates} duplicate records were skipped.");
        if !details.duplicates.is_empty() {
            description.push(' ');
            description.push_str(&list_rows(&details.duplicates));
        }
        out.push(Notification::new(NotificationLevel::Warning, "Duplicates found", description));
    }

    out
}

fn issue_count(list: &[RowIssue], summary_count: u64) -> u64 {
    if list.is_empty() { summary_count } else { list.len() as u64 }
}

fn list_rows(issues: &[RowIssue]) -> String {
    let mut listed: Vec<String> = issues.iter().take(LISTED_ROWS).map(RowIssue::describe).collect();
    if issues.len() > LISTED_ROWS {
        listed.push(format!("and {} more", issues.len() - LISTED_ROWS));
    }
    format!("Affected: {}", listed.join(", "))
}

/// The single notification shown for a failed pipeline step.
pub fn report_error(error: &UploadError) -> Notification {
    let (level, title, description) = match error {
        UploadError::UnsupportedFileType { .. } => (
            NotificationLevel::Error,
            "Invalid file type",
            "Please upload a CSV or Excel file".to_string(),
        ),
        UploadError::EmptyBatch => (
            NotificationLevel::Error,
            "No records to upload",
            "Please select a CSV or Excel file with at least one data row".to_string(),
        ),
        UploadError::InvalidState { .. } => (NotificationLevel::Warning, "Please wait", error.to_string()),
        UploadError::Submission(e) => (NotificationLevel::Error, "Upload failed", e.to_string()),
        other if other.is_parse_error() => (NotificationLevel::Error, "Error parsing file", other.to_string()),
        other => (NotificationLevel::Error, "Upload failed", other.to_string()),
    };
    Notification::new(level, title, description)
}
