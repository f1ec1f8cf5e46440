//! Leave application records and the single-application form.
//!
//! - [`LeaveApplication`]: a row of the remote `leave_applications` table
//! - [`NewLeaveApplication`]: the form payload for one request, with local validation
//! - [`table`]: filter/sort/paginate state for the applications table
//! - [`stats`]: dashboard counters

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{RemoteError, RemoteResult};
use crate::remote::DataStore;

pub mod stats;
pub mod table;

pub use stats::LeaveStats;
pub use table::{LeaveColumn, LeaveFilter, LeaveTable, SortDirection, DEFAULT_PAGE_SIZE};

/// Leave types offered by the application form.
pub const LEAVE_TYPES: [&str; 3] = ["Annual", "Sick", "Emergency"];

/// Approval state of a leave application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    /// Any status string this client does not know about, kept verbatim.
    Other(String),
}

impl LeaveStatus {
    pub fn as_str(&self) -> &str {
        match self {
            LeaveStatus::Pending => "Pending",
            LeaveStatus::Approved => "Approved",
            LeaveStatus::Rejected => "Rejected",
            LeaveStatus::Other(s) => s,
        }
    }
}

impl From<String> for LeaveStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Pending" => LeaveStatus::Pending,
            "Approved" => LeaveStatus::Approved,
            "Rejected" => LeaveStatus::Rejected,
            _ => LeaveStatus::Other(s),
        }
    }
}

impl From<LeaveStatus> for String {
    fn from(s: LeaveStatus) -> Self {
        match s {
            LeaveStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored leave application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApplication {
    #[serde(deserialize_with = "string_or_number")]
    pub employee_id: String,
    pub employee_name: String,
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
}

impl LeaveApplication {
    /// `true` if `day` falls within the inclusive leave range.
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    /// Every calendar day of the leave, start to end inclusive. Empty if the range is inverted.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |d| *d <= self.end_date)
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// A validation failure on one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Payload of the single leave application form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeaveApplication {
    pub employee_id: String,
    pub employee_name: String,
    pub leave_type: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: LeaveStatus,
}

impl NewLeaveApplication {
    /// Check every field, returning all failures rather than the first.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.employee_id.trim().is_empty() {
            errors.push(FieldError::new("employeeId", "Employee ID is required"));
        }
        if self.employee_name.trim().is_empty() {
            errors.push(FieldError::new("employeeName", "Employee Name is required"));
        }
        if self.leave_type.trim().is_empty() {
            errors.push(FieldError::new("leaveType", "Leave Type is required"));
        }
        if self.start_date.is_none() {
            errors.push(FieldError::new("startDate", "Start Date is required"));
        }
        match (self.start_date, self.end_date) {
            (_, None) => errors.push(FieldError::new("endDate", "End Date is required")),
            (Some(start), Some(end)) if end < start => {
                errors.push(FieldError::new("endDate", "End Date must not be before Start Date"))
            }
            _ => {}
        }
        if self.status.as_str().trim().is_empty() {
            errors.push(FieldError::new("status", "Status is required"));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Validate `application` locally and, if it passes, send it through `store`.
///
/// Validation failures never reach the service; they come back as [`RemoteError::Invalid`] listing
/// every failing field.
pub async fn submit_application(
    store: &dyn DataStore,
    application: &NewLeaveApplication,
) -> RemoteResult<serde_json::Value> {
    if let Err(errors) = application.validate() {
        let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(RemoteError::Invalid(joined.join("; ")));
    }
    let answer = store.submit_leave_application(application).await?;
    tracing::info!(
        target: "leave_ingest::leave",
        employee = %application.employee_id,
        leave_type = %application.leave_type,
        "leave application submitted"
    );
    Ok(answer)
}
