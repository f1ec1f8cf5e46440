//! Core data model for the upload pipeline.
//!
//! An uploaded file becomes a [`ParsedBatch`] of [`UploadRow`]s. The batch is sent to the remote
//! bulk-ingestion operation, which answers with a [`BulkIngestResponse`].

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Header of the leave start column. Receives date-serial normalization in spreadsheets.
pub const START_DATE_COLUMN: &str = "Start Date";
/// Header of the leave end column. Receives date-serial normalization in spreadsheets.
pub const END_DATE_COLUMN: &str = "End Date";

/// Columns whose spreadsheet date serials are converted to ISO dates.
pub const DATE_COLUMNS: [&str; 2] = [START_DATE_COLUMN, END_DATE_COLUMN];

/// Columns the remote operation recognizes. Any other header is still forwarded verbatim.
pub const RECOGNIZED_COLUMNS: [&str; 6] = [
    "Employee Name",
    "Staff ID",
    "Leave Type",
    START_DATE_COLUMN,
    END_DATE_COLUMN,
    "Status",
];

/// A single cell of an [`UploadRow`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Displayed string value.
    Text(String),
    /// Raw spreadsheet date serial, only present before normalization.
    Serial(f64),
}

impl CellValue {
    /// The text of the cell, or `None` for a raw serial.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            CellValue::Serial(_) => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Serial(f) => serializer.serialize_f64(*f),
        }
    }
}

/// One record of an uploaded file: column name -> cell, in file column order.
///
/// Serializes as a JSON object keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadRow {
    cells: Vec<(String, CellValue)>,
}

impl UploadRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column` to `value`, replacing an existing cell in place or appending a new one.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, column: &str) -> Option<&mut CellValue> {
        self.cells.iter_mut().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    /// Convenience accessor for text cells.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(CellValue::as_text)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for UploadRow
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = UploadRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl Serialize for UploadRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Ordered rows parsed from one uploaded file. Row order is file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParsedBatch {
    rows: Vec<UploadRow>,
}

impl ParsedBatch {
    pub fn new(rows: Vec<UploadRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[UploadRow] {
        &self.rows
    }

    /// Number of rows in the batch.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first `n` rows (or fewer).
    pub fn preview(&self, n: usize) -> &[UploadRow] {
        &self.rows[..self.rows.len().min(n)]
    }

    pub fn into_rows(self) -> Vec<UploadRow> {
        self.rows
    }
}

/// Aggregate counts returned by the bulk-ingestion operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub total: u64,
    pub inserted: u64,
    pub duplicates: u64,
    pub errors: u64,
}

/// One row the remote service rejected or skipped.
///
/// The shape of these descriptors belongs to the service, so the JSON is kept exactly as received.
/// `row` and `reason` are read out of it on demand, and only for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowIssue {
    raw: serde_json::Value,
}

impl From<serde_json::Value> for RowIssue {
    fn from(raw: serde_json::Value) -> Self {
        Self { raw }
    }
}

impl RowIssue {
    pub fn new(raw: serde_json::Value) -> Self {
        Self { raw }
    }

    /// The descriptor as sent by the service.
    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    /// The `row` reference, if the descriptor is an object carrying one.
    pub fn row(&self) -> Option<&serde_json::Value> {
        self.raw.get("row").filter(|v| !v.is_null())
    }

    /// First readable text under `reason`, `error` or `message`.
    ///
    /// A nested object contributes its own `message` (or `reason`/`error`) string.
    pub fn reason(&self) -> Option<String> {
        match &self.raw {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(obj) => reason_in(obj, 1),
            _ => None,
        }
    }

    /// Short human-readable label, e.g. `row 2 (bad date)` or `Staff ID S-17`.
    pub fn describe(&self) -> String {
        let subject = match (&self.raw, self.row()) {
            (_, Some(serde_json::Value::Number(n))) => format!("row {n}"),
            (_, Some(serde_json::Value::String(s))) => format!("row {s}"),
            (_, Some(serde_json::Value::Object(obj))) => identify(obj),
            (serde_json::Value::Object(obj), _) => identify(obj),
            (serde_json::Value::Number(n), _) => format!("row {n}"),
            _ => "unknown row".to_string(),
        };
        match self.reason() {
            Some(reason) if !matches!(self.raw, serde_json::Value::String(_)) => format!("{subject} ({reason})"),
            Some(reason) => reason,
            None => subject,
        }
    }
}

const REASON_KEYS: [&str; 3] = ["reason", "error", "message"];

fn reason_in(obj: &serde_json::Map<String, serde_json::Value>, depth: u8) -> Option<String> {
    REASON_KEYS.iter().find_map(|key| match obj.get(*key) {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(serde_json::Value::Object(inner)) if depth > 0 => reason_in(inner, depth - 1),
        _ => None,
    })
}

fn identify(obj: &serde_json::Map<String, serde_json::Value>) -> String {
    for key in ["Staff ID", "employee_id", "Employee Name", "employee_name"] {
        match obj.get(key) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => return format!("{key} {s}"),
            Some(serde_json::Value::Number(n)) => return format!("{key} {n}"),
            _ => {}
        }
    }
    "unknown row".to_string()
}

/// Per-row issue lists returned by the bulk-ingestion operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadDetail {
    #[serde(default)]
    pub errors: Vec<RowIssue>,
    #[serde(default)]
    pub duplicates: Vec<RowIssue>,
}

/// Full response of the bulk-ingestion operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkIngestResponse {
    pub summary: UploadSummary,
    #[serde(default)]
    pub details: UploadDetail,
}

/// Request body of the bulk-ingestion operation.
#[derive(Debug, Serialize)]
pub struct BulkIngestRequest<'a> {
    #[serde(rename = "csvData")]
    pub csv_data: &'a ParsedBatch,
}
