//! Upload parsing entrypoints and implementations.
//!
//! Most callers should use [`parse_upload`] (from [`unified`]) which:
//!
//! - accepts only CSV and xlsx MIME types
//! - parses the file into an in-memory [`crate::types::ParsedBatch`]
//! - optionally reports success/failure/alerts to an [`UploadObserver`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - `excel` (feature `excel`)
//! - [`dates`] for spreadsheet date-serial conversion

pub mod csv;
pub mod dates;
#[cfg(feature = "excel")]
pub mod excel;
pub mod observability;
pub mod unified;

/// Column names by position, shared by the CSV and spreadsheet parsers.
///
/// A blank header drops its column (`None`). A repeated name gets `_1`, `_2`... appended.
pub(crate) fn unique_headers<I, S>(names: I) -> Vec<Option<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen: Vec<String> = Vec::new();
    names
        .into_iter()
        .map(|n| {
            let base: String = n.into();
            if base.trim().is_empty() {
                return None;
            }
            let mut name = base.clone();
            let mut i = 1;
            while seen.contains(&name) {
                name = format!("{base}_{i}");
                i += 1;
            }
            seen.push(name.clone());
            Some(name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::unique_headers;

    #[test]
    fn repeated_and_blank_headers() {
        let names = unique_headers(["Status", "", "Status", "Status_1", "Status"]);
        assert_eq!(
            names,
            vec![
                Some("Status".to_string()),
                None,
                Some("Status_1".to_string()),
                Some("Status_1_1".to_string()),
                Some("Status_2".to_string()),
            ]
        );
    }
}

pub use observability::{
    severity_for_error, CompositeObserver, FileObserver, ParseStats, TracingObserver, UploadContext,
    UploadObserver, UploadSeverity,
};
pub use unified::{
    check_file_type, parse_bytes, parse_upload, UploadFile, UploadFormat, UploadOptions, CSV_MIME_TYPE,
    DEFAULT_PREVIEW_ROWS, XLSX_MIME_TYPE,
};
