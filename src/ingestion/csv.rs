//! CSV parsing.

use crate::error::UploadResult;
use crate::types::{ParsedBatch, UploadRow};

use super::unique_headers;

/// Parse CSV bytes into a [`ParsedBatch`].
///
/// Rules:
///
/// - The first record is the header; every later record becomes one row keyed by header name.
/// - A blank header drops its column; repeated header names get `_1`, `_2`... suffixes, the same
///   way spreadsheet headers do.
/// - Values are kept verbatim (no trimming, no date handling).
/// - Fully blank lines are skipped.
/// - A record whose field count differs from the header is an error.
/// - Empty input, or a header with no data rows, yields an empty batch.
pub fn parse_csv_bytes(bytes: &[u8]) -> UploadResult<ParsedBatch> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);
    parse_csv_from_reader(&mut rdr)
}

/// Parse CSV data from an existing CSV reader.
pub fn parse_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> UploadResult<ParsedBatch> {
    let headers = rdr.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Ok(ParsedBatch::default());
    }

    let columns = unique_headers(headers.iter());

    let mut rows: Vec<UploadRow> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let row: UploadRow = columns
            .iter()
            .zip(record.iter())
            .filter_map(|(column, value)| column.as_deref().map(|c| (c, value)))
            .collect();
        rows.push(row);
    }

    Ok(ParsedBatch::new(rows))
}
