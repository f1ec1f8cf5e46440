#![cfg(feature = "excel")]

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use crate::error::UploadResult;
use crate::types::{CellValue, ParsedBatch, UploadRow, DATE_COLUMNS};

use super::dates::{display_number, normalize_row_dates, serial_to_iso_date};
use super::unique_headers;

/// Parse an Excel workbook (`.xlsx`, also `.xls`/`.ods` by content sniffing) into a `ParsedBatch`.
///
/// Behavior:
/// - Only the first sheet is read
/// - The first non-empty row is the header row; blank header cells drop their column and repeated
///   names get `_1`, `_2`... suffixes
/// - Every cell becomes its displayed string; empty cells are left out of the row and rows with no
///   non-empty cell are skipped
/// - Numeric `Start Date` / `End Date` cells are treated as date serials and become `YYYY-MM-DD`
/// - A workbook with no sheets, an empty first sheet, or only a header row yields an empty batch
pub fn parse_xlsx_bytes(bytes: &[u8]) -> UploadResult<ParsedBatch> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let Some(first_sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(ParsedBatch::default());
    };
    let range = workbook.worksheet_range(&first_sheet)?;

    Ok(parse_sheet_range(&range))
}

fn parse_sheet_range(range: &Range<Data>) -> ParsedBatch {
    let mut rows_iter = range
        .rows()
        .skip_while(|row| row.iter().all(|c| matches!(c, Data::Empty)));

    let Some(header_row) = rows_iter.next() else {
        return ParsedBatch::default();
    };
    let headers = build_headers(header_row);

    let mut rows: Vec<UploadRow> = Vec::new();
    for cells in rows_iter {
        let mut row = UploadRow::new();
        for (col_idx, header) in headers.iter().enumerate() {
            let Some(header) = header else { continue };
            let cell = cells.get(col_idx).unwrap_or(&Data::Empty);
            if let Some(value) = convert_cell(header, cell) {
                row.insert(header.as_str(), value);
            }
        }
        if row.is_empty() {
            continue;
        }
        normalize_row_dates(&mut row);
        rows.push(row);
    }

    ParsedBatch::new(rows)
}

/// Header names by column index; `None` for columns with a blank header.
fn build_headers(header_row: &[Data]) -> Vec<Option<String>> {
    unique_headers(header_row.iter().map(display_cell))
}

fn convert_cell(column: &str, c: &Data) -> Option<CellValue> {
    if matches!(c, Data::Empty) {
        return None;
    }
    if DATE_COLUMNS.contains(&column) {
        match c {
            Data::Int(i) => return Some(CellValue::Serial(*i as f64)),
            Data::Float(f) => return Some(CellValue::Serial(*f)),
            Data::DateTime(dt) if !dt.is_duration() => return Some(CellValue::Serial(dt.as_f64())),
            _ => {}
        }
    }
    Some(CellValue::Text(display_cell(c)))
}

fn display_cell(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => display_number(*f),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(dt) if !dt.is_duration() => display_datetime(dt.as_f64()),
        Data::DateTime(dt) => display_number(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
        Data::Empty => String::new(),
    }
}

fn display_datetime(serial: f64) -> String {
    let Some(date) = serial_to_iso_date(serial) else {
        return display_number(serial);
    };
    let secs = (serial.fract() * 86_400.0).round() as u32;
    if secs == 0 || secs >= 86_400 {
        return date;
    }
    format!("{date} {:02}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
}
