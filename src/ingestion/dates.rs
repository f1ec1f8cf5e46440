//! Spreadsheet date-serial conversion.
//!
//! Serials count days from 1899-12-31 (serial 1 is 1900-01-01) and keep the 1900 leap-year bug:
//! serial 60 is the non-existent `1900-02-29`, so every later serial is one day ahead of a plain
//! day count.

use chrono::{Duration, NaiveDate};

use crate::types::{CellValue, UploadRow, DATE_COLUMNS};

const PHANTOM_LEAP_DAY: &str = "1900-02-29";
const PHANTOM_LEAP_SERIAL: i64 = 60;

fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 31).unwrap_or_default()
}

/// Convert a spreadsheet date serial to `YYYY-MM-DD`.
///
/// The time-of-day fraction is dropped. Returns `None` for serials below 1 or beyond the
/// representable date range.
pub fn serial_to_iso_date(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.trunc() as i64;
    if days == PHANTOM_LEAP_SERIAL {
        return Some(PHANTOM_LEAP_DAY.to_string());
    }
    let offset = if days > PHANTOM_LEAP_SERIAL { days - 1 } else { days };
    let date = serial_epoch().checked_add_signed(Duration::try_days(offset)?)?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// Inverse of [`serial_to_iso_date`] for whole-day serials.
pub fn iso_date_to_serial(iso: &str) -> Option<i64> {
    if iso == PHANTOM_LEAP_DAY {
        return Some(PHANTOM_LEAP_SERIAL);
    }
    let date = NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok()?;
    let days = (date - serial_epoch()).num_days();
    match days {
        d if d < 1 => None,
        d if d < PHANTOM_LEAP_SERIAL => Some(d),
        d => Some(d + 1),
    }
}

/// Replace raw serials in the `Start Date` / `End Date` cells of `row` with ISO dates.
///
/// Text cells are left alone. A serial that cannot be converted keeps its displayed number.
pub fn normalize_row_dates(row: &mut UploadRow) {
    for column in DATE_COLUMNS {
        if let Some(cell) = row.get_mut(column) {
            if let CellValue::Serial(serial) = *cell {
                *cell = CellValue::Text(
                    serial_to_iso_date(serial).unwrap_or_else(|| display_number(serial)),
                );
            }
        }
    }
}

/// Displayed form of a numeric cell: integral values without a trailing `.0`.
pub(crate) fn display_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}
