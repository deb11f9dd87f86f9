//! Date normalization between the two canonical textual forms.
//!
//! The flat model always shows dates as `DD/MM/YYYY`; the XML model always
//! carries ISO `YYYY-MM-DD`. Inputs arrive in a handful of source formats
//! (spreadsheet exports, hand-edited CSVs, Excel serial numbers), so parsing
//! is lenient and day-first; formatting is strict. Conversion between the two
//! canonical forms is lossless for valid calendar dates.

use chrono::{Duration, NaiveDate};

/// Display form used by the flat/tabular model.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Wire form used by the XML model.
pub const ISO_FORMAT: &str = "%Y-%m-%d";

/// Day zero of the 1900 Excel date system (accounting for the leap-year bug).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Day-first source formats accepted by the lenient pass, most common first.
const LENIENT_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

pub fn format_display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// Strict ISO → display reformat used while walking guide elements: only a
/// text that parses exactly as `YYYY-MM-DD` is rewritten, anything else is
/// left to the caller untouched.
pub fn reformat_iso_to_display(value: &str) -> Option<String> {
    NaiveDate::parse_from_str(value, ISO_FORMAT)
        .ok()
        .map(format_display)
}

/// Lenient day-first parse for the tabular second pass. Datetime-suffixed
/// variants cover spreadsheet exports that append a midnight time.
pub fn parse_lenient(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in LENIENT_FORMATS {
        if format.contains("%H") {
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, format) {
                return Some(dt.date());
            }
        } else if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    None
}

/// Convert a flat-model value to the ISO wire form for export. Tries the
/// canonical forms first, then a US-ordered fallback, then an Excel serial
/// number. `None` means the element is omitted entirely.
pub fn to_iso_string(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in [ISO_FORMAT, DISPLAY_FORMAT, "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(format_iso(date));
        }
    }
    from_excel_serial(trimmed).map(format_iso)
}

/// Excel serial-number fallback: days since 1899-12-30, fractional part
/// (time of day) discarded.
fn from_excel_serial(value: &str) -> Option<NaiveDate> {
    let serial: f64 = value.parse().ok()?;
    if !serial.is_finite() || serial.abs() > 200_000.0 {
        return None;
    }
    let (year, month, day) = EXCEL_EPOCH;
    let base = NaiveDate::from_ymd_opt(year, month, day)?;
    base.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Age in whole years between two display-form dates, floor semantics
/// (365-day years). `None` whenever either side fails to parse.
pub fn age_at_realization(birth: &str, realization: &str) -> Option<i64> {
    let birth = NaiveDate::parse_from_str(birth.trim(), DISPLAY_FORMAT).ok()?;
    let realization = NaiveDate::parse_from_str(realization.trim(), DISPLAY_FORMAT).ok()?;
    Some(realization.signed_duration_since(birth).num_days().div_euclid(365))
}
