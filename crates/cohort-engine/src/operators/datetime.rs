//! Date comparison operators
//!
//! Dates in uploaded data are strings in whatever format the source system
//! produced. Parsing tries ISO-8601 first, then a handful of formats seen in
//! real exports. Values are normalized to start-of-day before comparing; an
//! unparseable date on either side fails the predicate, it never errors.

use cohort_model::{CellValue, FilterOp};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date-only formats tried after ISO-8601.
const FALLBACK_DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%m/%d/%Y", "%m/%d/%y", "%d-%b-%Y"];

/// Parse a cell as a calendar date, normalized to start-of-day.
pub fn parse_cell_date(cell: &CellValue) -> Option<NaiveDate> {
    let text = cell.to_display_string();
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    FALLBACK_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Evaluate a date comparison. `value2` is the upper bound for
/// `between_dates` (inclusive on both ends).
pub fn compare_dates(
    op: &FilterOp,
    cell: &CellValue,
    value: &CellValue,
    value2: Option<&CellValue>,
) -> bool {
    let Some(lhs) = parse_cell_date(cell) else {
        return false;
    };
    let Some(rhs) = parse_cell_date(value) else {
        return false;
    };
    match op {
        FilterOp::OnDate => lhs == rhs,
        FilterOp::Before => lhs < rhs,
        FilterOp::After => lhs > rhs,
        FilterOp::OnOrBefore => lhs <= rhs,
        FilterOp::OnOrAfter => lhs >= rhs,
        FilterOp::BetweenDates => match value2.and_then(parse_cell_date) {
            Some(hi) => rhs <= lhs && lhs <= hi,
            None => false,
        },
        _ => false,
    }
}
