//! Cell parsers shared by the row schemas

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::models::{ImportRow, Lookup, RowIssue};

/// Non-empty trimmed text
pub fn required<'a>(
    row: &'a ImportRow,
    index: usize,
    column: &'static str,
) -> Result<&'a str, RowIssue> {
    row.cell(index).ok_or(RowIssue::Missing { column })
}

/// Wall-clock time as `HH:MM`
///
/// `HH:MM:00` is accepted; any other seconds value is invalid.
pub fn time(row: &ImportRow, index: usize, column: &'static str) -> Result<NaiveTime, RowIssue> {
    let value = required(row, index, column)?;
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
        .filter(|t| t.second() == 0)
        .ok_or_else(|| RowIssue::InvalidTime {
            column,
            value: value.to_string(),
        })
}

/// Calendar date as `YYYY-MM-DD`
pub fn date(row: &ImportRow, index: usize, column: &'static str) -> Result<NaiveDate, RowIssue> {
    let value = required(row, index, column)?;
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| RowIssue::InvalidDate {
        column,
        value: value.to_string(),
    })
}

/// Integer inside the closed range `min..=max`
pub fn int_in_range(
    row: &ImportRow,
    index: usize,
    column: &'static str,
    min: u8,
    max: u8,
) -> Result<u8, RowIssue> {
    let value = required(row, index, column)?;
    let parsed: i64 = value.parse().map_err(|_| RowIssue::NotInteger {
        column,
        value: value.to_string(),
    })?;

    if parsed < i64::from(min) || parsed > i64::from(max) {
        return Err(RowIssue::OutOfRange {
            column,
            value: parsed,
            min: i64::from(min),
            max: i64::from(max),
        });
    }

    Ok(parsed as u8)
}

/// Id behind a resolved name; missing and ambiguous names reject the row
pub fn reference<'a>(
    lookup: Lookup<'a>,
    column: &'static str,
    value: &str,
) -> Result<&'a str, RowIssue> {
    match lookup {
        Lookup::Found(id) => Ok(id),
        Lookup::Missing => Err(RowIssue::UnknownReference {
            column,
            value: value.to_string(),
        }),
        Lookup::Ambiguous(matches) => Err(RowIssue::AmbiguousReference {
            column,
            value: value.to_string(),
            matches,
        }),
    }
}

/// `HH:MM` rendering used in store payloads
pub fn format_time(value: NaiveTime) -> String {
    value.format("%H:%M").to_string()
}
