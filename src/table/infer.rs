//! Column kind inference from raw cell text.
//!
//! The CSV reader hands every cell over as text. A column becomes numeric
//! when every present cell parses as a number, temporal when every present
//! cell is a date or date-time written exactly the way the column would be
//! written back, and text otherwise. Missing-value tokens follow the usual
//! spreadsheet/pandas conventions.

use super::{Column, ColumnData, DATE_FORMAT, DATETIME_FORMAT};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::{HashMap, HashSet};

/// Cell contents treated as "no value".
pub const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

pub fn is_missing_token(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell)
}

/// Parses a numeric cell. Surrounding whitespace is allowed; NaN is not.
pub fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

pub fn parse_datetime(cell: &str) -> Option<NaiveDateTime> {
    let trimmed = cell.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Builds a column from raw cells. `None` cells (padding for short rows)
/// are missing, as are cells matching [`MISSING_TOKENS`].
pub fn infer_column(name: String, raw: Vec<Option<String>>) -> Column {
    let cells: Vec<Option<String>> = raw
        .into_iter()
        .map(|cell| cell.filter(|s| !is_missing_token(s)))
        .collect();

    let numbers: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            Some(s) => parse_number(s).map(Some),
            None => Some(None),
        })
        .collect();
    if let Some(values) = numbers {
        return Column::new(name, ColumnData::Numeric(values));
    }

    let datetimes: Option<Vec<Option<NaiveDateTime>>> = cells
        .iter()
        .map(|cell| match cell {
            Some(s) => parse_datetime(s).map(Some),
            None => Some(None),
        })
        .collect();
    if let Some(values) = datetimes
        && is_canonical(&cells, &values)
    {
        return Column::new(name, ColumnData::Temporal(values));
    }

    Column::new(name, ColumnData::Text(cells))
}

/// True when rendering `values` reproduces `cells` exactly. Anything else
/// (`2024/01/05`, `T` separators, dates mixed with date-times) stays text.
fn is_canonical(cells: &[Option<String>], values: &[Option<NaiveDateTime>]) -> bool {
    let date_only = values
        .iter()
        .flatten()
        .all(|dt| dt.time() == NaiveTime::MIN);
    let format = if date_only { DATE_FORMAT } else { DATETIME_FORMAT };

    cells.iter().zip(values).all(|(cell, value)| match (cell, value) {
        (Some(text), Some(dt)) => dt.format(format).to_string() == *text,
        _ => true,
    })
}

/// Makes header names usable as unique column names: blank headers become
/// `Unnamed: <index>`, repeats of `x` become `x.1`, `x.2`, ...
pub fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(headers.len());

    for (index, header) in headers.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {index}")
        } else {
            header
        };

        let name = if seen.contains(&base) {
            let counter = counters.entry(base.clone()).or_insert(1);
            loop {
                let candidate = format!("{base}.{counter}");
                *counter += 1;
                if !seen.contains(&candidate) {
                    break candidate;
                }
            }
        } else {
            base
        };

        seen.insert(name.clone());
        names.push(name);
    }

    names
}
