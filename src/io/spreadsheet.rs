//! Excel (`.xlsx`) reading with `calamine` and writing with `rust_xlsxwriter`.

use crate::error::{Result, SweeperError};
use crate::table::infer::{is_missing_token, normalize_headers, parse_datetime};
use crate::table::{Column, ColumnData, DATETIME_FORMAT, Table};
use chrono::NaiveDateTime;
use calamine::{Data, Reader as _, Xlsx, open_workbook_from_rs};
use rust_xlsxwriter::{Format, Workbook};
use std::io::Cursor;

pub const SHEET_NAME: &str = "Sheet1";

// Worksheet limits: 1,048,576 rows (header included) and 16,384 columns.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

/// Reads the first worksheet. Its first row is the header.
///
/// Column kinds come from the cell types: a column is numeric only when every
/// present cell is a number, temporal only when every present cell is a date,
/// and text otherwise. String cells are never reparsed, so `"02134"` stays
/// text.
///
/// # Errors
///
/// [`SweeperError::SpreadsheetRead`] when the bytes are not a readable
/// workbook.
pub fn read(bytes: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;

    let Some(range) = workbook.worksheet_range_at(0) else {
        log::warn!("Workbook has no worksheets");
        return Ok(Table::default());
    };
    let range = range?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };

    let headers: Vec<String> = header
        .iter()
        .map(|cell| cell_text(cell).unwrap_or_default())
        .collect();
    let width = headers.len();

    let mut cells: Vec<Vec<Option<&Data>>> = vec![Vec::new(); width];
    for row in rows {
        for (col, column_cells) in cells.iter_mut().enumerate() {
            column_cells.push(row.get(col).filter(|cell| is_present(cell)));
        }
    }

    let columns: Vec<Column> = normalize_headers(headers)
        .into_iter()
        .zip(cells)
        .map(|(name, column_cells)| typed_column(name, &column_cells))
        .collect();

    let table = Table::new(columns)?;
    log::debug!(
        "Parsed worksheet: {} rows x {} columns",
        table.height(),
        table.width()
    );
    Ok(table)
}

fn is_present(cell: &Data) -> bool {
    match cell {
        Data::Empty | Data::Error(_) => false,
        Data::String(s) => !is_missing_token(s),
        _ => true,
    }
}

/// Builds a column from the present cells of one worksheet column.
fn typed_column(name: String, cells: &[Option<&Data>]) -> Column {
    let numbers: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(Data::Int(v)) => Some(Some(*v as f64)),
            Some(Data::Float(v)) => Some((!v.is_nan()).then_some(*v)),
            // Non-finite numbers are written as these strings.
            Some(Data::String(s)) if s == "inf" => Some(Some(f64::INFINITY)),
            Some(Data::String(s)) if s == "-inf" => Some(Some(f64::NEG_INFINITY)),
            Some(_) => None,
        })
        .collect();
    if let Some(values) = numbers {
        return Column::numeric(name, values);
    }

    let datetimes: Option<Vec<Option<NaiveDateTime>>> = cells
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(Data::DateTime(dt)) => dt.as_datetime().map(Some),
            Some(Data::DateTimeIso(s)) => parse_datetime(s).map(Some),
            Some(_) => None,
        })
        .collect();
    if let Some(values) = datetimes {
        return Column::temporal(name, values);
    }

    Column::text(
        name,
        cells.iter().map(|cell| cell.and_then(cell_text)).collect(),
    )
}

/// Textual form of a cell, for headers and text columns.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Int(v) => Some(v.to_string()),
        Data::Float(v) => Some(v.to_string()),
        Data::String(s) => Some(s.clone()),
        Data::Bool(b) => Some(if *b { "True" } else { "False" }.to_owned()),
        Data::DateTime(dt) => Some(
            dt.as_datetime()
                .map(|d| d.format(DATETIME_FORMAT).to_string())
                .unwrap_or_else(|| dt.as_f64().to_string()),
        ),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        _ => None,
    }
}

/// Writes a single-sheet workbook with a bold header row and no index
/// column. Missing cells are left empty.
///
/// # Errors
///
/// [`SweeperError::SpreadsheetLimit`] when the table does not fit in one
/// worksheet, or any writer error.
pub fn write(table: &Table) -> Result<Vec<u8>> {
    if table.height() + 1 > MAX_ROWS {
        return Err(SweeperError::SpreadsheetLimit(format!(
            "{} rows (max {})",
            table.height(),
            MAX_ROWS - 1
        )));
    }
    if table.width() > MAX_COLUMNS {
        return Err(SweeperError::SpreadsheetLimit(format!(
            "{} columns (max {MAX_COLUMNS})",
            table.width()
        )));
    }

    let header_format = Format::new().set_bold();
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col_index, column) in table.columns().iter().enumerate() {
        let col = column_number(col_index)?;
        worksheet.write_string_with_format(0, col, column.name(), &header_format)?;

        match column.data() {
            ColumnData::Numeric(values) => {
                for (i, value) in values.iter().enumerate() {
                    let Some(value) = value else { continue };
                    let row = row_number(i)?;
                    if value.is_finite() {
                        worksheet.write_number(row, col, *value)?;
                    } else {
                        let text = if value.is_sign_positive() { "inf" } else { "-inf" };
                        worksheet.write_string(row, col, text)?;
                    }
                }
            }
            ColumnData::Text(values) => {
                for (i, value) in values.iter().enumerate() {
                    let Some(value) = value else { continue };
                    worksheet.write_string(row_number(i)?, col, value.as_str())?;
                }
            }
            ColumnData::Temporal(values) => {
                let format = if column.renderer().date_only() {
                    &date_format
                } else {
                    &datetime_format
                };
                for (i, value) in values.iter().enumerate() {
                    let Some(value) = value else { continue };
                    worksheet.write_datetime_with_format(row_number(i)?, col, value, format)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Worksheet row for data row `index`, below the header.
fn row_number(index: usize) -> Result<u32> {
    u32::try_from(index + 1)
        .map_err(|_err| SweeperError::SpreadsheetLimit(format!("row {index}")))
}

fn column_number(index: usize) -> Result<u16> {
    u16::try_from(index)
        .map_err(|_err| SweeperError::SpreadsheetLimit(format!("column {index}")))
}
