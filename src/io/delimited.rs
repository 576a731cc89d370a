//! CSV reading and writing.

use crate::error::{Result, SweeperError};
use crate::table::infer::{infer_column, normalize_headers};
use crate::table::{Column, Table};
use csv::{ReaderBuilder, WriterBuilder};

const BOM: char = '\u{feff}';

/// Reads CSV bytes. The first record is the header; short rows are padded
/// with missing values. Blank lines are skipped by the reader itself, while a
/// quoted empty field (`""`) is a row with a missing value.
///
/// # Errors
///
/// Decoding errors from the `csv` reader (including invalid UTF-8), or
/// [`SweeperError::RaggedRow`] for a row wider than the header.
pub fn read(bytes: &[u8]) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches(BOM).to_owned()
            } else {
                h.to_owned()
            }
        })
        .collect();
    let width = headers.len();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > width {
            let row = record
                .position()
                .and_then(|p| usize::try_from(p.line()).ok())
                .unwrap_or(index + 2);
            return Err(SweeperError::RaggedRow {
                row,
                expected: width,
                found: record.len(),
            });
        }

        for (col, column_cells) in cells.iter_mut().enumerate() {
            column_cells.push(record.get(col).map(str::to_owned));
        }
    }

    let columns: Vec<Column> = normalize_headers(headers)
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| infer_column(name, raw))
        .collect();

    let table = Table::new(columns)?;
    log::debug!(
        "Parsed CSV: {} rows x {} columns",
        table.height(),
        table.width()
    );
    Ok(table)
}

/// Writes the header and every row, with no index column. A table without
/// columns produces no bytes.
///
/// # Errors
///
/// Only if the in-memory writer fails.
pub fn write(table: &Table) -> Result<Vec<u8>> {
    if table.width() == 0 {
        return Ok(Vec::new());
    }

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(table.column_names())?;

    let renderers: Vec<_> = table.columns().iter().map(Column::renderer).collect();
    for row in 0..table.height() {
        writer.write_record(renderers.iter().map(|r| r.render(row)))?;
    }

    writer
        .into_inner()
        .map_err(|e| SweeperError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ColumnData, ColumnKind};

    #[test]
    fn test_read_infers_kinds() -> Result<()> {
        let table = read(b"k,v,when\na,1,2024-01-01\na,1,2024-01-01\nb,,2024-01-02\n")?;
        assert_eq!(table.column_names(), vec!["k", "v", "when"]);
        assert_eq!(table.height(), 3);

        let kinds: Vec<ColumnKind> = table.columns().iter().map(Column::kind).collect();
        assert_eq!(
            kinds,
            vec![ColumnKind::Text, ColumnKind::Numeric, ColumnKind::Temporal]
        );
        Ok(())
    }

    #[test]
    fn test_short_rows_are_padded() -> Result<()> {
        let table = read(b"a,b\n1\n2,3\n")?;
        assert_eq!(
            table.column("b").map(Column::data),
            Some(&ColumnData::Numeric(vec![None, Some(3.0)]))
        );
        Ok(())
    }

    #[test]
    fn test_date_text_round_trips_unchanged() -> Result<()> {
        let input = "d,e,f\n2024/01/05,2024-01-05T08:30,2024-01-05\n2024/02/01,2024-01-06,2024-01-06 07:00:00\n";
        let table = read(input.as_bytes())?;
        let kinds: Vec<ColumnKind> = table.columns().iter().map(Column::kind).collect();
        assert_eq!(kinds, vec![ColumnKind::Text; 3]);

        assert_eq!(String::from_utf8_lossy(&write(&table)?), input);
        Ok(())
    }

    #[test]
    fn test_canonical_dates_round_trip() -> Result<()> {
        let input = "day,at\n2024-01-05,2024-01-05 08:30:00\n,2024-01-06 00:00:00\n";
        let table = read(input.as_bytes())?;
        let kinds: Vec<ColumnKind> = table.columns().iter().map(Column::kind).collect();
        assert_eq!(kinds, vec![ColumnKind::Temporal; 2]);

        assert_eq!(String::from_utf8_lossy(&write(&table)?), input);
        Ok(())
    }

    #[test]
    fn test_quoted_empty_row_is_kept() -> Result<()> {
        let table = read(b"a\n1\n\"\"\n\n2\n")?;
        assert_eq!(
            table.column("a").map(Column::data),
            Some(&ColumnData::Numeric(vec![Some(1.0), None, Some(2.0)]))
        );
        Ok(())
    }

    #[test]
    fn test_long_row_is_an_error() {
        let err = read(b"a,b\n1,2,3\n").expect_err("row is wider than header");
        assert!(matches!(
            err,
            SweeperError::RaggedRow {
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_bom_and_quoted_fields() -> Result<()> {
        let table = read("\u{feff}name,note\nann,\"hello, world\"\n".as_bytes())?;
        assert_eq!(table.column_names(), vec!["name", "note"]);

        let bytes = write(&table)?;
        assert_eq!(
            String::from_utf8_lossy(&bytes),
            "name,note\nann,\"hello, world\"\n"
        );
        Ok(())
    }

    #[test]
    fn test_empty_input() -> Result<()> {
        let table = read(b"")?;
        assert_eq!(table.width(), 0);
        assert!(write(&table)?.is_empty());
        Ok(())
    }
}
