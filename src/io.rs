//! Reading uploads into tables and writing tables back out.
//!
//! The two supported formats are picked by file extension on the way in and
//! by the user's conversion choice on the way out.

pub mod delimited;
pub mod spreadsheet;

use crate::error::{Result, SweeperError};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A supported tabular format, used both for uploads and as the conversion
/// choice for downloads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum FileFormat {
    #[default]
    Csv,
    Excel,
}

impl FileFormat {
    pub const ALL: [Self; 2] = [Self::Csv, Self::Excel];

    /// Detects the format from an upload's name.
    ///
    /// # Errors
    ///
    /// [`SweeperError::UnsupportedExtension`] for anything but `.csv` and
    /// `.xlsx` (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Excel),
            "" => Err(SweeperError::UnsupportedExtension {
                file_name: file_name.to_owned(),
                extension: "(none)".to_owned(),
            }),
            other => Err(SweeperError::UnsupportedExtension {
                file_name: file_name.to_owned(),
                extension: format!(".{other}"),
            }),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => CSV_MIME,
            Self::Excel => XLSX_MIME,
        }
    }

    /// Name shown on the conversion radio buttons.
    pub fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Excel => "Excel",
        }
    }
}

/// Parses upload bytes in the given format.
///
/// # Errors
///
/// Whatever the underlying reader reports for malformed content.
pub fn read_table(bytes: &[u8], format: FileFormat) -> Result<Table> {
    match format {
        FileFormat::Csv => delimited::read(bytes),
        FileFormat::Excel => spreadsheet::read(bytes),
    }
}

/// Serializes a table without any row index column.
///
/// # Errors
///
/// Writer failures, or a table too large for one worksheet.
pub fn write_table(table: &Table, format: FileFormat) -> Result<Vec<u8>> {
    match format {
        FileFormat::Csv => delimited::write(table),
        FileFormat::Excel => spreadsheet::write(table),
    }
}

/// The source name with its final extension replaced by the target one.
pub fn output_file_name(source_name: &str, format: FileFormat) -> String {
    Path::new(source_name)
        .with_extension(format.extension())
        .to_string_lossy()
        .into_owned()
}

/// A converted file ready to hand to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    pub file_name: String,
    pub mime_type: &'static str,
    pub format: FileFormat,
    pub bytes: Vec<u8>,
}

impl Export {
    /// Converts `table`, naming the result after `source_name`.
    ///
    /// # Errors
    ///
    /// See [`write_table`].
    pub fn new(table: &Table, source_name: &str, format: FileFormat) -> Result<Self> {
        let bytes = write_table(table, format)?;
        let file_name = output_file_name(source_name, format);
        log::info!(
            "Converted {source_name} to {file_name} ({} bytes)",
            bytes.len()
        );
        Ok(Self {
            file_name,
            mime_type: format.mime_type(),
            format,
            bytes,
        })
    }

    /// The converted bytes, positioned at the start.
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, ColumnData};
    use std::io::Read as _;

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_file_name("a.csv").ok(), Some(FileFormat::Csv));
        assert_eq!(
            FileFormat::from_file_name("Report.XLSX").ok(),
            Some(FileFormat::Excel)
        );

        let err = FileFormat::from_file_name("data.txt").expect_err("txt is unsupported");
        assert_eq!(err.to_string(), "Unsupported file type: .txt");

        let err = FileFormat::from_file_name("README").expect_err("no extension");
        assert!(matches!(err, SweeperError::UnsupportedExtension { .. }));
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("report.csv", FileFormat::Excel), "report.xlsx");
        assert_eq!(output_file_name("report.xlsx", FileFormat::Csv), "report.csv");
        assert_eq!(output_file_name("q1.csv.csv", FileFormat::Excel), "q1.csv.xlsx");
    }

    #[test]
    fn test_export_metadata() -> Result<()> {
        let table = Table::new(vec![Column::numeric("v", vec![Some(1.0)])])?;

        let export = Export::new(&table, "report.csv", FileFormat::Excel)?;
        assert_eq!(export.file_name, "report.xlsx");
        assert_eq!(export.mime_type, XLSX_MIME);
        assert!(!export.is_empty());

        let export = Export::new(&table, "report.xlsx", FileFormat::Csv)?;
        assert_eq!(export.mime_type, "text/csv");
        let mut text = String::new();
        export.reader().read_to_string(&mut text)?;
        assert_eq!(text, "v\n1\n");
        Ok(())
    }

    #[test]
    fn test_round_trip_both_formats() -> Result<()> {
        let source = b"name,score,joined\nann,1.5,2024-01-02\nbob,,2024-03-04\n";
        let table = read_table(source, FileFormat::Csv)?;

        for format in FileFormat::ALL {
            let bytes = write_table(&table, format)?;
            let back = read_table(&bytes, format)?;
            assert_eq!(back, table, "round trip through {}", format.label());
        }

        assert_eq!(
            table.column("score").map(Column::data),
            Some(&ColumnData::Numeric(vec![Some(1.5), None]))
        );
        Ok(())
    }
}
