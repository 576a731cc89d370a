//! Error handling for data sweeper.
//!
//! Every fallible operation in the library returns [`Result`], whose error
//! type is [`SweeperError`]. Only one kind of failure is expected during
//! normal use, [`SweeperError::UnsupportedExtension`]. The others come from the
//! underlying readers and writers and are reported per file, so one bad
//! upload never stops the rest of the batch.
//!
//! ```
//! use data_sweeper::error::SweeperError;
//!
//! let err = SweeperError::UnsupportedExtension {
//!     file_name: "data.txt".to_owned(),
//!     extension: ".txt".to_owned(),
//! };
//! assert_eq!(err.to_string(), "Unsupported file type: .txt");
//! ```

/// Main error type for data sweeper operations.
#[derive(Debug, thiserror::Error)]
pub enum SweeperError {
    /// The upload is neither `.csv` nor `.xlsx`.
    #[error("Unsupported file type: {extension}")]
    UnsupportedExtension {
        file_name: String,
        extension: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not read spreadsheet: {0}")]
    SpreadsheetRead(#[from] calamine::XlsxError),

    #[error("Could not write spreadsheet: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),

    /// A data row has more fields than the header.
    #[error("Row {row} has {found} fields but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Column '{name}' has {found} values, expected {expected}")]
    ColumnLength {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    /// The table does not fit in a single worksheet.
    #[error("Table too large for a spreadsheet: {0}")]
    SpreadsheetLimit(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Handing a download to the user failed (save dialog, browser Blob).
    #[error("Download failed: {0}")]
    Transfer(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for SweeperError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<SweeperError> for String {
    fn from(err: SweeperError) -> Self {
        err.to_string()
    }
}

/// Result type alias for data sweeper operations.
pub type Result<T> = std::result::Result<T, SweeperError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<SweeperError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: SweeperError = e.into();
            SweeperError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: SweeperError = e.into();
            SweeperError::Other(format!("{}: {}", f(), err))
        })
    }
}
