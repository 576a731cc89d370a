//! In-memory table model.
//!
//! A [`Table`] is an ordered list of uniquely named [`Column`]s of equal
//! length. Each column stores one inferred [`ColumnKind`] of value, with
//! `None` marking an absent cell:
//!
//! ```
//! use data_sweeper::table::{Column, ColumnKind, Table};
//!
//! let table = Table::new(vec![
//!     Column::text("k", vec![Some("a".to_owned()), None]),
//!     Column::numeric("v", vec![Some(1.0), Some(2.5)]),
//! ])?;
//!
//! assert_eq!(table.height(), 2);
//! assert_eq!(table.column("v").map(|c| c.kind()), Some(ColumnKind::Numeric));
//! # Ok::<(), data_sweeper::error::SweeperError>(())
//! ```

pub mod infer;

use crate::error::{Result, SweeperError};
use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Output format for date-time cells that carry a time of day.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
/// Output format for date-time cells when the whole column is at midnight.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ColumnKind {
    Numeric,
    Text,
    Temporal,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "Numeric",
            Self::Text => "Text",
            Self::Temporal => "Temporal",
        }
    }
}

/// The values of one column.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    Temporal(Vec<Option<NaiveDateTime>>),
}

impl ColumnData {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Numeric(_) => ColumnKind::Numeric,
            Self::Text(_) => ColumnKind::Text,
            Self::Temporal(_) => ColumnKind::Temporal,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Temporal(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        match self {
            Self::Numeric(v) => v.iter().filter(|x| x.is_none()).count(),
            Self::Text(v) => v.iter().filter(|x| x.is_none()).count(),
            Self::Temporal(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    /// The value at `row`, or `None` when the row is out of range.
    pub fn get(&self, row: usize) -> Option<Value<'_>> {
        match self {
            Self::Numeric(v) => v
                .get(row)
                .map(|x| x.map_or(Value::Missing, Value::Number)),
            Self::Text(v) => v
                .get(row)
                .map(|x| x.as_deref().map_or(Value::Missing, Value::Text)),
            Self::Temporal(v) => v
                .get(row)
                .map(|x| x.map_or(Value::Missing, Value::DateTime)),
        }
    }

    fn retain_rows(&mut self, keep: &[bool]) {
        fn retain<T>(values: &mut Vec<T>, keep: &[bool]) {
            let mut flags = keep.iter();
            values.retain(|_| flags.next().copied().unwrap_or(true));
        }

        match self {
            Self::Numeric(v) => retain(v, keep),
            Self::Text(v) => retain(v, keep),
            Self::Temporal(v) => retain(v, keep),
        }
    }

    fn head(&self, n: usize) -> Self {
        match self {
            Self::Numeric(v) => Self::Numeric(v.iter().take(n).copied().collect()),
            Self::Text(v) => Self::Text(v.iter().take(n).cloned().collect()),
            Self::Temporal(v) => Self::Temporal(v.iter().take(n).copied().collect()),
        }
    }
}

/// A borrowed view of one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value<'a> {
    Missing,
    Number(f64),
    Text(&'a str),
    DateTime(NaiveDateTime),
}

impl Value<'_> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnData::Numeric(values))
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self::new(name, ColumnData::Text(values))
    }

    pub fn temporal(name: impl Into<String>, values: Vec<Option<NaiveDateTime>>) -> Self {
        Self::new(name, ColumnData::Temporal(values))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Mutable access for in-place transforms. Callers must keep the length.
    pub(crate) fn data_mut(&mut self) -> &mut ColumnData {
        &mut self.data
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.data.null_count()
    }

    pub fn get(&self, row: usize) -> Option<Value<'_>> {
        self.data.get(row)
    }

    /// Formats cells of this column as text, the way they are exported to CSV.
    pub fn renderer(&self) -> CellRenderer<'_> {
        let date_only = match &self.data {
            ColumnData::Temporal(values) => values
                .iter()
                .flatten()
                .all(|dt| dt.time() == NaiveTime::MIN),
            _ => false,
        };
        CellRenderer {
            data: &self.data,
            date_only,
        }
    }
}

/// Renders the cells of one column. Temporal columns whose values are all at
/// midnight render as plain dates.
pub struct CellRenderer<'a> {
    data: &'a ColumnData,
    date_only: bool,
}

impl CellRenderer<'_> {
    pub fn date_only(&self) -> bool {
        self.date_only
    }

    /// Missing and out-of-range cells render as an empty string.
    pub fn render(&self, row: usize) -> String {
        match self.data.get(row) {
            Some(Value::Number(v)) => v.to_string(),
            Some(Value::Text(s)) => s.to_owned(),
            Some(Value::DateTime(dt)) => {
                let format = if self.date_only {
                    DATE_FORMAT
                } else {
                    DATETIME_FORMAT
                };
                dt.format(format).to_string()
            }
            Some(Value::Missing) | None => String::new(),
        }
    }
}

/// Ordered, uniquely named columns of uniform length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Builds a table, checking that names are unique and lengths agree.
    ///
    /// # Errors
    ///
    /// [`SweeperError::DuplicateColumn`] or [`SweeperError::ColumnLength`].
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        let expected = columns.first().map_or(0, Column::len);

        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(SweeperError::DuplicateColumn(column.name().to_owned()));
            }
            if column.len() != expected {
                return Err(SweeperError::ColumnLength {
                    name: column.name().to_owned(),
                    expected,
                    found: column.len(),
                });
            }
        }

        Ok(Self { columns })
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows. A table without columns has no rows.
    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn row(&self, index: usize) -> Option<Vec<Value<'_>>> {
        if index >= self.height() {
            return None;
        }
        self.columns.iter().map(|c| c.get(index)).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<Value<'_>>> + '_ {
        (0..self.height()).filter_map(|i| self.row(i))
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name(), c.data().head(n)))
                .collect(),
        }
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns
            .iter()
            .filter(|c| c.kind() == ColumnKind::Numeric)
    }

    /// Restricts the table to `names`, in that order.
    ///
    /// Names that are not columns of the table, and repeats, are skipped, so
    /// the result is always a subset of the current columns. An empty list
    /// leaves a table without columns.
    pub fn select<S: AsRef<str>>(&mut self, names: &[S]) {
        let mut pool: Vec<Option<Column>> =
            std::mem::take(&mut self.columns).into_iter().map(Some).collect();

        for name in names {
            let name = name.as_ref();
            let slot = pool
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|c| c.name() == name));
            match slot.and_then(Option::take) {
                Some(column) => self.columns.push(column),
                None if self.column(name).is_some() => {
                    log::debug!("Column '{name}' selected more than once");
                }
                None => log::warn!("Ignoring unknown column '{name}' in selection"),
            }
        }
    }

    /// Keeps the rows whose flag is `true`.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        for column in &mut self.columns {
            column.data_mut().retain_rows(keep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Table {
        Table::new(vec![
            Column::text(
                "k",
                vec![Some("a".to_owned()), Some("b".to_owned()), None],
            ),
            Column::numeric("v", vec![Some(1.0), None, Some(3.5)]),
            Column::numeric("w", vec![Some(10.0), Some(20.0), Some(30.0)]),
        ])
        .expect("valid table")
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::numeric("a", vec![Some(1.0)]),
            Column::numeric("b", vec![Some(1.0), Some(2.0)]),
        ])
        .expect_err("lengths differ");
        assert!(matches!(err, SweeperError::ColumnLength { found: 2, .. }));
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let err = Table::new(vec![
            Column::numeric("a", vec![]),
            Column::numeric("a", vec![]),
        ])
        .expect_err("names repeat");
        assert!(matches!(err, SweeperError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn test_row_access() {
        let table = sample();
        assert_eq!(
            table.row(1),
            Some(vec![Value::Text("b"), Value::Missing, Value::Number(20.0)])
        );
        assert_eq!(table.row(3), None);
        assert_eq!(table.rows().count(), 3);
    }

    #[test]
    fn test_select_default_is_identity() {
        let mut table = sample();
        let all: Vec<String> = table.column_names().iter().map(|s| (*s).to_owned()).collect();
        let before = table.clone();
        table.select(&all);
        assert_eq!(table, before);
    }

    #[test]
    fn test_select_reorders_and_ignores_unknown() {
        let mut table = sample();
        table.select(&["w", "missing", "k", "w"]);
        assert_eq!(table.column_names(), vec!["w", "k"]);
        assert_eq!(table.height(), 3);
    }

    #[test]
    fn test_select_empty_leaves_no_columns() {
        let mut table = sample();
        table.select::<&str>(&[]);
        assert_eq!(table.width(), 0);
        assert_eq!(table.height(), 0);
    }

    #[test]
    fn test_head() {
        let head = sample().head(2);
        assert_eq!(head.height(), 2);
        assert_eq!(head.width(), 3);
        assert_eq!(sample().head(10).height(), 3);
    }

    #[test]
    fn test_renderer_formats() {
        let midnight = NaiveDate::from_ymd_opt(2024, 1, 5)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date");
        let afternoon = NaiveDate::from_ymd_opt(2024, 1, 6)
            .and_then(|d| d.and_hms_opt(14, 30, 0))
            .expect("valid date");

        let dates = Column::temporal("d", vec![Some(midnight), None]);
        let renderer = dates.renderer();
        assert!(renderer.date_only());
        assert_eq!(renderer.render(0), "2024-01-05");
        assert_eq!(renderer.render(1), "");

        let stamps = Column::temporal("d", vec![Some(midnight), Some(afternoon)]);
        assert_eq!(stamps.renderer().render(1), "2024-01-06 14:30:00");

        let numbers = Column::numeric("n", vec![Some(1.0), Some(2.5)]);
        assert_eq!(numbers.renderer().render(0), "1");
        assert_eq!(numbers.renderer().render(1), "2.5");
    }
}
