//! Cleaning operations: duplicate row removal and mean imputation.
//!
//! Both operations work in place and are idempotent on data that is already
//! clean.

use crate::table::{ColumnData, Table, Value};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A user-requested cleaning operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum CleaningStep {
    DropDuplicates,
    FillMissing,
}

impl CleaningStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DropDuplicates => "Remove Duplicates",
            Self::FillMissing => "Fill Missing Values",
        }
    }
}

/// What a step did to the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleaningOutcome {
    pub step: CleaningStep,
    /// Rows removed, or cells filled.
    pub affected: usize,
}

impl CleaningOutcome {
    pub fn message(&self) -> String {
        match self.step {
            CleaningStep::DropDuplicates => {
                format!("Duplicates removed! ({} rows dropped)", self.affected)
            }
            CleaningStep::FillMissing => {
                format!("Missing values have been filled! ({} cells)", self.affected)
            }
        }
    }
}

pub fn apply_step(table: &mut Table, step: CleaningStep) -> CleaningOutcome {
    let affected = match step {
        CleaningStep::DropDuplicates => drop_duplicates(table),
        CleaningStep::FillMissing => fill_missing_with_mean(table),
    };
    log::debug!("{}: {affected} affected", step.as_str());
    CleaningOutcome { step, affected }
}

/// Hashable form of a cell. Numbers compare by bit pattern with `-0.0`
/// folded into `0.0`; missing equals missing.
#[derive(PartialEq, Eq, Hash)]
enum RowKey<'a> {
    Missing,
    Number(u64),
    Text(&'a str),
    DateTime(NaiveDateTime),
}

impl<'a> From<Value<'a>> for RowKey<'a> {
    fn from(value: Value<'a>) -> Self {
        match value {
            Value::Missing => Self::Missing,
            Value::Number(v) if v == 0.0 => Self::Number(0.0_f64.to_bits()),
            Value::Number(v) => Self::Number(v.to_bits()),
            Value::Text(s) => Self::Text(s),
            Value::DateTime(dt) => Self::DateTime(dt),
        }
    }
}

/// Removes rows that exactly repeat an earlier row, keeping the first
/// occurrence and the order of what remains. Returns the number of rows
/// removed.
pub fn drop_duplicates(table: &mut Table) -> usize {
    let keep: Vec<bool> = {
        let mut seen: HashSet<Vec<RowKey<'_>>> = HashSet::with_capacity(table.height());
        table
            .rows()
            .map(|row| seen.insert(row.into_iter().map(RowKey::from).collect()))
            .collect()
    };

    let removed = keep.iter().filter(|k| !**k).count();
    if removed > 0 {
        table.retain_rows(&keep);
    }
    removed
}

/// Replaces missing values in every numeric column with the mean of that
/// column's present values, as the column stands now. Columns without any
/// present value, and non-numeric columns, are left alone. Returns the
/// number of cells filled.
pub fn fill_missing_with_mean(table: &mut Table) -> usize {
    let mut filled = 0;

    for column in table.columns_mut() {
        let ColumnData::Numeric(values) = column.data_mut() else {
            continue;
        };
        let Some(mean) = mean(values) else {
            continue;
        };
        for value in values.iter_mut().filter(|v| v.is_none()) {
            *value = Some(mean);
            filled += 1;
        }
    }

    filled
}

fn mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn text(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_owned)).collect()
    }

    fn key_value_table() -> Table {
        Table::new(vec![
            Column::text("k", text(&[Some("a"), Some("a"), Some("b")])),
            Column::numeric("v", vec![Some(1.0), Some(1.0), None]),
        ])
        .expect("valid table")
    }

    #[test]
    fn test_drop_duplicates_keeps_first() {
        let mut table = key_value_table();
        assert_eq!(drop_duplicates(&mut table), 1);
        assert_eq!(table.height(), 2);
        assert_eq!(table.row(0), Some(vec![Value::Text("a"), Value::Number(1.0)]));
        assert_eq!(table.row(1), Some(vec![Value::Text("b"), Value::Missing]));
    }

    #[test]
    fn test_drop_duplicates_is_idempotent() {
        let mut once = key_value_table();
        drop_duplicates(&mut once);
        let mut twice = once.clone();
        assert_eq!(drop_duplicates(&mut twice), 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_and_signed_zero_compare_equal() {
        let mut table = Table::new(vec![
            Column::numeric("x", vec![None, None, Some(0.0), Some(-0.0)]),
        ])
        .expect("valid table");
        assert_eq!(drop_duplicates(&mut table), 2);
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn test_drop_duplicates_preserves_order() {
        let mut table = Table::new(vec![Column::text(
            "k",
            text(&[Some("c"), Some("a"), Some("c"), Some("b"), Some("a")]),
        )])
        .expect("valid table");
        drop_duplicates(&mut table);
        let keys: Vec<String> = (0..table.height())
            .map(|i| table.columns()[0].renderer().render(i))
            .collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_fill_missing_uses_mean() {
        let mut table = Table::new(vec![Column::numeric(
            "v",
            vec![Some(1.0), None, Some(3.0)],
        )])
        .expect("valid table");
        assert_eq!(fill_missing_with_mean(&mut table), 1);
        assert_eq!(
            table.column("v").map(Column::data),
            Some(&ColumnData::Numeric(vec![Some(1.0), Some(2.0), Some(3.0)]))
        );
    }

    #[test]
    fn test_fill_missing_leaves_other_columns() {
        let mut table = Table::new(vec![
            Column::text("k", text(&[Some("a"), None])),
            Column::numeric("full", vec![Some(4.0), Some(5.0)]),
            Column::numeric("blank", vec![None, None]),
        ])
        .expect("valid table");
        let before = table.clone();

        assert_eq!(fill_missing_with_mean(&mut table), 0);
        assert_eq!(table, before);
    }

    #[test]
    fn test_fill_missing_twice_is_stable() {
        let mut table = Table::new(vec![Column::numeric(
            "v",
            vec![Some(2.0), None, Some(6.0), None],
        )])
        .expect("valid table");
        fill_missing_with_mean(&mut table);
        let once = table.clone();
        assert_eq!(fill_missing_with_mean(&mut table), 0);
        assert_eq!(table, once);
    }

    #[test]
    fn test_apply_step_messages() {
        let mut table = key_value_table();
        let outcome = apply_step(&mut table, CleaningStep::DropDuplicates);
        assert_eq!(outcome.affected, 1);
        assert!(outcome.message().starts_with("Duplicates removed!"));
    }
}
