//! Bar chart data for the visualisation panel.
//!
//! Only the first two numeric columns are charted, one bar group per row.

use crate::table::{ColumnData, Table};

/// Number of numeric columns charted.
pub const MAX_SERIES: usize = 2;
/// Width of one bar group on the x axis (rows are 1.0 apart).
pub const GROUP_WIDTH: f64 = 0.8;

#[derive(Clone, Debug, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// One series laid out as bars: `(x, height)` pairs plus the bar width.
#[derive(Clone, Debug, PartialEq)]
pub struct BarSeries {
    pub name: String,
    pub width: f64,
    pub bars: Vec<(f64, f64)>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartData {
    pub series: Vec<ChartSeries>,
}

impl ChartData {
    /// Takes the first [`MAX_SERIES`] numeric columns of `table`, in column
    /// order. A table without numeric columns gives an empty chart.
    pub fn from_table(table: &Table) -> Self {
        let series = table
            .numeric_columns()
            .take(MAX_SERIES)
            .filter_map(|column| match column.data() {
                ColumnData::Numeric(values) => Some(ChartSeries {
                    name: column.name().to_owned(),
                    values: values.clone(),
                }),
                _ => None,
            })
            .collect();
        Self { series }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.series.iter().map(|s| s.values.len()).max().unwrap_or(0)
    }

    /// Grouped layout: bars of one row sit side by side, centred on the row
    /// index. Missing values produce no bar.
    pub fn grouped_bars(&self) -> Vec<BarSeries> {
        let count = self.series.len();
        if count == 0 {
            return Vec::new();
        }

        let width = GROUP_WIDTH / count as f64;
        self.series
            .iter()
            .enumerate()
            .map(|(index, series)| {
                let offset = (index as f64 - (count as f64 - 1.0) / 2.0) * width;
                let bars = series
                    .values
                    .iter()
                    .enumerate()
                    .filter_map(|(row, value)| value.map(|v| (row as f64 + offset, v)))
                    .collect();
                BarSeries {
                    name: series.name.clone(),
                    width,
                    bars,
                }
            })
            .collect()
    }
}
