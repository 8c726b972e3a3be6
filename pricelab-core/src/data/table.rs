//! Date-indexed multi-symbol price table.
//!
//! Columns are aligned on a common, strictly ascending date axis. A missing
//! observation is `None`; nothing is ever forward-filled.

use super::period::Period;
use super::series::PriceSeries;
use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame, DataType, PolarsResult};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("column '{column}' has {actual} values but the index has {expected} dates")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("dates are not strictly ascending at row {row}")]
    UnorderedIndex { row: usize },

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
}

/// One named column of a [`PriceTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl TableColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Number of defined (non-missing) cells.
    pub fn defined(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    columns: Vec<TableColumn>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, checking the index is strictly ascending and every
    /// column matches its length.
    pub fn from_parts(
        dates: Vec<NaiveDate>,
        columns: Vec<TableColumn>,
    ) -> Result<Self, TableError> {
        if let Some(row) = dates.windows(2).position(|w| w[0] >= w[1]) {
            return Err(TableError::UnorderedIndex { row: row + 1 });
        }
        let mut seen = BTreeSet::new();
        for column in &columns {
            if column.values.len() != dates.len() {
                return Err(TableError::LengthMismatch {
                    column: column.name.clone(),
                    expected: dates.len(),
                    actual: column.values.len(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self { dates, columns })
    }

    /// Single-column table from a series, the column named after its symbol.
    pub fn from_series(series: &PriceSeries) -> Self {
        let dates = series.points.iter().map(|(date, _)| *date).collect();
        let values = series.points.iter().map(|(_, v)| Some(*v)).collect();
        Self {
            dates,
            columns: vec![TableColumn::new(series.symbol.clone(), values)],
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        self.column(column)
            .and_then(|c| c.values.get(row).copied().flatten())
    }

    /// Outer join on the date index.
    ///
    /// The result's index is the union of both indexes; cells absent on
    /// either side are `None`. Columns keep their order, `self` first. When
    /// both sides carry a column of the same name, `other`'s defined values
    /// take precedence.
    pub fn outer_join(&self, other: &PriceTable) -> PriceTable {
        let dates: Vec<NaiveDate> = self
            .dates
            .iter()
            .chain(other.dates.iter())
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let position: HashMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let mut columns: Vec<TableColumn> = Vec::with_capacity(self.width() + other.width());

        for (source, table) in [(0, self), (1, other)] {
            for column in &table.columns {
                let idx = match columns.iter().position(|c| c.name == column.name) {
                    Some(idx) => idx,
                    None => {
                        columns.push(TableColumn::new(column.name.clone(), vec![None; dates.len()]));
                        columns.len() - 1
                    }
                };
                for (date, value) in table.dates.iter().zip(&column.values) {
                    let Some(value) = value else { continue };
                    if let Some(&row) = position.get(date) {
                        let cell = &mut columns[idx].values[row];
                        if source == 1 || cell.is_none() {
                            *cell = Some(*value);
                        }
                    }
                }
            }
        }

        PriceTable { dates, columns }
    }

    /// Resample to `period`, keeping each column's last defined observation
    /// per bucket.
    ///
    /// The index becomes every bucket end from the first row's bucket to the
    /// last row's bucket, so empty periods appear as all-`None` rows.
    pub fn resample_last(&self, period: Period) -> PriceTable {
        let (Some(first), Some(last)) = (self.dates.first(), self.dates.last()) else {
            return PriceTable {
                dates: Vec::new(),
                columns: self
                    .columns
                    .iter()
                    .map(|c| TableColumn::new(c.name.clone(), Vec::new()))
                    .collect(),
            };
        };

        let stop = period.bucket_end(*last);
        let mut buckets = Vec::new();
        let mut cursor = Some(period.bucket_end(*first));
        while let Some(end) = cursor.filter(|end| *end <= stop) {
            buckets.push(end);
            cursor = period.next_bucket_end(end);
        }

        let mut columns: Vec<TableColumn> = self
            .columns
            .iter()
            .map(|c| TableColumn::new(c.name.clone(), vec![None; buckets.len()]))
            .collect();

        let mut bucket = 0;
        for (row, date) in self.dates.iter().enumerate() {
            let end = period.bucket_end(*date);
            while buckets.get(bucket).is_some_and(|b| *b < end) {
                bucket += 1;
            }
            if bucket >= buckets.len() {
                break;
            }
            for (out, column) in columns.iter_mut().zip(&self.columns) {
                if let Some(value) = column.values[row] {
                    out.values[bucket] = Some(value);
                }
            }
        }

        PriceTable {
            dates: buckets,
            columns,
        }
    }

    /// Apply `f` to every column, keeping names and the index.
    pub fn map_columns<F>(&self, f: F) -> PriceTable
    where
        F: Fn(&[Option<f64>]) -> Vec<Option<f64>>,
    {
        PriceTable {
            dates: self.dates.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| TableColumn::new(c.name.clone(), f(&c.values)))
                .collect(),
        }
    }

    /// Last `n` rows.
    pub fn tail(&self, n: usize) -> PriceTable {
        let start = self.len().saturating_sub(n);
        PriceTable {
            dates: self.dates[start..].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|c| TableColumn::new(c.name.clone(), c.values[start..].to_vec()))
                .collect(),
        }
    }

    /// Polars view: a `Date` column followed by one `Float64` column per symbol.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
        let days: Vec<i32> = self
            .dates
            .iter()
            .map(|d| (*d - epoch).num_days() as i32)
            .collect();

        let mut frame_columns = Vec::with_capacity(self.width() + 1);
        frame_columns.push(Column::new("Date".into(), days).cast(&DataType::Date)?);
        for column in &self.columns {
            frame_columns.push(Column::new(
                column.name.as_str().into(),
                column.values.clone(),
            ));
        }
        DataFrame::new(frame_columns)
    }

    /// Tail preview rendered through the polars table formatter.
    pub fn preview(&self, rows: usize) -> String {
        if self.columns.is_empty() {
            return "<empty table>".to_string();
        }
        match self.tail(rows).to_dataframe() {
            Ok(df) => df.to_string(),
            Err(e) => format!("<preview unavailable: {e}>"),
        }
    }
}
