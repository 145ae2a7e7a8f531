//! Date-aligned price table.

use ndarray::Array1;

use crate::{Date, SeriesError};

/// Price levels of several instruments on a shared, ascending date index.
///
/// Every cell is defined: construction rejects NaN or infinite values.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPriceTable {
    dates: Vec<Date>,
    names: Vec<String>,
    columns: Vec<Array1<f64>>,
}

impl AlignedPriceTable {
    /// Create a table from a date index and named columns.
    ///
    /// # Errors
    /// Returns `SeriesError` if a column length differs from the index, the
    /// index is not strictly increasing, names repeat, or a cell is missing.
    pub fn new(dates: Vec<Date>, columns: Vec<(String, Array1<f64>)>) -> Result<Self, SeriesError> {
        if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(SeriesError::NotIncreasing { name: "date".to_string(), date: w[1] });
        }

        let mut names = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len());
        for (name, column) in columns {
            if column.len() != dates.len() {
                return Err(SeriesError::LengthMismatch {
                    name,
                    dates: dates.len(),
                    values: column.len(),
                });
            }
            if names.contains(&name) {
                return Err(SeriesError::DuplicateColumn(name));
            }
            if let Some(i) = column.iter().position(|v| !v.is_finite()) {
                return Err(SeriesError::MissingValue { column: name, date: dates[i] });
            }
            names.push(name);
            values.push(column);
        }

        Ok(Self { dates, names, columns: values })
    }

    /// Shared date index.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Column names in insertion order.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Values of the named column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Array1<f64>> {
        self.names.iter().position(|n| n == name).map(|i| &self.columns[i])
    }

    /// Iterate over `(name, values)` pairs.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Array1<f64>)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Number of dates.
    #[must_use]
    pub const fn n_rows(&self) -> usize {
        self.dates.len()
    }

    /// Number of columns.
    #[must_use]
    pub const fn n_columns(&self) -> usize {
        self.names.len()
    }

    /// Check if the table has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
