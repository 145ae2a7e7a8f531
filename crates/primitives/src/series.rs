//! Dated time series.

use serde::{Deserialize, Serialize};

use crate::Date;

/// Errors raised when constructing series and tables.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    /// Dates and values have different lengths.
    #[error("series {name}: {dates} dates but {values} values")]
    LengthMismatch {
        /// Series name.
        name: String,
        /// Number of dates.
        dates: usize,
        /// Number of values.
        values: usize,
    },

    /// Dates are not strictly increasing.
    #[error("series {name}: date {date} is not after its predecessor")]
    NotIncreasing {
        /// Series name.
        name: String,
        /// First offending date.
        date: Date,
    },

    /// A value is missing (NaN or infinite) where one is required.
    #[error("column {column}: missing value on {date}")]
    MissingValue {
        /// Column name.
        column: String,
        /// Date of the missing value.
        date: Date,
    },

    /// Two columns share a name.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),
}

/// An ordered sequence of `(date, value)` observations for one instrument
/// or macro variable.
///
/// Dates are strictly increasing, so there is exactly one value per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    name: String,
    dates: Vec<Date>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a series from parallel date and value vectors.
    ///
    /// # Errors
    /// Returns `SeriesError::LengthMismatch` if the vectors differ in length and
    /// `SeriesError::NotIncreasing` if a date does not follow its predecessor.
    pub fn new(
        name: impl Into<String>,
        dates: Vec<Date>,
        values: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        let name = name.into();
        if dates.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                name,
                dates: dates.len(),
                values: values.len(),
            });
        }
        if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(SeriesError::NotIncreasing { name, date: w[1] });
        }
        Ok(Self { name, dates, values })
    }

    /// Create a series from `(date, value)` pairs.
    ///
    /// # Errors
    /// Returns `SeriesError::NotIncreasing` if the pairs are not in strictly
    /// increasing date order.
    pub fn from_observations(
        name: impl Into<String>,
        observations: impl IntoIterator<Item = (Date, f64)>,
    ) -> Result<Self, SeriesError> {
        let (dates, values) = observations.into_iter().unzip();
        Self::new(name, dates, values)
    }

    /// Series name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return a copy of this series under another name.
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Observation dates.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Observation values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of observations.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Check if empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// First observation date.
    #[must_use]
    pub fn first_date(&self) -> Option<Date> {
        self.dates.first().copied()
    }

    /// Last observation date.
    #[must_use]
    pub fn last_date(&self) -> Option<Date> {
        self.dates.last().copied()
    }

    /// Value observed on `date`, if any.
    #[must_use]
    pub fn get(&self, date: Date) -> Option<f64> {
        self.dates.binary_search(&date).ok().map(|i| self.values[i])
    }

    /// Iterate over `(date, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Restrict the series to the inclusive window `[from, to]`.
    #[must_use]
    pub fn between(&self, from: Date, to: Date) -> Self {
        let start = self.dates.partition_point(|d| *d < from);
        let end = self.dates.partition_point(|d| *d <= to);
        let end = end.max(start);
        Self {
            name: self.name.clone(),
            dates: self.dates[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn rejects_unsorted_dates() {
        let err = TimeSeries::new("x", vec![d(2024, 1, 2), d(2024, 1, 2)], vec![1.0, 2.0])
            .unwrap_err();
        assert_eq!(err, SeriesError::NotIncreasing { name: "x".into(), date: d(2024, 1, 2) });
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = TimeSeries::new("x", vec![d(2024, 1, 2)], vec![]).unwrap_err();
        assert!(err.to_string().contains("1 dates but 0 values"));
    }

    #[test]
    fn lookup_and_window() {
        let ts = TimeSeries::from_observations(
            "px",
            [(d(2024, 1, 2), 10.0), (d(2024, 1, 3), 11.0), (d(2024, 1, 5), 12.0)],
        )
        .unwrap();

        assert_eq!(ts.get(d(2024, 1, 3)), Some(11.0));
        assert_eq!(ts.get(d(2024, 1, 4)), None);

        let window = ts.between(d(2024, 1, 3), d(2024, 1, 4));
        assert_eq!(window.len(), 1);
        assert_eq!(window.first_date(), Some(d(2024, 1, 3)));

        let empty = ts.between(d(2025, 1, 1), d(2024, 1, 1));
        assert!(empty.is_empty());
    }
}
