//! Return type definitions.

use ndarray::Array1;

use crate::{Date, SeriesError};

/// Log returns (or excess log returns) of one instrument.
///
/// Each value is dated by the later of the two prices it differences.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    /// Instrument name.
    pub name: String,
    /// Return dates.
    pub dates: Vec<Date>,
    /// Return values.
    pub values: Array1<f64>,
}

impl ReturnSeries {
    /// Create a new return series.
    ///
    /// # Errors
    /// Returns `SeriesError::LengthMismatch` if dates and values differ in length.
    pub fn new(
        name: impl Into<String>,
        dates: Vec<Date>,
        values: Array1<f64>,
    ) -> Result<Self, SeriesError> {
        let name = name.into();
        if dates.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                name,
                dates: dates.len(),
                values: values.len(),
            });
        }
        Ok(Self { name, dates, values })
    }

    /// Number of returns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Arithmetic mean of the returns.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        self.values.mean()
    }

    /// Return on a specific date.
    #[must_use]
    pub fn get(&self, date: Date) -> Option<f64> {
        self.dates.binary_search(&date).ok().map(|i| self.values[i])
    }
}

/// Per-period log risk-free returns on a set of trading dates.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskFreeSeries {
    /// Trading dates.
    pub dates: Vec<Date>,
    /// Log risk-free return for each date.
    pub values: Array1<f64>,
}

impl RiskFreeSeries {
    /// Create a new risk-free series.
    ///
    /// # Errors
    /// Returns `SeriesError::LengthMismatch` if dates and values differ in length.
    pub fn new(dates: Vec<Date>, values: Array1<f64>) -> Result<Self, SeriesError> {
        if dates.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                name: "risk-free".to_string(),
                dates: dates.len(),
                values: values.len(),
            });
        }
        Ok(Self { dates, values })
    }

    /// Number of trading dates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
