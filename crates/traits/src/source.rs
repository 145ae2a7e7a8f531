//! Data source trait definitions.

use lintner_primitives::{Date, TimeSeries};

/// Errors a data source can report.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source could not deliver the requested series.
    #[error("source unavailable for {series}: {reason}")]
    Unavailable {
        /// Requested ticker or series name.
        series: String,
        /// Underlying cause.
        reason: String,
    },

    /// The source delivered no observations in the requested window.
    #[error("no observations for {series} between {from} and {to}")]
    Empty {
        /// Requested ticker or series name.
        series: String,
        /// Window start.
        from: Date,
        /// Window end.
        to: Date,
    },
}

impl SourceError {
    /// Convenience constructor for [`SourceError::Unavailable`].
    pub fn unavailable(series: impl Into<String>, reason: impl ToString) -> Self {
        Self::Unavailable { series: series.into(), reason: reason.to_string() }
    }

    /// Name of the series the error refers to.
    #[must_use]
    pub fn series(&self) -> &str {
        match self {
            Self::Unavailable { series, .. } | Self::Empty { series, .. } => series,
        }
    }
}

/// Supplier of raw time series.
///
/// Calls are atomic: a source either returns the whole series for the window
/// or fails. Callers do not retry.
pub trait DataSource {
    /// Daily adjusted closing prices for `ticker` over `[from, to]`.
    ///
    /// # Errors
    /// Returns `SourceError` if the series cannot be retrieved.
    fn daily_prices(&self, ticker: &str, from: Date, to: Date) -> Result<TimeSeries, SourceError>;

    /// A named macroeconomic series (interest rate, commodity price, FX rate)
    /// over `[from, to]`, at whatever frequency the publisher uses.
    ///
    /// # Errors
    /// Returns `SourceError` if the series cannot be retrieved.
    fn macro_series(&self, name: &str, from: Date, to: Date) -> Result<TimeSeries, SourceError>;
}
