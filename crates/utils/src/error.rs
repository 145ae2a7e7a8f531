//! Error types for utility functions.

use lintner_primitives::{Date, SeriesError};

/// Errors that can occur during utility operations.
#[derive(Debug, thiserror::Error)]
pub enum UtilsError {
    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Invalid parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A column has no known value on any date of the join index.
    #[error("incompatible date range: column {column} has no values on the joined dates")]
    IncompatibleDateRange {
        /// Column name.
        column: String,
    },

    /// A leading or trailing gap cannot be interpolated.
    #[error("unresolved gap in column {column} on {date}")]
    UnresolvedGap {
        /// Column name.
        column: String,
        /// Date of the first unresolved cell.
        date: Date,
    },

    /// The aligned table violates a series invariant.
    #[error("series error: {0}")]
    Series(#[from] SeriesError),
}
