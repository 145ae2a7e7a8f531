//! Error types for the analysis pipeline.

use lintner_math::MathError;
use lintner_primitives::{Date, SeriesError, YearMonth};
use lintner_traits::SourceError;
use lintner_utils::UtilsError;

/// Category of a pipeline failure.
///
/// Every failure is terminal for the run; the kind tells the caller which
/// stage rejected the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A joined column has no usable values.
    IncompatibleDateRange,
    /// No risk-free rate was published for a calendar month.
    MissingRate,
    /// Series that must be aligned by position differ in length.
    LengthMismatch,
    /// Too few observations for the number of parameters.
    InsufficientObservations,
    /// The data source could not deliver a series.
    SourceUnavailable,
    /// Input data or configuration is invalid.
    InvalidInput,
    /// A numerical routine failed (singular design, invalid distribution).
    Numerical,
}

/// Errors that can occur during loading, transformation, fitting and diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Data source error.
    #[error("data source error: {0}")]
    Source(#[from] SourceError),

    /// Alignment error.
    #[error("alignment error: {0}")]
    Utils(#[from] UtilsError),

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Series construction error.
    #[error("series error: {0}")]
    Series(#[from] SeriesError),

    /// No rate was published for the month enclosing a trading date.
    #[error("missing risk-free rate for {month} (needed on {date})")]
    MissingRate {
        /// Month without a rate.
        month: YearMonth,
        /// First trading date in that month.
        date: Date,
    },

    /// Series differ in length where positional alignment is required.
    #[error("length mismatch for {context}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// What was being aligned.
        context: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// A price is zero or negative, so its logarithm is undefined.
    #[error("non-positive price in column {column} on {date}")]
    NonPositivePrice {
        /// Column name.
        column: String,
        /// Date of the price.
        date: Date,
    },

    /// A numeric input contains NaN or an infinity.
    #[error("non-finite value in {0}")]
    NonFinite(String),

    /// Missing required column.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// A series failed the stationarity gate.
    #[error("series {column} is not stationary (statistic {statistic:.3}, p-value {p_value:.3})")]
    NonStationary {
        /// Column name.
        column: String,
        /// Unit-root test statistic.
        statistic: f64,
        /// Unit-root test p-value.
        p_value: f64,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ModelError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Source(_) => ErrorKind::SourceUnavailable,
            Self::Utils(
                UtilsError::IncompatibleDateRange { .. } | UtilsError::UnresolvedGap { .. },
            ) => ErrorKind::IncompatibleDateRange,
            Self::Math(MathError::InsufficientObservations { .. }) => {
                ErrorKind::InsufficientObservations
            }
            Self::Math(MathError::DimensionMismatch { .. })
            | Self::Series(SeriesError::LengthMismatch { .. })
            | Self::LengthMismatch { .. } => ErrorKind::LengthMismatch,
            Self::Math(_) => ErrorKind::Numerical,
            Self::MissingRate { .. } => ErrorKind::MissingRate,
            Self::Utils(_)
            | Self::Series(_)
            | Self::NonPositivePrice { .. }
            | Self::NonFinite(_)
            | Self::MissingColumn(_)
            | Self::NonStationary { .. }
            | Self::InvalidConfig(_) => ErrorKind::InvalidInput,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ModelError::MissingRate {
            month: YearMonth::new(2013, 7),
            date: Date::from_ymd_opt(2013, 7, 1).unwrap(),
        };
        assert_eq!(err.to_string(), "missing risk-free rate for 2013-07 (needed on 2013-07-01)");
    }

    #[test]
    fn error_kind() {
        let err = ModelError::from(MathError::InsufficientObservations {
            observations: 2,
            parameters: 3,
        });
        assert_eq!(err.kind(), ErrorKind::InsufficientObservations);

        let err = ModelError::from(UtilsError::IncompatibleDateRange { column: "fx".into() });
        assert_eq!(err.kind(), ErrorKind::IncompatibleDateRange);

        let err = ModelError::from(SourceError::unavailable("XOM", "offline"));
        assert_eq!(err.kind(), ErrorKind::SourceUnavailable);

        let err = ModelError::LengthMismatch { context: "oil".into(), expected: 10, actual: 9 };
        assert_eq!(err.kind(), ErrorKind::LengthMismatch);

        let err = ModelError::from(MathError::LinearAlgebra("singular".into()));
        assert_eq!(err.kind(), ErrorKind::Numerical);
    }
}
