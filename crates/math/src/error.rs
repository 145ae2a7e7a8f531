//! Error types for mathematical operations.

/// Errors that can occur during mathematical operations.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Not enough observations to identify the parameters.
    #[error("insufficient observations: {observations} observations for {parameters} parameters")]
    InsufficientObservations {
        /// Number of observations.
        observations: usize,
        /// Number of parameters.
        parameters: usize,
    },

    /// Linear algebra error.
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),

    /// Empty data.
    #[error("empty data provided")]
    EmptyData,

    /// Invalid distribution parameters.
    #[error("distribution error: {0}")]
    Distribution(String),
}
