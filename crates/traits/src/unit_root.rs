//! Unit-root test trait definitions.

use lintner_primitives::UnitRootOutcome;

/// A test of the unit-root null hypothesis on a numeric sequence.
///
/// Implementations only report; they never transform the input.
pub trait UnitRootTest {
    /// Error type raised when the test cannot be computed.
    type Error: std::error::Error;

    /// Run the test on `series`.
    ///
    /// # Errors
    /// Returns `Self::Error` if the series is too short or the test
    /// regression is singular.
    fn test(&self, series: &[f64]) -> Result<UnitRootOutcome, Self::Error>;

    /// Returns the name of this test.
    fn name(&self) -> &str;
}
