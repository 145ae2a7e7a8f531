//! Hypothesis-test outcomes.

use serde::{Deserialize, Serialize};

/// Statistic and p-value of a hypothesis test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Test statistic.
    pub statistic: f64,
    /// P-value of the statistic under the null hypothesis.
    pub p_value: f64,
    /// Significance level used for the decision.
    pub significance: f64,
}

impl TestOutcome {
    /// Create a new outcome.
    #[must_use]
    pub const fn new(statistic: f64, p_value: f64, significance: f64) -> Self {
        Self { statistic, p_value, significance }
    }

    /// Whether the null hypothesis is rejected at the configured significance.
    #[must_use]
    pub fn rejects_null(&self) -> bool {
        self.p_value < self.significance
    }
}

/// Critical values of a unit-root statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    /// 1% critical value.
    pub one_percent: f64,
    /// 5% critical value.
    pub five_percent: f64,
    /// 10% critical value.
    pub ten_percent: f64,
}

/// Result of a unit-root (stationarity) test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitRootOutcome {
    /// Test statistic and p-value. The null hypothesis is a unit root.
    pub test: TestOutcome,
    /// Number of lagged differences in the test regression.
    pub used_lag: usize,
    /// Observations used in the test regression.
    pub nobs: usize,
    /// Critical values for the observation count.
    pub critical_values: CriticalValues,
}

impl UnitRootOutcome {
    /// Whether the series is judged stationary (unit root rejected).
    #[must_use]
    pub fn is_stationary(&self) -> bool {
        self.test.rejects_null()
    }
}
