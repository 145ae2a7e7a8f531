//! Augmented Dickey-Fuller unit-root test.
//!
//! The test regression is
//!
//! ```text
//! Δy_t = γ·y_{t-1} + Σ_{j=1..k} φ_j·Δy_{t-j} + c (+ δ·t) + ε_t
//! ```
//!
//! and the statistic is the t-ratio of `γ`. The null hypothesis is a unit
//! root (`γ = 0`); rejecting it means the series is judged stationary.

use lintner_math::{
    MathError, OlsFit, UnitRootTrend, mackinnon_critical_values, mackinnon_p_value,
    ordinary_least_squares,
};
use lintner_primitives::{CriticalValues, TestOutcome, UnitRootOutcome};
use lintner_traits::UnitRootTest;
use ndarray::{Array1, Array2};

use crate::ModelError;

/// How many lagged differences enter the test regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LagSelection {
    /// Minimise AIC over `0..=max_lag` on a common sample.
    ///
    /// Without an explicit bound the Schwert rule `⌊12·(n/100)^¼⌋` is used.
    /// The bound is capped at `n/2 - d - 1` for `d` deterministic terms.
    Aic {
        /// Largest lag considered.
        max_lag: Option<usize>,
    },
    /// Use exactly this many lags.
    Fixed(usize),
}

impl Default for LagSelection {
    fn default() -> Self {
        Self::Aic { max_lag: None }
    }
}

/// Configuration for the augmented Dickey-Fuller test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfConfig {
    /// Deterministic terms in the test regression.
    pub regression: UnitRootTrend,
    /// Lag order selection.
    pub lags: LagSelection,
    /// Significance level for the stationarity decision.
    pub significance: f64,
}

impl Default for AdfConfig {
    fn default() -> Self {
        Self {
            regression: UnitRootTrend::Constant,
            lags: LagSelection::default(),
            significance: 0.05,
        }
    }
}

/// Augmented Dickey-Fuller test with MacKinnon p-values.
#[derive(Debug, Clone, Default)]
pub struct AugmentedDickeyFuller {
    config: AdfConfig,
}

impl AugmentedDickeyFuller {
    /// Create a test with the given configuration.
    #[must_use]
    pub const fn new(config: AdfConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &AdfConfig {
        &self.config
    }

    fn lag_bound(&self, n: usize, requested: Option<usize>) -> Result<usize, MathError> {
        let terms = deterministic_terms(self.config.regression);
        let cap = (n / 2).checked_sub(terms + 1).ok_or(MathError::InsufficientObservations {
            observations: n,
            parameters: terms + 2,
        })?;
        let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize;
        Ok(requested.unwrap_or(schwert).min(cap))
    }

    fn select_lag(&self, series: &[f64], max_lag: Option<usize>) -> Result<usize, MathError> {
        let trend = self.config.regression;
        let max_lag = self.lag_bound(series.len(), max_lag)?;

        let mut best = (0, f64::INFINITY);
        for lags in 0..=max_lag {
            let fit = adf_regression(series, lags, max_lag, trend)?;
            let aic = akaike(&fit);
            if aic < best.1 {
                best = (lags, aic);
            }
        }
        tracing::debug!(max_lag, used_lag = best.0, aic = best.1, "selected ADF lag order");
        Ok(best.0)
    }
}

impl UnitRootTest for AugmentedDickeyFuller {
    type Error = ModelError;

    fn test(&self, series: &[f64]) -> Result<UnitRootOutcome, ModelError> {
        if series.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("unit-root test input".to_string()));
        }

        let trend = self.config.regression;
        let used_lag = match self.config.lags {
            LagSelection::Fixed(lags) => lags,
            LagSelection::Aic { max_lag } => self.select_lag(series, max_lag)?,
        };
        let fit = adf_regression(series, used_lag, used_lag, trend)?;

        let statistic = fit.coefficients[0] / fit.standard_errors[0];
        let p_value = mackinnon_p_value(statistic, trend);
        let [one_percent, five_percent, ten_percent] = mackinnon_critical_values(fit.nobs(), trend);

        Ok(UnitRootOutcome {
            test: TestOutcome::new(statistic, p_value, self.config.significance),
            used_lag,
            nobs: fit.nobs(),
            critical_values: CriticalValues { one_percent, five_percent, ten_percent },
        })
    }

    fn name(&self) -> &str {
        "augmented Dickey-Fuller"
    }
}

const fn deterministic_terms(trend: UnitRootTrend) -> usize {
    match trend {
        UnitRootTrend::Constant => 1,
        UnitRootTrend::ConstantTrend => 2,
    }
}

fn akaike(fit: &OlsFit) -> f64 {
    let n = fit.nobs() as f64;
    let loglik = -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (fit.ss_residual / n).ln() + 1.0);
    2.0f64.mul_add(fit.n_params() as f64, -2.0 * loglik)
}

/// Fit the test regression with `lags` lagged differences on the
/// differences from index `start` onwards. Requires `start >= lags`.
///
/// Columns are `[y_{t-1}, Δy_{t-1}, …, Δy_{t-lags}, 1, (t)]`.
fn adf_regression(
    series: &[f64],
    lags: usize,
    start: usize,
    trend: UnitRootTrend,
) -> Result<OlsFit, MathError> {
    debug_assert!(start >= lags);
    let n_params = 1 + lags + deterministic_terms(trend);
    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();
    if start >= diffs.len() {
        return Err(MathError::InsufficientObservations {
            observations: diffs.len().saturating_sub(start),
            parameters: n_params,
        });
    }

    let nobs = diffs.len() - start;
    let y = Array1::from_iter(diffs[start..].iter().copied());
    let x = Array2::from_shape_fn((nobs, n_params), |(i, j)| {
        let t = start + i;
        if j == 0 {
            series[t]
        } else if j <= lags {
            diffs[t - j]
        } else if j == lags + 1 {
            1.0
        } else {
            (i + 1) as f64
        }
    });

    ordinary_least_squares(&y, &x)
}
