//! Ordinary least squares factor models.

use std::collections::BTreeSet;
use std::fmt;

use lintner_math::{OlsFit, f_sf, ordinary_least_squares, students_t_two_sided};
use lintner_primitives::{Date, ReturnSeries};
use ndarray::{Array1, Array2, Axis};

use crate::{ExcessReturns, ModelError};

/// Name of the intercept term in coefficient tables.
const INTERCEPT: &str = "(Intercept)";

/// Residual sum of squares, relative to the uncentered sum of squares of the
/// response, at or below which residuals are rounding noise.
const EXACT_FIT_TOLERANCE: f64 = 1e-20;

/// An estimated coefficient with its inference statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficient {
    /// Term name: the intercept or a regressor name.
    pub name: String,
    /// Point estimate.
    pub estimate: f64,
    /// Standard error.
    pub std_error: f64,
    /// t statistic, `estimate / std_error`.
    pub t_value: f64,
    /// Two-sided p-value of the t statistic.
    pub p_value: f64,
}

/// Immutable OLS fit of `dependent = α + Σ βᵢ·regressorᵢ + ε`.
///
/// Series are aligned by position. The design matrix keeps the intercept
/// in column 0 followed by the regressors in the order given.
#[derive(Debug, Clone)]
pub struct FactorModel {
    dependent: String,
    dates: Vec<Date>,
    response: Array1<f64>,
    design: Array2<f64>,
    fit: OlsFit,
    coefficients: Vec<Coefficient>,
    adj_r_squared: f64,
    f_statistic: f64,
    f_p_value: f64,
    log_likelihood: f64,
}

impl FactorModel {
    /// Fit `dependent` on an intercept and `regressors`.
    ///
    /// # Errors
    /// Returns `ModelError::LengthMismatch` if a regressor differs in length
    /// from the dependent series, `MathError::InsufficientObservations` when
    /// observations do not exceed parameters and `MathError::LinearAlgebra`
    /// for a singular design.
    pub fn fit(dependent: &ReturnSeries, regressors: &[&ReturnSeries]) -> Result<Self, ModelError> {
        if regressors.is_empty() {
            return Err(ModelError::InvalidConfig("a factor model needs a regressor".to_string()));
        }
        let n = dependent.len();
        for regressor in regressors {
            if regressor.len() != n {
                return Err(ModelError::LengthMismatch {
                    context: regressor.name.clone(),
                    expected: n,
                    actual: regressor.len(),
                });
            }
        }

        let mut names = Vec::with_capacity(regressors.len() + 1);
        names.push(INTERCEPT.to_string());
        names.extend(regressors.iter().map(|r| r.name.clone()));

        let design = Array2::from_shape_fn((n, names.len()), |(i, j)| {
            if j == 0 { 1.0 } else { regressors[j - 1].values[i] }
        });

        Self::estimate(
            dependent.name.clone(),
            names,
            dependent.dates.clone(),
            dependent.values.clone(),
            design,
        )
    }

    fn estimate(
        dependent: String,
        names: Vec<String>,
        dates: Vec<Date>,
        response: Array1<f64>,
        design: Array2<f64>,
    ) -> Result<Self, ModelError> {
        let fit = ordinary_least_squares(&response, &design)?;
        let df = fit.df_residual as f64;

        let coefficients = names
            .into_iter()
            .zip(fit.coefficients.iter().zip(fit.standard_errors.iter()))
            .map(|(name, (&estimate, &std_error))| {
                let t_value = estimate / std_error;
                let p_value = students_t_two_sided(t_value, df)?;
                Ok::<_, ModelError>(Coefficient { name, estimate, std_error, t_value, p_value })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let n = fit.nobs() as f64;
        let k = fit.n_params() as f64;
        let adj_r_squared = 1.0 - (1.0 - fit.r_squared) * (n - 1.0) / df;
        let f_statistic = (fit.r_squared / (k - 1.0)) / ((1.0 - fit.r_squared) / df);
        let f_p_value = f_sf(f_statistic, k - 1.0, df)?;
        let log_likelihood =
            -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (fit.ss_residual / n).ln() + 1.0);

        tracing::debug!(
            dependent = %dependent,
            nobs = fit.nobs(),
            params = fit.n_params(),
            r_squared = fit.r_squared,
            "fitted factor model"
        );

        Ok(Self {
            dependent,
            dates,
            response,
            design,
            fit,
            coefficients,
            adj_r_squared,
            f_statistic,
            f_p_value,
            log_likelihood,
        })
    }

    /// Refit on the same data without the observations at `excluded`.
    ///
    /// Indices outside the sample are ignored. The original model is left
    /// untouched.
    ///
    /// # Errors
    /// Same as [`FactorModel::fit`].
    pub fn refit_without(&self, excluded: &[usize]) -> Result<Self, ModelError> {
        let excluded: BTreeSet<usize> = excluded.iter().copied().collect();
        let keep: Vec<usize> = (0..self.nobs()).filter(|i| !excluded.contains(i)).collect();

        Self::estimate(
            self.dependent.clone(),
            self.coefficients.iter().map(|c| c.name.clone()).collect(),
            keep.iter().map(|&i| self.dates[i]).collect(),
            self.response.select(Axis(0), &keep),
            self.design.select(Axis(0), &keep),
        )
    }

    /// Name of the dependent series.
    #[must_use]
    pub fn dependent(&self) -> &str {
        &self.dependent
    }

    /// Regressor names, without the intercept.
    pub fn regressors(&self) -> impl Iterator<Item = &str> {
        self.coefficients[1..].iter().map(|c| c.name.as_str())
    }

    /// Observation dates.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// All coefficients, intercept first.
    #[must_use]
    pub fn coefficients(&self) -> &[Coefficient] {
        &self.coefficients
    }

    /// The intercept α.
    #[must_use]
    pub fn alpha(&self) -> &Coefficient {
        &self.coefficients[0]
    }

    /// Slope coefficient of the named regressor.
    #[must_use]
    pub fn beta(&self, regressor: &str) -> Option<&Coefficient> {
        self.coefficients[1..].iter().find(|c| c.name == regressor)
    }

    /// Dependent values.
    #[must_use]
    pub const fn response(&self) -> &Array1<f64> {
        &self.response
    }

    /// Design matrix, intercept column first.
    #[must_use]
    pub const fn design(&self) -> &Array2<f64> {
        &self.design
    }

    /// Underlying least squares fit.
    #[must_use]
    pub const fn ols(&self) -> &OlsFit {
        &self.fit
    }

    /// Residuals.
    #[must_use]
    pub const fn residuals(&self) -> &Array1<f64> {
        &self.fit.residuals
    }

    /// Fitted values.
    #[must_use]
    pub const fn fitted(&self) -> &Array1<f64> {
        &self.fit.fitted
    }

    /// Number of observations.
    #[must_use]
    pub fn nobs(&self) -> usize {
        self.fit.nobs()
    }

    /// Number of estimated parameters, intercept included.
    #[must_use]
    pub fn n_params(&self) -> usize {
        self.fit.n_params()
    }

    /// Residual degrees of freedom.
    #[must_use]
    pub const fn df_residual(&self) -> usize {
        self.fit.df_residual
    }

    /// Residual sum of squares.
    #[must_use]
    pub const fn ss_residual(&self) -> f64 {
        self.fit.ss_residual
    }

    /// Coefficient of determination.
    #[must_use]
    pub const fn r_squared(&self) -> f64 {
        self.fit.r_squared
    }

    /// Whether the regressors reproduce the response up to rounding.
    ///
    /// Residual-based tests have no information to work with on such a fit.
    #[must_use]
    pub fn is_exact_fit(&self) -> bool {
        self.fit.ss_residual <= EXACT_FIT_TOLERANCE * self.response.dot(&self.response)
    }

    /// R² adjusted for the number of parameters.
    #[must_use]
    pub const fn adj_r_squared(&self) -> f64 {
        self.adj_r_squared
    }

    /// Residual standard error.
    #[must_use]
    pub fn sigma(&self) -> f64 {
        self.fit.sigma_squared.sqrt()
    }

    /// F statistic for the joint nullity of all slopes.
    #[must_use]
    pub const fn f_statistic(&self) -> f64 {
        self.f_statistic
    }

    /// P-value of the F statistic.
    #[must_use]
    pub const fn f_p_value(&self) -> f64 {
        self.f_p_value
    }

    /// Gaussian log-likelihood at the estimates.
    #[must_use]
    pub const fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Akaike information criterion, counting the regression coefficients.
    #[must_use]
    pub fn aic(&self) -> f64 {
        2.0f64.mul_add(self.n_params() as f64, -2.0 * self.log_likelihood)
    }

    /// Bayesian information criterion, counting the regression coefficients.
    #[must_use]
    pub fn bic(&self) -> f64 {
        (self.nobs() as f64).ln().mul_add(self.n_params() as f64, -2.0 * self.log_likelihood)
    }
}

impl fmt::Display for FactorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.coefficients.iter().map(|c| c.name.len()).max().unwrap_or(0).max(8);

        writeln!(
            f,
            "Dependent: {}  Observations: {}  Parameters: {}",
            self.dependent,
            self.nobs(),
            self.n_params()
        )?;
        writeln!(
            f,
            "{:width$}  {:>12}  {:>12}  {:>9}  {:>10}",
            "", "Estimate", "Std. Error", "t value", "Pr(>|t|)"
        )?;
        for c in &self.coefficients {
            writeln!(
                f,
                "{:width$}  {:>12.6}  {:>12.6}  {:>9.3}  {:>10.4e}",
                c.name, c.estimate, c.std_error, c.t_value, c.p_value
            )?;
        }
        writeln!(
            f,
            "Residual standard error: {:.6} on {} degrees of freedom",
            self.sigma(),
            self.df_residual()
        )?;
        writeln!(
            f,
            "R-squared: {:.4}, Adjusted R-squared: {:.4}",
            self.r_squared(),
            self.adj_r_squared
        )?;
        writeln!(
            f,
            "F-statistic: {:.3} on {} and {} DF, p-value: {:.4e}",
            self.f_statistic,
            self.n_params() - 1,
            self.df_residual(),
            self.f_p_value
        )?;
        write!(
            f,
            "Log-likelihood: {:.3}, AIC: {:.3}, BIC: {:.3}",
            self.log_likelihood,
            self.aic(),
            self.bic()
        )
    }
}

/// Names of the series in a factor model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    /// Dependent column.
    pub dependent: String,
    /// Regressor columns, in design order.
    pub regressors: Vec<String>,
}

impl ModelSpec {
    /// Single-factor (CAPM) specification: the asset on the market.
    pub fn single_factor(asset: impl Into<String>, market: impl Into<String>) -> Self {
        Self { dependent: asset.into(), regressors: vec![market.into()] }
    }

    /// Multi-factor (APT) specification: the asset on the market and macro factors.
    pub fn multi_factor<I, S>(asset: impl Into<String>, market: impl Into<String>, factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut regressors = vec![market.into()];
        regressors.extend(factors.into_iter().map(Into::into));
        Self { dependent: asset.into(), regressors }
    }

    /// Fit the specification on excess returns.
    ///
    /// # Errors
    /// Returns `ModelError::MissingColumn` for an unknown series and any
    /// error of [`FactorModel::fit`].
    pub fn fit(&self, excess: &ExcessReturns) -> Result<FactorModel, ModelError> {
        let column = |name: &str| {
            excess.column(name).ok_or_else(|| ModelError::MissingColumn(name.to_string()))
        };
        let dependent = column(&self.dependent)?;
        let regressors =
            self.regressors.iter().map(|name| column(name)).collect::<Result<Vec<_>, _>>()?;
        FactorModel::fit(dependent, &regressors)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::{Array1, array};

    use super::*;
    use crate::ErrorKind;

    fn dates(n: usize) -> Vec<Date> {
        let start = Date::from_ymd_opt(2024, 1, 1).unwrap();
        start.iter_days().take(n).collect()
    }

    fn series(name: &str, values: Array1<f64>) -> ReturnSeries {
        ReturnSeries::new(name, dates(values.len()), values).unwrap()
    }

    #[test]
    fn exact_line_has_unit_r_squared() {
        let x = Array1::linspace(-1.0, 1.0, 20);
        let y = x.mapv(|v| 2.0 + 3.0 * v);

        let model = FactorModel::fit(&series("y", y), &[&series("x", x)]).unwrap();

        assert_relative_eq!(model.alpha().estimate, 2.0, epsilon = 1e-10);
        assert_relative_eq!(model.beta("x").unwrap().estimate, 3.0, epsilon = 1e-10);
        assert_relative_eq!(model.r_squared(), 1.0, epsilon = 1e-12);
        assert!(model.f_p_value() < 1e-10);
        assert!(model.is_exact_fit());
    }

    #[test]
    fn slope_recovered_as_noise_vanishes() {
        let x = Array1::linspace(0.0, 10.0, 50);
        // Deterministic alternating disturbance of shrinking size.
        for scale in [1e-1, 1e-3, 1e-6] {
            let y: Array1<f64> = x
                .iter()
                .enumerate()
                .map(|(i, v)| 2.0 + 3.0 * v + scale * if i % 2 == 0 { 1.0 } else { -1.0 })
                .collect();
            let model = FactorModel::fit(&series("y", y), &[&series("x", x.clone())]).unwrap();
            assert_relative_eq!(model.beta("x").unwrap().estimate, 3.0, epsilon = 10.0 * scale);
            assert!(!model.is_exact_fit());
        }
    }

    #[test]
    fn too_few_observations() {
        let y = series("y", array![0.1, 0.2]);
        let a = series("a", array![1.0, 2.0]);
        let b = series("b", array![3.0, 1.0]);

        let err = FactorModel::fit(&y, &[&a, &b]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientObservations);
    }

    #[test]
    fn regressor_length_must_match() {
        let y = series("y", array![0.1, 0.2, 0.3, 0.4]);
        let x = series("x", array![1.0, 2.0, 3.0]);

        let err = FactorModel::fit(&y, &[&x]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LengthMismatch);
    }

    #[test]
    fn inference_statistics() {
        let x = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = array![1.1, 1.9, 3.2, 3.9, 5.1, 5.8];
        let model = FactorModel::fit(&series("y", y), &[&series("x", x)]).unwrap();

        let beta = model.beta("x").unwrap();
        assert_relative_eq!(beta.t_value, beta.estimate / beta.std_error);
        assert!(beta.p_value < 1e-4);
        // With one regressor the overall F equals the squared slope t statistic.
        assert_relative_eq!(model.f_statistic(), beta.t_value.powi(2), max_relative = 1e-9);
        assert_eq!(model.df_residual(), 4);
        assert!(model.adj_r_squared() < model.r_squared());
        assert_relative_eq!(model.bic() - model.aic(), 2.0 * (6.0f64.ln() - 2.0), epsilon = 1e-9);
    }

    #[test]
    fn refit_drops_observations() {
        let x = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let mut y = x.mapv(|v| 1.0 + 0.5 * v);
        y[3] += 10.0;
        let model = FactorModel::fit(&series("y", y), &[&series("x", x)]).unwrap();

        let clean = model.refit_without(&[3, 99]).unwrap();

        assert_eq!(clean.nobs(), 6);
        assert_eq!(model.nobs(), 7);
        assert!(!clean.dates().contains(&model.dates()[3]));
        assert_relative_eq!(clean.beta("x").unwrap().estimate, 0.5, epsilon = 1e-10);
        assert_eq!(clean.regressors().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn spec_fits_named_columns() {
        let d = dates(5);
        let excess = ExcessReturns {
            dates: d.clone(),
            risk_free: lintner_primitives::RiskFreeSeries::new(d.clone(), Array1::zeros(5))
                .unwrap(),
            series: vec![
                ReturnSeries::new("xom", d.clone(), array![0.02, -0.01, 0.03, 0.0, 0.01]).unwrap(),
                ReturnSeries::new("spy", d.clone(), array![0.01, -0.01, 0.02, 0.001, 0.004])
                    .unwrap(),
                ReturnSeries::new("oil", d, array![0.03, 0.0, 0.01, -0.02, 0.02]).unwrap(),
            ],
        };

        let capm = ModelSpec::single_factor("xom", "spy").fit(&excess).unwrap();
        assert_eq!(capm.n_params(), 2);

        let apt = ModelSpec::multi_factor("xom", "spy", ["oil"]).fit(&excess).unwrap();
        assert_eq!(apt.regressors().collect::<Vec<_>>(), vec!["spy", "oil"]);

        let err = ModelSpec::multi_factor("xom", "spy", ["fx"]).fit(&excess).unwrap_err();
        assert!(matches!(err, ModelError::MissingColumn(ref c) if c == "fx"));
    }

    #[test]
    fn summary_lists_every_term() {
        let x = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = array![1.0, 2.1, 2.9, 4.2, 5.0];
        let model = FactorModel::fit(&series("asset", y), &[&series("market", x)]).unwrap();

        let summary = model.to_string();
        assert!(summary.contains("(Intercept)"));
        assert!(summary.contains("market"));
        assert!(summary.contains("R-squared"));
    }
}
