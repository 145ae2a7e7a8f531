//! Leverage, influence and outlier measures of a fitted factor model.

use lintner_math::{MathError, students_t_two_sided};
use lintner_primitives::Date;
use ndarray::{Array1, Axis};

use crate::{DiagnosticsConfig, FactorModel, ModelError};

/// Per-observation influence measures with threshold flags.
#[derive(Debug, Clone)]
pub struct InfluenceReport {
    /// Observation dates.
    pub dates: Vec<Date>,
    /// Diagonal of the hat matrix.
    pub hat: Array1<f64>,
    /// Cook's distance.
    pub cooks_distance: Array1<f64>,
    /// Externally studentized residuals.
    pub studentized: Array1<f64>,
    /// Hat values above this are high leverage.
    pub leverage_threshold: f64,
    /// Cook's distances above this are influential.
    pub cooks_threshold: f64,
}

impl InfluenceReport {
    /// Indices of high-leverage observations.
    #[must_use]
    pub fn high_leverage(&self) -> Vec<usize> {
        above(&self.hat, self.leverage_threshold)
    }

    /// Indices of influential observations by Cook's distance.
    #[must_use]
    pub fn influential(&self) -> Vec<usize> {
        above(&self.cooks_distance, self.cooks_threshold)
    }

    /// Indices flagged by either rule, ascending.
    #[must_use]
    pub fn flagged(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| {
                self.hat[i] > self.leverage_threshold
                    || self.cooks_distance[i] > self.cooks_threshold
            })
            .collect()
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hat.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hat.is_empty()
    }
}

fn above(values: &Array1<f64>, threshold: f64) -> Vec<usize> {
    values.iter().enumerate().filter(|(_, v)| **v > threshold).map(|(i, _)| i).collect()
}

/// Most extreme studentized residual and its Bonferroni-adjusted p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierTest {
    /// Observation index.
    pub index: usize,
    /// Observation date.
    pub date: Date,
    /// Externally studentized residual.
    pub studentized: f64,
    /// Two-sided p-value of the residual on `n - k - 1` degrees of freedom.
    pub unadjusted_p: f64,
    /// `min(1, n · unadjusted_p)`.
    pub bonferroni_p: f64,
}

/// Hat values `h_i = x_i'(X'X)⁻¹x_i`.
fn hat_values(model: &FactorModel) -> Array1<f64> {
    let design = model.design();
    let xtx_inv = &model.ols().xtx_inv;
    design.axis_iter(Axis(0)).map(|row| row.dot(&xtx_inv.dot(&row))).collect()
}

/// Externally studentized residuals `t_i = r_i·√((n-k-1)/(n-k-r_i²))`.
///
/// Undefined, and NaN, for every observation of an exact fit.
fn studentized_residuals(model: &FactorModel, hat: &Array1<f64>) -> Array1<f64> {
    if model.is_exact_fit() {
        return Array1::from_elem(hat.len(), f64::NAN);
    }
    let df = model.df_residual() as f64;
    let sigma = model.sigma();
    model
        .residuals()
        .iter()
        .zip(hat.iter())
        .map(|(e, h)| {
            let r = e / (sigma * (1.0 - h).sqrt());
            r * ((df - 1.0) / (df - r * r)).sqrt()
        })
        .collect()
}

/// Influence measures of every observation.
///
/// Leverage is flagged above `leverage_multiplier · k / n` and Cook's
/// distance above `cooks_numerator / n`, where `k` counts the intercept.
/// Deleting an observation from an exact fit leaves the fit unchanged, so
/// its Cook's distances are zero.
#[must_use]
pub fn influence(model: &FactorModel, config: &DiagnosticsConfig) -> InfluenceReport {
    let n = model.nobs() as f64;
    let k = model.n_params() as f64;
    let s2 = model.ols().sigma_squared;

    let hat = hat_values(model);
    let cooks_distance = if model.is_exact_fit() {
        Array1::zeros(hat.len())
    } else {
        model
            .residuals()
            .iter()
            .zip(hat.iter())
            .map(|(e, h)| e * e * h / (k * s2 * (1.0 - h).powi(2)))
            .collect()
    };
    let studentized = studentized_residuals(model, &hat);

    InfluenceReport {
        dates: model.dates().to_vec(),
        hat,
        cooks_distance,
        studentized,
        leverage_threshold: config.leverage_multiplier * k / n,
        cooks_threshold: config.cooks_numerator / n,
    }
}

/// Bonferroni outlier test on the largest absolute studentized residual.
///
/// Returns `None` when no studentized residual is finite, as for an exact fit
/// or when every observation has unit leverage.
///
/// # Errors
/// Returns `MathError::InsufficientObservations` when no degree of freedom
/// remains after deleting an observation.
pub fn outlier_test(model: &FactorModel) -> Result<Option<OutlierTest>, ModelError> {
    let n = model.nobs();
    if model.df_residual() < 2 {
        return Err(MathError::InsufficientObservations {
            observations: n,
            parameters: model.n_params() + 1,
        }
        .into());
    }

    let studentized = studentized_residuals(model, &hat_values(model));
    let Some((index, t)) = studentized
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, t)| t.is_finite())
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
    else {
        return Ok(None);
    };

    let unadjusted_p = students_t_two_sided(t, (model.df_residual() - 1) as f64)?;
    Ok(Some(OutlierTest {
        index,
        date: model.dates()[index],
        studentized: t,
        unadjusted_p,
        bonferroni_p: (n as f64 * unadjusted_p).min(1.0),
    }))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use lintner_primitives::ReturnSeries;
    use ndarray::Array1;

    use super::*;

    fn dates(n: usize) -> Vec<Date> {
        Date::from_ymd_opt(2023, 6, 1).unwrap().iter_days().take(n).collect()
    }

    fn model(x: Vec<f64>, y: Vec<f64>) -> FactorModel {
        let d = dates(x.len());
        let x = ReturnSeries::new("x", d.clone(), Array1::from(x)).unwrap();
        let y = ReturnSeries::new("y", d, Array1::from(y)).unwrap();
        FactorModel::fit(&y, &[&x]).unwrap()
    }

    fn noisy_line(x: &[f64]) -> Vec<f64> {
        x.iter().enumerate().map(|(i, v)| 0.5 + 2.0 * v + 0.3 * (i as f64 * 1.7).sin()).collect()
    }

    #[test]
    fn distant_regressor_has_high_leverage() {
        let mut x: Vec<f64> = (1..=20).map(f64::from).collect();
        x.push(100.0);
        let y = noisy_line(&x);

        let report = influence(&model(x, y), &DiagnosticsConfig::default());

        assert_relative_eq!(report.leverage_threshold, 2.0 * 2.0 / 21.0);
        assert!(report.hat[20] > report.leverage_threshold);
        assert_eq!(report.high_leverage(), vec![20]);
        assert!(report.flagged().contains(&20));
    }

    #[test]
    fn hat_values_sum_to_parameter_count() {
        let x: Vec<f64> = (0..15).map(|i| f64::from(i).powf(1.3)).collect();
        let y = noisy_line(&x);

        let report = influence(&model(x, y), &DiagnosticsConfig::default());

        assert_relative_eq!(report.hat.sum(), 2.0, epsilon = 1e-10);
        assert!(report.hat.iter().all(|h| (0.0..1.0).contains(h)));
    }

    #[test]
    fn measures_match_leave_one_out_refits() {
        let x: Vec<f64> = (0..12).map(|i| f64::from(i) * 0.5).collect();
        let mut y = noisy_line(&x);
        y[4] += 2.0;
        let fitted = model(x, y);
        let report = influence(&fitted, &DiagnosticsConfig::default());

        let i = 4;
        let without = fitted.refit_without(&[i]).unwrap();
        let coefficients: Array1<f64> = without.coefficients().iter().map(|c| c.estimate).collect();
        let shift = fitted.fitted() - &fitted.design().dot(&coefficients);
        let cooks = shift.mapv(|v| v * v).sum() / (2.0 * fitted.ols().sigma_squared);
        assert_relative_eq!(report.cooks_distance[i], cooks, max_relative = 1e-8);

        let h = report.hat[i];
        let external = fitted.residuals()[i] / (without.sigma() * (1.0 - h).sqrt());
        assert_relative_eq!(report.studentized[i], external, max_relative = 1e-8);
    }

    #[test]
    fn bonferroni_outlier() {
        let x: Vec<f64> = (0..30).map(f64::from).collect();
        let mut y = noisy_line(&x);
        y[17] += 6.0;
        let fitted = model(x, y);

        let test = outlier_test(&fitted).unwrap().unwrap();

        assert_eq!(test.index, 17);
        assert_eq!(test.date, fitted.dates()[17]);
        assert!(test.studentized > 0.0);
        assert_relative_eq!(test.bonferroni_p, (30.0 * test.unadjusted_p).min(1.0));
        assert!(test.bonferroni_p < 0.05);
    }

    #[test]
    fn exact_fit_has_no_outlier_test() {
        let x: Vec<f64> = (0..25).map(|i| f64::from(i) * 0.4).collect();
        let y: Vec<f64> = x.iter().map(|v| -1.0 + 0.75 * v).collect();
        let fitted = model(x, y);

        assert_eq!(outlier_test(&fitted).unwrap(), None);

        let report = influence(&fitted, &DiagnosticsConfig::default());
        assert!(report.studentized.iter().all(|t| t.is_nan()));
        assert!(report.cooks_distance.iter().all(|d| *d == 0.0));
        assert_relative_eq!(report.hat.sum(), 2.0, epsilon = 1e-10);
    }
}
