//! Residual diagnostics of fitted factor models.
//!
//! Every check reads an immutable [`FactorModel`] and reports a
//! [`TestOutcome`]; nothing here alters the fit.

use std::fmt;

use lintner_math::{MathError, central_moments, chi_squared_sf, f_sf, ordinary_least_squares};
use lintner_primitives::TestOutcome;
use ndarray::{Array1, Array2, Axis, concatenate, s};

use crate::{FactorModel, InfluenceReport, ModelError, OutlierTest, influence, outlier_test};

/// Configuration for the diagnostics engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagnosticsConfig {
    /// Reject a null hypothesis when its p-value is below this level.
    pub significance: f64,
    /// Residual lags in the Breusch-Godfrey regression.
    pub autocorrelation_order: usize,
    /// Use Koenker's studentized Breusch-Pagan statistic instead of the
    /// original normal-theory one.
    pub studentize_bp: bool,
    /// Leverage threshold is `leverage_multiplier · k / n`.
    pub leverage_multiplier: f64,
    /// Cook's distance threshold is `cooks_numerator / n`.
    pub cooks_numerator: f64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            significance: 0.05,
            autocorrelation_order: 1,
            studentize_bp: true,
            leverage_multiplier: 2.0,
            cooks_numerator: 4.0,
        }
    }
}

/// Breusch-Godfrey LM test together with the Durbin-Watson statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutocorrelationTest {
    /// Number of residual lags tested.
    pub order: usize,
    /// LM statistic, chi-squared with `order` degrees of freedom.
    pub lm: TestOutcome,
    /// Durbin-Watson statistic of the residuals.
    pub durbin_watson: f64,
}

/// F test of a restricted model against a model that nests it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NestedModelTest {
    /// Residual sum of squares of the restricted model.
    pub ss_residual_restricted: f64,
    /// Residual sum of squares of the full model.
    pub ss_residual_full: f64,
    /// Number of restrictions.
    pub df_numerator: usize,
    /// Residual degrees of freedom of the full model.
    pub df_denominator: usize,
    /// F statistic and p-value. The null is that the restrictions hold.
    pub test: TestOutcome,
}

impl fmt::Display for NestedModelTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Nested F test: F = {:.4} on {} and {} DF, p-value {:.4e} (RSS {:.6} -> {:.6})",
            self.test.statistic,
            self.df_numerator,
            self.df_denominator,
            self.test.p_value,
            self.ss_residual_restricted,
            self.ss_residual_full
        )
    }
}

/// All diagnostics of one fitted model.
#[derive(Debug, Clone)]
pub struct DiagnosticsReport {
    /// Significance level of every decision.
    pub significance: f64,
    /// Breusch-Pagan test for heteroscedasticity.
    pub heteroscedasticity: TestOutcome,
    /// Residual autocorrelation tests.
    pub autocorrelation: AutocorrelationTest,
    /// Jarque-Bera test for normality of residuals.
    pub normality: TestOutcome,
    /// Leverage and influence measures.
    pub influence: InfluenceReport,
    /// Bonferroni outlier test, `None` when no studentized residual is finite.
    pub outlier: Option<OutlierTest>,
    /// Variance inflation factor of every regressor.
    pub variance_inflation: Vec<(String, f64)>,
}

impl DiagnosticsReport {
    /// Names of the checks whose null hypothesis is rejected.
    #[must_use]
    pub fn rejections(&self) -> Vec<&'static str> {
        let mut rejected = Vec::new();
        if self.heteroscedasticity.rejects_null() {
            rejected.push("homoscedasticity");
        }
        if self.autocorrelation.lm.rejects_null() {
            rejected.push("no autocorrelation");
        }
        if self.normality.rejects_null() {
            rejected.push("normality");
        }
        if self.outlier.is_some_and(|o| o.bonferroni_p < self.significance) {
            rejected.push("no outliers");
        }
        rejected
    }
}

fn decision(test: &TestOutcome) -> &'static str {
    if test.rejects_null() { "reject" } else { "do not reject" }
}

impl fmt::Display for DiagnosticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bp = &self.heteroscedasticity;
        let bg = &self.autocorrelation.lm;
        let jb = &self.normality;
        writeln!(
            f,
            "Breusch-Pagan:   LM = {:>10.4}  p = {:.4e}  {}",
            bp.statistic,
            bp.p_value,
            decision(bp)
        )?;
        writeln!(
            f,
            "Breusch-Godfrey: LM = {:>10.4}  p = {:.4e}  {} (order {}, Durbin-Watson {:.4})",
            bg.statistic,
            bg.p_value,
            decision(bg),
            self.autocorrelation.order,
            self.autocorrelation.durbin_watson
        )?;
        writeln!(
            f,
            "Jarque-Bera:     JB = {:>10.4}  p = {:.4e}  {}",
            jb.statistic,
            jb.p_value,
            decision(jb)
        )?;
        match &self.outlier {
            Some(outlier) => writeln!(
                f,
                "Outlier test:    t = {:.4} on {}, Bonferroni p = {:.4e}",
                outlier.studentized, outlier.date, outlier.bonferroni_p
            )?,
            None => writeln!(f, "Outlier test:    not defined (no finite studentized residual)")?,
        }
        writeln!(
            f,
            "High leverage (hat > {:.4}): {} observations",
            self.influence.leverage_threshold,
            self.influence.high_leverage().len()
        )?;
        write!(
            f,
            "Influential (Cook's D > {:.4}): {} observations",
            self.influence.cooks_threshold,
            self.influence.influential().len()
        )?;
        for (name, vif) in &self.variance_inflation {
            write!(f, "\nVIF {name}: {vif:.3}")?;
        }
        Ok(())
    }
}

/// Outcome of a residual test on an exact fit, which carries no evidence
/// against the null.
const fn uninformative(significance: f64) -> TestOutcome {
    TestOutcome::new(0.0, 1.0, significance)
}

/// Breusch-Pagan test of homoscedastic residuals.
///
/// The squared residuals are regressed on the model's design. The
/// studentized (Koenker) statistic is `n·R²`; the original statistic is half
/// the explained sum of squares of `e²/σ̂²`. Both are chi-squared with
/// `k - 1` degrees of freedom. An exact fit yields statistic 0 and p-value 1.
///
/// # Errors
/// Returns a math error if the auxiliary regression fails.
pub fn breusch_pagan(
    model: &FactorModel,
    config: &DiagnosticsConfig,
) -> Result<TestOutcome, ModelError> {
    if model.is_exact_fit() {
        return Ok(uninformative(config.significance));
    }
    let n = model.nobs() as f64;
    let squared = model.residuals().mapv(|e| e * e);

    let statistic = if config.studentize_bp {
        let aux = ordinary_least_squares(&squared, model.design())?;
        n * aux.r_squared
    } else {
        let scaled = squared / (model.ss_residual() / n);
        let aux = ordinary_least_squares(&scaled, model.design())?;
        0.5 * (aux.ss_total - aux.ss_residual)
    };

    let df = (model.n_params() - 1) as f64;
    Ok(TestOutcome::new(statistic, chi_squared_sf(statistic, df)?, config.significance))
}

/// Breusch-Godfrey LM test for residual autocorrelation up to
/// `config.autocorrelation_order` lags.
///
/// Lagged residuals before the sample start are set to zero so that all `n`
/// observations enter the auxiliary regression. On an exact fit the LM test
/// reports statistic 0 and p-value 1, and the Durbin-Watson statistic is NaN.
///
/// # Errors
/// Returns a math error if the auxiliary regression fails.
pub fn breusch_godfrey(
    model: &FactorModel,
    config: &DiagnosticsConfig,
) -> Result<AutocorrelationTest, ModelError> {
    let order = config.autocorrelation_order;
    if order == 0 {
        return Err(ModelError::InvalidConfig("autocorrelation order must be positive".into()));
    }
    if model.is_exact_fit() {
        return Ok(AutocorrelationTest {
            order,
            lm: uninformative(config.significance),
            durbin_watson: f64::NAN,
        });
    }
    let residuals = model.residuals();
    let n = residuals.len();

    let lagged = Array2::from_shape_fn((n, order), |(t, j)| {
        let lag = j + 1;
        if t >= lag { residuals[t - lag] } else { 0.0 }
    });
    let design = concatenate(Axis(1), &[model.design().view(), lagged.view()])
        .map_err(|e| MathError::LinearAlgebra(e.to_string()))?;

    let aux = ordinary_least_squares(residuals, &design)?;
    let statistic = n as f64 * aux.r_squared;

    Ok(AutocorrelationTest {
        order,
        lm: TestOutcome::new(
            statistic,
            chi_squared_sf(statistic, order as f64)?,
            config.significance,
        ),
        durbin_watson: durbin_watson(residuals),
    })
}

/// Durbin-Watson statistic `Σ(e_t - e_{t-1})² / Σe_t²`.
///
/// Near 2 without first-order autocorrelation, towards 0 for positive and
/// towards 4 for negative autocorrelation.
#[must_use]
pub fn durbin_watson(residuals: &Array1<f64>) -> f64 {
    let diff = &residuals.slice(s![1..]) - &residuals.slice(s![..-1]);
    diff.dot(&diff) / residuals.dot(residuals)
}

/// Jarque-Bera normality test `n/6·(S² + (K-3)²/4)`, chi-squared with 2
/// degrees of freedom.
///
/// # Errors
/// Returns `MathError::EmptyData` for an empty sample.
pub fn jarque_bera(values: &[f64], significance: f64) -> Result<TestOutcome, ModelError> {
    let moments = central_moments(values).ok_or(MathError::EmptyData)?;
    let skew = moments.skewness();
    let excess = moments.kurtosis() - 3.0;
    let statistic = values.len() as f64 / 6.0 * excess.mul_add(excess / 4.0, skew * skew);

    Ok(TestOutcome::new(statistic, chi_squared_sf(statistic, 2.0)?, significance))
}

/// Variance inflation factor `1 / (1 - R²_j)` of each regressor, where
/// `R²_j` comes from regressing it on the intercept and the other regressors.
///
/// # Errors
/// Returns a math error if an auxiliary regression fails.
pub fn variance_inflation_factors(model: &FactorModel) -> Result<Vec<(String, f64)>, ModelError> {
    let design = model.design();
    model
        .regressors()
        .enumerate()
        .map(|(i, name)| {
            let j = i + 1;
            let others: Vec<usize> = (0..design.ncols()).filter(|&c| c != j).collect();
            let aux = ordinary_least_squares(
                &design.column(j).to_owned(),
                &design.select(Axis(1), &others),
            )?;
            Ok::<_, ModelError>((name.to_string(), 1.0 / (1.0 - aux.r_squared)))
        })
        .collect()
}

/// F test of `restricted` against `full`, which must share the sample and
/// nest the restricted regressors.
///
/// When `full` fits exactly the statistic is infinite, or 0 if `restricted`
/// fits exactly as well.
///
/// # Errors
/// Returns `ModelError::LengthMismatch` if the samples differ in size and
/// `ModelError::InvalidConfig` unless `full` has more parameters.
pub fn compare_nested(
    restricted: &FactorModel,
    full: &FactorModel,
    significance: f64,
) -> Result<NestedModelTest, ModelError> {
    if restricted.nobs() != full.nobs() {
        return Err(ModelError::LengthMismatch {
            context: format!("nested comparison of {}", full.dependent()),
            expected: full.nobs(),
            actual: restricted.nobs(),
        });
    }
    let Some(df_numerator) = full.n_params().checked_sub(restricted.n_params()).filter(|d| *d > 0)
    else {
        return Err(ModelError::InvalidConfig(
            "the full model must have more parameters than the restricted one".into(),
        ));
    };

    let df_denominator = full.df_residual();
    let statistic = if full.is_exact_fit() {
        if restricted.is_exact_fit() { 0.0 } else { f64::INFINITY }
    } else {
        ((restricted.ss_residual() - full.ss_residual()) / df_numerator as f64)
            / (full.ss_residual() / df_denominator as f64)
    };
    let p_value = f_sf(statistic, df_numerator as f64, df_denominator as f64)?;

    Ok(NestedModelTest {
        ss_residual_restricted: restricted.ss_residual(),
        ss_residual_full: full.ss_residual(),
        df_numerator,
        df_denominator,
        test: TestOutcome::new(statistic, p_value, significance),
    })
}

/// Run every diagnostic on `model`.
///
/// Residual tests of an exact fit report no evidence against their null.
///
/// # Errors
/// Returns the first error of the individual checks.
pub fn diagnose(
    model: &FactorModel,
    config: &DiagnosticsConfig,
) -> Result<DiagnosticsReport, ModelError> {
    let normality = if model.is_exact_fit() {
        uninformative(config.significance)
    } else {
        jarque_bera(&model.residuals().to_vec(), config.significance)?
    };
    Ok(DiagnosticsReport {
        significance: config.significance,
        heteroscedasticity: breusch_pagan(model, config)?,
        autocorrelation: breusch_godfrey(model, config)?,
        normality,
        influence: influence(model, config),
        outlier: outlier_test(model)?,
        variance_inflation: variance_inflation_factors(model)?,
    })
}
