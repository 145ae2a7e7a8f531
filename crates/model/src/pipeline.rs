//! Loading and end-to-end orchestration.
//!
//! A run is a straight line: load, align, transform, test stationarity, fit
//! the single-factor and multi-factor models, and diagnose them. Any failure
//! aborts the run.

use lintner_primitives::{
    AlignedPriceTable, Date, MonthlyRates, TimeSeries, UnitRootOutcome, YearMonth,
};
use lintner_traits::{DataSource, Renderer, SourceError, UnitRootTest};
use lintner_utils::{AlignConfig, align_series};

use crate::{
    AdfConfig, AugmentedDickeyFuller, DiagnosticsConfig, DiagnosticsReport, ExcessReturns,
    FactorModel, ModelError, ModelSpec, NestedModelTest, compare_nested, diagnose, excess_returns,
};

/// What to fetch from a [`DataSource`].
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// First date of the window.
    pub from: Date,
    /// Last date of the window.
    pub to: Date,
    /// Asset ticker. Its trading dates index the aligned table.
    pub asset: String,
    /// Market index ticker.
    pub market: String,
    /// Names of macro factor series.
    pub macro_factors: Vec<String>,
    /// Name of the monthly risk-free rate series.
    pub rate_series: String,
    /// Multiplier turning published rate values into decimals, e.g. `0.01`
    /// for percent.
    pub rate_scale: f64,
}

/// Raw inputs of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    /// Price series: asset, market, then macro factors.
    pub prices: Vec<TimeSeries>,
    /// Monthly risk-free rates in decimal form.
    pub rates: MonthlyRates,
}

/// Fetch every series of `request` from `source`.
///
/// # Errors
/// Returns `ModelError::Source` for the first series the source cannot
/// deliver or that has no observations in the window.
pub fn load_inputs(
    source: &dyn DataSource,
    request: &LoadRequest,
) -> Result<PipelineInputs, ModelError> {
    let (from, to) = (request.from, request.to);
    let non_empty = |series: TimeSeries, name: &str| {
        if series.is_empty() {
            Err(SourceError::Empty { series: name.to_string(), from, to })
        } else {
            Ok(series.renamed(name))
        }
    };

    let mut prices = Vec::with_capacity(2 + request.macro_factors.len());
    for ticker in [&request.asset, &request.market] {
        prices.push(non_empty(source.daily_prices(ticker, from, to)?, ticker.as_str())?);
    }
    for name in &request.macro_factors {
        prices.push(non_empty(source.macro_series(name, from, to)?, name.as_str())?);
    }

    // Monthly observations are dated on the first of the month, so the month
    // enclosing `from` must be requested from its first day.
    let rate_from = YearMonth::from(from).first_day().unwrap_or(from);
    let rate_series = request.rate_series.as_str();
    let rates = non_empty(source.macro_series(rate_series, rate_from, to)?, rate_series)?;
    let rates = MonthlyRates::from_series(&rates, request.rate_scale);

    tracing::info!(
        series = prices.len(),
        rate_months = rates.len(),
        %from,
        %to,
        "loaded inputs"
    );
    Ok(PipelineInputs { prices, rates })
}

/// Configuration of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Dependent asset column.
    pub asset: String,
    /// Market column.
    pub market: String,
    /// Additional regressors of the multi-factor model. Empty skips it.
    pub macro_factors: Vec<String>,
    /// Alignment settings.
    pub align: AlignConfig,
    /// Stationarity test settings.
    pub adf: AdfConfig,
    /// Diagnostics settings.
    pub diagnostics: DiagnosticsConfig,
    /// Abort when an excess return series fails the stationarity test.
    pub require_stationary: bool,
}

impl PipelineConfig {
    /// Configuration for `asset` against `market` with default settings.
    pub fn new(asset: impl Into<String>, market: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            market: market.into(),
            macro_factors: Vec::new(),
            align: AlignConfig::default(),
            adf: AdfConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
            require_stationary: false,
        }
    }

    /// Set the multi-factor regressors.
    #[must_use]
    pub fn with_macro_factors<I, S>(mut self, factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.macro_factors = factors.into_iter().map(Into::into).collect();
        self
    }

    fn columns(&self) -> impl Iterator<Item = &str> {
        [self.asset.as_str(), self.market.as_str()]
            .into_iter()
            .chain(self.macro_factors.iter().map(String::as_str))
    }
}

/// Unit-root tests of one column on price levels and on excess returns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationarityCheck<'a> {
    /// Column name.
    pub column: &'a str,
    /// Test on aligned price levels, `None` if it could not be computed.
    pub levels: Option<&'a UnitRootOutcome>,
    /// Test on excess log returns.
    pub returns: &'a UnitRootOutcome,
}

/// Everything a pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Aligned, interpolated price table.
    pub table: AlignedPriceTable,
    /// Excess log returns of every column.
    pub excess: ExcessReturns,
    /// Column name with its level and return unit-root tests. The level test
    /// is informational and `None` when it failed numerically.
    pub stationarity: Vec<(String, Option<UnitRootOutcome>, UnitRootOutcome)>,
    /// Single-factor model.
    pub capm: FactorModel,
    /// Diagnostics of the single-factor model.
    pub capm_diagnostics: DiagnosticsReport,
    /// Multi-factor model, if macro factors were configured.
    pub apt: Option<FactorModel>,
    /// Diagnostics of the multi-factor model.
    pub apt_diagnostics: Option<DiagnosticsReport>,
    /// F test of the single-factor model against the multi-factor model.
    pub comparison: Option<NestedModelTest>,
}

impl PipelineReport {
    /// Stationarity results per column.
    pub fn stationarity_checks(&self) -> impl Iterator<Item = StationarityCheck<'_>> {
        self.stationarity.iter().map(|(column, levels, returns)| StationarityCheck {
            column: column.as_str(),
            levels: levels.as_ref(),
            returns,
        })
    }

    /// Push every series and summary into `renderer`.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        let dates = self.table.dates();
        for (name, prices) in self.table.columns() {
            renderer.series(&format!("price {name}"), dates, &prices.to_vec());
        }
        for series in &self.excess.series {
            renderer.series(
                &format!("excess return {}", series.name),
                &series.dates,
                &series.values.to_vec(),
            );
        }
        renderer.text("stationarity", &self.stationarity_summary());

        render_model(renderer, "single-factor", &self.capm, &self.capm_diagnostics);
        if let (Some(apt), Some(diagnostics)) = (&self.apt, &self.apt_diagnostics) {
            render_model(renderer, "multi-factor", apt, diagnostics);
        }
        if let Some(comparison) = &self.comparison {
            renderer.text("model comparison", &comparison.to_string());
        }
    }

    fn stationarity_summary(&self) -> String {
        let verdict = |o: &UnitRootOutcome| if o.is_stationary() { "stationary" } else { "unit root" };
        self.stationarity_checks()
            .map(|check| {
                let levels = check.levels.map_or_else(
                    || "not computed".to_string(),
                    |o| {
                        format!(
                            "{:>8.3} (p {:.4}, {})",
                            o.test.statistic,
                            o.test.p_value,
                            verdict(o)
                        )
                    },
                );
                format!(
                    "{:<12} levels: {levels}  returns: {:>8.3} (p {:.4}, {}, lag {})",
                    check.column,
                    check.returns.test.statistic,
                    check.returns.test.p_value,
                    verdict(check.returns),
                    check.returns.used_lag
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn render_model(
    renderer: &mut dyn Renderer,
    label: &str,
    model: &FactorModel,
    diagnostics: &DiagnosticsReport,
) {
    let dates = model.dates();
    renderer.text(&format!("{label} model"), &model.to_string());
    renderer.series(&format!("{label} residuals"), dates, &model.residuals().to_vec());
    renderer.series(&format!("{label} fitted"), dates, &model.fitted().to_vec());
    renderer.series(&format!("{label} hat values"), dates, &diagnostics.influence.hat.to_vec());
    renderer.series(
        &format!("{label} cook's distance"),
        dates,
        &diagnostics.influence.cooks_distance.to_vec(),
    );
    renderer.text(&format!("{label} diagnostics"), &diagnostics.to_string());
}

/// Run the analysis on loaded inputs.
///
/// # Errors
/// Returns `ModelError::MissingColumn` if a configured series was not loaded,
/// `ModelError::NonStationary` when `require_stationary` is set and a return
/// series keeps its unit root, and any error of the individual stages.
pub fn run_pipeline(
    config: &PipelineConfig,
    inputs: &PipelineInputs,
) -> Result<PipelineReport, ModelError> {
    let ordered = config
        .columns()
        .map(|name| {
            inputs
                .prices
                .iter()
                .find(|s| s.name() == name)
                .cloned()
                .ok_or_else(|| ModelError::MissingColumn(name.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let table = align_series(&ordered, &config.align)?;
    tracing::info!(rows = table.n_rows(), columns = table.n_columns(), "aligned prices");

    let excess = excess_returns(&table, &inputs.rates)?;
    tracing::info!(periods = excess.len(), "computed excess returns");

    let adf = AugmentedDickeyFuller::new(config.adf);
    let mut stationarity = Vec::with_capacity(excess.series.len());
    for series in &excess.series {
        let levels = table
            .column(&series.name)
            .ok_or_else(|| ModelError::MissingColumn(series.name.clone()))?;
        let levels = adf
            .test(&levels.to_vec())
            .inspect_err(|e| {
                tracing::warn!(
                    column = %series.name,
                    "{} test on price levels failed: {e}",
                    adf.name()
                );
            })
            .ok();
        let returns = adf.test(&series.values.to_vec())?;

        if !returns.is_stationary() {
            tracing::warn!(
                column = %series.name,
                statistic = returns.test.statistic,
                p_value = returns.test.p_value,
                "excess returns fail the {} test",
                adf.name()
            );
            if config.require_stationary {
                return Err(ModelError::NonStationary {
                    column: series.name.clone(),
                    statistic: returns.test.statistic,
                    p_value: returns.test.p_value,
                });
            }
        }
        stationarity.push((series.name.clone(), levels, returns));
    }
    tracing::info!(columns = stationarity.len(), "tested stationarity");

    let capm = ModelSpec::single_factor(&config.asset, &config.market).fit(&excess)?;
    let capm_diagnostics = diagnose(&capm, &config.diagnostics)?;
    log_model("single-factor", &capm, &capm_diagnostics);

    let (apt, apt_diagnostics, comparison) = if config.macro_factors.is_empty() {
        (None, None, None)
    } else {
        let spec = ModelSpec::multi_factor(&config.asset, &config.market, &config.macro_factors);
        let apt = spec.fit(&excess)?;
        let diagnostics = diagnose(&apt, &config.diagnostics)?;
        log_model("multi-factor", &apt, &diagnostics);
        let comparison = compare_nested(&capm, &apt, config.diagnostics.significance)?;
        (Some(apt), Some(diagnostics), Some(comparison))
    };

    Ok(PipelineReport {
        table,
        excess,
        stationarity,
        capm,
        capm_diagnostics,
        apt,
        apt_diagnostics,
        comparison,
    })
}

fn log_model(label: &str, model: &FactorModel, diagnostics: &DiagnosticsReport) {
    tracing::info!(
        model = label,
        nobs = model.nobs(),
        r_squared = model.r_squared(),
        alpha = model.alpha().estimate,
        "fitted model"
    );
    for check in diagnostics.rejections() {
        tracing::warn!(model = label, "diagnostic rejects {check}");
    }
}
