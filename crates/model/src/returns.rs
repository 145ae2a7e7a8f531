//! Price to excess log-return transformation.

use std::collections::BTreeSet;

use lintner_primitives::{
    AlignedPriceTable, Date, MonthlyRates, ReturnSeries, RiskFreeSeries, YearMonth,
};
use ndarray::Array1;

use crate::ModelError;

/// Business days assumed in every calendar month when converting a monthly
/// rate into a per-period rate.
///
/// Applied uniformly; actual trading-day counts per month are not used.
pub const BUSINESS_DAYS_PER_MONTH: f64 = 22.0;

/// Excess log returns of every column of a price table.
#[derive(Debug, Clone)]
pub struct ExcessReturns {
    /// Return dates, the price dates without the first.
    pub dates: Vec<Date>,
    /// Risk-free series subtracted from every column.
    pub risk_free: RiskFreeSeries,
    /// Excess return series, in table column order.
    pub series: Vec<ReturnSeries>,
}

impl ExcessReturns {
    /// Excess returns of the named column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ReturnSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Column names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.name.as_str())
    }

    /// Number of return periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Log returns `ln(P_t) - ln(P_{t-1})` of a price series.
///
/// The result is one element shorter than `prices` and dated `dates[1..]`.
///
/// # Errors
/// Returns `ModelError::LengthMismatch` if dates and prices differ in length
/// and `ModelError::NonPositivePrice` for a zero or negative price.
pub fn log_returns(
    name: &str,
    dates: &[Date],
    prices: &Array1<f64>,
) -> Result<ReturnSeries, ModelError> {
    if dates.len() != prices.len() {
        return Err(ModelError::LengthMismatch {
            context: name.to_string(),
            expected: dates.len(),
            actual: prices.len(),
        });
    }
    if let Some(i) = prices.iter().position(|p| *p <= 0.0) {
        return Err(ModelError::NonPositivePrice { column: name.to_string(), date: dates[i] });
    }
    if prices.len() < 2 {
        return Ok(ReturnSeries::new(name, Vec::new(), Array1::zeros(0))?);
    }

    let logs = prices.mapv(f64::ln);
    let values: Array1<f64> = logs.windows(2).into_iter().map(|w| w[1] - w[0]).collect();

    Ok(ReturnSeries::new(name, dates[1..].to_vec(), values)?)
}

/// Per-period log risk-free returns on `dates`.
///
/// Each date takes the rate `r` of its calendar month and yields
/// `ln(1 + r / BUSINESS_DAYS_PER_MONTH)`.
///
/// # Errors
/// Returns `ModelError::MissingRate` for the first date whose month has no rate.
pub fn risk_free_series(dates: &[Date], rates: &MonthlyRates) -> Result<RiskFreeSeries, ModelError> {
    let values = dates
        .iter()
        .map(|&date| {
            rates
                .for_date(date)
                .map(|r| (r / BUSINESS_DAYS_PER_MONTH).ln_1p())
                .ok_or(ModelError::MissingRate { month: YearMonth::from(date), date })
        })
        .collect::<Result<Array1<f64>, _>>()?;

    Ok(RiskFreeSeries::new(dates.to_vec(), values)?)
}

/// Subtract the risk-free series from a return series, position by position.
///
/// # Errors
/// Returns `ModelError::LengthMismatch` if the series differ in length.
pub fn subtract_risk_free(
    returns: &ReturnSeries,
    risk_free: &RiskFreeSeries,
) -> Result<ReturnSeries, ModelError> {
    if returns.len() != risk_free.len() {
        return Err(ModelError::LengthMismatch {
            context: returns.name.clone(),
            expected: risk_free.len(),
            actual: returns.len(),
        });
    }
    Ok(ReturnSeries::new(
        returns.name.clone(),
        returns.dates.clone(),
        &returns.values - &risk_free.values,
    )?)
}

/// Excess log returns of every column of `table`.
///
/// # Errors
/// Returns `ModelError::MissingRate` if a return date falls in a month without
/// a rate and `ModelError::NonPositivePrice` for an invalid price.
pub fn excess_returns(
    table: &AlignedPriceTable,
    rates: &MonthlyRates,
) -> Result<ExcessReturns, ModelError> {
    let dates = table.dates().get(1..).unwrap_or_default().to_vec();
    let risk_free = risk_free_series(&dates, rates)?;

    let series = table
        .columns()
        .map(|(name, prices)| {
            let returns = log_returns(name, table.dates(), prices)?;
            subtract_risk_free(&returns, &risk_free)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let months: BTreeSet<YearMonth> = dates.iter().copied().map(YearMonth::from).collect();
    tracing::debug!(
        periods = dates.len(),
        months = months.len(),
        columns = series.len(),
        "computed excess log returns"
    );

    Ok(ExcessReturns { dates, risk_free, series })
}

/// Rebuild price levels from an initial price and log returns.
///
/// Returns `P_0, P_0·exp(ℓ_1), P_0·exp(ℓ_1 + ℓ_2), …`, one element longer
/// than `returns`.
#[must_use]
pub fn reconstruct_prices(initial: f64, returns: &[f64]) -> Vec<f64> {
    let mut prices = Vec::with_capacity(returns.len() + 1);
    prices.push(initial);
    let mut cumulative = 0.0;
    for r in returns {
        cumulative += r;
        prices.push(initial * cumulative.exp());
    }
    prices
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn log_returns_drop_first_observation() {
        let dates = vec![d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)];
        let returns = log_returns("a", &dates, &array![100.0, 110.0, 99.0]).unwrap();

        assert_eq!(returns.len(), 2);
        assert_eq!(returns.dates, &dates[1..]);
        assert_relative_eq!(returns.values[0], (1.1_f64).ln(), epsilon = 1e-12);
        assert_relative_eq!(returns.values[1], (0.9_f64).ln(), epsilon = 1e-12);
    }

    #[test]
    fn log_returns_reject_non_positive_price() {
        let dates = vec![d(2024, 1, 2), d(2024, 1, 3)];
        let err = log_returns("a", &dates, &array![100.0, 0.0]).unwrap_err();
        assert!(matches!(err, ModelError::NonPositivePrice { date, .. } if date == d(2024, 1, 3)));
    }

    #[test]
    fn reconstruction_round_trip() {
        let prices = array![50.0, 51.3, 49.9, 52.4, 52.4, 60.1, 58.7];
        let dates: Vec<Date> = (0..prices.len() as u32).map(|i| d(2024, 3, 1 + i)).collect();

        let returns = log_returns("a", &dates, &prices).unwrap();
        let rebuilt = reconstruct_prices(prices[0], returns.values.as_slice().unwrap());

        assert_eq!(rebuilt.len(), prices.len());
        for (a, b) in rebuilt.iter().zip(prices.iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-12);
        }
    }

    #[test]
    fn risk_free_uses_enclosing_month() {
        let rates: MonthlyRates = [(YearMonth::new(2024, 1), 0.022), (YearMonth::new(2024, 2), 0.044)]
            .into_iter()
            .collect();
        let dates = vec![d(2024, 1, 1), d(2024, 1, 31), d(2024, 2, 1), d(2024, 2, 29)];

        let rf = risk_free_series(&dates, &rates).unwrap();

        assert_eq!(rf.len(), dates.len());
        assert_relative_eq!(rf.values[0], (1.0_f64 + 0.001).ln(), epsilon = 1e-15);
        assert_relative_eq!(rf.values[1], (1.0_f64 + 0.001).ln(), epsilon = 1e-15);
        assert_relative_eq!(rf.values[2], (1.0_f64 + 0.002).ln(), epsilon = 1e-15);
        assert_relative_eq!(rf.values[3], (1.0_f64 + 0.002).ln(), epsilon = 1e-15);
    }

    #[test]
    fn risk_free_missing_month_is_fatal() {
        let rates: MonthlyRates = [(YearMonth::new(2024, 1), 0.01)].into_iter().collect();
        let err = risk_free_series(&[d(2024, 1, 31), d(2024, 2, 1)], &rates).unwrap_err();

        match err {
            ModelError::MissingRate { month, date } => {
                assert_eq!(month, YearMonth::new(2024, 2));
                assert_eq!(date, d(2024, 2, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn subtract_requires_equal_lengths() {
        let returns =
            ReturnSeries::new("a", vec![d(2024, 1, 2), d(2024, 1, 3)], array![0.1, 0.2]).unwrap();
        let rf = RiskFreeSeries::new(vec![d(2024, 1, 2)], array![0.0]).unwrap();

        let err = subtract_risk_free(&returns, &rf).unwrap_err();
        assert!(matches!(err, ModelError::LengthMismatch { expected: 1, actual: 2, .. }));
    }

    #[test]
    fn excess_returns_for_every_column() {
        let dates = vec![d(2024, 1, 30), d(2024, 1, 31), d(2024, 2, 1)];
        let table = AlignedPriceTable::new(
            dates,
            vec![("a".into(), array![10.0, 11.0, 12.0]), ("m".into(), array![5.0, 5.0, 5.0])],
        )
        .unwrap();
        let rates: MonthlyRates = [(YearMonth::new(2024, 1), 0.022), (YearMonth::new(2024, 2), 0.0)]
            .into_iter()
            .collect();

        let excess = excess_returns(&table, &rates).unwrap();

        assert_eq!(excess.len(), 2);
        assert_eq!(excess.names().collect::<Vec<_>>(), vec!["a", "m"]);
        let m = excess.column("m").unwrap();
        assert_relative_eq!(m.values[0], -(1.001_f64).ln(), epsilon = 1e-15);
        assert_relative_eq!(m.values[1], 0.0, epsilon = 1e-15);
    }
}
