//! Date alignment and gap interpolation.

use chrono::Datelike;
use lintner_primitives::{AlignedPriceTable, Date, TimeSeries};
use ndarray::Array1;
use polars::prelude::*;

use crate::UtilsError;

/// Name of the join key column.
const DATE_COL: &str = "date";

/// Treatment of gaps before the first or after the last known value of a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EdgeGapPolicy {
    /// Fail with `UtilsError::UnresolvedGap`.
    #[default]
    Reject,
    /// Drop leading and trailing rows until every column is defined.
    Trim,
}

/// Configuration for series alignment.
#[derive(Debug, Clone, Default)]
pub struct AlignConfig {
    /// Handling of gaps that interpolation cannot fill.
    pub edge_gaps: EdgeGapPolicy,
}

/// Linearly interpolate missing values in feature columns.
///
/// Casts to float, then fills each null from its nearest known neighbours in
/// `sort_col` order. Nulls before the first or after the last known value
/// remain null.
///
/// # Arguments
/// * `df` - Input LazyFrame
/// * `features` - Column names to interpolate
/// * `sort_col` - Column to sort by (typically "date")
///
/// # Returns
/// LazyFrame with interpolated features.
pub fn interpolate_features(df: LazyFrame, features: &[&str], sort_col: &str) -> LazyFrame {
    let sort_options = SortMultipleOptions::new().with_maintain_order(true);
    let lf = df.sort([sort_col], sort_options);

    let exprs: Vec<Expr> = features
        .iter()
        .map(|&feat| {
            col(feat).cast(DataType::Float64).interpolate(InterpolationMethod::Linear).alias(feat)
        })
        .collect();

    lf.with_columns(exprs)
}

/// Align series on the dates of the first series and fill interior gaps.
///
/// The first series defines the date index; every other series is left-joined
/// onto it, so its observations on other dates are dropped. Non-finite values
/// count as missing. Missing cells are then filled by linear interpolation.
///
/// # Errors
/// Returns `UtilsError::IncompatibleDateRange` if a column has no value on any
/// joined date, `UtilsError::UnresolvedGap` for an edge gap under
/// [`EdgeGapPolicy::Reject`], and `UtilsError::InvalidParameter` if no series
/// are given or names collide.
pub fn align_series(
    series: &[TimeSeries],
    config: &AlignConfig,
) -> Result<AlignedPriceTable, UtilsError> {
    let Some((left, rest)) = series.split_first() else {
        return Err(UtilsError::InvalidParameter("no series to align".to_string()));
    };

    let names: Vec<&str> = series.iter().map(TimeSeries::name).collect();
    for (i, name) in names.iter().enumerate() {
        if *name == DATE_COL || names[..i].contains(name) {
            return Err(UtilsError::InvalidParameter(format!("duplicate column name: {name}")));
        }
    }

    let mut lf = series_frame(left)?.lazy();
    for other in rest {
        lf = lf.join(
            series_frame(other)?.lazy(),
            [col(DATE_COL)],
            [col(DATE_COL)],
            JoinArgs::new(JoinType::Left),
        );
    }
    let joined = lf.sort([DATE_COL], SortMultipleOptions::default()).collect()?;
    let height = joined.height();

    let mut missing = 0;
    for &name in &names {
        let nulls = joined.column(name)?.null_count();
        if nulls == height {
            return Err(UtilsError::IncompatibleDateRange { column: name.to_string() });
        }
        missing += nulls;
    }

    let filled = interpolate_features(joined.lazy(), &names, DATE_COL).collect()?;

    let dates = filled
        .column(DATE_COL)?
        .i32()?
        .into_no_null_iter()
        .map(|days| {
            Date::from_num_days_from_ce_opt(days)
                .ok_or_else(|| UtilsError::InvalidParameter(format!("invalid day number {days}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut columns = Vec::with_capacity(names.len());
    for &name in &names {
        let values: Vec<Option<f64>> = filled.column(name)?.f64()?.into_iter().collect();
        columns.push((name, values));
    }

    let (start, end) = defined_window(&columns, &dates, config.edge_gaps)?;
    let unresolved: usize =
        columns.iter().map(|(_, values)| values.iter().filter(|v| v.is_none()).count()).sum();
    tracing::debug!(
        rows = height,
        missing,
        interpolated = missing.saturating_sub(unresolved),
        trimmed = height - (end - start),
        "aligned {} series",
        names.len()
    );

    let mut table_columns = Vec::with_capacity(columns.len());
    for (name, values) in columns {
        let window = values[start..end]
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.ok_or_else(|| UtilsError::UnresolvedGap {
                    column: name.to_string(),
                    date: dates[start + i],
                })
            })
            .collect::<Result<Array1<f64>, _>>()?;
        table_columns.push((name.to_string(), window));
    }

    Ok(AlignedPriceTable::new(dates[start..end].to_vec(), table_columns)?)
}

/// Row range `[start, end)` on which every column has a known value at both ends.
fn defined_window(
    columns: &[(&str, Vec<Option<f64>>)],
    dates: &[Date],
    policy: EdgeGapPolicy,
) -> Result<(usize, usize), UtilsError> {
    let height = dates.len();
    let mut start = 0;
    let mut end = height;
    let mut latest_start_column = "";

    for (name, values) in columns {
        // Every column has at least one value at this point.
        let first = values.iter().position(Option::is_some).unwrap_or(height);
        let last = values.iter().rposition(Option::is_some).map_or(0, |i| i + 1);

        if policy == EdgeGapPolicy::Reject {
            if first > 0 {
                return Err(UtilsError::UnresolvedGap { column: name.to_string(), date: dates[0] });
            }
            if last < height {
                return Err(UtilsError::UnresolvedGap {
                    column: name.to_string(),
                    date: dates[last],
                });
            }
        }

        if first >= start {
            start = first;
            latest_start_column = *name;
        }
        end = end.min(last);
    }

    if start >= end {
        return Err(UtilsError::IncompatibleDateRange { column: latest_start_column.to_string() });
    }
    Ok((start, end))
}

/// Build a two-column `| date | name |` frame from a series.
fn series_frame(series: &TimeSeries) -> PolarsResult<DataFrame> {
    let days: Vec<i32> = series.dates().iter().map(Datelike::num_days_from_ce).collect();
    let values: Vec<Option<f64>> =
        series.values().iter().map(|v| v.is_finite().then_some(*v)).collect();

    DataFrame::new(vec![
        Column::new(DATE_COL.into(), days),
        Column::new(series.name().into(), values),
    ])
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn series(name: &str, obs: &[(u32, f64)]) -> TimeSeries {
        TimeSeries::from_observations(name, obs.iter().map(|&(day, v)| (d(day), v))).unwrap()
    }

    #[test]
    fn interpolate_features_basic() {
        let df = df! {
            "date" => &[3, 1, 2, 4],
            "value" => &[Some(3.0), Some(1.0), None, None],
        }
        .unwrap()
        .lazy();

        let result = interpolate_features(df, &["value"], "date").collect().unwrap();
        let values: Vec<Option<f64>> =
            result.column("value").unwrap().f64().unwrap().into_iter().collect();

        // Sorted by date: [1, None, 3, None] -> [1, 2, 3, None]
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0), None]);
    }

    #[test]
    fn left_join_keeps_left_dates_and_interpolates() {
        let stock = series("stock", &[(2, 10.0), (3, 11.0), (4, 12.0), (5, 13.0)]);
        // Oil is missing on the 3rd and 4th and has an extra observation on the 6th.
        let oil = series("oil", &[(2, 70.0), (5, 76.0), (6, 80.0)]);

        let table = align_series(&[stock, oil], &AlignConfig::default()).unwrap();

        assert_eq!(table.dates(), &[d(2), d(3), d(4), d(5)]);
        let oil = table.column("oil").unwrap();
        assert_relative_eq!(oil[1], 72.0);
        assert_relative_eq!(oil[2], 74.0);
        assert_relative_eq!(oil[3], 76.0);
    }

    #[test]
    fn non_finite_values_are_interpolated() {
        let a = series("a", &[(2, 1.0), (3, 2.0), (4, 3.0)]);
        let b = series("b", &[(2, 5.0), (3, f64::NAN), (4, 7.0)]);

        let table = align_series(&[a, b], &AlignConfig::default()).unwrap();
        assert_relative_eq!(table.column("b").unwrap()[1], 6.0);
    }

    #[test]
    fn no_missing_cells_after_alignment() {
        let a = series("a", &(2..=20).map(|day| (day, day as f64)).collect::<Vec<_>>());
        let b = series("b", &[(2, 1.0), (9, 2.0), (20, 3.0)]);
        let c = series("c", &[(2, 5.0), (3, 4.0), (11, 9.0), (17, 1.0), (20, 2.0)]);

        let table = align_series(&[a, b, c], &AlignConfig::default()).unwrap();

        assert_eq!(table.n_rows(), 19);
        for (_, values) in table.columns() {
            assert!(values.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn leading_gap_is_rejected() {
        let a = series("a", &[(2, 1.0), (3, 2.0), (4, 3.0)]);
        let b = series("b", &[(3, 5.0), (4, 6.0)]);

        let err = align_series(&[a, b], &AlignConfig::default()).unwrap_err();
        match err {
            UtilsError::UnresolvedGap { column, date } => {
                assert_eq!(column, "b");
                assert_eq!(date, d(2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn trailing_gap_is_rejected() {
        let a = series("a", &[(2, 1.0), (3, 2.0), (4, 3.0)]);
        let b = series("b", &[(2, 5.0), (3, 6.0)]);

        let err = align_series(&[a, b], &AlignConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            UtilsError::UnresolvedGap { ref column, date } if column == "b" && date == d(4)
        ));
    }

    #[test]
    fn edge_gaps_are_trimmed() {
        let a = series("a", &[(2, 1.0), (3, 2.0), (4, 3.0), (5, 4.0), (8, 5.0)]);
        let b = series("b", &[(3, 5.0), (5, 7.0)]);
        let config = AlignConfig { edge_gaps: EdgeGapPolicy::Trim };

        let table = align_series(&[a, b], &config).unwrap();

        assert_eq!(table.dates(), &[d(3), d(4), d(5)]);
        assert_relative_eq!(table.column("b").unwrap()[1], 6.0);
    }

    #[test]
    fn disjoint_column_is_incompatible() {
        let a = series("a", &[(2, 1.0), (3, 2.0)]);
        let b = series("b", &[(10, 5.0), (11, 6.0)]);

        let err = align_series(&[a, b], &AlignConfig::default()).unwrap_err();
        assert!(matches!(err, UtilsError::IncompatibleDateRange { ref column } if column == "b"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let a = series("a", &[(2, 1.0)]);
        let err = align_series(&[a.clone(), a], &AlignConfig::default()).unwrap_err();
        assert!(matches!(err, UtilsError::InvalidParameter(_)));
        assert!(align_series(&[], &AlignConfig::default()).is_err());
    }
}
