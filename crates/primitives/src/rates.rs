//! Calendar-month keyed rates.

use std::collections::BTreeMap;

use chrono::Datelike;
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{Date, TimeSeries};

/// A calendar month.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[display("{year:04}-{month:02}")]
pub struct YearMonth {
    /// Calendar year.
    pub year: i32,
    /// Month number, 1 to 12.
    pub month: u32,
}

impl YearMonth {
    /// Create a new year-month.
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// First calendar day of the month, `None` for an invalid month.
    #[must_use]
    pub fn first_day(self) -> Option<Date> {
        Date::from_ymd_opt(self.year, self.month, 1)
    }
}

impl From<Date> for YearMonth {
    fn from(date: Date) -> Self {
        Self { year: date.year(), month: date.month() }
    }
}

/// Published rates keyed by calendar month.
///
/// Built once from a monthly series and queried per trading date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRates(BTreeMap<YearMonth, f64>);

impl MonthlyRates {
    /// Create an empty rate map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build the map from a series of published rates.
    ///
    /// Each observation is keyed by its calendar month; when a month has several
    /// observations the latest one wins. Every value is multiplied by `scale`,
    /// which converts quoted units (e.g. percent) into decimal rates.
    #[must_use]
    pub fn from_series(series: &TimeSeries, scale: f64) -> Self {
        series.iter().map(|(date, rate)| (YearMonth::from(date), rate * scale)).collect()
    }

    /// Set the rate for a month.
    pub fn insert(&mut self, month: YearMonth, rate: f64) {
        self.0.insert(month, rate);
    }

    /// Rate published for `month`.
    #[must_use]
    pub fn get(&self, month: YearMonth) -> Option<f64> {
        self.0.get(&month).copied()
    }

    /// Rate for the calendar month enclosing `date`.
    #[must_use]
    pub fn for_date(&self, date: Date) -> Option<f64> {
        self.get(YearMonth::from(date))
    }

    /// Covered months in ascending order.
    pub fn months(&self) -> impl Iterator<Item = YearMonth> + '_ {
        self.0.keys().copied()
    }

    /// Number of months with a rate.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(YearMonth, f64)> for MonthlyRates {
    fn from_iter<I: IntoIterator<Item = (YearMonth, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
