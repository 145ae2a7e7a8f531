//! Yahoo Finance and FRED-style CSV data sources.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, NaiveTime};
use lintner::{
    primitives::{Date, TimeSeries},
    traits::{DataSource, SourceError},
};
use polars::prelude::*;
use time::OffsetDateTime;
use tokio::runtime::Runtime;
use yahoo_finance_api as yahoo;

/// Marker FRED uses for a missing observation.
const FRED_MISSING: &str = ".";

/// Daily adjusted closes from Yahoo Finance.
///
/// The connector is async; each request is driven to completion on a
/// private current-thread runtime.
pub(crate) struct YahooSource {
    provider: yahoo::YahooConnector,
    runtime: Runtime,
}

impl YahooSource {
    pub(crate) fn new() -> Result<Self, SourceError> {
        let provider =
            yahoo::YahooConnector::new().map_err(|e| SourceError::unavailable("yahoo", e))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SourceError::unavailable("yahoo", e))?;
        Ok(Self { provider, runtime })
    }

    pub(crate) fn adjusted_closes(
        &self,
        ticker: &str,
        from: Date,
        to: Date,
    ) -> Result<TimeSeries, SourceError> {
        let start = unix_start_of(ticker, from)?;
        let end = unix_start_of(ticker, to.succ_opt().unwrap_or(to))?;

        tracing::debug!(ticker, %from, %to, "requesting quote history");
        let response = self
            .runtime
            .block_on(self.provider.get_quote_history(ticker, start, end))
            .map_err(|e| SourceError::unavailable(ticker, e))?;
        let quotes = response.quotes().map_err(|e| SourceError::unavailable(ticker, e))?;

        // Yahoo can append an intraday row that shares its date with the last
        // close, so later quotes replace earlier ones on the same date.
        let mut by_date = BTreeMap::new();
        for quote in &quotes {
            let date = i64::try_from(quote.timestamp)
                .ok()
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map(|dt| dt.date_naive());
            if let Some(date) = date {
                by_date.insert(date, quote.adjclose);
            }
        }

        let series = TimeSeries::from_observations(ticker, by_date)
            .map_err(|e| SourceError::unavailable(ticker, e))?;
        if series.is_empty() {
            return Err(SourceError::Empty { series: ticker.to_string(), from, to });
        }
        Ok(series)
    }
}

fn unix_start_of(series: &str, date: Date) -> Result<OffsetDateTime, SourceError> {
    let seconds = date.and_time(NaiveTime::MIN).and_utc().timestamp();
    OffsetDateTime::from_unix_timestamp(seconds).map_err(|e| SourceError::unavailable(series, e))
}

/// Read a FRED-style CSV file: a header row, dates in the first column and
/// values in the second. Rows whose value is `.` are skipped.
pub(crate) fn read_fred_csv(path: &Path, name: &str) -> Result<TimeSeries, SourceError> {
    let unavailable =
        |e: String| SourceError::unavailable(name, format!("{}: {e}", path.display()));

    // Schema inference is disabled so every column is read as text.
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| unavailable(e.to_string()))?;

    let columns = df.get_columns();
    if columns.len() < 2 {
        return Err(unavailable("expected a date and a value column".to_string()));
    }
    let dates = columns[0].str().map_err(|e| unavailable(e.to_string()))?;
    let values = columns[1].str().map_err(|e| unavailable(e.to_string()))?;

    let mut observations = Vec::with_capacity(df.height());
    for (date, value) in dates.into_iter().zip(values) {
        let (Some(date), Some(value)) = (date, value) else {
            continue;
        };
        let value = value.trim();
        if value == FRED_MISSING || value.is_empty() {
            continue;
        }
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|e| unavailable(format!("date {date:?}: {e}")))?;
        let value: f64 =
            value.parse().map_err(|e| unavailable(format!("value {value:?}: {e}")))?;
        observations.push((date, value));
    }

    TimeSeries::from_observations(name, observations).map_err(|e| unavailable(e.to_string()))
}

/// Routes each request to a CSV file or Yahoo Finance.
///
/// CSV files are keyed by series name and take precedence. Macro series
/// without a file are fetched from Yahoo under their mapped ticker.
pub(crate) struct AnalysisSource {
    yahoo: YahooSource,
    tickers: HashMap<String, String>,
    files: HashMap<String, PathBuf>,
}

impl AnalysisSource {
    pub(crate) fn new(
        tickers: HashMap<String, String>,
        files: HashMap<String, PathBuf>,
    ) -> Result<Self, SourceError> {
        Ok(Self { yahoo: YahooSource::new()?, tickers, files })
    }

    fn from_file(&self, name: &str, from: Date, to: Date) -> Option<Result<TimeSeries, SourceError>> {
        let path = self.files.get(name)?;
        tracing::debug!(series = name, path = %path.display(), "reading CSV series");
        Some(read_fred_csv(path, name).map(|series| series.between(from, to)))
    }
}

impl DataSource for AnalysisSource {
    fn daily_prices(&self, ticker: &str, from: Date, to: Date) -> Result<TimeSeries, SourceError> {
        self.from_file(ticker, from, to)
            .unwrap_or_else(|| self.yahoo.adjusted_closes(ticker, from, to))
    }

    fn macro_series(&self, name: &str, from: Date, to: Date) -> Result<TimeSeries, SourceError> {
        if let Some(series) = self.from_file(name, from, to) {
            return series;
        }
        let ticker = self
            .tickers
            .get(name)
            .ok_or_else(|| SourceError::unavailable(name, "no file or ticker configured"))?;
        Ok(self.yahoo.adjusted_closes(ticker, from, to)?.renamed(name))
    }
}
