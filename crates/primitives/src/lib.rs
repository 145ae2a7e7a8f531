#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lintner/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod series;
pub use series::{SeriesError, TimeSeries};

mod table;
pub use table::AlignedPriceTable;

mod returns;
pub use returns::{ReturnSeries, RiskFreeSeries};

mod rates;
pub use rates::{MonthlyRates, YearMonth};

mod outcome;
pub use outcome::{CriticalValues, TestOutcome, UnitRootOutcome};

/// Re-export common date type.
pub type Date = chrono::NaiveDate;
