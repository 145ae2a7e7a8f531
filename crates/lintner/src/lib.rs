//! # lintner
//!
//! Single-factor (CAPM) and multi-factor (APT) analysis of daily asset
//! returns: alignment of price and macro series, excess log returns over a
//! monthly risk-free rate, unit-root tests, OLS factor models and regression
//! diagnostics.
//!
//! This crate re-exports the component crates. Individual components can be
//! enabled via feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Series, tables and test outcome types
//! - `traits`: Data source, renderer and unit-root test seams
//! - `math`: Least squares, distributions and MacKinnon surfaces
//! - `model`: Returns, stationarity, factor models, diagnostics and the pipeline
//! - `utils`: Series alignment and interpolation
//! - `cli`: The `analyze` binary
//!
//! ## Example
//!
//! ```rust,ignore
//! use lintner::model::prelude::*;
//!
//! let config = PipelineConfig::new("XOM", "SPY").with_macro_factors(["oil", "fx"]);
//! let report = run_pipeline(&config, &inputs)?;
//! println!("{}", report.capm);
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use lintner_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use lintner_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use lintner_math as math;
#[cfg(feature = "model")]
#[doc(inline)]
pub use lintner_model as model;
#[cfg(feature = "utils")]
#[doc(inline)]
pub use lintner_utils as utils;
