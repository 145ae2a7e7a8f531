#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lintner/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod returns;
pub use returns::{
    BUSINESS_DAYS_PER_MONTH, ExcessReturns, excess_returns, log_returns, reconstruct_prices,
    risk_free_series, subtract_risk_free,
};

mod stationarity;
pub use stationarity::{AdfConfig, AugmentedDickeyFuller, LagSelection};

mod factor_model;
pub use factor_model::{Coefficient, FactorModel, ModelSpec};

mod influence;
pub use influence::{InfluenceReport, OutlierTest, influence, outlier_test};

mod diagnostics;
pub use diagnostics::{
    AutocorrelationTest, DiagnosticsConfig, DiagnosticsReport, NestedModelTest, breusch_godfrey,
    breusch_pagan, compare_nested, diagnose, durbin_watson, jarque_bera,
    variance_inflation_factors,
};

mod pipeline;
pub use pipeline::{
    LoadRequest, PipelineConfig, PipelineInputs, PipelineReport, StationarityCheck, load_inputs,
    run_pipeline,
};

mod error;
pub use error::{ErrorKind, ModelError};

/// Re-export commonly used types.
pub mod prelude {
    pub use lintner_math::UnitRootTrend;
    pub use lintner_traits::{DataSource, Renderer, UnitRootTest};
    pub use lintner_utils::{AlignConfig, EdgeGapPolicy};

    pub use super::{
        DiagnosticsConfig, ErrorKind, FactorModel, ModelError, ModelSpec, PipelineConfig,
        run_pipeline,
    };
}
