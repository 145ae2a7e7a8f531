#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lintner/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod linalg;
pub use linalg::{OlsFit, invert, ordinary_least_squares, solve_linear_system};

mod moments;
pub use moments::{CentralMoments, central_moments};

mod distributions;
pub use distributions::{chi_squared_sf, f_sf, normal_cdf, students_t_two_sided};

mod mackinnon;
pub use mackinnon::{UnitRootTrend, mackinnon_critical_values, mackinnon_p_value};

mod error;
pub use error::MathError;
