#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lintner/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod align;
pub use align::{AlignConfig, EdgeGapPolicy, align_series, interpolate_features};

mod error;
pub use error::UtilsError;
