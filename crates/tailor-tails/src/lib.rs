#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tailor/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod bondy;
pub mod clark;
pub mod constant;
pub mod curve;
pub mod error;
pub mod estimator;
pub mod runoff;
pub mod source;

pub use bondy::{Bondy, BondyConfig, BondyRow, BondyTail};
pub use clark::{Clark, ClarkConfig, ClarkRow, ClarkTail};
pub use constant::{Constant, ConstantConfig, ConstantRow, ConstantTail};
pub use curve::{Curve, CurveConfig, CurveRow, CurveTail, FitPeriod};
pub use error::{Result, TailError};
pub use estimator::{
    FitStatus, FittedTail, RowContext, RowTail, TailEstimator, TailStrategy, TailedPattern,
};
pub use runoff::RunoffSplitter;
pub use source::{ClarkPattern, DevelopmentSource};
