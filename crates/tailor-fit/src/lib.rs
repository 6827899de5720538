#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tailor/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod bondy;
pub mod curve;
pub mod growth;
pub mod regression;

pub use bondy::{BondyFit, BondySolver};
pub use curve::{CurveFit, CurveFitter, CurveKind, LowFactorPolicy};
pub use growth::{
    ClarkContinuation, GrowthCurve, GrowthFunction, MAX_TRUNCATION_PERIODS, truncation_horizon,
};
pub use regression::LinearFit;

use thiserror::Error;

/// Errors that can occur while fitting tail models
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitError {
    /// Too few usable link ratios in the regression window
    #[error("Insufficient data for curve fit: need at least {required} usable factors, got {actual}")]
    InsufficientDataForCurveFit {
        /// Required number of usable factors
        required: usize,
        /// Usable factors after filtering
        actual: usize,
    },

    /// Too few factors from the earliest age to regress consecutive pairs
    #[error("Insufficient data for Bondy fit: need at least {required} factors, got {actual}")]
    InsufficientDataForBondyFit {
        /// Required number of factors
        required: usize,
        /// Factors available
        actual: usize,
    },

    /// Bondy exponent outside (0, 1); the infinite product diverges or is undefined
    #[error("Degenerate Bondy exponent: {0} (must be strictly between 0 and 1)")]
    DegenerateBondyExponent(f64),

    /// Link ratio at or below one while the fit is set to raise on them
    #[error("Non-developing factor {factor} at development period {ordinal}")]
    NonDevelopingFactor {
        /// Development ordinal of the link
        ordinal: f64,
        /// Offending factor
        factor: f64,
    },

    /// Truncation age does not extend past the observed edge
    #[error("Invalid truncation age {truncation}: must exceed the last observed age {edge}")]
    InvalidTruncationAge {
        /// Requested truncation age
        truncation: f64,
        /// Oldest observed age
        edge: f64,
    },

    /// Truncation age too far past the edge to lay out as run-off columns
    #[error("Truncation age {truncation} lies beyond the longest supported run-off, age {max_age}")]
    TruncationBeyondHorizon {
        /// Requested truncation age
        truncation: f64,
        /// Latest truncation age supported from the edge
        max_age: f64,
    },

    /// Growth curve parameters or evaluations are unusable
    #[error("Invalid growth curve: {0}")]
    InvalidGrowthCurve(String),
}
