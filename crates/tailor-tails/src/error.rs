//! Error types for tail estimation.

use tailor_fit::FitError;
use tailor_pattern::PatternError;
use thiserror::Error;

/// Result type for tail estimation.
pub type Result<T> = std::result::Result<T, TailError>;

/// Errors that can occur while fitting or applying a tail
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TailError {
    /// Pattern shape, content or attachment error
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// Tail model fitting error
    #[error("Fit error: {0}")]
    Fit(#[from] FitError),

    /// `transform` called before a successful `fit`
    #[error("Tail estimator has not been fitted")]
    NotFitted,

    /// Invalid estimator configuration
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Clark tail without growth curves from the upstream model
    #[error("Missing growth curve: {0}")]
    MissingGrowthCurve(String),
}
