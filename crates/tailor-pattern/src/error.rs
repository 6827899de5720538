//! Error types for pattern operations.

use thiserror::Error;

/// Result type for pattern operations.
pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors that can occur while building or indexing development patterns.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatternError {
    /// Attachment age is outside the observed range of the axis
    #[error("Invalid attachment age {age}: must lie between {min} and {max}")]
    InvalidAttachmentAge {
        /// Requested attachment age
        age: f64,
        /// Youngest age on the axis
        min: f64,
        /// Edge of the observed triangle
        max: f64,
    },

    /// Shape, NaN or non-positive factor violations
    #[error("Malformed pattern array: {0}")]
    MalformedPatternArray(String),
}
