//! Upstream development estimators.
//!
//! Tail estimators only need the upstream `ldf_`; the Clark tail also needs
//! the growth curve fitted for each key.

use tailor_fit::GrowthCurve;
use tailor_pattern::PatternArray;

use crate::error::{Result, TailError};

/// Output of an upstream development estimator
pub trait DevelopmentSource {
    /// Incremental development factors
    fn ldf(&self) -> &PatternArray;

    /// Fitted growth curve per key, when the upstream model has one
    fn growth_curves(&self) -> Option<&[GrowthCurve]> {
        None
    }
}

impl DevelopmentSource for PatternArray {
    fn ldf(&self) -> &PatternArray {
        self
    }
}

/// Development pattern of a fitted growth-curve model
#[derive(Debug, Clone)]
pub struct ClarkPattern {
    ldf: PatternArray,
    curves: Vec<GrowthCurve>,
}

impl ClarkPattern {
    /// Pair an `ldf_` with one fitted growth curve per key.
    ///
    /// # Errors
    /// [`TailError::MissingGrowthCurve`] when the curve count differs from
    /// the key count, or a fit error for invalid curve parameters.
    pub fn new(ldf: PatternArray, curves: Vec<GrowthCurve>) -> Result<Self> {
        if curves.len() != ldf.keys().len() {
            return Err(TailError::MissingGrowthCurve(format!(
                "{} growth curves for {} keys",
                curves.len(),
                ldf.keys().len()
            )));
        }
        for curve in &curves {
            curve.validate()?;
        }
        Ok(Self { ldf, curves })
    }
}

impl DevelopmentSource for ClarkPattern {
    fn ldf(&self) -> &PatternArray {
        &self.ldf
    }

    fn growth_curves(&self) -> Option<&[GrowthCurve]> {
        Some(&self.curves)
    }
}
