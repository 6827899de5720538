//! Curve-fitted tail factors
//!
//! Link ratios decay towards one. Both supported curves model the
//! development portion `ldf - 1` as log-linear in a transform of the
//! development ordinal `t`:
//!
//! ```text
//! exponential:   ln(ldf - 1) = intercept + slope * t
//!                ldf(t)      = 1 + exp(slope * t + intercept)
//! inverse power: ln(ldf - 1) = intercept + slope * ln(t)
//!                ldf(t)      = 1 + exp(intercept) * t^slope
//! ```
//!
//! Coefficients come from closed-form OLS; factors at or below one have no
//! log of `ldf - 1` and are dropped or rejected depending on the
//! [`LowFactorPolicy`].

use derive_more::Display;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::FitError;
use crate::regression::{LinearFit, ols};

/// Minimum usable link ratios for a curve fit
pub const MIN_CURVE_POINTS: usize = 2;

/// Shape of the decay curve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// `ldf - 1` decays exponentially in the development ordinal
    #[default]
    #[display("exponential")]
    Exponential,
    /// `ldf - 1` decays as a power of the development ordinal
    #[display("inverse_power")]
    InversePower,
}

impl CurveKind {
    /// Regressor used for a development ordinal
    pub fn regressor(self, ordinal: f64) -> f64 {
        match self {
            Self::Exponential => ordinal,
            Self::InversePower => ordinal.ln(),
        }
    }
}

/// Treatment of link ratios at or below one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowFactorPolicy {
    /// Drop them from the regression window
    #[default]
    Ignore,
    /// Fail the fit
    Raise,
}

/// Fitted decay curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveFit {
    /// Curve shape
    pub curve: CurveKind,
    /// Regression slope
    pub slope: f64,
    /// Regression intercept
    pub intercept: f64,
    /// Goodness of fit on the log scale
    pub r_squared: f64,
}

impl CurveFit {
    /// Fitted link ratio at a development ordinal
    pub fn factor(&self, ordinal: f64) -> f64 {
        match self.curve {
            CurveKind::Exponential => 1.0 + (self.slope * ordinal + self.intercept).exp(),
            CurveKind::InversePower => 1.0 + self.intercept.exp() * ordinal.powf(self.slope),
        }
    }

    /// Fitted link ratios at successive ordinals
    pub fn extrapolate<I>(&self, ordinals: I) -> Array1<f64>
    where
        I: IntoIterator<Item = f64>,
    {
        ordinals.into_iter().map(|t| self.factor(t)).collect()
    }
}

/// Fits decay curves to windows of observed link ratios
#[derive(Debug, Clone, Copy, Default)]
pub struct CurveFitter {
    curve: CurveKind,
    policy: LowFactorPolicy,
}

impl CurveFitter {
    /// Create a fitter for a curve shape
    pub const fn new(curve: CurveKind, policy: LowFactorPolicy) -> Self {
        Self { curve, policy }
    }

    /// Curve shape being fitted
    pub const fn curve(&self) -> CurveKind {
        self.curve
    }

    /// Fit `ln(ldf - 1)` against the development ordinals of a window.
    ///
    /// # Arguments
    /// * `ordinals` - Development ordinal of each link ratio
    /// * `factors` - Observed link ratios, aligned with `ordinals`
    ///
    /// # Errors
    /// [`FitError::InsufficientDataForCurveFit`] when fewer than two usable
    /// factors with distinct ordinals remain, and
    /// [`FitError::NonDevelopingFactor`] for a factor at or below one under
    /// [`LowFactorPolicy::Raise`].
    pub fn fit(
        &self,
        ordinals: ArrayView1<'_, f64>,
        factors: ArrayView1<'_, f64>,
    ) -> Result<CurveFit, FitError> {
        let mut x = Vec::with_capacity(factors.len());
        let mut y = Vec::with_capacity(factors.len());

        for (&t, &f) in ordinals.iter().zip(factors.iter()) {
            if f > 1.0 && f.is_finite() {
                x.push(self.curve.regressor(t));
                y.push((f - 1.0).ln());
            } else if self.policy == LowFactorPolicy::Raise {
                return Err(FitError::NonDevelopingFactor {
                    ordinal: t,
                    factor: f,
                });
            }
        }

        let usable = x.len();
        let insufficient = FitError::InsufficientDataForCurveFit {
            required: MIN_CURVE_POINTS,
            actual: usable,
        };
        if usable < MIN_CURVE_POINTS {
            return Err(insufficient);
        }

        let LinearFit {
            slope,
            intercept,
            r_squared,
            ..
        } = ols(ArrayView1::from(x.as_slice()), ArrayView1::from(y.as_slice())).ok_or(insufficient)?;

        Ok(CurveFit {
            curve: self.curve,
            slope,
            intercept,
            r_squared,
        })
    }
}
