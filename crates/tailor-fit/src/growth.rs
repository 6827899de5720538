//! Growth-curve continuation (Clark)
//!
//! Clark's method describes development by a growth function `G(x)`, the
//! proportion of ultimate loss emerged by age `x`:
//!
//! ```text
//! log-logistic: G(x) = x^ω / (x^ω + θ^ω)
//! Weibull:      G(x) = 1 - exp(-(x/θ)^ω)
//! ```
//!
//! The curve itself is fit upstream; here it is only evaluated. Link ratios
//! between ages `a < b` are `G(b) / G(a)` and the tail at an attachment age
//! `A` is `G(T) / G(A)`, where `T` is the truncation age or infinity
//! (`G(∞) = 1`). Ages past the truncation contribute no further development.

use serde::{Deserialize, Serialize};

use crate::FitError;

/// Cumulative proportion of ultimate emerged by a development age
pub trait GrowthFunction {
    /// `G(age)`, in [0, 1] and non-decreasing in age
    fn cumulative(&self, age: f64) -> f64;
}

/// Fitted growth-curve parameters of one slice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GrowthCurve {
    /// `x^ω / (x^ω + θ^ω)`
    LogLogistic {
        /// Shape ω
        omega: f64,
        /// Scale θ
        theta: f64,
    },
    /// `1 - exp(-(x/θ)^ω)`
    Weibull {
        /// Shape ω
        omega: f64,
        /// Scale θ
        theta: f64,
    },
}

impl GrowthCurve {
    /// Check that shape and scale are positive and finite
    pub fn validate(&self) -> Result<(), FitError> {
        let (Self::LogLogistic { omega, theta } | Self::Weibull { omega, theta }) = *self;
        if omega.is_finite() && theta.is_finite() && omega > 0.0 && theta > 0.0 {
            Ok(())
        } else {
            Err(FitError::InvalidGrowthCurve(format!(
                "shape {omega} and scale {theta} must be positive"
            )))
        }
    }
}

impl GrowthFunction for GrowthCurve {
    fn cumulative(&self, age: f64) -> f64 {
        if age <= 0.0 {
            return 0.0;
        }
        match *self {
            Self::LogLogistic { omega, theta } => {
                // x^ω / (x^ω + θ^ω) = 1 / (1 + (θ/x)^ω)
                1.0 / (1.0 + (theta / age).powf(omega))
            }
            Self::Weibull { omega, theta } => 1.0 - (-(age / theta).powf(omega)).exp(),
        }
    }
}

/// Continues a growth curve past the edge of a triangle
#[derive(Debug, Clone, Copy)]
pub struct ClarkContinuation<'a, G: ?Sized> {
    curve: &'a G,
    truncation: Option<f64>,
}

impl<'a, G> ClarkContinuation<'a, G>
where
    G: GrowthFunction + ?Sized,
{
    /// Create a continuation.
    ///
    /// # Errors
    /// [`FitError::InvalidTruncationAge`] when the truncation age does not
    /// exceed the oldest observed age `edge`.
    pub fn new(curve: &'a G, truncation: Option<f64>, edge: f64) -> Result<Self, FitError> {
        if let Some(t) = truncation
            && (t.is_nan() || t <= edge)
        {
            return Err(FitError::InvalidTruncationAge {
                truncation: t,
                edge,
            });
        }
        Ok(Self { curve, truncation })
    }

    /// Truncation age, if any
    pub const fn truncation(&self) -> Option<f64> {
        self.truncation
    }

    /// `G(T)`, one without truncation
    fn terminal(&self) -> f64 {
        self.truncation.map_or(1.0, |t| self.curve.cumulative(t))
    }

    fn capped(&self, age: f64) -> Result<f64, FitError> {
        let age = self.truncation.map_or(age, |t| age.min(t));
        let g = self.curve.cumulative(age);
        if g > 0.0 && g.is_finite() {
            Ok(g)
        } else {
            Err(FitError::InvalidGrowthCurve(format!(
                "growth curve evaluates to {g} at age {age}"
            )))
        }
    }

    /// Tail factor at an attachment age: `G(T) / G(attach_age)`
    pub fn tail_factor(&self, attach_age: f64) -> Result<f64, FitError> {
        Ok(self.terminal() / self.capped(attach_age)?)
    }

    /// Link ratios for columns starting at `ages`.
    ///
    /// Every column but the last develops to the next age; the last column
    /// develops to the truncation age (or ultimate). The product of the
    /// result equals `tail_factor(ages[0])`.
    pub fn continuation(&self, ages: &[f64]) -> Result<Vec<f64>, FitError> {
        let Some(&last) = ages.last() else {
            return Ok(Vec::new());
        };

        let mut factors = ages
            .windows(2)
            .map(|w| Ok(self.capped(w[1])? / self.capped(w[0])?))
            .collect::<Result<Vec<_>, FitError>>()?;
        factors.push(self.terminal() / self.capped(last)?);

        Ok(factors)
    }
}

/// Most development periods a truncation age may lie past the edge
pub const MAX_TRUNCATION_PERIODS: usize = 1200;

/// Columns needed beyond the edge: at least `min_periods`, and with a
/// truncation age enough steps for the last column to start before it.
///
/// # Errors
/// [`FitError::TruncationBeyondHorizon`] when reaching the truncation age
/// takes more than [`MAX_TRUNCATION_PERIODS`] steps.
pub fn truncation_horizon(
    truncation: Option<f64>,
    edge: f64,
    step: f64,
    min_periods: usize,
) -> Result<usize, FitError> {
    let Some(t) = truncation else {
        return Ok(min_periods);
    };

    let needed = ((t - edge) / step).ceil();
    if needed.is_nan() || needed > MAX_TRUNCATION_PERIODS as f64 {
        return Err(FitError::TruncationBeyondHorizon {
            truncation: t,
            max_age: edge + step * MAX_TRUNCATION_PERIODS as f64,
        });
    }
    Ok((needed.max(0.0) as usize).max(min_periods))
}
