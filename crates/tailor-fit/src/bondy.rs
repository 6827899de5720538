//! Generalized Bondy tail
//!
//! The Generalized Bondy method assumes each link ratio is a fixed power of
//! the previous one:
//!
//! ```text
//! f(t+1) = f(t)^B        =>  ln f(t+1) = B * ln f(t)
//! f(k)   = f(0)^(B^k)
//! ```
//!
//! so the tail beyond a fitted factor `f(n-1)` is the infinite product
//!
//! ```text
//! f(n-1)^B * f(n-1)^(B^2) * ... = f(n-1)^(B / (1 - B))
//! ```
//!
//! which converges only for `0 < B < 1`. Both `B` and `f(0)` are recovered in
//! closed form: `B` as the through-origin slope of consecutive log factors,
//! and `ln f(0)` as the least-squares solution of `ln f(k) = B^k ln f(0)`.
//!
//! # References
//! - Bondy, M. (1966). Actuarial practice for tail factors; generalized by
//!   Boor, J. (2006). "Estimating Tail Development Factors: What to do When
//!   the Triangle Runs Out." CAS Forum.

use ndarray::{Array1, ArrayView1, s};
use serde::{Deserialize, Serialize};

use crate::FitError;
use crate::regression::ols_through_origin;

/// Minimum factors from the earliest age (one consecutive pair)
pub const MIN_BONDY_FACTORS: usize = 2;

/// Fitted Generalized Bondy parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BondyFit {
    /// Bondy exponent `B`
    pub b: f64,
    /// Fitted link ratio at the earliest age, `f(0)`
    pub earliest_ldf: f64,
}

impl BondyFit {
    /// Fitted link ratio `steps` periods after the earliest age
    pub fn fitted_ldf(&self, steps: usize) -> f64 {
        self.earliest_ldf.powf(self.b.powi(steps as i32))
    }

    /// Product of every fitted link ratio from `steps` periods after the
    /// earliest age onwards.
    ///
    /// Equal to `BondySolver::tail(b, fitted_ldf(steps - 1))`, and for
    /// `steps == 0` to `f(0)^(1 / (1 - B))`.
    pub fn tail_from(&self, steps: usize) -> f64 {
        self.earliest_ldf
            .powf(self.b.powi(steps as i32) / (1.0 - self.b))
    }
}

/// Closed-form Generalized Bondy solver
#[derive(Debug, Clone, Copy, Default)]
pub struct BondySolver;

impl BondySolver {
    /// Estimate the Bondy exponent and the fitted earliest link ratio.
    ///
    /// # Arguments
    /// * `factors` - Observed link ratios from the earliest age to the edge,
    ///   in increasing age order
    ///
    /// # Errors
    /// [`FitError::InsufficientDataForBondyFit`] for fewer than two factors
    /// and [`FitError::DegenerateBondyExponent`] when the exponent is not
    /// strictly between zero and one.
    pub fn fit(factors: ArrayView1<'_, f64>) -> Result<BondyFit, FitError> {
        let n = factors.len();
        if n < MIN_BONDY_FACTORS {
            return Err(FitError::InsufficientDataForBondyFit {
                required: MIN_BONDY_FACTORS,
                actual: n,
            });
        }

        let logs: Array1<f64> = factors.mapv(f64::ln);
        let b = ols_through_origin(logs.slice(s![..n - 1]), logs.slice(s![1..]))
            .unwrap_or(f64::NAN);
        Self::check_exponent(b)?;

        // ln f(0) = Σ B^k ln f(k) / Σ B^(2k)
        let (num, den) = logs
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(num, den), (k, &lf)| {
                let w = b.powi(k as i32);
                (num + w * lf, den + w * w)
            });

        Ok(BondyFit {
            b,
            earliest_ldf: (num / den).exp(),
        })
    }

    /// Tail implied by the exponent beyond the last fitted link ratio:
    /// `last_fitted_ldf^(b / (1 - b))`.
    ///
    /// # Errors
    /// [`FitError::DegenerateBondyExponent`] when `b` is not in (0, 1).
    pub fn tail(b: f64, last_fitted_ldf: f64) -> Result<f64, FitError> {
        Self::check_exponent(b)?;
        Ok(last_fitted_ldf.powf(b / (1.0 - b)))
    }

    fn check_exponent(b: f64) -> Result<(), FitError> {
        if b.is_finite() && b > 0.0 && b < 1.0 {
            Ok(())
        } else {
            Err(FitError::DegenerateBondyExponent(b))
        }
    }
}
