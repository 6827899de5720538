//! Ordinary least squares.
//!
//! Tail fits only ever need a single regressor, so both estimators are the
//! closed-form normal equations:
//!
//! ```text
//! slope     = Σ (x - x̄)(y - ȳ) / Σ (x - x̄)²
//! intercept = ȳ - slope * x̄
//! ```
//!
//! and, for the regression through the origin used by the Bondy exponent,
//! `slope = Σ x y / Σ x²`.

use ndarray::ArrayView1;

/// Result of a simple linear regression
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Slope coefficient
    pub slope: f64,
    /// Intercept coefficient
    pub intercept: f64,
    /// Coefficient of determination (1.0 for a perfect fit)
    pub r_squared: f64,
    /// Number of observations
    pub n: usize,
}

/// Fit `y = intercept + slope * x`.
///
/// Returns `None` when there are fewer than two observations, the lengths
/// differ, or `x` has no variance.
pub fn ols(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Option<LinearFit> {
    let n = x.len();
    if n < 2 || y.len() != n {
        return None;
    }

    let x_mean = x.sum() / n as f64;
    let y_mean = y.sum() / n as f64;

    let (sxx, sxy, syy) = x.iter().zip(y.iter()).fold((0.0, 0.0, 0.0), |acc, (&xi, &yi)| {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        (acc.0 + dx * dx, acc.1 + dx * dy, acc.2 + dy * dy)
    });

    if sxx <= f64::EPSILON * n as f64 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let r_squared = if syy > 0.0 { sxy * sxy / (sxx * syy) } else { 1.0 };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
        n,
    })
}

/// Fit `y = slope * x` with no intercept.
///
/// Returns `None` when the inputs are empty, differ in length, or `x` is all
/// zeros.
pub fn ols_through_origin(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Option<f64> {
    if x.is_empty() || x.len() != y.len() {
        return None;
    }

    let sxx = x.dot(&x);
    if sxx <= 0.0 {
        return None;
    }

    Some(x.dot(&y) / sxx)
}
