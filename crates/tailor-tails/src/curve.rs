//! Curve Tail
//!
//! Fits an exponential or inverse-power decay to the observed link ratios of
//! each row and extrapolates it past the attachment.
//!
//! The link from column `j` develops to ordinal `j + 2`; with the attachment
//! at ordinal `A` the tail is
//!
//! ```text
//! tail = ∏_{i=1}^{extrap_periods} f(A + i)
//! ```

use ndarray::{Array1, Array2, s};
use serde::{Deserialize, Serialize};
use tailor_fit::{CurveFit, CurveFitter, CurveKind, LowFactorPolicy};
use tailor_pattern::{AGE_TOLERANCE, Attachment, DevelopmentAxis};

use crate::error::{Result, TailError};
use crate::estimator::{RowContext, RowTail, TailEstimator, TailStrategy};
use crate::runoff::{DEFAULT_PROJECTION_PERIOD, RunoffSplitter, collapse};

/// Default number of extrapolated link ratios
pub const DEFAULT_EXTRAP_PERIODS: usize = 100;

/// Development ages whose link ratios enter the regression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitPeriod {
    /// First from-age included
    pub start: f64,
    /// Last from-age included; `None` runs to the edge
    pub end: Option<f64>,
}

impl FitPeriod {
    fn contains(&self, age: f64) -> bool {
        age >= self.start - AGE_TOLERANCE
            && self.end.is_none_or(|end| age <= end + AGE_TOLERANCE)
    }
}

/// Configuration for the curve tail
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// Decay curve (default: exponential)
    pub curve: CurveKind,
    /// Regression window; `None` uses the links from the attachment to the
    /// edge, or every link when attaching at the edge
    pub fit_period: Option<FitPeriod>,
    /// Number of link ratios extrapolated past the attachment (default: 100)
    pub extrap_periods: usize,
    /// Treatment of link ratios at or below one (default: ignore)
    pub errors: LowFactorPolicy,
    /// Attachment age; `None` attaches at the edge
    pub attachment_age: Option<f64>,
    /// Months projected past the edge (default: 12)
    pub projection_period: u32,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            curve: CurveKind::default(),
            fit_period: None,
            extrap_periods: DEFAULT_EXTRAP_PERIODS,
            errors: LowFactorPolicy::default(),
            attachment_age: None,
            projection_period: DEFAULT_PROJECTION_PERIOD,
        }
    }
}

/// Curve tail strategy
#[derive(Debug, Clone, Copy)]
pub struct Curve {
    config: CurveConfig,
    fitter: CurveFitter,
    splitter: RunoffSplitter,
}

impl Curve {
    /// Create a curve tail strategy.
    ///
    /// # Errors
    /// [`TailError::InvalidParameter`] for `extrap_periods == 0`, an empty
    /// fit period or a projection period under one year.
    pub fn new(config: CurveConfig) -> Result<Self> {
        if config.extrap_periods == 0 {
            return Err(TailError::InvalidParameter(
                "extrap_periods must be at least 1".to_string(),
            ));
        }
        if let Some(FitPeriod {
            start,
            end: Some(end),
        }) = config.fit_period
            && start > end
        {
            return Err(TailError::InvalidParameter(format!(
                "fit_period start {start} is after its end {end}"
            )));
        }

        Ok(Self {
            config,
            fitter: CurveFitter::new(config.curve, config.errors),
            splitter: RunoffSplitter::new(config.projection_period)?,
        })
    }

    /// Strategy configuration
    pub const fn config(&self) -> &CurveConfig {
        &self.config
    }

    /// Column range `[lo, hi)` of the regression window
    fn window(&self, axis: &DevelopmentAxis, attachment: &Attachment) -> (usize, usize) {
        match self.config.fit_period {
            Some(period) => {
                let ages = axis.ages();
                let lo = ages
                    .iter()
                    .position(|&a| period.contains(a))
                    .unwrap_or(ages.len());
                let hi = lo + ages[lo..].iter().take_while(|&&a| period.contains(a)).count();
                (lo, hi)
            }
            None if attachment.index < axis.len() => (attachment.index, axis.len()),
            None => (0, axis.len()),
        }
    }
}

/// Fitted curve tail of one row
#[derive(Debug, Clone, PartialEq)]
pub struct CurveRow {
    fit: CurveFit,
    sequence: Vec<f64>,
    tail: f64,
}

impl CurveRow {
    /// Fitted decay curve
    pub const fn fit(&self) -> &CurveFit {
        &self.fit
    }

    /// Extrapolated link ratios from the attachment onwards
    pub fn sequence(&self) -> &[f64] {
        &self.sequence
    }
}

impl RowTail for CurveRow {
    fn tail(&self) -> f64 {
        self.tail
    }

    fn runoff(&self, ages: &[f64]) -> Result<Vec<f64>> {
        Ok(collapse(&self.sequence, ages.len()))
    }
}

impl TailStrategy for Curve {
    type Row = CurveRow;

    fn name(&self) -> &'static str {
        "curve"
    }

    fn attachment_age(&self) -> Option<f64> {
        self.config.attachment_age
    }

    fn splitter(&self) -> RunoffSplitter {
        self.splitter
    }

    fn fit_row(&self, row: &RowContext<'_>) -> Result<CurveRow> {
        let (lo, hi) = self.window(row.axis, &row.attachment);
        let ordinals: Array1<f64> = (lo..hi).map(|j| (j + 2) as f64).collect();
        let fit = self
            .fitter
            .fit(ordinals.view(), row.factors.slice(s![lo..hi]))?;

        let first = row.attachment.ordinal() as f64;
        let sequence = fit.extrapolate((1..=self.config.extrap_periods).map(|i| first + i as f64));

        Ok(CurveRow {
            fit,
            tail: sequence.product(),
            sequence: sequence.to_vec(),
        })
    }
}

/// Curve tail estimator
pub type CurveTail = TailEstimator<Curve>;

impl CurveTail {
    /// Curve tail estimator from a configuration
    pub fn curve(config: CurveConfig) -> Result<Self> {
        Ok(Self::new(Curve::new(config)?))
    }

    /// Regression slope per (key, origin)
    pub fn slope(&self) -> Result<Array2<f64>> {
        Ok(self.fitted()?.map_rows(|row| row.fit.slope))
    }

    /// Regression intercept per (key, origin)
    pub fn intercept(&self) -> Result<Array2<f64>> {
        Ok(self.fitted()?.map_rows(|row| row.fit.intercept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tailor_fit::FitError;
    use tailor_pattern::{Grain, PatternArray};

    fn pattern(factors: &[f64]) -> PatternArray {
        let ages = (1..=factors.len()).map(|i| (12 * i) as f64).collect();
        let axis = DevelopmentAxis::new(Grain::Annual, ages).unwrap();
        PatternArray::from_ldf(axis, factors).unwrap()
    }

    fn exponential_factors(n: usize) -> Vec<f64> {
        (0..n)
            .map(|j| 1.0 + (-0.7 * (j + 2) as f64 + 0.9).exp())
            .collect()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let zero = CurveConfig {
            extrap_periods: 0,
            ..Default::default()
        };
        assert!(Curve::new(zero).is_err());

        let backwards = CurveConfig {
            fit_period: Some(FitPeriod {
                start: 48.0,
                end: Some(24.0),
            }),
            ..Default::default()
        };
        assert!(Curve::new(backwards).is_err());
    }

    #[test]
    fn test_recovers_slope_and_intercept() {
        let mut estimator = CurveTail::curve(CurveConfig::default()).unwrap();
        estimator.fit(&pattern(&exponential_factors(8))).unwrap();

        assert_relative_eq!(estimator.slope().unwrap()[[0, 0]], -0.7, epsilon = 1e-9);
        assert_relative_eq!(estimator.intercept().unwrap()[[0, 0]], 0.9, epsilon = 1e-9);
    }

    #[test]
    fn test_runoff_product_is_tail() {
        let mut estimator = CurveTail::curve(CurveConfig::default()).unwrap();
        let out = estimator
            .fit_transform(&pattern(&exponential_factors(8)))
            .unwrap();
        let tail = out.tail[[0, 0]];

        let runoff: f64 = out.ldf.row(0, 0).iter().skip(8).product();
        assert_eq!(out.ldf.axis().len(), 10);
        assert_relative_eq!(runoff, tail, epsilon = 1e-12);
        assert!(tail > 1.0);
    }

    #[test]
    fn test_fit_period_restricts_window() {
        let mut factors = exponential_factors(8);
        factors[0] = 3.5;
        let config = CurveConfig {
            fit_period: Some(FitPeriod {
                start: 24.0,
                end: None,
            }),
            ..Default::default()
        };
        let mut estimator = CurveTail::curve(config).unwrap();
        estimator.fit(&pattern(&factors)).unwrap();
        assert_relative_eq!(estimator.slope().unwrap()[[0, 0]], -0.7, epsilon = 1e-9);
    }

    #[test]
    fn test_short_window_is_insufficient() {
        let config = CurveConfig {
            attachment_age: Some(96.0),
            ..Default::default()
        };
        let mut estimator = CurveTail::curve(config).unwrap();
        let err = estimator.fit(&pattern(&exponential_factors(8))).unwrap_err();
        assert_eq!(
            err,
            TailError::Fit(FitError::InsufficientDataForCurveFit {
                required: 2,
                actual: 1
            })
        );
    }
}
