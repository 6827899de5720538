//! Constant Tail
//!
//! A user-supplied tail factor applied uniformly to every row and split
//! geometrically across the run-off columns with a decay rate.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TailError};
use crate::estimator::{RowContext, RowTail, TailEstimator, TailStrategy};
use crate::runoff::{DEFAULT_PROJECTION_PERIOD, RunoffSplitter, split_tail};

/// Configuration for the constant tail
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantConfig {
    /// Cumulative tail factor at the attachment age (default: 1.0)
    pub tail: f64,
    /// Share retained by each successive run-off column, in (0, 1]
    /// (default: 0.5)
    pub decay: f64,
    /// Attachment age; `None` attaches at the edge
    pub attachment_age: Option<f64>,
    /// Months projected past the edge (default: 12)
    pub projection_period: u32,
}

impl Default for ConstantConfig {
    fn default() -> Self {
        Self {
            tail: 1.0,
            decay: 0.5,
            attachment_age: None,
            projection_period: DEFAULT_PROJECTION_PERIOD,
        }
    }
}

/// Constant tail strategy
#[derive(Debug, Clone, Copy)]
pub struct Constant {
    config: ConstantConfig,
    splitter: RunoffSplitter,
}

impl Constant {
    /// Create a constant tail strategy.
    ///
    /// # Errors
    /// [`TailError::InvalidParameter`] for a non-positive tail, a decay
    /// outside (0, 1] or a projection period under one year.
    pub fn new(config: ConstantConfig) -> Result<Self> {
        if !(config.tail.is_finite() && config.tail > 0.0) {
            return Err(TailError::InvalidParameter(format!(
                "tail must be positive and finite, got {}",
                config.tail
            )));
        }
        if !(config.decay > 0.0 && config.decay <= 1.0) {
            return Err(TailError::InvalidParameter(format!(
                "decay must be in (0, 1], got {}",
                config.decay
            )));
        }
        let splitter = RunoffSplitter::new(config.projection_period)?;
        Ok(Self { config, splitter })
    }

    /// Strategy configuration
    pub const fn config(&self) -> &ConstantConfig {
        &self.config
    }
}

/// Constant tail of one row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantRow {
    tail: f64,
    decay: f64,
}

impl RowTail for ConstantRow {
    fn tail(&self) -> f64 {
        self.tail
    }

    fn runoff(&self, ages: &[f64]) -> Result<Vec<f64>> {
        Ok(split_tail(self.tail, self.decay, ages.len()))
    }
}

impl TailStrategy for Constant {
    type Row = ConstantRow;

    fn name(&self) -> &'static str {
        "constant"
    }

    fn attachment_age(&self) -> Option<f64> {
        self.config.attachment_age
    }

    fn splitter(&self) -> RunoffSplitter {
        self.splitter
    }

    fn fit_row(&self, _row: &RowContext<'_>) -> Result<ConstantRow> {
        Ok(ConstantRow {
            tail: self.config.tail,
            decay: self.config.decay,
        })
    }
}

/// Constant tail estimator
pub type ConstantTail = TailEstimator<Constant>;

impl ConstantTail {
    /// Constant tail estimator from a configuration
    pub fn constant(config: ConstantConfig) -> Result<Self> {
        Ok(Self::new(Constant::new(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use tailor_pattern::{DevelopmentAxis, Grain, PatternArray};

    fn pattern() -> PatternArray {
        let axis =
            DevelopmentAxis::new(Grain::Annual, (1..=5).map(|i| f64::from(i * 12)).collect())
                .unwrap();
        PatternArray::from_ldf(axis, &[2.0, 1.4, 1.2, 1.1, 1.05]).unwrap()
    }

    #[rstest]
    #[case(0.0, 0.5)]
    #[case(-1.1, 0.5)]
    #[case(f64::INFINITY, 0.5)]
    #[case(1.05, 0.0)]
    #[case(1.05, 1.2)]
    #[case(1.05, f64::NAN)]
    fn test_rejects_invalid_config(#[case] tail: f64, #[case] decay: f64) {
        let config = ConstantConfig {
            tail,
            decay,
            ..Default::default()
        };
        assert!(matches!(
            Constant::new(config),
            Err(TailError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_default_tail_is_unity() {
        let mut estimator = ConstantTail::constant(ConstantConfig::default()).unwrap();
        let out = estimator.fit_transform(&pattern()).unwrap();

        assert_eq!(out.ldf.axis().len(), 7);
        assert!(
            out.ldf.values().iter().skip(5).all(|&f| f == 1.0),
            "unit tail leaves run-off flat"
        );
        assert_relative_eq!(out.cdf.values()[[0, 0, 5]], 1.0);
    }

    #[test]
    fn test_attach_before_edge_replaces_observed_columns() {
        let config = ConstantConfig {
            tail: 1.3,
            decay: 0.8,
            attachment_age: Some(36.0),
            ..Default::default()
        };
        let mut estimator = ConstantTail::constant(config).unwrap();
        let out = estimator.fit_transform(&pattern()).unwrap();

        let row = out.ldf.row(0, 0);
        assert_eq!(row.len(), 2 + 3 + 2);
        assert_eq!(row[0], 2.0);
        assert_eq!(row[1], 1.4);
        let runoff: f64 = row.iter().skip(2).product();
        assert_relative_eq!(runoff, 1.3, epsilon = 1e-12);
        assert_relative_eq!(out.cdf.values()[[0, 0, 2]], 1.3, epsilon = 1e-12);
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: ConstantConfig = serde_json::from_str(r#"{"tail": 1.05}"#).unwrap();
        assert_eq!(config.decay, 0.5);
        assert_eq!(config.projection_period, 12);
        assert!(config.attachment_age.is_none());
    }
}
