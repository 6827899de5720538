//! Clark Growth-Curve Tail
//!
//! Continues the growth curve fitted upstream past the edge. The tail at the
//! attachment is `G(T) / G(attachment_age)`, with `T` the optional
//! truncation age. Run-off columns are the curve's own link ratios; with a
//! truncation age enough columns are emitted to reach it.

use serde::{Deserialize, Serialize};
use tailor_fit::{ClarkContinuation, GrowthCurve, truncation_horizon};
use tailor_pattern::{Attachment, DevelopmentAxis};

use crate::error::{Result, TailError};
use crate::estimator::{RowContext, RowTail, TailEstimator, TailStrategy};
use crate::runoff::{DEFAULT_PROJECTION_PERIOD, RunoffSplitter};
use crate::source::DevelopmentSource;

/// Configuration for the Clark tail
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClarkConfig {
    /// Age past which no development is recognised; `None` develops to
    /// infinity
    pub truncation_age: Option<f64>,
    /// Attachment age; `None` attaches at the edge
    pub attachment_age: Option<f64>,
    /// Months projected past the edge (default: 12)
    pub projection_period: u32,
}

impl Default for ClarkConfig {
    fn default() -> Self {
        Self {
            truncation_age: None,
            attachment_age: None,
            projection_period: DEFAULT_PROJECTION_PERIOD,
        }
    }
}

/// Clark growth-curve strategy
#[derive(Debug, Clone, Copy)]
pub struct Clark {
    config: ClarkConfig,
    splitter: RunoffSplitter,
}

impl Clark {
    /// Create a Clark strategy.
    ///
    /// # Errors
    /// [`TailError::InvalidParameter`] for a non-positive truncation age or
    /// a projection period under one year. Truncation ages inside the
    /// triangle, or too far past it to lay out as run-off columns, are
    /// rejected at fit time.
    pub fn new(config: ClarkConfig) -> Result<Self> {
        if let Some(t) = config.truncation_age
            && !(t.is_finite() && t > 0.0)
        {
            return Err(TailError::InvalidParameter(format!(
                "truncation_age must be a positive age, got {t}"
            )));
        }
        let splitter = RunoffSplitter::new(config.projection_period)?;
        Ok(Self { config, splitter })
    }

    /// Strategy configuration
    pub const fn config(&self) -> &ClarkConfig {
        &self.config
    }
}

/// Clark tail of one row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClarkRow {
    curve: GrowthCurve,
    truncation: Option<f64>,
    edge: f64,
    tail: f64,
}

impl ClarkRow {
    /// Growth curve of the row's key
    pub const fn curve(&self) -> &GrowthCurve {
        &self.curve
    }
}

impl RowTail for ClarkRow {
    fn tail(&self) -> f64 {
        self.tail
    }

    fn runoff(&self, ages: &[f64]) -> Result<Vec<f64>> {
        let continuation = ClarkContinuation::new(&self.curve, self.truncation, self.edge)?;
        Ok(continuation.continuation(ages)?)
    }
}

impl TailStrategy for Clark {
    type Row = ClarkRow;

    fn name(&self) -> &'static str {
        "clark"
    }

    fn attachment_age(&self) -> Option<f64> {
        self.config.attachment_age
    }

    fn splitter(&self) -> RunoffSplitter {
        self.splitter
    }

    fn horizon(&self, axis: &DevelopmentAxis) -> Result<usize> {
        Ok(truncation_horizon(
            self.config.truncation_age,
            axis.edge(),
            axis.step(),
            self.splitter.horizon(axis),
        )?)
    }

    fn prepare(&self, source: &dyn DevelopmentSource, _attachment: &Attachment) -> Result<()> {
        let keys = source.ldf().keys().len();
        match source.growth_curves() {
            None => Err(TailError::MissingGrowthCurve(
                "upstream development has no fitted growth curve".to_string(),
            )),
            Some(curves) if curves.len() != keys => Err(TailError::MissingGrowthCurve(format!(
                "{} growth curves for {keys} keys",
                curves.len()
            ))),
            Some(_) => Ok(()),
        }
    }

    fn fit_row(&self, row: &RowContext<'_>) -> Result<ClarkRow> {
        let curve = row.growth_curve.copied().ok_or_else(|| {
            TailError::MissingGrowthCurve(format!("no growth curve for key {}", row.key))
        })?;
        let edge = row.axis.edge();
        let truncation = self.config.truncation_age;
        let tail = ClarkContinuation::new(&curve, truncation, edge)?.tail_factor(row.attachment.age)?;

        Ok(ClarkRow {
            curve,
            truncation,
            edge,
            tail,
        })
    }
}

/// Clark growth-curve tail estimator
pub type ClarkTail = TailEstimator<Clark>;

impl ClarkTail {
    /// Clark tail estimator from a configuration
    pub fn clark(config: ClarkConfig) -> Result<Self> {
        Ok(Self::new(Clark::new(config)?))
    }
}
