//! Generalized Bondy Tail
//!
//! Fits `f(t+1) = f(t)^B` to the link ratios from `earliest_age` to the edge
//! and takes the closed-form infinite product past the attachment.

use ndarray::{Array2, s};
use serde::{Deserialize, Serialize};
use tailor_fit::{BondyFit, BondySolver};

use crate::error::{Result, TailError};
use crate::estimator::{RowContext, RowTail, TailEstimator, TailStrategy};
use crate::runoff::{DEFAULT_PROJECTION_PERIOD, RunoffSplitter};

const fn default_projection_period() -> u32 {
    DEFAULT_PROJECTION_PERIOD
}

/// Configuration for the Generalized Bondy tail
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BondyConfig {
    /// First development age used in the fit; must be an observed column
    pub earliest_age: f64,
    /// Attachment age; `None` attaches at the edge
    #[serde(default)]
    pub attachment_age: Option<f64>,
    /// Months projected past the edge (default: 12)
    #[serde(default = "default_projection_period")]
    pub projection_period: u32,
}

impl BondyConfig {
    /// Configuration fitting from `earliest_age`, attaching at the edge
    pub const fn new(earliest_age: f64) -> Self {
        Self {
            earliest_age,
            attachment_age: None,
            projection_period: DEFAULT_PROJECTION_PERIOD,
        }
    }
}

/// Generalized Bondy strategy
#[derive(Debug, Clone, Copy)]
pub struct Bondy {
    config: BondyConfig,
    splitter: RunoffSplitter,
}

impl Bondy {
    /// Create a Bondy strategy.
    ///
    /// # Errors
    /// [`TailError::InvalidParameter`] for a non-positive earliest age or a
    /// projection period under one year.
    pub fn new(config: BondyConfig) -> Result<Self> {
        if !(config.earliest_age.is_finite() && config.earliest_age > 0.0) {
            return Err(TailError::InvalidParameter(format!(
                "earliest_age must be a positive age, got {}",
                config.earliest_age
            )));
        }
        let splitter = RunoffSplitter::new(config.projection_period)?;
        Ok(Self { config, splitter })
    }

    /// Strategy configuration
    pub const fn config(&self) -> &BondyConfig {
        &self.config
    }
}

/// Fitted Bondy tail of one row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondyRow {
    fit: BondyFit,
    /// Periods from the earliest age to the attachment
    steps: usize,
    tail: f64,
}

impl BondyRow {
    /// Fitted Bondy parameters
    pub const fn fit(&self) -> &BondyFit {
        &self.fit
    }
}

impl RowTail for BondyRow {
    fn tail(&self) -> f64 {
        self.tail
    }

    fn runoff(&self, ages: &[f64]) -> Result<Vec<f64>> {
        let Some(last) = ages.len().checked_sub(1) else {
            return Ok(Vec::new());
        };
        let mut factors: Vec<f64> = (0..last)
            .map(|i| self.fit.fitted_ldf(self.steps + i))
            .collect();
        factors.push(self.fit.tail_from(self.steps + last));
        Ok(factors)
    }
}

impl TailStrategy for Bondy {
    type Row = BondyRow;

    fn name(&self) -> &'static str {
        "bondy"
    }

    fn attachment_age(&self) -> Option<f64> {
        self.config.attachment_age
    }

    fn splitter(&self) -> RunoffSplitter {
        self.splitter
    }

    fn fit_row(&self, row: &RowContext<'_>) -> Result<BondyRow> {
        let earliest = row.axis.position(self.config.earliest_age).ok_or_else(|| {
            TailError::InvalidParameter(format!(
                "earliest_age {} is not an observed development age",
                self.config.earliest_age
            ))
        })?;
        let steps = row.attachment.index.checked_sub(earliest).ok_or_else(|| {
            TailError::InvalidParameter(format!(
                "earliest_age {} is after the attachment age {}",
                self.config.earliest_age, row.attachment.age
            ))
        })?;

        let fit = BondySolver::fit(row.factors.slice(s![earliest..]))?;
        let tail = match steps {
            0 => fit.tail_from(0),
            _ => BondySolver::tail(fit.b, fit.fitted_ldf(steps - 1))?,
        };

        Ok(BondyRow { fit, steps, tail })
    }
}

/// Generalized Bondy tail estimator
pub type BondyTail = TailEstimator<Bondy>;

impl BondyTail {
    /// Bondy tail estimator from a configuration
    pub fn bondy(config: BondyConfig) -> Result<Self> {
        Ok(Self::new(Bondy::new(config)?))
    }

    /// Bondy exponent per (key, origin)
    pub fn b(&self) -> Result<Array2<f64>> {
        Ok(self.fitted()?.map_rows(|row| row.fit.b))
    }

    /// Fitted link ratio at the earliest age per (key, origin)
    pub fn earliest_ldf(&self) -> Result<Array2<f64>> {
        Ok(self.fitted()?.map_rows(|row| row.fit.earliest_ldf))
    }
}
