//! Tail Estimator
//!
//! Shared fit/transform lifecycle of every tail method. A [`TailStrategy`]
//! supplies the method-specific parameter estimation; the estimator owns
//! attachment resolution, row bookkeeping and the layout of the enlarged
//! pattern.
//!
//! ```text
//! Unfit --fit--> Fitting --ok--> Fitted --fit--> Fitting ...
//!                        \--err--> previous state
//! ```
//!
//! Fitted parameters live in an [`Arc`] snapshot. A successful fit swaps the
//! snapshot and never touches one already handed out; a failed fit leaves
//! the estimator exactly as it was.

use std::fmt;
use std::sync::Arc;

use ndarray::{Array2, Array3, ArrayView1, s};
use rayon::prelude::*;
use tailor_fit::GrowthCurve;
use tailor_pattern::{
    Attachment, AttachmentResolver, DevelopmentAxis, PatternArray, PatternError, PatternKind,
};
use tracing::{debug, trace};

use crate::error::{Result, TailError};
use crate::runoff::RunoffSplitter;
use crate::source::DevelopmentSource;

/// Fitted tail of one (key, origin) row
pub trait RowTail: fmt::Debug + Clone + Send + Sync {
    /// Cumulative factor at the attachment age
    fn tail(&self) -> f64;

    /// Incremental factors for run-off columns starting at `ages`.
    ///
    /// The last column develops to ultimate and the product of the result is
    /// [`RowTail::tail`].
    fn runoff(&self, ages: &[f64]) -> Result<Vec<f64>>;
}

/// Everything a strategy sees when fitting one row
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    /// Key index
    pub key: usize,
    /// Origin index
    pub origin: usize,
    /// Observed link ratios of the row
    pub factors: ArrayView1<'a, f64>,
    /// Axis of the observed pattern
    pub axis: &'a DevelopmentAxis,
    /// Resolved attachment
    pub attachment: Attachment,
    /// Upstream growth curve of the key, if any
    pub growth_curve: Option<&'a GrowthCurve>,
}

/// Method-specific half of a tail estimator
pub trait TailStrategy: fmt::Debug + Send + Sync {
    /// Per-row fitted state
    type Row: RowTail;

    /// Short method name used in logs
    fn name(&self) -> &'static str;

    /// Requested attachment age; `None` attaches at the edge
    fn attachment_age(&self) -> Option<f64>;

    /// Splitter laying the tail out past the edge
    fn splitter(&self) -> RunoffSplitter;

    /// Columns emitted past the edge
    fn horizon(&self, axis: &DevelopmentAxis) -> Result<usize> {
        Ok(self.splitter().horizon(axis))
    }

    /// Checks against the whole source before any row is fit
    fn prepare(&self, source: &dyn DevelopmentSource, attachment: &Attachment) -> Result<()> {
        let _ = (source, attachment);
        Ok(())
    }

    /// Fit one row
    fn fit_row(&self, row: &RowContext<'_>) -> Result<Self::Row>;
}

/// Parameters estimated by `fit`
#[derive(Debug, Clone)]
pub struct FittedTail<R> {
    attachment: Attachment,
    keys: Vec<String>,
    origins: Vec<String>,
    axis: DevelopmentAxis,
    runoff_axis: DevelopmentAxis,
    rows: Vec<R>,
    tail: Array2<f64>,
}

impl<R: RowTail> FittedTail<R> {
    /// Where the tail attaches
    pub const fn attachment(&self) -> &Attachment {
        &self.attachment
    }

    /// Axis of the pattern the tail was fit on
    pub const fn axis(&self) -> &DevelopmentAxis {
        &self.axis
    }

    /// Axis of the tailed pattern `transform` emits
    pub const fn runoff_axis(&self) -> &DevelopmentAxis {
        &self.runoff_axis
    }

    /// Cumulative factor at the attachment, per (key, origin)
    pub const fn tail(&self) -> &Array2<f64> {
        &self.tail
    }

    /// Fitted state of one row
    pub fn row(&self, key: usize, origin: usize) -> &R {
        &self.rows[key * self.origins.len() + origin]
    }

    /// Map every row to a (key × origin) diagnostic array
    pub fn map_rows<F>(&self, f: F) -> Array2<f64>
    where
        F: Fn(&R) -> f64,
    {
        Array2::from_shape_fn((self.keys.len(), self.origins.len()), |(k, o)| {
            f(self.row(k, o))
        })
    }

    fn matches(&self, ldf: &PatternArray) -> bool {
        ldf.keys() == self.keys && ldf.origins() == self.origins && *ldf.axis() == self.axis
    }
}

/// Pattern enlarged with a tail
#[derive(Debug, Clone, PartialEq)]
pub struct TailedPattern {
    /// Incremental factors including the run-off columns
    pub ldf: PatternArray,
    /// Cumulative factors of `ldf`
    pub cdf: PatternArray,
    /// Cumulative factor at the attachment, per (key, origin)
    pub tail: Array2<f64>,
    /// Where the tail attaches
    pub attachment: Attachment,
}

/// Lifecycle state of an estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStatus {
    /// No successful fit
    Unfit,
    /// Parameters available
    Fitted,
}

/// Tail estimator composed from a method strategy
#[derive(Debug)]
pub struct TailEstimator<S: TailStrategy> {
    strategy: S,
    fitted: Option<Arc<FittedTail<S::Row>>>,
}

impl<S: TailStrategy> TailEstimator<S> {
    /// Create an unfit estimator
    pub const fn new(strategy: S) -> Self {
        Self {
            strategy,
            fitted: None,
        }
    }

    /// Method strategy and its configuration
    pub const fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Current lifecycle state
    pub const fn status(&self) -> FitStatus {
        if self.fitted.is_some() {
            FitStatus::Fitted
        } else {
            FitStatus::Unfit
        }
    }

    /// Estimate tail parameters from an upstream pattern.
    ///
    /// Rows are independent and fit in parallel. The new snapshot replaces
    /// the current one only when every row fits; on error the estimator
    /// keeps its previous state.
    pub fn fit<D>(&mut self, source: &D) -> Result<()>
    where
        D: DevelopmentSource + ?Sized,
    {
        let fitted = self.estimate(source)?;
        self.fitted = Some(Arc::new(fitted));
        Ok(())
    }

    fn estimate<D>(&self, source: &D) -> Result<FittedTail<S::Row>>
    where
        D: DevelopmentSource + ?Sized,
    {
        let ldf = source.ldf();
        let curves = source.growth_curves();
        if ldf.kind() != PatternKind::Incremental {
            return Err(PatternError::MalformedPatternArray(
                "tails are fit on incremental factors".to_string(),
            )
            .into());
        }

        let axis = ldf.axis();
        let attachment = AttachmentResolver::resolve(axis, self.strategy.attachment_age())?;
        let runoff_axis =
            RunoffSplitter::runoff_axis(&attachment, axis, self.strategy.horizon(axis)?)?;
        let (n_keys, n_origins, _) = ldf.dim();

        debug!(
            method = self.strategy.name(),
            keys = n_keys,
            origins = n_origins,
            ages = axis.len(),
            attachment_age = attachment.age,
            "fitting tail"
        );

        self.strategy.prepare(&DynSource(source), &attachment)?;

        let rows = (0..n_keys * n_origins)
            .into_par_iter()
            .map(|i| {
                let (key, origin) = (i / n_origins, i % n_origins);
                let row = self.strategy.fit_row(&RowContext {
                    key,
                    origin,
                    factors: ldf.row(key, origin),
                    axis,
                    attachment,
                    growth_curve: curves.and_then(|c| c.get(key)),
                })?;
                trace!(key, origin, tail = row.tail(), "fitted row");
                Ok(row)
            })
            .collect::<Result<Vec<_>>>()?;

        let tail = Array2::from_shape_fn((n_keys, n_origins), |(k, o)| {
            rows[k * n_origins + o].tail()
        });

        Ok(FittedTail {
            attachment,
            keys: ldf.keys().to_vec(),
            origins: ldf.origins().to_vec(),
            axis: axis.clone(),
            runoff_axis,
            rows,
            tail,
        })
    }

    /// Snapshot of the fitted parameters
    pub fn fitted(&self) -> Result<Arc<FittedTail<S::Row>>> {
        self.fitted.clone().ok_or(TailError::NotFitted)
    }

    /// Cumulative factor at the attachment, per (key, origin)
    pub fn tail(&self) -> Result<Array2<f64>> {
        Ok(self.fitted()?.tail().clone())
    }

    /// Write the tail onto a pattern.
    ///
    /// Columns before the attachment are copied from `source`; the run-off
    /// columns follow. Pure: the same input always gives the same output.
    pub fn transform<D>(&self, source: &D) -> Result<TailedPattern>
    where
        D: DevelopmentSource + ?Sized,
    {
        let fitted = self.fitted.as_deref().ok_or(TailError::NotFitted)?;
        let ldf = source.ldf();
        if ldf.kind() != PatternKind::Incremental || !fitted.matches(ldf) {
            return Err(PatternError::MalformedPatternArray(
                "pattern does not match the keys, origins and axis the tail was fit on"
                    .to_string(),
            )
            .into());
        }

        let attachment = fitted.attachment;
        let extended = fitted.runoff_axis.clone();
        let runoff_ages = &extended.ages()[attachment.index..];

        let (n_keys, n_origins, _) = ldf.dim();
        let mut values = Array3::<f64>::zeros((n_keys, n_origins, extended.len()));
        for k in 0..n_keys {
            for o in 0..n_origins {
                let runoff = fitted.row(k, o).runoff(runoff_ages)?;
                let mut lane = values.slice_mut(s![k, o, ..]);
                lane.slice_mut(s![..attachment.index])
                    .assign(&ldf.row(k, o).slice(s![..attachment.index]));
                lane.slice_mut(s![attachment.index..])
                    .assign(&ArrayView1::from(runoff.as_slice()));
            }
        }

        debug!(
            method = self.strategy.name(),
            periods = runoff_ages.len(),
            ages = extended.len(),
            "applied tail"
        );

        let out = PatternArray::new(
            PatternKind::Incremental,
            ldf.keys().to_vec(),
            ldf.origins().to_vec(),
            extended,
            values,
        )?;
        let cdf = out.cdf()?;

        Ok(TailedPattern {
            ldf: out,
            cdf,
            tail: fitted.tail.clone(),
            attachment,
        })
    }

    /// `fit` followed by `transform` on the same source
    pub fn fit_transform<D>(&mut self, source: &D) -> Result<TailedPattern>
    where
        D: DevelopmentSource + ?Sized,
    {
        self.fit(source)?;
        self.transform(source)
    }
}

/// Adapter handing a possibly unsized source to strategies as a trait object
struct DynSource<'a, D: ?Sized>(&'a D);

impl<D: DevelopmentSource + ?Sized> DevelopmentSource for DynSource<'_, D> {
    fn ldf(&self) -> &PatternArray {
        self.0.ldf()
    }

    fn growth_curves(&self) -> Option<&[GrowthCurve]> {
        self.0.growth_curves()
    }
}
