//! Pattern Array
//!
//! A labeled (key × origin × development age) array of development factors.
//! Keys are independent slices (lines of business, segments), origins are the
//! origin buckets of the triangle, and the last axis follows a
//! [`DevelopmentAxis`].
//!
//! Cumulative factors are read right to left from the incremental ones:
//! cdf[j] = ldf[j] * ldf[j+1] * ... * ldf[n-1]

use ndarray::{Array3, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::axis::DevelopmentAxis;
use crate::error::{PatternError, Result};

/// Whether an array holds link ratios or cumulative-to-ultimate factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Incremental development factors (`ldf_`)
    Incremental,
    /// Cumulative development factors (`cdf_`)
    Cumulative,
}

/// Development factors over (key × origin × age)
#[derive(Debug, Clone, PartialEq)]
pub struct PatternArray {
    kind: PatternKind,
    keys: Vec<String>,
    origins: Vec<String>,
    axis: DevelopmentAxis,
    values: Array3<f64>,
}

impl PatternArray {
    /// Create a pattern array.
    ///
    /// # Errors
    /// Returns [`PatternError::MalformedPatternArray`] if the shape of
    /// `values` disagrees with the labels and axis, or if any factor is
    /// non-finite or not strictly positive.
    pub fn new(
        kind: PatternKind,
        keys: Vec<String>,
        origins: Vec<String>,
        axis: DevelopmentAxis,
        values: Array3<f64>,
    ) -> Result<Self> {
        let expected = (keys.len(), origins.len(), axis.len());
        if values.dim() != expected {
            return Err(PatternError::MalformedPatternArray(format!(
                "values have shape {:?}, labels and axis imply {:?}",
                values.dim(),
                expected
            )));
        }
        if keys.is_empty() || origins.is_empty() {
            return Err(PatternError::MalformedPatternArray(
                "pattern needs at least one key and one origin".to_string(),
            ));
        }
        if let Some(((k, o, d), v)) = values
            .indexed_iter()
            .find(|(_, v)| !v.is_finite() || **v <= 0.0)
        {
            return Err(PatternError::MalformedPatternArray(format!(
                "factor {v} at key {k}, origin {o}, age {} is not a positive number",
                axis.age_at(d)
            )));
        }

        Ok(Self {
            kind,
            keys,
            origins,
            axis,
            values,
        })
    }

    /// Incremental pattern with a single key and origin
    pub fn from_ldf(axis: DevelopmentAxis, factors: &[f64]) -> Result<Self> {
        let values = Array3::from_shape_vec((1, 1, factors.len()), factors.to_vec())
            .map_err(|e| PatternError::MalformedPatternArray(e.to_string()))?;
        Self::new(
            PatternKind::Incremental,
            vec!["total".to_string()],
            vec!["all".to_string()],
            axis,
            values,
        )
    }

    /// Kind of factors held
    pub const fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Slice labels
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Origin labels
    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    /// Development axis of the last dimension
    pub const fn axis(&self) -> &DevelopmentAxis {
        &self.axis
    }

    /// Raw factors
    pub const fn values(&self) -> &Array3<f64> {
        &self.values
    }

    /// (keys, origins, ages)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.values.dim()
    }

    /// Factors of one (key, origin) row in age order
    pub fn row(&self, key: usize, origin: usize) -> ArrayView1<'_, f64> {
        self.values.index_axis(Axis(0), key).index_axis_move(Axis(0), origin)
    }

    /// Whether two arrays share keys, origins and axis
    pub fn is_aligned_with(&self, other: &Self) -> bool {
        self.keys == other.keys && self.origins == other.origins && self.axis == other.axis
    }

    /// Cumulative factors of an incremental pattern.
    ///
    /// # Errors
    /// Returns [`PatternError::MalformedPatternArray`] when called on a
    /// cumulative pattern.
    pub fn cdf(&self) -> Result<Self> {
        if self.kind != PatternKind::Incremental {
            return Err(PatternError::MalformedPatternArray(
                "cumulative factors can only be derived from incremental ones".to_string(),
            ));
        }

        let mut cdf = self.values.clone();
        for mut lane in cdf.lanes_mut(Axis(2)) {
            let mut running = 1.0;
            for v in lane.iter_mut().rev() {
                running *= *v;
                *v = running;
            }
        }

        Ok(Self {
            kind: PatternKind::Cumulative,
            keys: self.keys.clone(),
            origins: self.origins.clone(),
            axis: self.axis.clone(),
            values: cdf,
        })
    }
}
