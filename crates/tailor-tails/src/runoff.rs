//! Run-off splitting
//!
//! A tail factor collapses all development past the attachment into one
//! number. Downstream projections need it spread across valuation periods, so
//! every tail is emitted as a run of incremental factors: one column per
//! development period over the projection window past the edge, plus an open
//! `-Ult` column holding whatever development remains.
//!
//! A constant tail `T` is split geometrically in log space:
//!
//! ```text
//! w_i   = (1 - d) * d^i        for i < n - 1
//! w_n-1 = d^(n-1)              (open remainder of the series)
//! f_i   = T^(w_i)
//! ```
//!
//! The weights sum to one, so the product of the pieces is exactly `T`.
//! With `d = 1` there is no decay and each piece takes `T^(1/n)`.

use tailor_pattern::{Attachment, DevelopmentAxis};

use crate::error::{Result, TailError};

/// Default months projected past the edge before the `-Ult` column
pub const DEFAULT_PROJECTION_PERIOD: u32 = 12;

/// Lays tails out over run-off columns
#[derive(Debug, Clone, Copy)]
pub struct RunoffSplitter {
    projection_period: u32,
}

impl Default for RunoffSplitter {
    fn default() -> Self {
        Self {
            projection_period: DEFAULT_PROJECTION_PERIOD,
        }
    }
}

impl RunoffSplitter {
    /// Create a splitter projecting `projection_period` months past the edge.
    ///
    /// # Errors
    /// [`TailError::InvalidParameter`] for less than one valuation year.
    pub fn new(projection_period: u32) -> Result<Self> {
        if projection_period < DEFAULT_PROJECTION_PERIOD {
            return Err(TailError::InvalidParameter(format!(
                "projection_period must cover at least one valuation year, got {projection_period} months"
            )));
        }
        Ok(Self { projection_period })
    }

    /// Months projected past the edge
    pub const fn projection_period(&self) -> u32 {
        self.projection_period
    }

    /// Columns emitted past the edge for an axis
    pub const fn horizon(&self, axis: &DevelopmentAxis) -> usize {
        axis.grain().runoff_periods(self.projection_period)
    }

    /// Run-off column count from an attachment: replaced observed columns
    /// plus `horizon` columns past the edge.
    ///
    /// # Errors
    /// [`TailError::InvalidParameter`] when the count overflows.
    pub fn periods(
        attachment: &Attachment,
        axis: &DevelopmentAxis,
        horizon: usize,
    ) -> Result<usize> {
        axis.len()
            .saturating_sub(attachment.index)
            .checked_add(horizon)
            .ok_or_else(|| {
                TailError::InvalidParameter(format!(
                    "run-off horizon of {horizon} columns is too long"
                ))
            })
    }

    /// Axis of the tailed pattern: observed columns up to the attachment,
    /// then the run-off columns, the last one open-ended.
    ///
    /// # Errors
    /// [`TailError::InvalidParameter`] or a pattern error when the column
    /// count overflows.
    pub fn runoff_axis(
        attachment: &Attachment,
        axis: &DevelopmentAxis,
        horizon: usize,
    ) -> Result<DevelopmentAxis> {
        let periods = Self::periods(attachment, axis, horizon)?;
        Ok(axis.extend(attachment.index, periods)?)
    }
}

/// Log-space weights of each run-off piece; they sum to one
pub fn decay_weights(decay: f64, periods: usize) -> Vec<f64> {
    if periods == 0 {
        return Vec::new();
    }
    if decay >= 1.0 {
        return vec![1.0 / periods as f64; periods];
    }

    let mut weights: Vec<f64> = (0..periods - 1)
        .map(|i| (1.0 - decay) * decay.powi(i as i32))
        .collect();
    weights.push(decay.powi((periods - 1) as i32));
    weights
}

/// Split `tail` into `periods` incremental factors whose product is `tail`
pub fn split_tail(tail: f64, decay: f64, periods: usize) -> Vec<f64> {
    decay_weights(decay, periods)
        .into_iter()
        .map(|w| tail.powf(w))
        .collect()
}

/// Fit an explicit factor sequence into `periods` columns.
///
/// The first `periods - 1` factors are kept (padded with 1.0 when the
/// sequence is shorter) and the last column takes the product of everything
/// left over, so the product is preserved.
pub fn collapse(sequence: &[f64], periods: usize) -> Vec<f64> {
    if periods == 0 {
        return Vec::new();
    }

    let explicit = periods - 1;
    let mut factors: Vec<f64> = (0..explicit)
        .map(|i| sequence.get(i).copied().unwrap_or(1.0))
        .collect();
    factors.push(sequence.iter().skip(explicit).product());
    factors
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use tailor_pattern::{AttachmentResolver, Grain};

    fn axis(grain: Grain, n: usize) -> DevelopmentAxis {
        let step = f64::from(grain.months());
        DevelopmentAxis::new(grain, (1..=n).map(|i| step * i as f64).collect()).unwrap()
    }

    #[rstest]
    #[case(0.5, 2)]
    #[case(0.95, 5)]
    #[case(1.0, 13)]
    #[case(0.2, 1)]
    fn test_weights_sum_to_one(#[case] decay: f64, #[case] periods: usize) {
        let weights = decay_weights(decay, periods);
        assert_eq!(weights.len(), periods);
        assert_relative_eq!(weights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_explicit_shares_decay() {
        let weights = decay_weights(0.5, 5);
        for w in weights[..4].windows(2) {
            assert!(w[1] < w[0]);
        }
    }

    #[test]
    fn test_no_decay_is_constant_share() {
        let pieces = split_tail(1.21, 1.0, 2);
        assert_relative_eq!(pieces[0], 1.1, epsilon = 1e-12);
        assert_relative_eq!(pieces[1], 1.1, epsilon = 1e-12);
    }

    #[rstest]
    #[case(Grain::Annual, 2)]
    #[case(Grain::Quarterly, 5)]
    #[case(Grain::Monthly, 13)]
    fn test_runoff_axis_at_edge(#[case] grain: Grain, #[case] expected: usize) {
        let axis = axis(grain, 8);
        let attachment = AttachmentResolver::resolve(&axis, None).unwrap();
        let splitter = RunoffSplitter::default();
        let extended =
            RunoffSplitter::runoff_axis(&attachment, &axis, splitter.horizon(&axis)).unwrap();

        assert_eq!(extended.len(), 8 + expected);
        assert_eq!(extended.ages()[8], axis.edge());
        assert!(extended.is_open_ended());

        let pieces = split_tail(1.1, 0.5, extended.len() - attachment.index);
        assert_relative_eq!(pieces.iter().product::<f64>(), 1.1, epsilon = 1e-12);
    }

    #[test]
    fn test_runoff_before_edge_covers_replaced_columns() {
        let axis = axis(Grain::Annual, 9);
        let attachment = AttachmentResolver::resolve(&axis, Some(84.0)).unwrap();
        let periods = RunoffSplitter::periods(&attachment, &axis, 2).unwrap();
        let extended = RunoffSplitter::runoff_axis(&attachment, &axis, 2).unwrap();

        assert_eq!(periods, 5);
        assert_eq!(&extended.ages()[attachment.index..], &[84.0, 96.0, 108.0, 120.0, 132.0]);
    }

    #[test]
    fn test_overflowing_horizon_is_an_error() {
        let axis = axis(Grain::Annual, 9);
        let attachment = AttachmentResolver::resolve(&axis, Some(84.0)).unwrap();
        assert!(matches!(
            RunoffSplitter::periods(&attachment, &axis, usize::MAX),
            Err(TailError::InvalidParameter(_))
        ));

        let edge = AttachmentResolver::resolve(&axis, None).unwrap();
        assert!(RunoffSplitter::runoff_axis(&edge, &axis, usize::MAX).is_err());
    }

    #[test]
    fn test_longer_projection() {
        let splitter = RunoffSplitter::new(24).unwrap();
        assert_eq!(splitter.horizon(&axis(Grain::Annual, 3)), 3);
        assert!(RunoffSplitter::new(6).is_err());
    }

    #[test]
    fn test_collapse_preserves_product() {
        let sequence = [1.2, 1.1, 1.05, 1.02, 1.01];
        let collapsed = collapse(&sequence, 3);
        assert_eq!(collapsed.len(), 3);
        assert_eq!(&collapsed[..2], &[1.2, 1.1]);
        assert_relative_eq!(collapsed[2], 1.05 * 1.02 * 1.01, epsilon = 1e-12);

        let padded = collapse(&[1.3], 3);
        assert_eq!(padded, vec![1.3, 1.0, 1.0]);
    }
}
