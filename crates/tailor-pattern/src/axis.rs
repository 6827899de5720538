//! Development Axis
//!
//! The ordered development ages of a pattern. Each age is the *from*-age of a
//! link-ratio column, so an axis of `[12, 24, ..., 108]` describes the links
//! `12-24` through `108-120`. The age one step past the last column is the
//! edge of the observed triangle:
//!
//! ```text
//! ages:   12    24    36   ...   108  | 120 (edge)
//! links: 12-24 24-36 36-48 ... 108-120 |
//! ```
//!
//! Once a tail has been attached the last column develops to ultimate and the
//! axis is flagged as open-ended (`144-Ult`).

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::{PatternError, Result};

/// Tolerance used when comparing ages
pub const AGE_TOLERANCE: f64 = 1e-9;

/// Time unit of development ages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grain {
    /// Yearly development periods
    #[display("annual")]
    Annual,
    /// Quarterly development periods
    #[display("quarterly")]
    Quarterly,
    /// Monthly development periods
    #[display("monthly")]
    Monthly,
}

impl Grain {
    /// Months spanned by one development period
    pub const fn months(self) -> u32 {
        match self {
            Self::Annual => 12,
            Self::Quarterly => 3,
            Self::Monthly => 1,
        }
    }

    /// Development periods per valuation year
    pub const fn periods_per_year(self) -> usize {
        match self {
            Self::Annual => 1,
            Self::Quarterly => 4,
            Self::Monthly => 12,
        }
    }

    /// Number of columns emitted beyond the edge for a projection window.
    ///
    /// One column per development period in `projection_months` plus the
    /// open `-Ult` bucket. With the default 12 months this is 2/5/13 for
    /// annual/quarterly/monthly.
    pub const fn runoff_periods(self, projection_months: u32) -> usize {
        (projection_months / self.months()) as usize + 1
    }

    /// Infer the grain from a development step in months
    pub fn from_step(step: f64) -> Option<Self> {
        [Self::Annual, Self::Quarterly, Self::Monthly]
            .into_iter()
            .find(|g| (f64::from(g.months()) - step).abs() < AGE_TOLERANCE)
    }
}

/// Ordered development ages of a pattern.
///
/// Consecutive ages are exactly one grain step apart. Deserialization goes
/// through the same checks as [`DevelopmentAxis::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAxis")]
pub struct DevelopmentAxis {
    grain: Grain,
    ages: Vec<f64>,
    open_ended: bool,
}

/// Unchecked wire form of a [`DevelopmentAxis`]
#[derive(Deserialize)]
struct RawAxis {
    grain: Grain,
    ages: Vec<f64>,
    #[serde(default)]
    open_ended: bool,
}

impl TryFrom<RawAxis> for DevelopmentAxis {
    type Error = PatternError;

    fn try_from(raw: RawAxis) -> Result<Self> {
        Self::build(raw.grain, raw.ages, raw.open_ended)
    }
}

impl DevelopmentAxis {
    /// Create a closed axis (no tail yet) from the from-ages of each column.
    ///
    /// # Errors
    /// Returns [`PatternError::MalformedPatternArray`] if the ages are empty,
    /// non-finite, not strictly increasing or not spaced by the grain's
    /// months.
    pub fn new(grain: Grain, ages: Vec<f64>) -> Result<Self> {
        Self::build(grain, ages, false)
    }

    /// Create a closed axis, inferring the grain from the development step.
    ///
    /// A single age is assumed to be annual.
    pub fn from_ages(ages: Vec<f64>) -> Result<Self> {
        let grain = match ages.as_slice() {
            [.., a, b] => Grain::from_step(b - a).ok_or_else(|| {
                PatternError::MalformedPatternArray(format!(
                    "cannot infer grain from development step {}",
                    b - a
                ))
            })?,
            _ => Grain::Annual,
        };
        Self::new(grain, ages)
    }

    fn build(grain: Grain, ages: Vec<f64>, open_ended: bool) -> Result<Self> {
        if ages.is_empty() {
            return Err(PatternError::MalformedPatternArray(
                "development axis has no ages".to_string(),
            ));
        }
        if let Some(bad) = ages.iter().find(|a| !a.is_finite()) {
            return Err(PatternError::MalformedPatternArray(format!(
                "development age {bad} is not finite"
            )));
        }
        if let Some(w) = ages.windows(2).find(|w| w[1] <= w[0]) {
            return Err(PatternError::MalformedPatternArray(format!(
                "development ages must be strictly increasing ({} then {})",
                w[0], w[1]
            )));
        }

        let step = f64::from(grain.months());
        if let Some(w) = ages
            .windows(2)
            .find(|w| (w[1] - w[0] - step).abs() > AGE_TOLERANCE)
        {
            return Err(PatternError::MalformedPatternArray(format!(
                "development ages {} and {} are not one {grain} step ({step} months) apart",
                w[0], w[1]
            )));
        }

        Ok(Self {
            grain,
            ages,
            open_ended,
        })
    }

    /// Grain of the axis
    pub const fn grain(&self) -> Grain {
        self.grain
    }

    /// From-ages of every column
    pub fn ages(&self) -> &[f64] {
        &self.ages
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.ages.len()
    }

    /// Always false; construction rejects empty axes
    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }

    /// Development step between consecutive ages, in months
    pub fn step(&self) -> f64 {
        f64::from(self.grain.months())
    }

    /// Whether the last column develops to ultimate
    pub const fn is_open_ended(&self) -> bool {
        self.open_ended
    }

    /// Oldest observed valuation age (one step past the last column)
    pub fn edge(&self) -> f64 {
        self.ages[self.ages.len() - 1] + self.step()
    }

    /// Age at a column index; the index one past the end is the edge
    pub fn age_at(&self, index: usize) -> f64 {
        if index < self.ages.len() {
            self.ages[index]
        } else {
            self.edge() + self.step() * (index - self.ages.len()) as f64
        }
    }

    /// Column index of an age on the axis (exact match)
    pub fn position(&self, age: f64) -> Option<usize> {
        self.ages
            .iter()
            .position(|a| (a - age).abs() < AGE_TOLERANCE)
    }

    /// Column labels such as `"12-24"`; an open last column reads `"144-Ult"`
    pub fn labels(&self) -> Vec<String> {
        let n = self.ages.len();
        (0..n)
            .map(|i| {
                if self.open_ended && i == n - 1 {
                    format!("{}-Ult", self.ages[i])
                } else {
                    format!("{}-{}", self.ages[i], self.age_at(i + 1))
                }
            })
            .collect()
    }

    /// Axis of an enlarged pattern.
    ///
    /// Columns before `attach_index` are kept; `periods` columns starting at
    /// the attachment age follow, spaced by the development step. The last
    /// column is open-ended.
    ///
    /// # Errors
    /// [`PatternError::MalformedPatternArray`] when the column count
    /// overflows or leaves no columns.
    pub fn extend(&self, attach_index: usize, periods: usize) -> Result<Self> {
        let len = attach_index
            .checked_add(periods)
            .filter(|&len| len > 0)
            .ok_or_else(|| {
                PatternError::MalformedPatternArray(format!(
                    "cannot extend axis by {periods} columns from column {attach_index}"
                ))
            })?;

        Ok(Self {
            grain: self.grain,
            ages: (0..len).map(|i| self.age_at(i)).collect(),
            open_ended: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn annual() -> DevelopmentAxis {
        DevelopmentAxis::new(Grain::Annual, (1..=9).map(|i| f64::from(i * 12)).collect()).unwrap()
    }

    #[rstest]
    #[case(Grain::Annual, 2)]
    #[case(Grain::Quarterly, 5)]
    #[case(Grain::Monthly, 13)]
    fn test_default_runoff_periods(#[case] grain: Grain, #[case] expected: usize) {
        assert_eq!(grain.runoff_periods(12), expected);
    }

    #[test]
    fn test_grain_display() {
        assert_eq!(Grain::Quarterly.to_string(), "quarterly");
    }

    #[test]
    fn test_edge_and_step() {
        let axis = annual();
        assert_eq!(axis.step(), 12.0);
        assert_eq!(axis.edge(), 120.0);
        assert_eq!(axis.age_at(9), 120.0);
        assert_eq!(axis.age_at(11), 144.0);
    }

    #[test]
    fn test_labels() {
        let labels = annual().labels();
        assert_eq!(labels.first().map(String::as_str), Some("12-24"));
        assert_eq!(labels.last().map(String::as_str), Some("108-120"));

        let extended = annual().extend(9, 2).unwrap();
        let labels = extended.labels();
        assert_eq!(labels.len(), 11);
        assert_eq!(labels[9], "120-132");
        assert_eq!(labels[10], "132-Ult");
    }

    #[test]
    fn test_extend_replaces_from_attachment() {
        let extended = annual().extend(7, 4).unwrap();
        assert!(extended.is_open_ended());
        assert_eq!(extended.ages(), &[12.0, 24.0, 36.0, 48.0, 60.0, 72.0, 84.0, 96.0, 108.0, 120.0, 132.0]);
    }

    #[test]
    fn test_extend_rejects_overflowing_column_count() {
        assert!(annual().extend(usize::MAX, 1).is_err());
        assert!(annual().extend(0, 0).is_err());
    }

    #[rstest]
    #[case(Grain::Annual, vec![3.0, 6.0, 9.0, 12.0])]
    #[case(Grain::Annual, vec![1.0, 2.0, 3.0])]
    #[case(Grain::Quarterly, vec![12.0, 24.0])]
    #[case(Grain::Annual, vec![12.0, 24.0, 48.0])]
    fn test_rejects_step_off_grain(#[case] grain: Grain, #[case] ages: Vec<f64>) {
        assert!(matches!(
            DevelopmentAxis::new(grain, ages),
            Err(PatternError::MalformedPatternArray(_))
        ));
    }

    #[test]
    fn test_single_age_takes_grain_step() {
        let axis = DevelopmentAxis::new(Grain::Quarterly, vec![3.0]).unwrap();
        assert_eq!(axis.step(), 3.0);
        assert_eq!(axis.edge(), 6.0);
    }

    #[test]
    fn test_deserialize_validates() {
        let empty = r#"{"grain":"annual","ages":[],"step":12.0,"open_ended":false}"#;
        assert!(serde_json::from_str::<DevelopmentAxis>(empty).is_err());

        let off_grain = r#"{"grain":"annual","ages":[3.0,6.0,9.0],"open_ended":false}"#;
        assert!(serde_json::from_str::<DevelopmentAxis>(off_grain).is_err());

        let extended = annual().extend(9, 2).unwrap();
        let json = serde_json::to_string(&extended).unwrap();
        assert_eq!(serde_json::from_str::<DevelopmentAxis>(&json).unwrap(), extended);

        let closed: DevelopmentAxis =
            serde_json::from_str(r#"{"grain":"quarterly","ages":[3.0,6.0]}"#).unwrap();
        assert!(!closed.is_open_ended());
        assert_eq!(closed.edge(), 9.0);
    }

    #[test]
    fn test_rejects_unordered_ages() {
        assert!(DevelopmentAxis::new(Grain::Annual, vec![12.0, 12.0]).is_err());
        assert!(DevelopmentAxis::new(Grain::Annual, vec![]).is_err());
        assert!(DevelopmentAxis::new(Grain::Annual, vec![12.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_infer_grain() {
        let axis = DevelopmentAxis::from_ages(vec![3.0, 6.0, 9.0]).unwrap();
        assert_eq!(axis.grain(), Grain::Quarterly);
        assert!(DevelopmentAxis::from_ages(vec![1.0, 8.0]).is_err());
    }
}
