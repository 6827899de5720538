//! Attachment Resolution
//!
//! Finds the column at which an estimated tail attaches to the observed
//! pattern. Candidate ages are every column age plus the edge; the edge is
//! the default and sits one past the last column. A request that falls
//! between two ages snaps to the next candidate when it lies within one
//! development step of it.

use serde::{Deserialize, Serialize};

use crate::axis::{AGE_TOLERANCE, DevelopmentAxis};
use crate::error::{PatternError, Result};

/// Resolved attachment point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Column index where the tail starts replacing observed factors
    pub index: usize,
    /// Development age at that column
    pub age: f64,
}

impl Attachment {
    /// Development ordinal of the attachment age (1 for the first column)
    pub const fn ordinal(&self) -> usize {
        self.index + 1
    }
}

/// Maps requested attachment ages onto a development axis
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachmentResolver;

impl AttachmentResolver {
    /// Resolve an attachment age; `None` attaches at the edge.
    ///
    /// # Errors
    /// [`PatternError::InvalidAttachmentAge`] when the age is outside the
    /// observed range or not within one step of an axis age, and
    /// [`PatternError::MalformedPatternArray`] for an axis that already
    /// develops to ultimate.
    pub fn resolve(axis: &DevelopmentAxis, attachment_age: Option<f64>) -> Result<Attachment> {
        if axis.is_open_ended() {
            return Err(PatternError::MalformedPatternArray(
                "pattern already develops to ultimate".to_string(),
            ));
        }

        let edge = Attachment {
            index: axis.len(),
            age: axis.edge(),
        };
        let Some(age) = attachment_age else {
            return Ok(edge);
        };

        let invalid = || PatternError::InvalidAttachmentAge {
            age,
            min: axis.age_at(0),
            max: edge.age,
        };
        if !age.is_finite() {
            return Err(invalid());
        }

        (0..=axis.len())
            .map(|index| Attachment {
                index,
                age: axis.age_at(index),
            })
            .find(|c| c.age >= age - AGE_TOLERANCE)
            .filter(|c| c.age - age < axis.step() - AGE_TOLERANCE)
            .ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Grain;
    use rstest::rstest;

    fn axis() -> DevelopmentAxis {
        DevelopmentAxis::new(Grain::Annual, (1..=9).map(|i| f64::from(i * 12)).collect()).unwrap()
    }

    #[test]
    fn test_default_attaches_at_edge() {
        let attachment = AttachmentResolver::resolve(&axis(), None).unwrap();
        assert_eq!(attachment.index, 9);
        assert_eq!(attachment.age, 120.0);
        assert_eq!(attachment.ordinal(), 10);
    }

    #[rstest]
    #[case(12.0, 0)]
    #[case(60.0, 4)]
    #[case(120.0, 9)]
    #[case(55.0, 4)]
    #[case(110.0, 9)]
    fn test_resolves_within_bucket(#[case] age: f64, #[case] index: usize) {
        let attachment = AttachmentResolver::resolve(&axis(), Some(age)).unwrap();
        assert_eq!(attachment.index, index);
    }

    #[rstest]
    #[case(132.0)]
    #[case(0.0)]
    #[case(-12.0)]
    #[case(f64::NAN)]
    fn test_rejects_out_of_range(#[case] age: f64) {
        let err = AttachmentResolver::resolve(&axis(), Some(age)).unwrap_err();
        assert!(matches!(err, PatternError::InvalidAttachmentAge { .. }));
    }

    #[test]
    fn test_rejects_open_ended_axis() {
        let open = axis().extend(9, 2).unwrap();
        assert!(AttachmentResolver::resolve(&open, None).is_err());
    }
}
