use nalgebra::{DVector, RealField, Scalar};
use thiserror::Error as ThisError;

/// errors when constructing box constraints
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum BoundsError {
    /// lower and upper bound have different lengths
    #[error("Lower bound has length {lower}, but upper bound has length {upper}")]
    LengthMismatch {
        /// length of the lower bound
        lower: usize,
        /// length of the upper bound
        upper: usize,
    },
    /// an interval with lower bound above its upper bound
    #[error("Lower bound exceeds upper bound at index {index}")]
    LowerExceedsUpper {
        /// index of the offending interval
        index: usize,
    },
}

/// Box constraints `$l_i \leq \alpha_i \leq u_i$` on the nonlinear parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    lower: DVector<ScalarType>,
    upper: DVector<ScalarType>,
}

impl<ScalarType> Bounds<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// create box constraints from lower and upper bounds of the same length
    pub fn new(
        lower: DVector<ScalarType>,
        upper: DVector<ScalarType>,
    ) -> Result<Self, BoundsError> {
        if lower.len() != upper.len() {
            return Err(BoundsError::LengthMismatch {
                lower: lower.len(),
                upper: upper.len(),
            });
        }
        if let Some(index) = lower
            .iter()
            .zip(upper.iter())
            .position(|(lo, hi)| lo > hi)
        {
            return Err(BoundsError::LowerExceedsUpper { index });
        }
        Ok(Self { lower, upper })
    }

    /// number of constrained parameters
    pub fn len(&self) -> usize {
        self.lower.len()
    }

    /// true if no parameter is constrained
    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    /// the lower bounds
    pub fn lower(&self) -> &DVector<ScalarType> {
        &self.lower
    }

    /// the upper bounds
    pub fn upper(&self) -> &DVector<ScalarType> {
        &self.upper
    }

    /// true if the position lies within the box (boundaries included)
    pub fn contains(&self, position: &DVector<ScalarType>) -> bool {
        position.len() == self.len()
            && position
                .iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(x, (lo, hi))| lo <= x && x <= hi)
    }

    /// project the position onto the box
    /// # Panics
    /// if the position does not have one entry per bound
    pub fn clamp(&self, position: &DVector<ScalarType>) -> DVector<ScalarType> {
        assert_eq!(
            position.len(),
            self.len(),
            "Position and bounds must have the same length"
        );
        DVector::from_fn(position.len(), |idx, _| {
            position[idx].max(self.lower[idx]).min(self.upper[idx])
        })
    }
}
