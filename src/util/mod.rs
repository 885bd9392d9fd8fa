use nalgebra::{DMatrix, DVector, RealField, Scalar};
use std::ops::Mul;

mod weights;
pub use weights::Weights;

/// A square diagonal matrix with dynamic dimension. Off-diagonal entries are assumed zero.
/// This internally stores only the diagonal elements
/// # Types
/// ScalarType: the numeric type of the matrix
#[derive(Debug, Clone, PartialEq)]
pub struct DiagMatrix<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    diagonal: DVector<ScalarType>,
}

impl<ScalarType> DiagMatrix<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// the size (i.e. number of rows == number of cols) of this square matrix
    pub fn size(&self) -> usize {
        self.diagonal.len()
    }
}

/// Generate a square diagonal matrix from the given diagonal vector.
impl<ScalarType> From<DVector<ScalarType>> for DiagMatrix<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    fn from(diagonal: DVector<ScalarType>) -> Self {
        Self { diagonal }
    }
}

/// Multiply this diagonal matrix from the left to a dynamically sized matrix.
/// # Panics
/// Panics if the dimensions of the matrices do not fit for matrix multiplication
impl<ScalarType> Mul<DMatrix<ScalarType>> for &DiagMatrix<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    type Output = DMatrix<ScalarType>;

    fn mul(self, mut rhs: DMatrix<ScalarType>) -> Self::Output {
        assert_eq!(
            self.size(),
            rhs.nrows(),
            "Matrix dimensions incorrect for diagonal matrix multiplication."
        );
        rhs.column_iter_mut()
            .for_each(|mut col| col.component_mul_assign(&self.diagonal));
        rhs
    }
}

/// Matrix-vector product of the diagonal matrix and the given vector
/// # Panics
/// operation panics if the matrix and vector dimensions are incorrect for a product
impl<ScalarType> Mul<DVector<ScalarType>> for &DiagMatrix<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    type Output = DVector<ScalarType>;

    fn mul(self, rhs: DVector<ScalarType>) -> Self::Output {
        assert_eq!(
            self.size(),
            rhs.len(),
            "Matrix dimensions incorrect for diagonal matrix multiplication."
        );
        self.diagonal.component_mul(&rhs)
    }
}
