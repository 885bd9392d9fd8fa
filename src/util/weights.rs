use crate::util::DiagMatrix;
use nalgebra::{DMatrix, DVector, RealField, Scalar};
use std::ops::Mul;

/// The weights that scale the residuals of the approximation problem.
///
/// Unit weights correspond to the identity matrix sized to the signal and are
/// the default. Diagonal weights only store the diagonal, while dense weights
/// store an arbitrary square matrix. A dense matrix with zero columns is the
/// degenerate configuration for which no weighted linear fit is performed at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Weights<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// unit weights, which means the problem is unweighted
    Unit,
    /// the weights are represented by a diagonal matrix
    Diagonal(DiagMatrix<ScalarType>),
    /// the weights are a full matrix
    Dense(DMatrix<ScalarType>),
}

impl<ScalarType> Weights<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// create diagonal weights with the given diagonal elements of a matrix.
    /// Make sure that the dimensions of the weights match the signal that they
    /// should be applied to
    pub fn diagonal(diagonal: DVector<ScalarType>) -> Self {
        Self::from(DiagMatrix::from(diagonal))
    }

    /// create weights from a full weight matrix
    pub fn dense(matrix: DMatrix<ScalarType>) -> Self {
        Self::Dense(matrix)
    }

    /// true if this is a weight matrix with zero columns, which disables the
    /// weighted linear least squares fit
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Weights::Dense(matrix) if matrix.ncols() == 0)
    }

    /// check that the weights are appropriately sized for the given data vector, so that
    /// they can be applied without panic. For unit weights this is always true. Diagonal
    /// weights must have the length of the data and dense weights must be square and
    /// conformant to it.
    /// # Arguments
    /// * `data_len`: the number of elements in the data vector
    pub fn is_size_correct_for_data_length(&self, data_len: usize) -> bool {
        match self {
            Weights::Unit => true,
            Weights::Diagonal(diag) => diag.size() == data_len,
            Weights::Dense(matrix) => matrix.nrows() == data_len && matrix.ncols() == data_len,
        }
    }

    /// the shape `(rows, cols)` of the weight matrix, where unit weights
    /// take the shape of the data they are applied to
    pub fn shape(&self, data_len: usize) -> (usize, usize) {
        match self {
            Weights::Unit => (data_len, data_len),
            Weights::Diagonal(diag) => (diag.size(), diag.size()),
            Weights::Dense(matrix) => matrix.shape(),
        }
    }
}

/// Get a variant representing unit weights (i.e. unweighted problem)
impl<ScalarType> Default for Weights<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    fn default() -> Self {
        Self::Unit
    }
}

/// create diagonal weights using the given diagonal matrix
impl<ScalarType> From<DiagMatrix<ScalarType>> for Weights<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    fn from(diag: DiagMatrix<ScalarType>) -> Self {
        Self::Diagonal(diag)
    }
}

/// Multiply the weights to a matrix from the left. This is a no-op for unit weights
/// and a cheap scaling of the rows for diagonal weights.
/// # Panics
/// If the matrix multiplication fails because of incorrect dimensions.
/// (unit weights never panic)
#[allow(non_snake_case)]
impl<ScalarType> Mul<DMatrix<ScalarType>> for &Weights<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    type Output = DMatrix<ScalarType>;

    fn mul(self, rhs: DMatrix<ScalarType>) -> Self::Output {
        match self {
            Weights::Unit => rhs,
            Weights::Diagonal(W) => W * rhs,
            Weights::Dense(W) => W * rhs,
        }
    }
}

/// Multiply the weights to a vector from the left.
/// # Panics
/// If the dimensions do not fit. (unit weights never panic)
#[allow(non_snake_case)]
impl<ScalarType> Mul<DVector<ScalarType>> for &Weights<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    type Output = DVector<ScalarType>;

    fn mul(self, rhs: DVector<ScalarType>) -> Self::Output {
        match self {
            Weights::Unit => rhs,
            Weights::Diagonal(W) => W * rhs,
            Weights::Dense(W) => W * rhs,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::util::weights::Weights;
    use nalgebra::{DMatrix, DVector};

    #[test]
    #[allow(non_snake_case)]
    fn unit_weight_produce_correct_results_when_multiplied_to_matrix_or_vector() {
        let W = Weights::default();
        let v = DVector::from(vec![1., 3., 3., 7.]);
        let A = DMatrix::from_element(4, 4, 2.0);

        assert_eq!(&W * v.clone(), v);
        assert_eq!(&W * A.clone(), A);
    }

    #[test]
    #[allow(non_snake_case)]
    fn diagonal_and_dense_weights_agree_with_the_dense_matrix_product() {
        let diagonal = DVector::from(vec![3., 78., 6., 5.]);
        let D = DMatrix::from_diagonal(&diagonal);
        let W_diag = Weights::diagonal(diagonal);
        let W_dense = Weights::dense(D.clone());

        let v = DVector::from(vec![1., 3., 3., 7.]);
        let mut A = DMatrix::from_element(4, 2, 0.);
        A.set_column(0, &DVector::from(vec![32., 5., 86., 51.]));
        A.set_column(1, &DVector::from(vec![65., 46., 8., 85.]));

        assert_eq!(&D * &v, &W_diag * v.clone());
        assert_eq!(&D * &A, &W_diag * A.clone());
        assert_eq!(&D * &v, &W_dense * v);
        assert_eq!(&D * &A, &W_dense * A);
    }

    #[test]
    fn weight_sizes_are_checked_against_the_data_length() {
        assert!(Weights::<f64>::Unit.is_size_correct_for_data_length(17));
        assert!(Weights::diagonal(DVector::from_element(3, 1.)).is_size_correct_for_data_length(3));
        assert!(!Weights::diagonal(DVector::from_element(3, 1.)).is_size_correct_for_data_length(4));
        assert!(Weights::dense(DMatrix::<f64>::identity(3, 3)).is_size_correct_for_data_length(3));
        // not square
        assert!(!Weights::dense(DMatrix::<f64>::zeros(3, 2)).is_size_correct_for_data_length(3));
    }

    #[test]
    fn only_dense_weights_without_columns_are_degenerate() {
        assert!(Weights::dense(DMatrix::<f64>::zeros(4, 0)).is_degenerate());
        assert!(!Weights::dense(DMatrix::<f64>::identity(4, 4)).is_degenerate());
        assert!(!Weights::<f64>::Unit.is_degenerate());
    }
}
