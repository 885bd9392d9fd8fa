#[cfg(test)]
mod test;

use nalgebra::{DMatrix, DVector, RealField, Scalar};
use std::cmp::Ordering;

/// the factorial `$n!$` as a floating point number
pub(crate) fn factorial<ScalarType>(n: usize) -> ScalarType
where
    ScalarType: Scalar + RealField + Copy,
{
    (1..=n).fold(ScalarType::one(), |acc, k| acc * from_usize::<ScalarType>(k))
}

/// convert an integer count into the scalar type
#[inline]
pub(crate) fn from_usize<ScalarType>(value: usize) -> ScalarType
where
    ScalarType: Scalar + RealField + Copy,
{
    nalgebra::convert(value as f64)
}

/// An interval of `count` consecutive integers that is centered around zero.
/// The lower bound is `-(count/2)` using integer division, so for even counts the
/// interval is `$[-N/2, N/2-1]$` and for odd counts `$[-\lfloor N/2 \rfloor, \lfloor N/2 \rfloor]$`.
pub(crate) fn centered_integer_interval<ScalarType>(count: usize) -> DVector<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    let lower = -((count / 2) as f64);
    DVector::from_fn(count, |i, _| nalgebra::convert(lower + i as f64))
}

/// sort the elements of the vector in ascending order. NaN values
/// compare as equal to everything, so their position is unspecified.
pub(crate) fn sorted_ascending<ScalarType>(vector: DVector<ScalarType>) -> DVector<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    let mut values: Vec<ScalarType> = vector.iter().copied().collect();
    values.sort_by(|lhs, rhs| lhs.partial_cmp(rhs).unwrap_or(Ordering::Equal));
    DVector::from_vec(values)
}

/// the threshold below which singular values are treated as zero. This is the
/// same heuristic that Octave uses for its rank function, see
/// https://octave.sourceforge.io/octave/function/rank.html.
pub(crate) fn svd_epsilon<ScalarType>(
    singular_values: &DVector<ScalarType>,
    nrows: usize,
    ncols: usize,
) -> ScalarType
where
    ScalarType: Scalar + RealField + Copy,
{
    let max_sv = singular_values
        .iter()
        .copied()
        .fold(ScalarType::zero(), |acc, sv| acc.max(sv));
    max_sv * from_usize::<ScalarType>(nrows.max(ncols)) * ScalarType::default_epsilon()
}

/// gather the given columns of a matrix (in the given order) into a new matrix
pub(crate) fn select_columns<ScalarType>(
    matrix: &DMatrix<ScalarType>,
    columns: &[usize],
) -> DMatrix<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    DMatrix::from_fn(matrix.nrows(), columns.len(), |row, col| {
        matrix[(row, columns[col])]
    })
}

/// gather the given rows of a matrix (in the given order) into a new matrix
pub(crate) fn select_rows<ScalarType>(
    matrix: &DMatrix<ScalarType>,
    rows: &[usize],
) -> DMatrix<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    DMatrix::from_fn(rows.len(), matrix.ncols(), |row, col| {
        matrix[(rows[row], col)]
    })
}
