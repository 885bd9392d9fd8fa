use nalgebra::{DVector, RealField, Scalar};
use std::ops::{Add, Div, Mul, Sub};

/// A vertex position of the simplex. The length is fixed when the coordinate
/// is created and all arithmetic requires operands of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Coord<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    values: DVector<ScalarType>,
}

impl<ScalarType> Coord<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// number of components
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// true if the coordinate has no components
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// the components as a vector
    pub fn as_vector(&self) -> &DVector<ScalarType> {
        &self.values
    }

    /// consume the coordinate and return its components
    pub fn into_vector(self) -> DVector<ScalarType> {
        self.values
    }
}

impl<ScalarType> From<DVector<ScalarType>> for Coord<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    fn from(values: DVector<ScalarType>) -> Self {
        Self { values }
    }
}

impl<ScalarType> Add for &Coord<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    type Output = Coord<ScalarType>;

    fn add(self, rhs: Self) -> Self::Output {
        assert_eq!(self.len(), rhs.len(), "Coordinates must have the same length");
        Coord::from(&self.values + &rhs.values)
    }
}

impl<ScalarType> Sub for &Coord<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    type Output = Coord<ScalarType>;

    fn sub(self, rhs: Self) -> Self::Output {
        assert_eq!(self.len(), rhs.len(), "Coordinates must have the same length");
        Coord::from(&self.values - &rhs.values)
    }
}

impl<ScalarType> Mul<ScalarType> for &Coord<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    type Output = Coord<ScalarType>;

    fn mul(self, rhs: ScalarType) -> Self::Output {
        Coord::from(&self.values * rhs)
    }
}

impl<ScalarType> Div<ScalarType> for Coord<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    type Output = Coord<ScalarType>;

    fn div(self, rhs: ScalarType) -> Self::Output {
        Coord::from(self.values / rhs)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn coordinate_arithmetic_works_componentwise() {
        let a = Coord::from(DVector::from_vec(vec![1., 2.]));
        let b = Coord::from(DVector::from_vec(vec![3., -4.]));
        assert_eq!((&a + &b).into_vector(), DVector::from_vec(vec![4., -2.]));
        assert_eq!((&a - &b).into_vector(), DVector::from_vec(vec![-2., 6.]));
        assert_eq!((&a * 2.5).into_vector(), DVector::from_vec(vec![2.5, 5.]));
        assert_eq!((&a + &b) / 2., Coord::from(DVector::from_vec(vec![2., -1.])));
    }

    #[test]
    #[should_panic]
    fn adding_coordinates_of_different_length_panics() {
        let a = Coord::from(DVector::from_vec(vec![1., 2.]));
        let b = Coord::from(DVector::from_vec(vec![1., 2., 3.]));
        let _ = &a + &b;
    }
}
