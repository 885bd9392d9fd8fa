use crate::linalg_helpers::*;
use approx::assert_relative_eq;
use nalgebra::{DMatrix, DVector};

#[test]
fn factorial_is_calculated_as_floating_point_number() {
    assert_eq!(factorial::<f64>(0), 1.);
    assert_eq!(factorial::<f64>(1), 1.);
    assert_eq!(factorial::<f64>(5), 120.);
    assert_relative_eq!(factorial::<f64>(12), 479001600.);
}

#[test]
fn centered_integer_interval_uses_integer_division_for_the_lower_bound() {
    let even: DVector<f64> = centered_integer_interval(4);
    assert_eq!(even, DVector::from_vec(vec![-2., -1., 0., 1.]));
    let odd: DVector<f64> = centered_integer_interval(5);
    assert_eq!(odd, DVector::from_vec(vec![-2., -1., 0., 1., 2.]));
    let empty: DVector<f64> = centered_integer_interval(0);
    assert_eq!(empty.len(), 0);
}

#[test]
fn sorting_produces_ascending_order() {
    let v = DVector::from_vec(vec![3., -1., 2., 0.5]);
    assert_eq!(
        sorted_ascending(v),
        DVector::from_vec(vec![-1., 0.5, 2., 3.])
    );
}

#[test]
fn svd_epsilon_scales_with_largest_singular_value_and_dimension() {
    let sv = DVector::from_vec(vec![0.5, 4., 1.]);
    assert_relative_eq!(svd_epsilon(&sv, 10, 3), 4. * 10. * f64::EPSILON);
}

#[test]
fn selecting_rows_and_columns_produces_submatrices_in_the_requested_order() {
    let m = DMatrix::from_row_slice(3, 3, &[1., 2., 3., 4., 5., 6., 7., 8., 9.]);
    assert_eq!(
        select_columns(&m, &[2, 0]),
        DMatrix::from_row_slice(3, 2, &[3., 1., 6., 4., 9., 7.])
    );
    assert_eq!(
        select_rows(&m, &[1]),
        DMatrix::from_row_slice(1, 3, &[4., 5., 6.])
    );
    assert_eq!(select_columns(&m, &[]).shape(), (3, 0));
}
