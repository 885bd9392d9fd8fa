//! This module includes helper functionality that is useful for testing across all modules

use crate::solvers::{Objective, ObjectiveError};
use nalgebra::{DMatrix, DVector};

/// create holding `count` the elements from range [first,last] with linear spacing. (equivalent to matlabs linspace)
pub fn linspace(first: f64, last: f64, count: usize) -> DVector<f64> {
    assert!(count > 1, "linspace needs at least two points");
    let step = (last - first) / (count - 1) as f64;
    DVector::from_fn(count, |n, _| first + step * n as f64)
}

/// numerical derivative of a matrix valued function with respect to the parameter
/// at position `index`, calculated by central differences with step `h`.
pub fn central_difference<F>(
    params: &DVector<f64>,
    index: usize,
    h: f64,
    mut func: F,
) -> DMatrix<f64>
where
    F: FnMut(&DVector<f64>) -> DMatrix<f64>,
{
    let mut plus = params.clone();
    plus[index] += h;
    let mut minus = params.clone();
    minus[index] -= h;
    (func(&plus) - func(&minus)) / (2. * h)
}

/// the sphere function `$f(x,y) = x^2+y^2$` and its minimum at the origin
pub fn sphere(position: &DVector<f64>) -> f64 {
    position.norm_squared()
}

/// Booth's function `$f(x,y) = (x+2y-7)^2 + (2x+y-5)^2$` with minimum at `$(1,3)$`
pub fn booth(position: &DVector<f64>) -> f64 {
    let (x, y) = (position[0], position[1]);
    (x + 2. * y - 7.).powi(2) + (2. * x + y - 5.).powi(2)
}

/// an objective that wraps a plain scalar function and counts its evaluations
pub struct ScalarFunction {
    func: fn(&DVector<f64>) -> f64,
    /// number of times the function was evaluated
    pub evaluations: usize,
}

impl ScalarFunction {
    /// wrap the given function
    pub fn new(func: fn(&DVector<f64>) -> f64) -> Self {
        Self {
            func,
            evaluations: 0,
        }
    }
}

impl Objective<f64> for ScalarFunction {
    fn evaluate(&mut self, parameters: &DVector<f64>) -> Result<f64, ObjectiveError> {
        self.evaluations += 1;
        Ok((self.func)(parameters))
    }

    fn weighted_residuals(&self) -> Option<DVector<f64>> {
        None
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        None
    }

    fn has_jacobian_info(&self) -> bool {
        false
    }
}

/// A least squares objective given by a residual function and optionally its
/// Jacobian. The error is the norm of the residuals.
pub struct ResidualFunction {
    residuals: fn(&DVector<f64>) -> DVector<f64>,
    jacobian: Option<fn(&DVector<f64>) -> DMatrix<f64>>,
    position: DVector<f64>,
    /// number of times the function was evaluated
    pub evaluations: usize,
}

impl ResidualFunction {
    /// an objective without analytic Jacobian
    pub fn new(residuals: fn(&DVector<f64>) -> DVector<f64>) -> Self {
        Self {
            residuals,
            jacobian: None,
            position: DVector::zeros(0),
            evaluations: 0,
        }
    }

    /// an objective with analytic Jacobian
    pub fn with_jacobian(
        residuals: fn(&DVector<f64>) -> DVector<f64>,
        jacobian: fn(&DVector<f64>) -> DMatrix<f64>,
    ) -> Self {
        Self {
            jacobian: Some(jacobian),
            ..Self::new(residuals)
        }
    }
}

impl Objective<f64> for ResidualFunction {
    fn evaluate(&mut self, parameters: &DVector<f64>) -> Result<f64, ObjectiveError> {
        self.evaluations += 1;
        self.position = parameters.clone();
        Ok((self.residuals)(parameters).norm())
    }

    fn weighted_residuals(&self) -> Option<DVector<f64>> {
        Some((self.residuals)(&self.position))
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        self.jacobian.map(|jacobian| jacobian(&self.position))
    }

    fn has_jacobian_info(&self) -> bool {
        self.jacobian.is_some()
    }
}
