#![warn(missing_docs)]
//! a helper crate which carries common code used by the benchtests and the
//! integration tests.
use nalgebra::{DMatrix, DVector, Scalar};
use num_traits::Float;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use varpro_approx::function_system::hermite::OrthonormalHermite;
use varpro_approx::function_system::FunctionSystem;
use varpro_approx::solvers::{Objective, ObjectiveError};

/// create holding `count` the elements from range [first,last] with linear spacing. (equivalent to matlabs linspace)
pub fn linspace<ScalarType: Float + Scalar>(
    first: ScalarType,
    last: ScalarType,
    count: usize,
) -> DVector<ScalarType> {
    let n_minus_one = ScalarType::from(count - 1).expect("Could not convert usize to Float");
    let lin: Vec<ScalarType> = (0..count)
        .map(|n| {
            first
                + (last - first) / (n_minus_one)
                    * ScalarType::from(n).expect("Could not convert usize to Float")
        })
        .collect();
    DVector::from(lin)
}

/// A signal that is the linear combination of the orthonormal Hermite functions
/// with the given dilation and translation. The number of functions is the
/// number of coefficients.
pub fn hermite_signal(
    samples: usize,
    dilation: f64,
    translation: f64,
    coefficients: &[f64],
) -> DVector<f64> {
    let mut hermite = OrthonormalHermite::<f64>::new(samples, coefficients.len());
    hermite
        .apply_nonlinear_parameters(&DVector::from_vec(vec![dilation, translation]))
        .expect("Hermite system must accept dilation and translation");
    hermite.function_system() * DVector::from_column_slice(coefficients)
}

/// add uniformly distributed noise in `[-amplitude, amplitude]` to the signal,
/// reproducibly for a given seed
pub fn add_noise(signal: &DVector<f64>, amplitude: f64, seed: u64) -> DVector<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    signal.map(|value| value + rng.gen_range(-amplitude..=amplitude))
}

/// the sphere function `$f(x,y) = x^2+y^2$` with minimum at the origin
pub fn sphere(position: &DVector<f64>) -> f64 {
    position.norm_squared()
}

/// Booth's function `$f(x,y) = (x+2y-7)^2 + (2x+y-5)^2$` with minimum at `$(1,3)$`
pub fn booth(position: &DVector<f64>) -> f64 {
    let (x, y) = (position[0], position[1]);
    (x + 2. * y - 7.).powi(2) + (2. * x + y - 5.).powi(2)
}

/// An objective given by a scalar test function. It has neither residuals
/// nor a Jacobian, so only derivative free strategies can minimize it.
pub struct TestFunction {
    func: fn(&DVector<f64>) -> f64,
    /// number of times the function was evaluated
    pub evaluations: usize,
}

impl TestFunction {
    /// wrap the given function
    pub fn new(func: fn(&DVector<f64>) -> f64) -> Self {
        Self {
            func,
            evaluations: 0,
        }
    }
}

impl Objective<f64> for TestFunction {
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
