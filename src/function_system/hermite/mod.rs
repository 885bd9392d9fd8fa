use super::{
    FunctionSystem, FunctionSystemDerivative, FunctionSystemError, OrthogonalPolynomial,
    PartialDerivativeIndex,
};
use crate::linalg_helpers::{centered_integer_interval, factorial, from_usize, sorted_ascending};
use nalgebra::{DMatrix, DVector, RealField, Scalar};


/// index of the dilation in the nonlinear parameter vector
pub const DILATION: usize = 0;
/// index of the translation in the nonlinear parameter vector
pub const TRANSLATION: usize = 1;

/// The orthonormal Hermite functions
///
/// ```math
/// \phi_k(x) = \frac{H_k(x)\, e^{-x^2/2}}{\sqrt{2^k\, k!\, \sqrt{\pi}}}, \quad k = 0,\dots,K-1,
/// ```
///
/// sampled on a discrete domain. On construction the domain is given by the roots of
/// the Hermite polynomial `$H_N$`, where `$N$` is the number of values. After the
/// nonlinear parameters `$\vec{\alpha} = (\lambda, \tau)^T$` are applied, the domain
/// is the equidistant grid
///
/// ```math
/// x_i = |\lambda|\,(t_i + \lfloor N/2 \rfloor - \tau), \quad t_i = -\lfloor N/2 \rfloor + i,
/// ```
///
/// so `$\lambda$` dilates and `$\tau$` translates the functions across the samples.
/// A negative dilation is mirrored to its absolute value rather than rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthonormalHermite<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    number_of_values: usize,
    degree: usize,
    dilation: ScalarType,
    translation: ScalarType,
    domain: DVector<ScalarType>,
    function_system: DMatrix<ScalarType>,
    d_function_system: DMatrix<ScalarType>,
    partial_derivatives: DMatrix<ScalarType>,
    index: PartialDerivativeIndex,
}

impl<ScalarType> OrthonormalHermite<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// Create a system with `degree` basis functions sampled at `number_of_values`
    /// points. The initial domain are the roots of the Hermite polynomial of
    /// order `number_of_values`. A system with zero values or zero degree is
    /// considered unsized and refuses nonlinear parameters.
    pub fn new(number_of_values: usize, degree: usize) -> Self {
        let domain = hermite_roots(number_of_values);
        let (function_system, d_function_system) = orthonormal_basis(&domain, degree);
        Self {
            number_of_values,
            degree,
            dilation: ScalarType::one(),
            translation: ScalarType::zero(),
            domain,
            function_system,
            d_function_system,
            partial_derivatives: DMatrix::zeros(number_of_values, 0),
            index: PartialDerivativeIndex::new(2),
        }
    }

    /// the dilation that was last applied. This is always non-negative.
    pub fn dilation(&self) -> ScalarType {
        self.dilation
    }

    /// the translation `$\lfloor N/2 \rfloor - \tau$` that was last applied to the
    /// integer grid
    pub fn translation(&self) -> ScalarType {
        self.translation
    }

    fn is_sized(&self) -> bool {
        self.number_of_values > 0 && self.degree > 0
    }

    fn regenerate(&mut self, domain: DVector<ScalarType>) {
        let (function_system, d_function_system) = orthonormal_basis(&domain, self.degree);
        self.number_of_values = domain.len();
        self.domain = domain;
        self.function_system = function_system;
        self.d_function_system = d_function_system;
    }

    /// `shifted_grid` is `$t + \lfloor N/2 \rfloor - \tau$`, i.e. the domain before dilation.
    /// `dilation_sign` is the derivative of `$|\lambda|$` with respect to `$\lambda$`.
    fn update_partial_derivatives(
        &mut self,
        shifted_grid: &DVector<ScalarType>,
        dilation_sign: ScalarType,
    ) {
        let mut partial_derivatives = DMatrix::zeros(self.number_of_values, 2 * self.degree);
        let mut index = PartialDerivativeIndex::new(2);
        for order in 0..self.degree {
            let dphi = self.d_function_system.column(order);
            let d_dilation = dphi.component_mul(shifted_grid) * dilation_sign;
            let d_translation = dphi * (-self.dilation);
            partial_derivatives.set_column(2 * order, &d_dilation);
            partial_derivatives.set_column(2 * order + 1, &d_translation);
            index.push(DILATION, order, 2 * order);
            index.push(TRANSLATION, order, 2 * order + 1);
        }
        self.partial_derivatives = partial_derivatives;
        self.index = index;
    }
}

impl<ScalarType> FunctionSystem for OrthonormalHermite<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    type ScalarType = ScalarType;

    fn output_len(&self) -> usize {
        self.number_of_values
    }

    fn degree(&self) -> usize {
        self.degree
    }

    fn nonlinear_parameter_count(&self) -> usize {
        2
    }

    fn function_system(&self) -> &DMatrix<ScalarType> {
        &self.function_system
    }

    fn apply_nonlinear_parameters(
        &mut self,
        parameters: &DVector<ScalarType>,
    ) -> Result<(), FunctionSystemError> {
        if !self.is_sized() {
            return Err(FunctionSystemError::NotSized {
                number_of_values: self.number_of_values,
                degree: self.degree,
            });
        }
        if parameters.len() != self.nonlinear_parameter_count() {
            return Err(FunctionSystemError::InvalidParameterCount {
                expected: self.nonlinear_parameter_count(),
                actual: parameters.len(),
            });
        }

        let grid: DVector<ScalarType> = centered_integer_interval(self.number_of_values);
        let raw_dilation = parameters[DILATION];
        let dilation_sign = if raw_dilation < ScalarType::zero() {
            -ScalarType::one()
        } else {
            ScalarType::one()
        };
        let dilation = raw_dilation.abs();
        let translation =
            from_usize::<ScalarType>(self.number_of_values / 2) - parameters[TRANSLATION];

        let shifted_grid = grid.add_scalar(translation);
        self.regenerate(&shifted_grid * dilation);
        self.dilation = dilation;
        self.translation = translation;
        self.update_partial_derivatives(&shifted_grid, dilation_sign);
        Ok(())
    }
}

impl<ScalarType> FunctionSystemDerivative for OrthonormalHermite<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    fn d_function_system(&self) -> &DMatrix<ScalarType> {
        &self.d_function_system
    }

    fn partial_derivatives(&self) -> &DMatrix<ScalarType> {
        &self.partial_derivatives
    }

    fn index(&self) -> &PartialDerivativeIndex {
        &self.index
    }
}

impl<ScalarType> OrthogonalPolynomial for OrthonormalHermite<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    fn domain(&self) -> &DVector<ScalarType> {
        &self.domain
    }

    fn generate_with_custom_domain(
        &mut self,
        domain: DVector<ScalarType>,
        degree: usize,
    ) -> Result<(), FunctionSystemError> {
        if let Some(index) = domain.iter().position(|x| !x.is_finite()) {
            return Err(FunctionSystemError::NonFiniteDomain { index });
        }
        self.degree = degree;
        self.regenerate(domain);
        self.partial_derivatives = DMatrix::zeros(self.number_of_values, 0);
        self.index = PartialDerivativeIndex::new(2);
        Ok(())
    }
}

/// The roots of the Hermite polynomial `$H_n$` in ascending order. They are the
/// eigenvalues of the symmetric tridiagonal Jacobi matrix of the Hermite
/// recurrence, whose off-diagonal entries are `$\sqrt{i/2}$` for `$i=1,\dots,n-1$`.
pub(crate) fn hermite_roots<ScalarType>(n: usize) -> DVector<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    if n == 0 {
        return DVector::zeros(0);
    }
    let half: ScalarType = nalgebra::convert(0.5);
    let jacobi = DMatrix::from_fn(n, n, |row, col| {
        if col == row + 1 {
            (half * from_usize::<ScalarType>(col)).sqrt()
        } else if row == col + 1 {
            (half * from_usize::<ScalarType>(row)).sqrt()
        } else {
            ScalarType::zero()
        }
    });
    sorted_ascending(jacobi.symmetric_eigenvalues())
}

/// Evaluate the first `degree` orthonormal Hermite functions and their derivatives
/// with respect to `$x$` on the given domain. Returns `(basis, derivative)`, both
/// with one column per function.
pub(crate) fn orthonormal_basis<ScalarType>(
    x: &DVector<ScalarType>,
    degree: usize,
) -> (DMatrix<ScalarType>, DMatrix<ScalarType>)
where
    ScalarType: Scalar + RealField + Copy,
{
    let m = x.len();
    let two: ScalarType = nalgebra::convert(2.0);
    let half: ScalarType = nalgebra::convert(0.5);

    // classical (physicists') Hermite polynomials by the three term recurrence
    let mut basis = DMatrix::zeros(m, degree);
    if degree > 0 {
        basis.column_mut(0).fill(ScalarType::one());
    }
    if degree > 1 {
        basis.set_column(1, &(x * two));
    }
    for k in 2..degree {
        let next = (basis.column(k - 1).component_mul(x)
            - basis.column(k - 2) * from_usize::<ScalarType>(k - 1))
            * two;
        basis.set_column(k, &next);
    }

    let gaussian = x.map(|xi| (-(xi * xi) * half).exp());
    let sqrt_pi = ScalarType::pi().sqrt();
    for k in 0..degree {
        let norm = (two.powi(k as i32) * factorial::<ScalarType>(k) * sqrt_pi).sqrt();
        let normalized = basis.column(k).component_mul(&gaussian) / norm;
        basis.set_column(k, &normalized);
    }

    // phi_k' = sqrt(2k) phi_{k-1} - x phi_k
    let mut derivative = DMatrix::zeros(m, degree);
    for k in 0..degree {
        let x_phi = basis.column(k).component_mul(x);
        let dphi = if k == 0 {
            -x_phi
        } else {
            basis.column(k - 1) * (two * from_usize::<ScalarType>(k)).sqrt() - x_phi
        };
        derivative.set_column(k, &dphi);
    }

    (basis, derivative)
}
