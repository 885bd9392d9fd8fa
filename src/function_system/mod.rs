use nalgebra::{DMatrix, DVector, RealField, Scalar};

mod errors;
mod index;

/// the orthonormal Hermite function system
pub mod hermite;

pub use errors::FunctionSystemError;
pub use index::{DerivativeColumn, PartialDerivativeIndex};

/// A parametrized set of basis functions evaluated on a discrete domain.
///
/// The basis is available as a matrix `$\boldsymbol{\Phi}$` with one row per sample
/// point and one column per basis function. The basis depends on a (possibly empty)
/// set of nonlinear parameters `$\vec{\alpha}$`, which are applied with
/// [`FunctionSystem::apply_nonlinear_parameters`].
pub trait FunctionSystem {
    /// the scalar number type of the basis
    type ScalarType: Scalar + RealField + Copy;

    /// the number of sample points, i.e. the number of rows of the basis
    fn output_len(&self) -> usize;

    /// the number of basis functions, i.e. the number of columns of the basis
    fn degree(&self) -> usize;

    /// the number of nonlinear parameters this system depends on
    fn nonlinear_parameter_count(&self) -> usize;

    /// the current basis matrix `$\boldsymbol{\Phi}$`
    fn function_system(&self) -> &DMatrix<Self::ScalarType>;

    /// regenerate the basis for the given nonlinear parameters.
    /// # Errors
    /// If the system was not sized yet or the number of parameters is wrong.
    fn apply_nonlinear_parameters(
        &mut self,
        parameters: &DVector<Self::ScalarType>,
    ) -> Result<(), FunctionSystemError>;
}

/// A function system that also provides the derivative of the basis and its
/// partial derivatives with respect to the nonlinear parameters.
pub trait FunctionSystemDerivative: FunctionSystem {
    /// the derivative of every basis function with respect to the domain variable
    fn d_function_system(&self) -> &DMatrix<Self::ScalarType>;

    /// the partial derivatives of the basis functions with respect to the nonlinear
    /// parameters. The meaning of each column is given by [`FunctionSystemDerivative::index`].
    fn partial_derivatives(&self) -> &DMatrix<Self::ScalarType>;

    /// the index that assigns the columns of the partial derivatives to the
    /// nonlinear parameters and the basis orders. An empty index means no analytic
    /// derivatives are available.
    fn index(&self) -> &PartialDerivativeIndex;
}

/// A function system given by an orthogonal polynomial family, which exposes
/// its domain and the Christoffel-Darboux kernel.
pub trait OrthogonalPolynomial: FunctionSystemDerivative {
    /// the sample points on which the basis is evaluated
    fn domain(&self) -> &DVector<Self::ScalarType>;

    /// overwrite the domain and regenerate the basis with the given number of
    /// basis functions. Partial derivatives are discarded, since they refer to the
    /// nonlinear parameters that produced the previous domain.
    fn generate_with_custom_domain(
        &mut self,
        domain: DVector<Self::ScalarType>,
        degree: usize,
    ) -> Result<(), FunctionSystemError>;

    /// the Christoffel-Darboux kernel `$\boldsymbol{\Lambda} = \boldsymbol{\Phi}\boldsymbol{\Phi}^T$`
    fn christoffel_darboux(&self) -> DMatrix<Self::ScalarType> {
        let phi = self.function_system();
        phi * phi.transpose()
    }
}
