use crate::function_system::FunctionSystemDerivative;
use crate::linalg_helpers::{from_usize, select_columns, select_rows, svd_epsilon};
use crate::solvers::{Objective, ObjectiveError};
use crate::util::Weights;
use nalgebra::{ComplexField, DMatrix, DVector, RealField, Scalar};
use num_traits::One;
use tracing::{debug, warn};


/// A callback that is invoked after every evaluation with the sample positions,
/// the signal and the current approximation.
pub type DebugHook<ScalarType> =
    Box<dyn FnMut(&DVector<ScalarType>, &DVector<ScalarType>, &DVector<ScalarType>)>;

/// The results of the last evaluation of a [`SeparableProblem`]
#[derive(Debug, Clone, PartialEq)]
pub struct CachedCalculations<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// the linear coefficients `$\vec{c}$` of the best linear fit
    pub linear_coefficients: DVector<ScalarType>,
    /// the (unweighted) approximation `$\boldsymbol{\Phi}\vec{c}$`
    pub approximation: DVector<ScalarType>,
    /// the weighted residuals `$\vec{r}_w = \boldsymbol{W}(\vec{y}-\boldsymbol{\Phi}\vec{c})$`
    pub weighted_residuals: DVector<ScalarType>,
    /// the norm of the weighted residuals
    pub error: ScalarType,
    /// the Jacobian of the weighted residuals with respect to the nonlinear
    /// parameters, if the function system provides partial derivatives
    pub jacobian: Option<DMatrix<ScalarType>>,
    /// the numerical rank of the weighted basis
    pub rank: usize,
}

/// The separable least squares problem of approximating a signal `$\vec{y}$` with
/// a function system `$\boldsymbol{\Phi}(\vec{\alpha})$`.
///
/// For fixed nonlinear parameters `$\vec{\alpha}$` the linear coefficients are the
/// solution of the weighted linear least squares problem
///
/// ```math
/// \vec{c}(\vec{\alpha}) = \arg\min_{\vec{c}} \lVert \boldsymbol{W}(\vec{y}-\boldsymbol{\Phi}(\vec{\alpha})\vec{c})\rVert_2,
/// ```
///
/// which is calculated with the singular value decomposition
/// `$\boldsymbol{W}\boldsymbol{\Phi} = \boldsymbol{U}\boldsymbol{\Sigma}\boldsymbol{V}^T$`.
/// What remains is the nonlinear problem of minimizing the norm of the projected
/// residual `$\vec{r}_w(\vec{\alpha})$`, which this type exposes as an [`Objective`].
///
/// The Jacobian of the projected residual is calculated with the formula of
/// Golub and Pereyra. With `$\boldsymbol{D}_i = \boldsymbol{W}\,\partial\boldsymbol{\Phi}/\partial\alpha_i$`,
/// column `$i$` is
///
/// ```math
/// \vec{j}_i = -\left(\boldsymbol{P}^\perp \boldsymbol{D}_i \vec{c} + \boldsymbol{U}\boldsymbol{\Sigma}^{-1}\boldsymbol{V}^T \boldsymbol{D}_i^T \vec{r}_w\right),
/// ```
///
/// where `$\boldsymbol{P}^\perp = \boldsymbol{1}-\boldsymbol{U}\boldsymbol{U}^T$` projects onto the orthogonal
/// complement of the column space. Only singular values above the rank threshold
/// enter the pseudo inverse.
///
/// A weight matrix with zero columns disables the linear fit. In that case the
/// approximation is the sum of the basis columns, the linear coefficients are empty
/// and the residuals are unweighted.
pub struct SeparableProblem<FS>
where
    FS: FunctionSystemDerivative,
{
    signal: DVector<FS::ScalarType>,
    weights: Weights<FS::ScalarType>,
    function_system: FS,
    cached: Option<CachedCalculations<FS::ScalarType>>,
    evaluations: usize,
    debug_hook: Option<DebugHook<FS::ScalarType>>,
}

impl<FS> std::fmt::Debug for SeparableProblem<FS>
where
    FS: FunctionSystemDerivative + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeparableProblem")
            .field("signal", &self.signal)
            .field("weights", &self.weights)
            .field("function_system", &self.function_system)
            .field("cached", &self.cached)
            .field("evaluations", &self.evaluations)
            .field("debug_hook", &self.debug_hook.is_some())
            .finish()
    }
}

impl<FS> SeparableProblem<FS>
where
    FS: FunctionSystemDerivative,
{
    /// Combine signal, weights and function system. The dimensions are not
    /// checked here, this is the job of the [`crate::varpro::VarProBuilder`].
    pub(crate) fn new(
        signal: DVector<FS::ScalarType>,
        weights: Weights<FS::ScalarType>,
        function_system: FS,
    ) -> Self {
        Self {
            signal,
            weights,
            function_system,
            cached: None,
            evaluations: 0,
            debug_hook: None,
        }
    }

    pub(crate) fn set_debug_hook(&mut self, hook: Option<DebugHook<FS::ScalarType>>) {
        self.debug_hook = hook;
    }

    /// the signal that is approximated
    pub fn signal(&self) -> &DVector<FS::ScalarType> {
        &self.signal
    }

    /// the weights of the residuals
    pub fn weights(&self) -> &Weights<FS::ScalarType> {
        &self.weights
    }

    /// the function system in its most recently applied state
    pub fn function_system(&self) -> &FS {
        &self.function_system
    }

    /// the results of the last evaluation, `None` if there was none or it failed
    pub fn cached(&self) -> Option<&CachedCalculations<FS::ScalarType>> {
        self.cached.as_ref()
    }

    /// the number of evaluations since the problem was created
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Solve the linear problem for the function system in its current state,
    /// without applying any nonlinear parameters. Returns the error.
    pub fn evaluate_current(&mut self) -> Result<FS::ScalarType, ObjectiveError> {
        self.evaluations += 1;
        let result = if self.weights.is_degenerate() {
            self.unweighted_approximation()
        } else {
            self.weighted_fit()
        };
        let cached = match result {
            Ok(cached) => cached,
            Err(error) => {
                self.cached = None;
                return Err(error);
            }
        };
        debug!(error = %cached.error, rank = cached.rank, "separable problem evaluated");

        if let Some(hook) = self.debug_hook.as_mut() {
            let domain = DVector::from_fn(self.signal.len(), |idx, _| {
                from_usize::<FS::ScalarType>(idx)
            });
            hook(&domain, &self.signal, &cached.approximation);
        }
        let error = cached.error;
        self.cached = Some(cached);
        Ok(error)
    }

    #[allow(non_snake_case)]
    fn weighted_fit(&self) -> Result<CachedCalculations<FS::ScalarType>, ObjectiveError> {
        let Phi = self.function_system.function_system();
        self.check_rows(Phi)?;

        let Phi_w = &self.weights * Phi.clone();
        let y_w = &self.weights * self.signal.clone();

        let decomposition = Phi_w.clone().svd(true, true);
        let (Some(U), Some(V_t)) = (decomposition.u.as_ref(), decomposition.v_t.as_ref()) else {
            return Err(ObjectiveError::Evaluation(
                "singular value decomposition did not produce singular vectors".into(),
            ));
        };
        let singular_values = &decomposition.singular_values;
        let epsilon = svd_epsilon(singular_values, Phi_w.nrows(), Phi_w.ncols());
        let nonzero: Vec<usize> = singular_values
            .iter()
            .enumerate()
            .filter(|(_, sv)| **sv > epsilon)
            .map(|(idx, _)| idx)
            .collect();
        let rank = nonzero.len();
        if rank < Phi_w.ncols() {
            warn!(
                rank,
                basis_functions = Phi_w.ncols(),
                "weighted basis is rank deficient"
            );
        }

        // pseudo inverse restricted to the numerical range
        let U_r = select_columns(U, &nonzero);
        let V_r_t = select_rows(V_t, &nonzero);
        let sigma_inverse =
            DVector::from_iterator(rank, nonzero.iter().map(|&idx| singular_values[idx].recip()));

        let linear_coefficients =
            V_r_t.transpose() * (U_r.transpose() * &y_w).component_mul(&sigma_inverse);
        let approximation = Phi * &linear_coefficients;
        let weighted_residuals = &y_w - &Phi_w * &linear_coefficients;
        let error = weighted_residuals.norm();

        let jacobian = if self.function_system.index().is_empty() {
            None
        } else {
            Some(self.golub_pereyra_jacobian(
                &U_r,
                &V_r_t,
                &sigma_inverse,
                &linear_coefficients,
                &weighted_residuals,
            )?)
        };

        Ok(CachedCalculations {
            linear_coefficients,
            approximation,
            weighted_residuals,
            error,
            jacobian,
            rank,
        })
    }

    #[allow(non_snake_case)]
    fn golub_pereyra_jacobian(
        &self,
        U_r: &DMatrix<FS::ScalarType>,
        V_r_t: &DMatrix<FS::ScalarType>,
        sigma_inverse: &DVector<FS::ScalarType>,
        linear_coefficients: &DVector<FS::ScalarType>,
        weighted_residuals: &DVector<FS::ScalarType>,
    ) -> Result<DMatrix<FS::ScalarType>, ObjectiveError> {
        let index = self.function_system.index();
        let dPhi_w = &self.weights * self.function_system.partial_derivatives().clone();
        let degree = linear_coefficients.len();
        let rows = weighted_residuals.len();
        let parameter_count = index.parameter_count();

        let mut jacobian = DMatrix::zeros(rows, parameter_count);
        for parameter in 0..parameter_count {
            // D_i c and D_i^T r
            let mut Dc = DVector::zeros(rows);
            let mut Dt_r = DVector::zeros(degree);
            for entry in index.columns_for(parameter) {
                if entry.order >= degree || entry.column >= dPhi_w.ncols() {
                    return Err(ObjectiveError::InvalidDerivativeIndex { parameter });
                }
                let column = dPhi_w.column(entry.column);
                Dc.axpy(linear_coefficients[entry.order], &column, FS::ScalarType::one());
                Dt_r[entry.order] += column.dot(weighted_residuals);
            }
            let projected = &Dc - U_r * (U_r.transpose() * &Dc);
            let pseudo_inverse_term = U_r * (V_r_t * &Dt_r).component_mul(sigma_inverse);
            jacobian.set_column(parameter, &(-(projected + pseudo_inverse_term)));
        }
        Ok(jacobian)
    }

    /// the fallback for weights with zero columns
    #[allow(non_snake_case)]
    fn unweighted_approximation(
        &self,
    ) -> Result<CachedCalculations<FS::ScalarType>, ObjectiveError> {
        warn!("weights without columns, skipping the linear fit");
        let Phi = self.function_system.function_system();
        self.check_rows(Phi)?;

        let approximation = Phi * DVector::repeat(Phi.ncols(), FS::ScalarType::one());
        let residuals = &self.signal - &approximation;
        let error = residuals.norm();

        let index = self.function_system.index();
        let jacobian = if index.is_empty() {
            None
        } else {
            let dPhi = self.function_system.partial_derivatives();
            let mut jacobian = DMatrix::zeros(Phi.nrows(), index.parameter_count());
            for parameter in 0..index.parameter_count() {
                for entry in index.columns_for(parameter) {
                    if entry.column >= dPhi.ncols() {
                        return Err(ObjectiveError::InvalidDerivativeIndex { parameter });
                    }
                    let mut column = jacobian.column_mut(parameter);
                    column -= dPhi.column(entry.column);
                }
            }
            Some(jacobian)
        };

        Ok(CachedCalculations {
            linear_coefficients: DVector::zeros(0),
            approximation,
            weighted_residuals: residuals,
            error,
            jacobian,
            rank: 0,
        })
    }

    fn check_rows(&self, basis: &DMatrix<FS::ScalarType>) -> Result<(), ObjectiveError> {
        if basis.nrows() != self.signal.len() {
            return Err(ObjectiveError::SignalLengthMismatch {
                signal: self.signal.len(),
                rows: basis.nrows(),
            });
        }
        Ok(())
    }
}

impl<FS> Objective<FS::ScalarType> for SeparableProblem<FS>
where
    FS: FunctionSystemDerivative,
{
    fn evaluate(
        &mut self,
        parameters: &DVector<FS::ScalarType>,
    ) -> Result<FS::ScalarType, ObjectiveError> {
        if let Err(error) = self.function_system.apply_nonlinear_parameters(parameters) {
            self.cached = None;
            return Err(error.into());
        }
        self.evaluate_current()
    }

    fn weighted_residuals(&self) -> Option<DVector<FS::ScalarType>> {
        self.cached
            .as_ref()
            .map(|cached| cached.weighted_residuals.clone())
    }

    fn jacobian(&self) -> Option<DMatrix<FS::ScalarType>> {
        self.cached.as_ref().and_then(|cached| cached.jacobian.clone())
    }

    fn has_jacobian_info(&self) -> bool {
        !self.function_system.index().is_empty()
    }
}
