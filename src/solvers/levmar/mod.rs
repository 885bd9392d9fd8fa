use super::{
    Bounds, CancellationToken, Objective, ObjectiveError, OptimizationStrategy, StrategyError,
    StrategyState,
};
use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt, TerminationReason};
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn, Matrix, RealField, Scalar, Vector};
use num_traits::Float;
use tracing::{debug, info, warn};


/// Minimizes an [`Objective`] with the Levenberg-Marquardt implementation of the
/// [levenberg_marquardt](https://crates.io/crates/levenberg-marquardt) crate.
///
/// The objective must provide its residual vector. If it also provides analytic
/// Jacobians they are passed on to the solver, otherwise the Jacobian is approximated
/// by forward differences. Box constraints are enforced by projecting every
/// candidate position onto the box before the objective is evaluated.
///
/// The convergence criteria are the ones of the solver. Unless a preconfigured
/// solver is given, the iteration cap is forwarded as the solver's patience.
///
/// The solver does not expose its iteration count, so
/// [`OptimizationStrategy::iterations`] reports the number of residual evaluations
/// of the solver instead.
///
/// If the run is cancelled, the solver stops at a trial step it has not accepted.
/// The strategy then reports the evaluated position with the smallest error instead.
pub struct LevMarStrategy<ScalarType>
where
    ScalarType: Scalar + RealField + Float + Copy,
{
    solver: Option<LevenbergMarquardt<ScalarType>>,
    state: StrategyState<ScalarType>,
}

impl<ScalarType> LevMarStrategy<ScalarType>
where
    ScalarType: Scalar + RealField + Float + Copy,
{
    /// a strategy with the default settings of the solver
    pub fn new() -> Self {
        Self {
            solver: None,
            state: StrategyState::default(),
        }
    }

    /// use a solver with custom tolerances, patience and so on. The iteration cap
    /// given to [`OptimizationStrategy::optimize`] is then only used to skip the
    /// minimization when it is zero.
    pub fn with_solver(solver: LevenbergMarquardt<ScalarType>) -> Self {
        Self {
            solver: Some(solver),
            ..Self::new()
        }
    }
}

impl<ScalarType> Default for LevMarStrategy<ScalarType>
where
    ScalarType: Scalar + RealField + Float + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<ScalarType> std::fmt::Debug for LevMarStrategy<ScalarType>
where
    ScalarType: Scalar + RealField + Float + Copy,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevMarStrategy")
            .field("custom_solver", &self.solver.is_some())
            .field("state", &self.state)
            .finish()
    }
}

impl<ScalarType> OptimizationStrategy<ScalarType> for LevMarStrategy<ScalarType>
where
    ScalarType: Scalar + RealField + Float + Copy,
{
    fn optimize(
        &mut self,
        max_error: ScalarType,
        max_iterations: usize,
        initial_parameters: &DMatrix<ScalarType>,
        objective: &mut dyn Objective<ScalarType>,
        cancellation: &CancellationToken,
    ) -> Result<(), StrategyError> {
        self.state.reset(max_error, max_iterations);

        if initial_parameters.nrows() == 0 {
            return Err(StrategyError::InvalidNumberOfStartingPoints {
                expected: self.required_starting_points(),
                actual: 0,
            });
        }
        if initial_parameters.ncols() == 0 {
            return Err(StrategyError::EmptyStartingPoints);
        }
        let parameter_count = initial_parameters.ncols();
        match &self.state.bounds {
            Some(bounds) if bounds.len() != parameter_count => {
                return Err(StrategyError::BoundsDimensionMismatch {
                    bounds: bounds.len(),
                    parameters: parameter_count,
                })
            }
            Some(_) => {}
            None => warn!("no box constraints installed, minimizing without constraints"),
        }

        let start: DVector<ScalarType> = initial_parameters.row(0).transpose();
        let mut problem = ObjectiveProblem {
            objective: &mut *objective,
            bounds: self.state.bounds.as_ref(),
            cancellation,
            params: DVector::zeros(0),
            residuals: None,
            jacobian: None,
            error: None,
            best: None,
        };
        problem.set_params(&start);
        if let Some(error) = problem.error.take() {
            return Err(error.into());
        }
        let initial_error = problem
            .residuals
            .as_ref()
            .map(|residuals| residuals.norm())
            .unwrap_or_else(ScalarType::zero);

        let (params, error) = if cancellation.is_cancelled() {
            self.state.exit_message = Some("cancelled".into());
            (problem.best_or_current_params(), problem.error)
        } else if max_iterations == 0 || initial_error <= max_error {
            self.state.exit_message = Some("no minimization necessary".into());
            (problem.params, problem.error)
        } else {
            let (problem, report) = match &self.solver {
                Some(solver) => solver.minimize(problem),
                None => LevenbergMarquardt::new()
                    .with_patience(max_iterations)
                    .minimize(problem),
            };
            info!(
                termination = ?report.termination,
                evaluations = report.number_of_evaluations,
                "levenberg-marquardt finished"
            );
            self.state.current_iteration = report.number_of_evaluations;
            self.state.exit_message = Some(format!("{:?}", report.termination));
            // the solver stops on a trial step when the residuals are withheld
            let stopped_early = cancellation.is_cancelled()
                || matches!(report.termination, TerminationReason::User(_));
            let params = if stopped_early {
                problem.best_or_current_params()
            } else {
                problem.params.clone()
            };
            (params, problem.error)
        };
        if let Some(error) = error {
            return Err(error.into());
        }

        self.state.current_error = objective.evaluate(&params)?;
        self.state.jacobian_info_available = objective.has_jacobian_info();
        self.state.jacobian = objective.jacobian();
        self.state.position = params;
        if cancellation.is_cancelled() {
            self.state.cancelled = true;
            self.state.exit_message = Some("cancelled".into());
        }
        Ok(())
    }

    fn required_starting_points(&self) -> usize {
        1
    }

    fn state(&self) -> &StrategyState<ScalarType> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut StrategyState<ScalarType> {
        &mut self.state
    }
}

/// Exposes an objective as a least squares problem to the solver for the
/// duration of one minimization.
struct ObjectiveProblem<'a, ScalarType>
where
    ScalarType: Scalar + RealField + Float + Copy,
{
    objective: &'a mut dyn Objective<ScalarType>,
    bounds: Option<&'a Bounds<ScalarType>>,
    cancellation: &'a CancellationToken,
    params: DVector<ScalarType>,
    residuals: Option<DVector<ScalarType>>,
    jacobian: Option<DMatrix<ScalarType>>,
    /// the first evaluation error, after which no more evaluations happen
    error: Option<ObjectiveError>,
    /// the evaluated parameters with the smallest residual norm and that norm
    best: Option<(ScalarType, DVector<ScalarType>)>,
}

impl<ScalarType> ObjectiveProblem<'_, ScalarType>
where
    ScalarType: Scalar + RealField + Float + Copy,
{
    fn evaluate_residuals(
        &mut self,
        params: &DVector<ScalarType>,
    ) -> Result<DVector<ScalarType>, ObjectiveError> {
        let error = self.objective.evaluate(params)?;
        debug!(position = ?params.as_slice(), error = %error, "objective evaluated");
        self.objective.weighted_residuals().ok_or_else(|| {
            ObjectiveError::Evaluation("objective does not provide residuals".into())
        })
    }

    /// forward differences of the residuals around the current parameters. The
    /// objective is evaluated at the current parameters again afterwards.
    fn forward_differences(
        &mut self,
        residuals: &DVector<ScalarType>,
    ) -> Result<DMatrix<ScalarType>, ObjectiveError> {
        let params = self.params.clone();
        let sqrt_eps = Float::sqrt(ScalarType::default_epsilon());
        let mut jacobian = DMatrix::zeros(residuals.len(), params.len());
        for col in 0..params.len() {
            let step = sqrt_eps * Float::max(Float::abs(params[col]), ScalarType::one());
            let mut shifted = params.clone();
            shifted[col] += step;
            let shifted_residuals = self.evaluate_residuals(&shifted)?;
            jacobian.set_column(col, &((shifted_residuals - residuals) / step));
        }
        self.evaluate_residuals(&params)?;
        Ok(jacobian)
    }

    fn best_or_current_params(&self) -> DVector<ScalarType> {
        match &self.best {
            Some((_, params)) => params.clone(),
            None => self.params.clone(),
        }
    }

    fn update(&mut self) -> Result<(), ObjectiveError> {
        let params = self.params.clone();
        let residuals = self.evaluate_residuals(&params)?;
        let norm = residuals.norm();
        let improves = match &self.best {
            Some((best_norm, _)) => norm < *best_norm,
            None => true,
        };
        if improves {
            self.best = Some((norm, params));
        }
        let analytic = if self.objective.has_jacobian_info() {
            self.objective.jacobian()
        } else {
            None
        };
        let jacobian = match analytic {
            Some(jacobian) => jacobian,
            None => self.forward_differences(&residuals)?,
        };
        self.residuals = Some(residuals);
        self.jacobian = Some(jacobian);
        Ok(())
    }
}

impl<ScalarType> LeastSquaresProblem<ScalarType, Dyn, Dyn> for ObjectiveProblem<'_, ScalarType>
where
    ScalarType: Scalar + RealField + Float + Copy,
{
    type ResidualStorage = Owned<ScalarType, Dyn>;
    type JacobianStorage = Owned<ScalarType, Dyn, Dyn>;
    type ParameterStorage = Owned<ScalarType, Dyn>;

    fn set_params(&mut self, params: &Vector<ScalarType, Dyn, Self::ParameterStorage>) {
        self.params = match self.bounds {
            Some(bounds) => bounds.clamp(params),
            None => params.clone(),
        };
        self.residuals = None;
        self.jacobian = None;
        // returning no residuals makes the solver terminate
        if self.error.is_some() || self.cancellation.is_cancelled() {
            return;
        }
        if let Err(error) = self.update() {
            self.error = Some(error);
        }
    }

    fn params(&self) -> Vector<ScalarType, Dyn, Self::ParameterStorage> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<Vector<ScalarType, Dyn, Self::ResidualStorage>> {
        self.residuals.clone()
    }

    fn jacobian(&self) -> Option<Matrix<ScalarType, Dyn, Dyn, Self::JacobianStorage>> {
        self.jacobian.clone()
    }
}
