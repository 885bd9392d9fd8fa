use crate::function_system::FunctionSystemDerivative;
use crate::problem::{DebugHook, SeparableProblem};
use crate::solvers::{
    starting_points, Bounds, CancellationToken, Objective, ObjectiveError, OptimizationStrategy,
    Optimizer,
};
use crate::statistics::{ApproximationStatistics, StatisticsError};
use nalgebra::{DMatrix, DVector, RealField, Scalar};
use num_traits::{Float, Zero};
use tracing::info;

mod builder;
pub use builder::{VarProBuilder, VarProError};


/// The outcome of a [`VariableProjection::run`]
#[derive(Debug, Clone, PartialEq)]
pub struct FitReport<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// the nonlinear parameters `$\vec{\alpha}$` the run ended with
    pub nonlinear_parameters: DVector<ScalarType>,
    /// the linear coefficients `$\vec{c}(\vec{\alpha})$` for these parameters
    pub linear_parameters: DVector<ScalarType>,
    /// the approximation of the signal
    pub approximation: DVector<ScalarType>,
    /// the norm of the weighted residuals
    pub current_error: ScalarType,
    /// the Jacobian of the weighted residuals, if the function system has partial derivatives
    pub jacobian: Option<DMatrix<ScalarType>>,
    /// iterations of the optimization strategy, see [`OptimizationStrategy::iterations`].
    /// The Levenberg-Marquardt strategy counts residual evaluations of the solver here.
    pub iterations: usize,
    /// evaluations of the problem during the run
    pub evaluations: usize,
    /// why the run ended
    pub exit_message: Option<String>,
    /// whether the run was cancelled
    pub cancelled: bool,
}

/// The variable projection engine.
///
/// It approximates a signal `$\vec{y}$` with a function system
/// `$\boldsymbol{\Phi}(\vec{\alpha})$` by minimizing
///
/// ```math
/// \lVert \boldsymbol{W}(\vec{y}-\boldsymbol{\Phi}(\vec{\alpha})\vec{c}(\vec{\alpha})) \rVert_2
/// ```
///
/// over the nonlinear parameters `$\vec{\alpha}$` only, where the linear coefficients
/// `$\vec{c}(\vec{\alpha})$` are eliminated by solving the linear least squares problem
/// for every candidate `$\vec{\alpha}$`, see [`SeparableProblem`]. The minimization is
/// delegated to an [`OptimizationStrategy`].
///
/// Use the [`VarProBuilder`] to create an engine. The configuration can be changed
/// between runs with the setters; every run validates it again.
pub struct VariableProjection<FS>
where
    FS: FunctionSystemDerivative,
{
    pub(crate) problem: SeparableProblem<FS>,
    pub(crate) strategy: Box<dyn OptimizationStrategy<FS::ScalarType>>,
    pub(crate) nonlinear_parameters: DVector<FS::ScalarType>,
    pub(crate) initial_parameters: Option<DMatrix<FS::ScalarType>>,
    pub(crate) bounds: Option<Bounds<FS::ScalarType>>,
    pub(crate) max_error: FS::ScalarType,
    pub(crate) max_iterations: usize,
    pub(crate) cancellation: CancellationToken,
    pub(crate) report: Option<FitReport<FS::ScalarType>>,
}

impl<FS> VariableProjection<FS>
where
    FS: FunctionSystemDerivative,
{
    /// Run the approximation.
    ///
    /// Without nonlinear parameters only the linear problem is solved. Otherwise the
    /// strategy minimizes the error starting from the initial parameters, or from
    /// starting points derived from the nonlinear parameters, and the nonlinear
    /// parameters are updated to the best position found.
    ///
    /// Running out of iterations or being cancelled is not an error, see the
    /// `exit_message` and `cancelled` fields of the report.
    /// # Errors
    /// If the configuration is invalid, or the strategy or the problem fail.
    pub fn run(&mut self) -> Result<&FitReport<FS::ScalarType>, VarProError> {
        self.report = None;
        self.validate()?;
        let evaluations_before = self.problem.evaluations();

        let (iterations, exit_message, cancelled) = if self.nonlinear_parameters.is_empty() {
            info!("no nonlinear parameters, solving the linear problem only");
            self.problem.evaluate_current()?;
            (0, Some("linear problem solved".to_string()), false)
        } else {
            let initial = match &self.initial_parameters {
                Some(initial) => initial.clone(),
                None => starting_points(
                    &self.nonlinear_parameters,
                    self.strategy.required_starting_points(),
                ),
            };
            info!(
                parameters = ?self.nonlinear_parameters.as_slice(),
                max_error = %self.max_error,
                max_iterations = self.max_iterations,
                "starting variable projection"
            );
            self.strategy.set_boundaries(self.bounds.clone());
            self.strategy.optimize(
                self.max_error,
                self.max_iterations,
                &initial,
                &mut self.problem,
                &self.cancellation,
            )?;
            let position = self.strategy.position().clone();
            // the strategy may have evaluated other positions after the best one
            self.problem.evaluate(&position)?;
            self.nonlinear_parameters = position;
            (
                self.strategy.iterations(),
                self.strategy.exit_message().map(str::to_string),
                self.strategy.was_cancelled(),
            )
        };

        let cached = self.problem.cached().ok_or_else(|| {
            VarProError::Objective(ObjectiveError::Evaluation(
                "no approximation after the run".into(),
            ))
        })?;
        let report = FitReport {
            nonlinear_parameters: self.nonlinear_parameters.clone(),
            linear_parameters: cached.linear_coefficients.clone(),
            approximation: cached.approximation.clone(),
            current_error: cached.error,
            jacobian: cached.jacobian.clone(),
            iterations,
            evaluations: self.problem.evaluations() - evaluations_before,
            exit_message,
            cancelled,
        };
        info!(
            error = %report.current_error,
            iterations = report.iterations,
            evaluations = report.evaluations,
            "variable projection finished"
        );
        Ok(&*self.report.insert(report))
    }

    /// check the configuration
    pub(crate) fn validate(&self) -> Result<(), VarProError> {
        let signal_len = self.problem.signal().len();
        let function_system = self.problem.function_system();
        if signal_len == 0 {
            return Err(VarProError::EmptySignal);
        }
        if function_system.output_len() == 0 || function_system.degree() == 0 {
            return Err(VarProError::UnsizedFunctionSystem);
        }
        if function_system.output_len() != signal_len {
            return Err(VarProError::SignalLengthMismatch {
                signal: signal_len,
                function_system: function_system.output_len(),
            });
        }
        let weights = self.problem.weights();
        if !weights.is_degenerate() && !weights.is_size_correct_for_data_length(signal_len) {
            let (rows, cols) = weights.shape(signal_len);
            return Err(VarProError::InvalidWeightsShape {
                rows,
                cols,
                signal: signal_len,
            });
        }
        // also rejects NaN
        let max_error_is_valid = self.max_error >= FS::ScalarType::zero();
        if !max_error_is_valid {
            return Err(VarProError::NegativeMaxError);
        }
        if self.max_iterations == 0 {
            return Err(VarProError::ZeroMaxIterations);
        }

        let parameter_count = self.nonlinear_parameters.len();
        if parameter_count == 0 {
            return Ok(());
        }
        if parameter_count != function_system.nonlinear_parameter_count() {
            return Err(VarProError::NonlinearParameterCount {
                expected: function_system.nonlinear_parameter_count(),
                actual: parameter_count,
            });
        }
        if let Some(bounds) = &self.bounds {
            if bounds.len() != parameter_count {
                return Err(VarProError::BoundsLengthMismatch {
                    bounds: bounds.len(),
                    parameters: parameter_count,
                });
            }
        }
        if let Some(initial) = &self.initial_parameters {
            let expected_rows = self.strategy.required_starting_points();
            if initial.nrows() != expected_rows || initial.ncols() != parameter_count {
                return Err(VarProError::InvalidInitialParameters {
                    expected_rows,
                    expected_cols: parameter_count,
                    rows: initial.nrows(),
                    cols: initial.ncols(),
                });
            }
        }
        Ok(())
    }

    /// the report of the last successful run
    pub fn report(&self) -> Option<&FitReport<FS::ScalarType>> {
        self.report.as_ref()
    }

    /// the nonlinear parameters, after a run these are the best ones found
    pub fn nonlinear_parameters(&self) -> &DVector<FS::ScalarType> {
        &self.nonlinear_parameters
    }

    /// the linear coefficients of the last evaluation
    pub fn linear_parameters(&self) -> Option<&DVector<FS::ScalarType>> {
        self.problem
            .cached()
            .map(|cached| &cached.linear_coefficients)
    }

    /// the approximation of the last evaluation
    pub fn approximation(&self) -> Option<&DVector<FS::ScalarType>> {
        self.problem.cached().map(|cached| &cached.approximation)
    }

    /// the error of the last evaluation
    pub fn current_error(&self) -> Option<FS::ScalarType> {
        self.problem.cached().map(|cached| cached.error)
    }

    /// the Jacobian of the last evaluation
    pub fn jacobian(&self) -> Option<&DMatrix<FS::ScalarType>> {
        self.problem
            .cached()
            .and_then(|cached| cached.jacobian.as_ref())
    }

    /// iterations of the last run
    pub fn iterations(&self) -> usize {
        self.report.as_ref().map_or(0, |report| report.iterations)
    }

    /// the underlying separable problem
    pub fn problem(&self) -> &SeparableProblem<FS> {
        &self.problem
    }

    /// the function system in the state of the last evaluation
    pub fn function_system(&self) -> &FS {
        self.problem.function_system()
    }

    /// the strategy, including the state of its last run
    pub fn strategy(&self) -> &dyn OptimizationStrategy<FS::ScalarType> {
        self.strategy.as_ref()
    }

    /// the token that cancels runs of this engine. Clone it to cancel from another thread.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Statistics of the approximation of the last run
    /// # Errors
    /// If there was no successful run, or the statistics are undefined for it.
    pub fn statistics(
        &self,
    ) -> Result<ApproximationStatistics<FS::ScalarType>, StatisticsError> {
        let report = self.report.as_ref().ok_or(StatisticsError::NotRun)?;
        ApproximationStatistics::try_calculate(
            &self.problem,
            report.nonlinear_parameters.len(),
            report.iterations,
            report.exit_message.clone(),
        )
    }

    /// override the nonlinear parameters, an empty vector makes the problem linear
    pub fn set_nonlinear_parameters(&mut self, nonlinear_parameters: DVector<FS::ScalarType>) {
        self.nonlinear_parameters = nonlinear_parameters;
    }

    /// install or remove box constraints
    pub fn set_bounds(&mut self, bounds: Option<Bounds<FS::ScalarType>>) {
        self.bounds = bounds;
    }

    /// set the error at which a run stops
    pub fn set_max_error(&mut self, max_error: FS::ScalarType) {
        self.max_error = max_error;
    }

    /// set the iteration cap
    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.max_iterations = max_iterations;
    }

    /// set or clear the explicit starting points
    pub fn set_initial_parameters(&mut self, initial_parameters: Option<DMatrix<FS::ScalarType>>) {
        self.initial_parameters = initial_parameters;
    }

    /// replace the optimization strategy
    pub fn set_strategy(&mut self, strategy: Box<dyn OptimizationStrategy<FS::ScalarType>>) {
        self.strategy = strategy;
    }

    /// set or remove the debug hook
    pub fn set_debug_hook(&mut self, hook: Option<DebugHook<FS::ScalarType>>) {
        self.problem.set_debug_hook(hook);
    }
}

impl<FS> VariableProjection<FS>
where
    FS: FunctionSystemDerivative,
    FS::ScalarType: Float,
{
    /// replace the optimization strategy by one that ships with this crate
    pub fn select_optimizer(&mut self, optimizer: Optimizer) {
        self.strategy = optimizer.strategy();
    }
}
