use super::VariableProjection;
use crate::function_system::FunctionSystemDerivative;
use crate::problem::{DebugHook, SeparableProblem};
use crate::solvers::simplex::Simplex;
use crate::solvers::{
    Bounds, CancellationToken, ObjectiveError, OptimizationStrategy, Optimizer, StrategyError,
};
use crate::util::Weights;
use nalgebra::{DMatrix, DVector};
use num_traits::{Float, Zero};
use thiserror::Error as ThisError;

/// Errors in the configuration of a [`VariableProjection`] or during its run
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum VarProError {
    /// the signal was not given to the builder
    #[error("Signal not provided")]
    SignalMissing,

    /// the signal has no samples
    #[error("Signal must have a nonzero number of elements")]
    EmptySignal,

    /// the function system has no rows or no columns
    #[error("Function system is not sized")]
    UnsizedFunctionSystem,

    /// the basis has a different number of rows than the signal has samples
    #[error(
        "Signal and function system must have the same length. Signal length = {}, function system length = {}",
        signal,
        function_system
    )]
    SignalLengthMismatch {
        /// number of samples of the signal
        signal: usize,
        /// number of rows of the basis
        function_system: usize,
    },

    /// the weight matrix is not square or does not fit the signal
    #[error(
        "Weights of shape {}x{} do not fit a signal of length {}",
        rows,
        cols,
        signal
    )]
    InvalidWeightsShape {
        /// rows of the weight matrix
        rows: usize,
        /// columns of the weight matrix
        cols: usize,
        /// number of samples of the signal
        signal: usize,
    },

    /// the nonlinear parameters do not fit the function system
    #[error(
        "Function system has {} nonlinear parameters, but {} were provided",
        expected,
        actual
    )]
    NonlinearParameterCount {
        /// number of nonlinear parameters of the function system
        expected: usize,
        /// length of the given parameter vector
        actual: usize,
    },

    /// the bounds do not have one entry per nonlinear parameter
    #[error(
        "Bounds have length {}, but there are {} nonlinear parameters",
        bounds,
        parameters
    )]
    BoundsLengthMismatch {
        /// length of the bounds
        bounds: usize,
        /// number of nonlinear parameters
        parameters: usize,
    },

    /// the maximum error is negative or not a number
    #[error("Maximum error must not be negative")]
    NegativeMaxError,

    /// the iteration cap is zero
    #[error("Maximum number of iterations must be positive")]
    ZeroMaxIterations,

    /// the explicit starting points do not fit the strategy and the parameters
    #[error(
        "Initial parameters must have shape {}x{}, but have shape {}x{}",
        expected_rows,
        expected_cols,
        rows,
        cols
    )]
    InvalidInitialParameters {
        /// starting points the strategy needs
        expected_rows: usize,
        /// number of nonlinear parameters
        expected_cols: usize,
        /// rows of the given matrix
        rows: usize,
        /// columns of the given matrix
        cols: usize,
    },

    /// the optimization strategy failed
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// the problem could not be evaluated
    #[error(transparent)]
    Objective(#[from] ObjectiveError),
}

/// A builder for the [`VariableProjection`] engine.
///
/// Only the function system and the signal are mandatory. Everything else has
/// a default:
///
/// * unit weights,
/// * no nonlinear parameters, which makes it a purely linear problem,
/// * no bounds,
/// * a maximum error of zero and at most 100 iterations,
/// * the [`Simplex`] strategy,
/// * no debug hook and a fresh [`CancellationToken`].
///
/// # Example
/// ```rust
/// # use nalgebra::DVector;
/// # use varpro_approx::function_system::hermite::OrthonormalHermite;
/// # use varpro_approx::varpro::VarProBuilder;
/// # fn fit(signal: DVector<f64>) {
/// let engine = VarProBuilder::new(OrthonormalHermite::new(signal.len(), 6))
///     .signal(signal)
///     .nonlinear_parameters(DVector::from_vec(vec![0.7, 50.]))
///     .max_error(1e-6)
///     .build()
///     .unwrap();
/// # }
/// ```
pub struct VarProBuilder<FS>
where
    FS: FunctionSystemDerivative,
{
    /// Required: the signal to approximate
    signal: Option<DVector<FS::ScalarType>>,
    /// Required: the function system that spans the approximation
    function_system: FS,
    weights: Weights<FS::ScalarType>,
    nonlinear_parameters: DVector<FS::ScalarType>,
    initial_parameters: Option<DMatrix<FS::ScalarType>>,
    bounds: Option<Bounds<FS::ScalarType>>,
    max_error: FS::ScalarType,
    max_iterations: usize,
    strategy: Box<dyn OptimizationStrategy<FS::ScalarType>>,
    debug_hook: Option<DebugHook<FS::ScalarType>>,
    cancellation: CancellationToken,
}

impl<FS> VarProBuilder<FS>
where
    FS: FunctionSystemDerivative,
{
    /// Create a new builder for the given function system
    pub fn new(function_system: FS) -> Self {
        Self {
            signal: None,
            function_system,
            weights: Weights::default(),
            nonlinear_parameters: DVector::zeros(0),
            initial_parameters: None,
            bounds: None,
            max_error: FS::ScalarType::zero(),
            max_iterations: 100,
            strategy: Box::new(Simplex::new()),
            debug_hook: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// **Mandatory**: the signal `$\vec{y}$` to approximate. Its length must match
    /// the number of rows of the function system.
    pub fn signal(self, signal: DVector<FS::ScalarType>) -> Self {
        Self {
            signal: Some(signal),
            ..self
        }
    }

    /// **Optional** weights for the residuals. Diagonal or dense weights must be
    /// square and match the signal. Dense weights with zero columns skip the
    /// linear fit entirely.
    pub fn weights(self, weights: Weights<FS::ScalarType>) -> Self {
        Self { weights, ..self }
    }

    /// **Optional** starting values of the nonlinear parameters. If none are
    /// given, the problem is linear and no optimization takes place.
    pub fn nonlinear_parameters(self, nonlinear_parameters: DVector<FS::ScalarType>) -> Self {
        Self {
            nonlinear_parameters,
            ..self
        }
    }

    /// **Optional** explicit starting points for the strategy, one per row.
    /// Otherwise they are derived from the nonlinear parameters, see
    /// [`crate::solvers::starting_points`].
    pub fn initial_parameters(self, initial_parameters: DMatrix<FS::ScalarType>) -> Self {
        Self {
            initial_parameters: Some(initial_parameters),
            ..self
        }
    }

    /// **Optional** box constraints on the nonlinear parameters
    pub fn bounds(self, bounds: Bounds<FS::ScalarType>) -> Self {
        Self {
            bounds: Some(bounds),
            ..self
        }
    }

    /// **Optional** the run stops once the error drops to this value
    pub fn max_error(self, max_error: FS::ScalarType) -> Self {
        Self { max_error, ..self }
    }

    /// **Optional** the iteration cap of the strategy
    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    /// **Optional** use a custom optimization strategy
    pub fn strategy(self, strategy: Box<dyn OptimizationStrategy<FS::ScalarType>>) -> Self {
        Self { strategy, ..self }
    }

    /// **Optional** a callback that receives the sample positions, the signal and
    /// the approximation after every evaluation
    pub fn debug_hook<F>(self, hook: F) -> Self
    where
        F: FnMut(&DVector<FS::ScalarType>, &DVector<FS::ScalarType>, &DVector<FS::ScalarType>)
            + 'static,
    {
        Self {
            debug_hook: Some(Box::new(hook)),
            ..self
        }
    }

    /// **Optional** a token that can cancel the runs of the engine from another thread
    pub fn cancellation_token(self, cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            ..self
        }
    }

    /// Build the engine.
    /// # Errors
    /// If the signal is missing or any part of the configuration is invalid.
    pub fn build(self) -> Result<VariableProjection<FS>, VarProError> {
        let Self {
            signal,
            function_system,
            weights,
            nonlinear_parameters,
            initial_parameters,
            bounds,
            max_error,
            max_iterations,
            strategy,
            debug_hook,
            cancellation,
        } = self;

        let signal = signal.ok_or(VarProError::SignalMissing)?;
        let mut problem = SeparableProblem::new(signal, weights, function_system);
        problem.set_debug_hook(debug_hook);

        let engine = VariableProjection {
            problem,
            strategy,
            nonlinear_parameters,
            initial_parameters,
            bounds,
            max_error,
            max_iterations,
            cancellation,
            report: None,
        };
        engine.validate()?;
        Ok(engine)
    }
}

impl<FS> VarProBuilder<FS>
where
    FS: FunctionSystemDerivative,
    FS::ScalarType: Float,
{
    /// **Optional** use one of the strategies that ship with this crate
    pub fn optimizer(self, optimizer: Optimizer) -> Self {
        Self {
            strategy: optimizer.strategy(),
            ..self
        }
    }
}
