use nalgebra::{DMatrix, DVector, RealField, Scalar};
use num_traits::Float;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod bounds;
mod errors;

/// Adapter to the [levenberg-marquardt](https://crates.io/crates/levenberg-marquardt) crate
pub mod levmar;
/// A derivative free simplex search on a population of three points
pub mod simplex;


pub use bounds::{Bounds, BoundsError};
pub use errors::{ObjectiveError, StrategyError};

/// The function an optimization strategy minimizes.
///
/// Evaluating the objective at a position yields the scalar error. Afterwards,
/// objectives that are least squares problems can expose their residual vector
/// and, if they have analytic derivatives, the Jacobian of the residuals at
/// the same position.
#[cfg_attr(test, mockall::automock)]
pub trait Objective<ScalarType: Scalar + RealField + Copy> {
    /// evaluate the objective at the given position and return the error.
    /// The residuals and Jacobian refer to this position until the next call.
    fn evaluate(&mut self, parameters: &DVector<ScalarType>) -> Result<ScalarType, ObjectiveError>;

    /// the residual vector at the most recently evaluated position, if available
    fn weighted_residuals(&self) -> Option<DVector<ScalarType>>;

    /// the Jacobian of the residuals at the most recently evaluated position, if available
    fn jacobian(&self) -> Option<DMatrix<ScalarType>>;

    /// true if the objective provides analytic Jacobians
    fn has_jacobian_info(&self) -> bool;
}

/// A cloneable flag that requests the termination of a running optimization.
/// Strategies check it once per iteration and stop with the best position found
/// so far.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// a new token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// request cancellation. All clones of this token observe the request.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// reset the token so that it can be reused for another run
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// true if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// The bookkeeping every optimization strategy carries.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyState<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// iteration cap of the current run
    pub max_iterations: usize,
    /// number of iterations performed in the current run
    pub current_iteration: usize,
    /// the run stops once the error drops to this value
    pub max_error: ScalarType,
    /// error at the current position
    pub current_error: ScalarType,
    /// best position found so far
    pub position: DVector<ScalarType>,
    /// box constraints on the position
    pub bounds: Option<Bounds<ScalarType>>,
    /// Jacobian of the objective residuals at the current position, if the strategy uses it
    pub jacobian: Option<DMatrix<ScalarType>>,
    /// whether the objective offers analytic Jacobians
    pub jacobian_info_available: bool,
    /// a human readable description why the run ended
    pub exit_message: Option<String>,
    /// the run was stopped through the cancellation token
    pub cancelled: bool,
}

impl<ScalarType> StrategyState<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// prepare the state for a new run. Bounds are kept.
    pub fn reset(&mut self, max_error: ScalarType, max_iterations: usize) {
        self.max_error = max_error;
        self.max_iterations = max_iterations;
        self.current_iteration = 0;
        self.current_error = ScalarType::zero();
        self.position = DVector::zeros(0);
        self.jacobian = None;
        self.jacobian_info_available = false;
        self.exit_message = None;
        self.cancelled = false;
    }
}

impl<ScalarType> Default for StrategyState<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    fn default() -> Self {
        Self {
            max_iterations: 0,
            current_iteration: 0,
            max_error: ScalarType::zero(),
            current_error: ScalarType::zero(),
            position: DVector::zeros(0),
            bounds: None,
            jacobian: None,
            jacobian_info_available: false,
            exit_message: None,
            cancelled: false,
        }
    }
}

/// A nonlinear minimization strategy that can drive any [`Objective`].
///
/// A strategy only borrows the objective for the duration of one call to
/// [`OptimizationStrategy::optimize`]. The results of the last run are available
/// through the accessors afterwards.
pub trait OptimizationStrategy<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// Minimize the objective until its error drops to `max_error` or
    /// `max_iterations` iterations were performed.
    /// # Arguments
    /// * `initial_parameters`: the starting points, one per row. The number of
    ///   rows must be [`OptimizationStrategy::required_starting_points`].
    /// * `cancellation`: checked once per iteration
    fn optimize(
        &mut self,
        max_error: ScalarType,
        max_iterations: usize,
        initial_parameters: &DMatrix<ScalarType>,
        objective: &mut dyn Objective<ScalarType>,
        cancellation: &CancellationToken,
    ) -> Result<(), StrategyError>;

    /// the number of starting points (rows of the initial parameters) the strategy needs
    fn required_starting_points(&self) -> usize;

    /// the bookkeeping of the last run
    fn state(&self) -> &StrategyState<ScalarType>;

    /// mutable access to the bookkeeping
    fn state_mut(&mut self) -> &mut StrategyState<ScalarType>;

    /// best position of the last run
    fn position(&self) -> &DVector<ScalarType> {
        &self.state().position
    }

    /// error at the best position of the last run
    fn current_error(&self) -> ScalarType {
        self.state().current_error
    }

    /// number of iterations of the last run
    fn iterations(&self) -> usize {
        self.state().current_iteration
    }

    /// Jacobian at the final position, for strategies that use one
    fn jacobian(&self) -> Option<&DMatrix<ScalarType>> {
        self.state().jacobian.as_ref()
    }

    /// install (or with `None` remove) box constraints for the following runs
    fn set_boundaries(&mut self, bounds: Option<Bounds<ScalarType>>) {
        self.state_mut().bounds = bounds;
    }

    /// whether the objective of the last run supplied analytic Jacobians
    fn has_jacobian_info(&self) -> bool {
        self.state().jacobian_info_available
    }

    /// why the last run ended
    fn exit_message(&self) -> Option<&str> {
        self.state().exit_message.as_deref()
    }

    /// true if the last run was stopped by the cancellation token
    fn was_cancelled(&self) -> bool {
        self.state().cancelled
    }
}

/// The optimization strategies that ship with this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Optimizer {
    /// the derivative free [`simplex::Simplex`] search
    #[default]
    Simplex,
    /// Levenberg-Marquardt through [`levmar::LevMarStrategy`]
    LevenbergMarquardt,
}

impl Optimizer {
    /// create a fresh instance of the strategy with default settings
    pub fn strategy<ScalarType>(self) -> Box<dyn OptimizationStrategy<ScalarType>>
    where
        ScalarType: Scalar + RealField + Float + Copy,
    {
        match self {
            Optimizer::Simplex => Box::new(simplex::Simplex::new()),
            Optimizer::LevenbergMarquardt => Box::new(levmar::LevMarStrategy::new()),
        }
    }
}

/// Derive `count` starting points from a single starting vector. The first row is the
/// vector itself and every further row adds `1.5` to each entry of the row before it.
pub fn starting_points<ScalarType>(
    start: &DVector<ScalarType>,
    count: usize,
) -> DMatrix<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    let step: ScalarType = nalgebra::convert(1.5);
    DMatrix::from_fn(count, start.len(), |row, col| {
        let offset: ScalarType = nalgebra::convert(row as f64);
        start[col] + step * offset
    })
}
