use crate::function_system::FunctionSystemError;
use thiserror::Error as ThisError;

/// Errors that can occur when an objective is evaluated
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum ObjectiveError {
    /// the function system could not be regenerated for the parameters
    #[error("Function system error: {0}")]
    FunctionSystem(#[from] FunctionSystemError),
    /// the basis has a different number of rows than the signal has samples
    #[error("Signal has length {signal}, but the function system has {rows} rows")]
    SignalLengthMismatch {
        /// number of samples of the signal
        signal: usize,
        /// number of rows of the basis
        rows: usize,
    },
    /// the partial derivative index refers to a basis order or column that does not exist
    #[error("Partial derivative index entry for parameter {parameter} is out of range")]
    InvalidDerivativeIndex {
        /// the nonlinear parameter with the offending entry
        parameter: usize,
    },
    /// any other failure of a user supplied objective
    #[error("Objective could not be evaluated: {0}")]
    Evaluation(String),
}

/// Errors that abort an optimization run
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum StrategyError {
    /// the strategy needs a fixed number of starting points
    #[error("Strategy requires {expected} starting points, but {actual} were provided")]
    InvalidNumberOfStartingPoints {
        /// number of starting points the strategy works with
        expected: usize,
        /// number of rows of the initial parameter matrix
        actual: usize,
    },
    /// the starting points have no coordinates
    #[error("Starting points must have at least one coordinate")]
    EmptyStartingPoints,
    /// the bounds do not have one entry per parameter
    #[error("Bounds have length {bounds}, but there are {parameters} parameters")]
    BoundsDimensionMismatch {
        /// length of the bound vectors
        bounds: usize,
        /// number of parameters
        parameters: usize,
    },
    /// evaluating the objective failed
    #[error(transparent)]
    Objective(#[from] ObjectiveError),
}
