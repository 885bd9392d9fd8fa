use thiserror::Error as ThisError;

/// Errors that a function system can produce when it is (re-)generated
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum FunctionSystemError {
    /// the system was asked for nonlinear parameters before a size was given
    #[error("Function system must be sized before nonlinear parameters can be applied (number of values: {number_of_values}, degree: {degree})")]
    NotSized {
        /// number of sample points of the system
        number_of_values: usize,
        /// number of basis functions of the system
        degree: usize,
    },
    /// the number of nonlinear parameters does not match the system
    #[error("Function system expects {expected} nonlinear parameters, but {actual} were given")]
    InvalidParameterCount {
        /// number of parameters the system depends on
        expected: usize,
        /// number of parameters that were provided
        actual: usize,
    },
    /// a user supplied domain contains NaN or infinite values
    #[error("Custom domain contains a non-finite value at index {index}")]
    NonFiniteDomain {
        /// first offending position
        index: usize,
    },
}
