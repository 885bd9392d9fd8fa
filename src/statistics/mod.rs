use crate::function_system::FunctionSystemDerivative;
use crate::linalg_helpers::from_usize;
use crate::problem::SeparableProblem;
use nalgebra::{DVector, RealField, Scalar};
use thiserror::Error as ThisError;

#[cfg(test)]
mod test;

/// Information about an error that occurred during calculation
/// of the approximation statistics.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum StatisticsError {
    /// there are not more data points than parameters
    #[error("Fit is underdetermined: {data_points} data points for {parameters} parameters")]
    Underdetermined {
        /// number of samples of the signal
        data_points: usize,
        /// number of nonlinear parameters plus number of basis functions
        parameters: usize,
    },
    /// the signal equals its mean, so the PRD is not defined
    #[error("Signal is constant, the PRD is undefined")]
    ConstantSignal,
    /// no approximation was calculated yet
    #[error("No approximation was calculated yet")]
    NotRun,
}

/// Figures that describe the quality of an approximation and the run that
/// produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApproximationStatistics<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    prd: ScalarType,
    sigma: ScalarType,
    iterations: usize,
    exit_message: Option<String>,
}

impl<ScalarType> ApproximationStatistics<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// Calculate the statistics for the most recent evaluation of the problem.
    /// `fitted_parameters` is the number of nonlinear parameters that were
    /// optimized, zero for a linear-only run. The iteration count and exit
    /// message are those of the strategy run that led there.
    pub fn try_calculate<FS>(
        problem: &SeparableProblem<FS>,
        fitted_parameters: usize,
        iterations: usize,
        exit_message: Option<String>,
    ) -> Result<Self, StatisticsError>
    where
        FS: FunctionSystemDerivative<ScalarType = ScalarType>,
    {
        let cached = problem.cached().ok_or(StatisticsError::NotRun)?;
        Ok(Self {
            prd: prd(problem.signal(), &cached.approximation)?,
            sigma: sigma(
                &cached.weighted_residuals,
                fitted_parameters,
                problem.function_system().degree(),
            )?,
            iterations,
            exit_message,
        })
    }

    /// the percentage root-mean-square difference
    /// `$\lVert \vec{y}-\vec{f} \rVert / \lVert \vec{y}-\bar{y} \rVert$`
    /// as a fraction
    pub fn prd(&self) -> ScalarType {
        self.prd
    }

    /// the estimated standard deviation of the weighted residuals
    pub fn sigma(&self) -> ScalarType {
        self.sigma
    }

    /// the number of iterations of the optimization
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// the exit message of the optimization, if any
    pub fn exit_message(&self) -> Option<&str> {
        self.exit_message.as_deref()
    }
}

/// The norm of the difference between signal and approximation relative to the
/// norm of the signal with its mean removed.
pub fn prd<ScalarType>(
    signal: &DVector<ScalarType>,
    approximation: &DVector<ScalarType>,
) -> Result<ScalarType, StatisticsError>
where
    ScalarType: Scalar + RealField + Copy,
{
    let mean = signal.mean();
    let spread = signal.map(|value| value - mean).norm();
    if spread == ScalarType::zero() {
        return Err(StatisticsError::ConstantSignal);
    }
    Ok((signal - approximation).norm() / spread)
}

/// The estimated standard deviation
/// `$\sigma = \lVert \vec{r}_w \rVert / \sqrt{m-p-k}$`
/// for `$m$` data points, `$p$` nonlinear parameters and `$k$` basis functions.
pub fn sigma<ScalarType>(
    weighted_residuals: &DVector<ScalarType>,
    nonlinear_parameters: usize,
    basis_functions: usize,
) -> Result<ScalarType, StatisticsError>
where
    ScalarType: Scalar + RealField + Copy,
{
    let data_points = weighted_residuals.len();
    let parameters = nonlinear_parameters + basis_functions;
    if data_points <= parameters {
        return Err(StatisticsError::Underdetermined {
            data_points,
            parameters,
        });
    }
    let degrees_of_freedom = from_usize::<ScalarType>(data_points - parameters);
    Ok(weighted_residuals.norm() / degrees_of_freedom.sqrt())
}
