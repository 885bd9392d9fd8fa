use super::*;
use crate::function_system::hermite::OrthonormalHermite;
use crate::problem::SeparableProblem;
use crate::solvers::Objective;
use crate::util::Weights;
use approx::assert_relative_eq;
use assert_matches::assert_matches;
use nalgebra::DVector;

#[test]
fn prd_is_relative_to_the_signal_without_its_mean() {
    let signal = DVector::from_vec(vec![1., 2., 3., 4.]);
    let approximation = DVector::from_vec(vec![1., 2., 3., 5.]);
    // mean 2.5, so the centered norm is sqrt(2.25+0.25+0.25+2.25) = sqrt(5)
    assert_relative_eq!(
        prd(&signal, &approximation).unwrap(),
        1. / f64::sqrt(5.),
        epsilon = 1e-12
    );
    assert_eq!(prd(&signal, &signal).unwrap(), 0.);
}

#[test]
fn prd_of_a_constant_signal_is_undefined() {
    let signal = DVector::from_element(5, 3.);
    assert_matches!(
        prd(&signal, &DVector::zeros(5)),
        Err(StatisticsError::ConstantSignal)
    );
}

#[test]
fn sigma_divides_by_the_degrees_of_freedom() {
    let residuals = DVector::from_vec(vec![3., 0., 4., 0., 0., 0.]);
    // 6 samples, 2 nonlinear parameters, 2 basis functions
    assert_relative_eq!(sigma(&residuals, 2, 2).unwrap(), 5. / f64::sqrt(2.), epsilon = 1e-12);
}

#[test]
fn sigma_of_an_underdetermined_fit_is_an_error() {
    let residuals = DVector::from_vec(vec![1., 1., 1., 1.]);
    assert_matches!(
        sigma(&residuals, 2, 2),
        Err(StatisticsError::Underdetermined {
            data_points: 4,
            parameters: 4
        })
    );
}

#[test]
fn statistics_require_an_evaluated_problem() {
    let signal = DVector::from_fn(30, |idx, _| (idx as f64 * 0.3).cos());
    let mut problem = SeparableProblem::new(
        signal,
        Weights::default(),
        OrthonormalHermite::<f64>::new(30, 5),
    );
    assert_matches!(
        ApproximationStatistics::try_calculate(&problem, 2, 0, None),
        Err(StatisticsError::NotRun)
    );

    problem
        .evaluate(&DVector::from_vec(vec![0.5, 15.]))
        .unwrap();
    let statistics =
        ApproximationStatistics::try_calculate(&problem, 2, 7, Some("done".to_string())).unwrap();
    let cached = problem.cached().unwrap();
    assert_relative_eq!(
        statistics.sigma(),
        cached.weighted_residuals.norm() / f64::sqrt(30. - 2. - 5.),
        epsilon = 1e-12
    );
    assert_relative_eq!(
        statistics.prd(),
        prd(problem.signal(), &cached.approximation).unwrap(),
        epsilon = 1e-12
    );
    assert_eq!(statistics.iterations(), 7);
    assert_eq!(statistics.exit_message(), Some("done"));
}
