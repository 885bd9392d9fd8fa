use approx::assert_abs_diff_eq;
use assert_matches::assert_matches;
use nalgebra::{DMatrix, DVector};
use shared_test_code::{add_noise, hermite_signal, linspace};
use varpro_approx::prelude::*;
use varpro_approx::statistics::StatisticsError;

mod strategies;

const SAMPLES: usize = 100;
const DEGREE: usize = 10;

/// the fifth basis function of a system with unit dilation, centered on the grid
fn single_hermite_function() -> DVector<f64> {
    let mut coefficients = [0.; DEGREE];
    coefficients[4] = 1.;
    hermite_signal(SAMPLES, 1., SAMPLES as f64 / 2., &coefficients)
}

fn hermite_bounds() -> Bounds<f64> {
    Bounds::new(
        DVector::from_vec(vec![0.01, -1000.]),
        DVector::from_vec(vec![1000., 1000.]),
    )
    .unwrap()
}

#[test]
fn levenberg_marquardt_recovers_dilation_and_translation_of_a_hermite_function() {
    let mut engine = VarProBuilder::new(OrthonormalHermite::new(SAMPLES, DEGREE))
        .signal(single_hermite_function())
        .nonlinear_parameters(DVector::from_vec(vec![0.7, 50.]))
        .bounds(hermite_bounds())
        .optimizer(Optimizer::LevenbergMarquardt)
        .build()
        .expect("valid configuration");
    let report = engine.run().expect("run must succeed").clone();

    assert_abs_diff_eq!(report.nonlinear_parameters[0], 1., epsilon = 1e-3);
    assert_abs_diff_eq!(report.nonlinear_parameters[1], 50., epsilon = 1e-2);
    assert!(report.current_error < 1e-6);
    assert_abs_diff_eq!(report.linear_parameters[4], 1., epsilon = 1e-3);
    assert!(!report.cancelled);
    assert!(engine.strategy().has_jacobian_info());
}

#[test]
fn simplex_approaches_dilation_and_translation_of_a_hermite_function() {
    let seeds = DMatrix::from_row_slice(3, 2, &[0.7, 50., 0.9, 49., 1.2, 51.]);
    let mut engine = VarProBuilder::new(OrthonormalHermite::new(SAMPLES, DEGREE))
        .signal(single_hermite_function())
        .nonlinear_parameters(DVector::from_vec(vec![0.7, 50.]))
        .initial_parameters(seeds)
        .bounds(hermite_bounds())
        .max_error(1e-6)
        .max_iterations(300)
        .build()
        .expect("valid configuration");
    let report = engine.run().expect("run must succeed").clone();

    assert_abs_diff_eq!(report.nonlinear_parameters[0], 1., epsilon = 5e-2);
    assert_abs_diff_eq!(report.nonlinear_parameters[1], 50., epsilon = 0.5);
    assert!(report.current_error < 0.1);
    assert!(report.jacobian.is_some());
}

#[test]
fn linear_problem_is_solved_without_optimization() {
    let coefficients = [0.5, -1., 2., 0.25];
    let signal = hermite_signal(64, 0.8, 30., &coefficients);
    let mut hermite = OrthonormalHermite::<f64>::new(64, 4);
    hermite
        .apply_nonlinear_parameters(&DVector::from_vec(vec![0.8, 30.]))
        .unwrap();

    let mut engine = VarProBuilder::new(hermite)
        .signal(signal.clone())
        .build()
        .unwrap();
    let report = engine.run().unwrap().clone();

    assert_eq!(report.iterations, 0);
    assert_abs_diff_eq!(
        report.linear_parameters,
        DVector::from_column_slice(&coefficients),
        epsilon = 1e-10
    );
    assert_abs_diff_eq!(report.approximation, signal, epsilon = 1e-10);
    let statistics = engine.statistics().unwrap();
    assert_abs_diff_eq!(statistics.prd(), 0., epsilon = 1e-8);
}

#[test]
fn noisy_signal_is_approximated_within_the_noise_level() {
    let coefficients = [1., 0.4, -0.8, 0.3, 0.5, -0.2, 0.1, 0.05];
    let clean = hermite_signal(SAMPLES, 0.8, 48., &coefficients);
    let amplitude = 0.01;
    let signal = add_noise(&clean, amplitude, 0xC0FFEE);

    let mut engine = VarProBuilder::new(OrthonormalHermite::new(SAMPLES, coefficients.len()))
        .signal(signal)
        .nonlinear_parameters(DVector::from_vec(vec![0.75, 50.]))
        .bounds(hermite_bounds())
        .optimizer(Optimizer::LevenbergMarquardt)
        .build()
        .unwrap();
    let report = engine.run().unwrap().clone();

    assert_abs_diff_eq!(report.nonlinear_parameters[0], 0.8, epsilon = 2e-2);
    assert_abs_diff_eq!(report.nonlinear_parameters[1], 48., epsilon = 0.2);
    assert_abs_diff_eq!(report.approximation, clean, epsilon = 3. * amplitude);

    let statistics = engine.statistics().unwrap();
    // uniform noise in [-a, a] has standard deviation a/sqrt(3)
    let noise_deviation = amplitude / f64::sqrt(3.);
    assert!(statistics.sigma() > 0.6 * noise_deviation);
    assert!(statistics.sigma() < 1.4 * noise_deviation);
    assert!(statistics.prd() < 0.1);
}

#[test]
fn weighted_fit_ignores_samples_with_zero_weight() {
    let coefficients = [1., -0.5, 0.25];
    let mut signal = hermite_signal(40, 1., 20., &coefficients);
    // corrupt samples that get no weight
    let corrupted = [3usize, 17, 31];
    let mut weights = DVector::from_element(40, 1.);
    for &idx in &corrupted {
        signal[idx] += 10.;
        weights[idx] = 0.;
    }
    let mut hermite = OrthonormalHermite::<f64>::new(40, 3);
    hermite
        .apply_nonlinear_parameters(&DVector::from_vec(vec![1., 20.]))
        .unwrap();
    let mut engine = VarProBuilder::new(hermite)
        .signal(signal)
        .weights(Weights::diagonal(weights))
        .build()
        .unwrap();
    let report = engine.run().unwrap();
    assert_abs_diff_eq!(
        report.linear_parameters,
        DVector::from_column_slice(&coefficients),
        epsilon = 1e-10
    );
    assert_abs_diff_eq!(report.current_error, 0., epsilon = 1e-10);
}

#[test]
fn statistics_need_a_successful_run() {
    let signal = linspace(-1., 1., SAMPLES).map(|x: f64| (-x * x).exp());
    let engine = VarProBuilder::new(OrthonormalHermite::new(SAMPLES, DEGREE))
        .signal(signal)
        .build()
        .unwrap();
    assert_matches!(engine.statistics(), Err(StatisticsError::NotRun));
}
