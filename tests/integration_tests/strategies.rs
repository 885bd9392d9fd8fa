use approx::assert_abs_diff_eq;
use nalgebra::{DMatrix, DVector};
use shared_test_code::{booth, sphere, TestFunction};
use varpro_approx::solvers::simplex::Simplex;
use varpro_approx::solvers::{CancellationToken, OptimizationStrategy, Optimizer};

#[test]
fn simplex_finds_the_minimum_of_the_sphere_function() {
    let seeds = DMatrix::from_row_slice(3, 2, &[10., 1., 2., 2., 3., 1.]);
    let mut objective = TestFunction::new(sphere);
    let mut strategy = Simplex::<f64>::new();
    strategy
        .optimize(1e-7, 100, &seeds, &mut objective, &CancellationToken::new())
        .unwrap();

    assert_abs_diff_eq!(
        strategy.position().clone(),
        DVector::from_vec(vec![0., 0.]),
        epsilon = 1e-3
    );
    assert_abs_diff_eq!(strategy.current_error(), 0., epsilon = 1e-7);
    assert!(!strategy.has_jacobian_info());
}

#[test]
fn simplex_finds_the_minimum_of_booths_function() {
    let seeds = DMatrix::from_row_slice(3, 2, &[5., 5., -5., -5., -5., 5.]);
    let mut objective = TestFunction::new(booth);
    let mut strategy = Optimizer::Simplex.strategy::<f64>();
    strategy
        .optimize(1e-4, 100, &seeds, &mut objective, &CancellationToken::new())
        .unwrap();

    assert_abs_diff_eq!(
        strategy.position().clone(),
        DVector::from_vec(vec![1., 3.]),
        epsilon = 2e-2
    );
    assert!(strategy.current_error() <= 1e-4);
    assert!(objective.evaluations > strategy.iterations());
}

#[test]
fn strategy_can_be_cancelled_from_another_thread() {
    let token = CancellationToken::new();
    let remote = token.clone();
    std::thread::spawn(move || remote.cancel()).join().unwrap();

    let seeds = DMatrix::from_row_slice(3, 2, &[5., 5., -5., -5., -5., 5.]);
    let mut objective = TestFunction::new(booth);
    let mut strategy = Simplex::<f64>::new();
    strategy
        .optimize(0., 100, &seeds, &mut objective, &token)
        .unwrap();
    assert!(strategy.was_cancelled());
    assert_eq!(objective.evaluations, 3);

    // a reset token can be reused
    token.reset();
    strategy
        .optimize(1e-4, 100, &seeds, &mut objective, &token)
        .unwrap();
    assert!(!strategy.was_cancelled());
    assert!(strategy.current_error() <= 1e-4);
}
