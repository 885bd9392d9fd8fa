use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::{DMatrix, DVector};
use pprof::criterion::{Output, PProfProfiler};
use shared_test_code::{add_noise, hermite_signal};
use varpro_approx::prelude::*;

const SAMPLES: usize = 256;

/// helper struct for the parameters of the generating signal
#[derive(Copy, Clone, PartialEq, Debug)]
struct HermiteParameters {
    dilation: f64,
    translation: f64,
}

fn build_engine(
    true_parameters: HermiteParameters,
    guess: HermiteParameters,
    optimizer: Optimizer,
) -> VariableProjection<OrthonormalHermite<f64>> {
    let coefficients = [1., -0.5, 0.8, 0.2, -0.3, 0.1, 0.05];
    let HermiteParameters {
        dilation,
        translation,
    } = true_parameters;
    let signal = add_noise(
        &hermite_signal(SAMPLES, dilation, translation, &coefficients),
        1e-3,
        42,
    );
    let mut builder = VarProBuilder::new(OrthonormalHermite::new(SAMPLES, coefficients.len()))
        .signal(signal)
        .nonlinear_parameters(DVector::from_vec(vec![guess.dilation, guess.translation]))
        .max_iterations(200)
        .optimizer(optimizer);
    if optimizer == Optimizer::Simplex {
        builder = builder.initial_parameters(DMatrix::from_row_slice(
            3,
            2,
            &[
                guess.dilation,
                guess.translation,
                1.1 * guess.dilation,
                guess.translation - 2.,
                0.9 * guess.dilation,
                guess.translation + 2.,
            ],
        ));
    }
    builder
        .build()
        .expect("Building valid engine should not panic")
}

fn run_approximation(mut engine: VariableProjection<OrthonormalHermite<f64>>) -> [f64; 2] {
    let report = engine.run().expect("Approximation should not fail");
    [report.nonlinear_parameters[0], report.nonlinear_parameters[1]]
}

fn bench_hermite_fit(c: &mut Criterion) {
    let true_parameters = HermiteParameters {
        dilation: 0.3,
        translation: 120.,
    };
    let guess = HermiteParameters {
        dilation: 0.25,
        translation: 125.,
    };

    c.bench_function("hermite fit levenberg-marquardt", move |bencher| {
        bencher.iter_batched(
            || build_engine(true_parameters, guess, Optimizer::LevenbergMarquardt),
            run_approximation,
            criterion::BatchSize::SmallInput,
        )
    });
    c.bench_function("hermite fit simplex", move |bencher| {
        bencher.iter_batched(
            || build_engine(true_parameters, guess, Optimizer::Simplex),
            run_approximation,
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = bench_hermite_fit);
criterion_main!(benches);
