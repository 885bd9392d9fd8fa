#![warn(missing_docs)]
//!
//! # Introduction
//!
//! Many signals can be described by a linear combination of a small number of basis functions
//! that themselves depend on a few *nonlinear* parameters, such as a dilation and a translation
//! of the basis. This crate approximates such signals with the *variable projection* method:
//! the linear coefficients are eliminated analytically, and only the nonlinear parameters are
//! left to a numerical optimizer.
//!
//! Consider a signal `$\vec{y}= (y_1,\dots,y_{m})^T$` and a function system
//! `$\boldsymbol{\Phi}(\vec{\alpha}) \in \mathbb{R}^{m \times n}$`, whose `$n$` columns are the
//! basis functions sampled at the `$m$` signal positions. The approximation is
//!
//! ```math
//! \vec{f}(\vec{\alpha},\vec{c}) = \boldsymbol{\Phi}(\vec{\alpha})\,\vec{c},
//! ```
//!
//! where we call `$\vec{\alpha}$` the _nonlinear parameters_ and `$\vec{c}$` the _linear coefficients_.
//!
//! ## What Variable Projection Computes
//! The crate finds `$\vec{\alpha}$` and `$\vec{c}$` such that
//!
//! ```math
//! \arg\min_{\vec{\alpha},\vec{c}} \lVert \mathbf{W}(\vec{y}-\boldsymbol{\Phi}(\vec{\alpha})\vec{c}) \rVert_2,
//! ```
//! where `$\mathbf{W}$` is a weight matrix that defaults to the identity.
//! For a fixed `$\vec{\alpha}$` the best coefficients are given by the pseudoinverse,
//! `$\vec{c}(\vec{\alpha}) = (\mathbf{W}\boldsymbol{\Phi})^\dagger \mathbf{W}\vec{y}$`. Plugging them
//! back in leaves a problem in `$\vec{\alpha}$` only, whose Jacobian is calculated with the
//! full Golub-Pereyra formula (Golub1973) from the partial derivatives of the function system.
//!
//! # Usage and Workflow
//!
//! 1. Pick a [`FunctionSystem`](crate::function_system::FunctionSystem) that also provides
//! its partial derivatives, e.g. the
//! [`OrthonormalHermite`](crate::function_system::hermite::OrthonormalHermite) functions with a
//! dilation and a translation parameter, or implement the traits for your own basis.
//! 2. Configure a [`VariableProjection`](crate::varpro::VariableProjection) engine with the
//! [`VarProBuilder`](crate::varpro::VarProBuilder). Only the signal is mandatory.
//! 3. Choose an [`OptimizationStrategy`](crate::solvers::OptimizationStrategy). By default a
//! three point [`Simplex`](crate::solvers::simplex::Simplex) is used, which needs no
//! derivatives. The [`LevMarStrategy`](crate::solvers::levmar::LevMarStrategy) uses the
//! Jacobian via the [levenberg_marquardt](https://crates.io/crates/levenberg-marquardt/) crate.
//! 4. Call [`run`](crate::varpro::VariableProjection::run) and inspect the
//! [`FitReport`](crate::varpro::FitReport) and, if desired, the
//! [`ApproximationStatistics`](crate::statistics::ApproximationStatistics).
//!
//! # Example
//!
//! ```rust
//! use nalgebra::DVector;
//! use varpro_approx::prelude::*;
//! # fn approximate(signal: DVector<f64>) {
//! let samples = signal.len();
//! let mut engine = VarProBuilder::new(OrthonormalHermite::new(samples, 7))
//!     .signal(signal)
//!     // dilation and translation
//!     .nonlinear_parameters(DVector::from_vec(vec![0.5, samples as f64 / 2.]))
//!     .optimizer(Optimizer::LevenbergMarquardt)
//!     .max_iterations(50)
//!     .build()
//!     .expect("configuration is valid");
//! let report = engine.run().expect("approximation succeeds");
//! // the nonlinear parameters after the run
//! let alpha = &report.nonlinear_parameters;
//! // the coefficients of the basis functions
//! let c = &report.linear_parameters;
//! # }
//! ```
//!
//! # References and Further Reading
//! (Golub1973) Golub, G. H., Pereyra, V. The Differentiation of Pseudo-Inverses and Nonlinear
//! Least Squares Problems Whose Variables Separate. *SIAM J. Numer. Anal.* **10**, 413–432 (1973).
//!
//! (Golub2003) Golub, G. , Pereyra, V Separable nonlinear least squares: the variable projection method and its applications. Inverse Problems **19** R1 (2003) [https://iopscience.iop.org/article/10.1088/0266-5611/19/2/201](https://iopscience.iop.org/article/10.1088/0266-5611/19/2/201)

/// function systems whose columns span the approximation
pub mod function_system;
/// commonly useful imports
pub mod prelude;
/// the separable least squares problem for a fixed function system
pub mod problem;
/// strategies for the nonlinear minimization problem
pub mod solvers;
/// quality figures of an approximation
pub mod statistics;
/// weights and small matrix helpers
pub mod util;
/// the variable projection engine
pub mod varpro;

/// private module that contains helper functionality for linear algebra that is not yet
/// implemented in the nalgebra crate
mod linalg_helpers;

#[cfg(test)]
pub mod test_helpers;
