pub use crate::function_system::hermite::OrthonormalHermite;
pub use crate::function_system::{FunctionSystem, FunctionSystemDerivative, OrthogonalPolynomial};
pub use crate::solvers::{Bounds, CancellationToken, OptimizationStrategy, Optimizer};
pub use crate::util::Weights;
pub use crate::varpro::{FitReport, VarProBuilder, VarProError, VariableProjection};
