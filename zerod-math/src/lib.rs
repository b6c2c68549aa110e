//! Numerics foundation for the 0D hemodynamics solver: dense linear
//! algebra wrappers and periodic cubic-spline boundary condition lookups.

pub mod linalg;
pub mod spline;

pub use linalg::{argmax_abs, inf_norm, solve_dense, Mat64, SingularJacobianError, Vec64};
pub use spline::{BcTableError, BcValueFn, PeriodicCubicSpline};
