//! Dense linear algebra helpers shared by the assembler and integrator.

use nalgebra::{DMatrix, DVector};
use std::fmt;

/// Column vector of solution degrees of freedom.
pub type Vec64 = DVector<f64>;
/// Dense square (or rectangular, for local stamps) matrix of `f64`.
pub type Mat64 = DMatrix<f64>;

/// Failure of the dense direct solve used by the Newton inner loop.
#[derive(Debug, Clone)]
pub struct SingularJacobianError {
    pub size: usize,
}

impl fmt::Display for SingularJacobianError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Jacobian of size {} is singular to working precision",
            self.size
        )
    }
}

impl std::error::Error for SingularJacobianError {}

/// Solves `a * x = b` with a dense LU decomposition with partial pivoting.
///
/// Returns `Err` when `a` is singular (or effectively so) rather than
/// silently returning `NaN`/`inf`-filled solutions, since a singular
/// Jacobian during Newton iteration means the step must abort.
pub fn solve_dense(a: &Mat64, b: &Vec64) -> Result<Vec64, SingularJacobianError> {
    a.clone().lu().solve(b).ok_or(SingularJacobianError { size: a.nrows() })
}

/// Infinity norm (`max |x_i|`) used throughout for convergence checks.
pub fn inf_norm(v: &Vec64) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}

/// Index (and value) of the element with the largest magnitude.
pub fn argmax_abs(v: &Vec64) -> (usize, f64) {
    let mut best_idx = 0;
    let mut best_val = 0.0_f64;
    for (i, x) in v.iter().enumerate() {
        if x.abs() > best_val {
            best_val = x.abs();
            best_idx = i;
        }
    }
    (best_idx, best_val)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_identity_system() {
        let a = Mat64::identity(3, 3);
        let b = Vec64::from_vec(vec![1.0, 2.0, 3.0]);
        let x = solve_dense(&a, &b).unwrap();
        assert_eq!(x, b);
    }

    #[test]
    fn flags_singular_matrix() {
        let a = Mat64::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let b = Vec64::from_vec(vec![1.0, 2.0]);
        assert!(solve_dense(&a, &b).is_err());
    }

    #[test]
    fn inf_norm_picks_largest_magnitude() {
        let v = Vec64::from_vec(vec![-5.0, 2.0, 4.0]);
        assert_eq!(inf_norm(&v), 5.0);
        assert_eq!(argmax_abs(&v), (0, 5.0));
    }
}
