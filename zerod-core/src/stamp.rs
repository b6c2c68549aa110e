//! The local stamp contract every block fills in at assembly time.

use zerod_math::{Mat64, Vec64};

/// A block's local contribution to the global DAE `E*ydot + F*y + C = 0`.
///
/// Sized `num_equations x num_local_cols`, where `num_local_cols` is
/// `2 * wires.len() + num_internal_vars` (P, Q per wire, then internals).
/// The assembler scatters these into the global matrices using the
/// block's cached column-index array; the block itself never sees
/// global indices.
pub struct LocalStamp {
    pub e: Mat64,
    pub f: Mat64,
    /// Time-varying forcing written by `update_time` (once per outer
    /// step): `Qfunc(t)`, `Pfunc(t)`, `Pref(t)`, and similar. Persists
    /// across every Newton iterate of the step it was written in, since
    /// `update_solution` never touches it.
    pub c_time: Vec64,
    /// Nonlinear residual contribution written by `update_solution`
    /// every Newton iterate (e.g. the stenosis `|Q|Q` term). Cleared by
    /// `clear_nonlinear` before each call so stale iterates don't
    /// accumulate.
    pub c: Vec64,
    pub dc_dy: Mat64,
    pub dc_dydot: Mat64,
}

impl LocalStamp {
    pub fn zeros(num_equations: usize, num_local_cols: usize) -> Self {
        Self {
            e: Mat64::zeros(num_equations, num_local_cols),
            f: Mat64::zeros(num_equations, num_local_cols),
            c_time: Vec64::zeros(num_equations),
            c: Vec64::zeros(num_equations),
            dc_dy: Mat64::zeros(num_equations, num_local_cols),
            dc_dydot: Mat64::zeros(num_equations, num_local_cols),
        }
    }

    /// Clears only the per-iterate nonlinear parts (`C`, `dC/dy`,
    /// `dC/dydot`); `E`, `F`, and the time-forcing `c_time` are written
    /// once by `update_constant`/`update_time` and otherwise left
    /// untouched across Newton iterates.
    pub fn clear_nonlinear(&mut self) {
        self.c.fill(0.0);
        self.dc_dy.fill(0.0);
        self.dc_dydot.fill(0.0);
    }
}
