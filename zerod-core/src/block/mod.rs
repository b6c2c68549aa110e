//! The block library: the closed set of built-in 0D element kinds plus
//! the `BlockKind` trait that lets a consumer drive a custom element
//! through the same integrator.

mod bc;
mod junction;
mod vessel;

pub use bc::{
    OpenLoopCoronaryWithDistalPressureBlock, UnsteadyFlowRef, UnsteadyPressureRef,
    UnsteadyRcrBlockWithDistalPressure, UnsteadyResistanceWithDistalPressure,
};
pub use junction::{BloodVesselJunction, InternalJunction};
pub use vessel::BloodVessel;

use crate::stamp::LocalStamp;
use zerod_math::Vec64;

/// The three hooks every block (built-in or custom) must implement.
///
/// - `update_constant` runs once, right after DOF assignment, and fills
///   the parts of `E`/`F` that never change.
/// - `update_time` runs once per outer time step and fills parts that
///   depend on `t` alone (boundary-condition lookups).
/// - `update_solution` runs once per Newton iterate and fills the
///   nonlinear residual `C` and its Jacobians.
///
/// A block's `num_equations` must be stable for the lifetime of a run.
pub trait BlockKind {
    fn name(&self) -> &str;
    /// Names of the blocks this one connects to, in wire order.
    fn connecting_blocks(&self) -> &[String];
    /// Sign of each connecting wire's flow contribution to this block's
    /// mass-conservation row(s): `+1` if flow enters the block through
    /// that wire, `-1` if it exits.
    fn flow_directions(&self) -> &[i32];
    fn num_equations(&self) -> usize;
    fn num_internal_vars(&self) -> usize {
        0
    }
    /// Symbolic names for this block's internal DOFs, e.g. `var_0_<name>`.
    fn internal_var_names(&self) -> Vec<String> {
        Vec::new()
    }
    fn update_constant(&mut self, stamp: &mut LocalStamp);
    fn update_time(&mut self, t: f64, stamp: &mut LocalStamp);
    fn update_solution(&mut self, y_local: &Vec64, ydot_local: &Vec64, stamp: &mut LocalStamp);
}

/// The closed set of built-in element kinds, dispatched by `match`
/// rather than a registry lookup. Custom element kinds implement
/// `BlockKind` directly and are stored alongside these in a network's
/// block list without being a variant of this enum.
pub enum Block {
    InternalJunction(InternalJunction),
    BloodVesselJunction(BloodVesselJunction),
    BloodVessel(BloodVessel),
    UnsteadyFlowRef(UnsteadyFlowRef),
    UnsteadyPressureRef(UnsteadyPressureRef),
    UnsteadyResistanceWithDistalPressure(UnsteadyResistanceWithDistalPressure),
    UnsteadyRcrBlockWithDistalPressure(UnsteadyRcrBlockWithDistalPressure),
    OpenLoopCoronaryWithDistalPressure(OpenLoopCoronaryWithDistalPressureBlock),
}

impl BlockKind for Block {
    fn name(&self) -> &str {
        match self {
            Block::InternalJunction(b) => b.name(),
            Block::BloodVesselJunction(b) => b.name(),
            Block::BloodVessel(b) => b.name(),
            Block::UnsteadyFlowRef(b) => b.name(),
            Block::UnsteadyPressureRef(b) => b.name(),
            Block::UnsteadyResistanceWithDistalPressure(b) => b.name(),
            Block::UnsteadyRcrBlockWithDistalPressure(b) => b.name(),
            Block::OpenLoopCoronaryWithDistalPressure(b) => b.name(),
        }
    }

    fn connecting_blocks(&self) -> &[String] {
        match self {
            Block::InternalJunction(b) => b.connecting_blocks(),
            Block::BloodVesselJunction(b) => b.connecting_blocks(),
            Block::BloodVessel(b) => b.connecting_blocks(),
            Block::UnsteadyFlowRef(b) => b.connecting_blocks(),
            Block::UnsteadyPressureRef(b) => b.connecting_blocks(),
            Block::UnsteadyResistanceWithDistalPressure(b) => b.connecting_blocks(),
            Block::UnsteadyRcrBlockWithDistalPressure(b) => b.connecting_blocks(),
            Block::OpenLoopCoronaryWithDistalPressure(b) => b.connecting_blocks(),
        }
    }

    fn flow_directions(&self) -> &[i32] {
        match self {
            Block::InternalJunction(b) => b.flow_directions(),
            Block::BloodVesselJunction(b) => b.flow_directions(),
            Block::BloodVessel(b) => b.flow_directions(),
            Block::UnsteadyFlowRef(b) => b.flow_directions(),
            Block::UnsteadyPressureRef(b) => b.flow_directions(),
            Block::UnsteadyResistanceWithDistalPressure(b) => b.flow_directions(),
            Block::UnsteadyRcrBlockWithDistalPressure(b) => b.flow_directions(),
            Block::OpenLoopCoronaryWithDistalPressure(b) => b.flow_directions(),
        }
    }

    fn num_equations(&self) -> usize {
        match self {
            Block::InternalJunction(b) => b.num_equations(),
            Block::BloodVesselJunction(b) => b.num_equations(),
            Block::BloodVessel(b) => b.num_equations(),
            Block::UnsteadyFlowRef(b) => b.num_equations(),
            Block::UnsteadyPressureRef(b) => b.num_equations(),
            Block::UnsteadyResistanceWithDistalPressure(b) => b.num_equations(),
            Block::UnsteadyRcrBlockWithDistalPressure(b) => b.num_equations(),
            Block::OpenLoopCoronaryWithDistalPressure(b) => b.num_equations(),
        }
    }

    fn num_internal_vars(&self) -> usize {
        match self {
            Block::InternalJunction(b) => b.num_internal_vars(),
            Block::BloodVesselJunction(b) => b.num_internal_vars(),
            Block::BloodVessel(b) => b.num_internal_vars(),
            Block::UnsteadyFlowRef(b) => b.num_internal_vars(),
            Block::UnsteadyPressureRef(b) => b.num_internal_vars(),
            Block::UnsteadyResistanceWithDistalPressure(b) => b.num_internal_vars(),
            Block::UnsteadyRcrBlockWithDistalPressure(b) => b.num_internal_vars(),
            Block::OpenLoopCoronaryWithDistalPressure(b) => b.num_internal_vars(),
        }
    }

    fn internal_var_names(&self) -> Vec<String> {
        match self {
            Block::InternalJunction(b) => b.internal_var_names(),
            Block::BloodVesselJunction(b) => b.internal_var_names(),
            Block::BloodVessel(b) => b.internal_var_names(),
            Block::UnsteadyFlowRef(b) => b.internal_var_names(),
            Block::UnsteadyPressureRef(b) => b.internal_var_names(),
            Block::UnsteadyResistanceWithDistalPressure(b) => b.internal_var_names(),
            Block::UnsteadyRcrBlockWithDistalPressure(b) => b.internal_var_names(),
            Block::OpenLoopCoronaryWithDistalPressure(b) => b.internal_var_names(),
        }
    }

    fn update_constant(&mut self, stamp: &mut LocalStamp) {
        match self {
            Block::InternalJunction(b) => b.update_constant(stamp),
            Block::BloodVesselJunction(b) => b.update_constant(stamp),
            Block::BloodVessel(b) => b.update_constant(stamp),
            Block::UnsteadyFlowRef(b) => b.update_constant(stamp),
            Block::UnsteadyPressureRef(b) => b.update_constant(stamp),
            Block::UnsteadyResistanceWithDistalPressure(b) => b.update_constant(stamp),
            Block::UnsteadyRcrBlockWithDistalPressure(b) => b.update_constant(stamp),
            Block::OpenLoopCoronaryWithDistalPressure(b) => b.update_constant(stamp),
        }
    }

    fn update_time(&mut self, t: f64, stamp: &mut LocalStamp) {
        match self {
            Block::InternalJunction(b) => b.update_time(t, stamp),
            Block::BloodVesselJunction(b) => b.update_time(t, stamp),
            Block::BloodVessel(b) => b.update_time(t, stamp),
            Block::UnsteadyFlowRef(b) => b.update_time(t, stamp),
            Block::UnsteadyPressureRef(b) => b.update_time(t, stamp),
            Block::UnsteadyResistanceWithDistalPressure(b) => b.update_time(t, stamp),
            Block::UnsteadyRcrBlockWithDistalPressure(b) => b.update_time(t, stamp),
            Block::OpenLoopCoronaryWithDistalPressure(b) => b.update_time(t, stamp),
        }
    }

    fn update_solution(&mut self, y_local: &Vec64, ydot_local: &Vec64, stamp: &mut LocalStamp) {
        match self {
            Block::InternalJunction(b) => b.update_solution(y_local, ydot_local, stamp),
            Block::BloodVesselJunction(b) => b.update_solution(y_local, ydot_local, stamp),
            Block::BloodVessel(b) => b.update_solution(y_local, ydot_local, stamp),
            Block::UnsteadyFlowRef(b) => b.update_solution(y_local, ydot_local, stamp),
            Block::UnsteadyPressureRef(b) => b.update_solution(y_local, ydot_local, stamp),
            Block::UnsteadyResistanceWithDistalPressure(b) => {
                b.update_solution(y_local, ydot_local, stamp)
            }
            Block::UnsteadyRcrBlockWithDistalPressure(b) => {
                b.update_solution(y_local, ydot_local, stamp)
            }
            Block::OpenLoopCoronaryWithDistalPressure(b) => {
                b.update_solution(y_local, ydot_local, stamp)
            }
        }
    }
}

impl Block {
    /// `true` for block kinds that introduce a capacitor-bearing
    /// internal DOF whose steady-state value must be restored after
    /// the steady-BC prelude (SPEC_FULL.md 4.5).
    pub fn has_capacitor_state(&self) -> bool {
        matches!(
            self,
            Block::BloodVessel(b) if b.has_capacitor()
        ) || matches!(
            self,
            Block::UnsteadyRcrBlockWithDistalPressure(_) | Block::OpenLoopCoronaryWithDistalPressure(_)
        )
    }

}
