//! Boundary-condition blocks: each terminates a single wire with a
//! prescribed (possibly time-varying) flow, pressure, resistance, or
//! Windkessel/coronary relation.

use super::BlockKind;
use crate::stamp::LocalStamp;
use zerod_math::{BcValueFn, Vec64};

/// Fixes `Q(t) = Qfunc(t)` on its one wire.
pub struct UnsteadyFlowRef {
    name: String,
    connecting_blocks: Vec<String>,
    flow_directions: Vec<i32>,
    q_func: BcValueFn,
    q_at_t: f64,
}

impl UnsteadyFlowRef {
    pub fn new(name: impl Into<String>, connecting_block: impl Into<String>, flow_direction: i32, q_func: BcValueFn) -> Self {
        Self {
            name: name.into(),
            connecting_blocks: vec![connecting_block.into()],
            flow_directions: vec![flow_direction],
            q_func,
            q_at_t: 0.0,
        }
    }
}

impl BlockKind for UnsteadyFlowRef {
    fn name(&self) -> &str {
        &self.name
    }
    fn connecting_blocks(&self) -> &[String] {
        &self.connecting_blocks
    }
    fn flow_directions(&self) -> &[i32] {
        &self.flow_directions
    }
    fn num_equations(&self) -> usize {
        1
    }
    fn update_constant(&mut self, stamp: &mut LocalStamp) {
        stamp.f[(0, 1)] += 1.0;
    }
    fn update_time(&mut self, t: f64, stamp: &mut LocalStamp) {
        self.q_at_t = self.q_func.eval(t);
        stamp.c_time[0] = -self.q_at_t;
    }
    fn update_solution(&mut self, _y_local: &Vec64, _ydot_local: &Vec64, _stamp: &mut LocalStamp) {}
}

/// Fixes `P(t) = Pfunc(t)` on its one wire.
pub struct UnsteadyPressureRef {
    name: String,
    connecting_blocks: Vec<String>,
    flow_directions: Vec<i32>,
    p_func: BcValueFn,
}

impl UnsteadyPressureRef {
    pub fn new(name: impl Into<String>, connecting_block: impl Into<String>, flow_direction: i32, p_func: BcValueFn) -> Self {
        Self {
            name: name.into(),
            connecting_blocks: vec![connecting_block.into()],
            flow_directions: vec![flow_direction],
            p_func,
        }
    }
}

impl BlockKind for UnsteadyPressureRef {
    fn name(&self) -> &str {
        &self.name
    }
    fn connecting_blocks(&self) -> &[String] {
        &self.connecting_blocks
    }
    fn flow_directions(&self) -> &[i32] {
        &self.flow_directions
    }
    fn num_equations(&self) -> usize {
        1
    }
    fn update_constant(&mut self, stamp: &mut LocalStamp) {
        stamp.f[(0, 0)] += 1.0;
    }
    fn update_time(&mut self, t: f64, stamp: &mut LocalStamp) {
        stamp.c_time[0] = -self.p_func.eval(t);
    }
    fn update_solution(&mut self, _y_local: &Vec64, _ydot_local: &Vec64, _stamp: &mut LocalStamp) {}
}

/// `P - Pref(t) = R(t) * Q` on its one wire.
pub struct UnsteadyResistanceWithDistalPressure {
    name: String,
    connecting_blocks: Vec<String>,
    flow_directions: Vec<i32>,
    r_func: BcValueFn,
    pref_func: BcValueFn,
}

impl UnsteadyResistanceWithDistalPressure {
    pub fn new(
        name: impl Into<String>,
        connecting_block: impl Into<String>,
        flow_direction: i32,
        r_func: BcValueFn,
        pref_func: BcValueFn,
    ) -> Self {
        Self {
            name: name.into(),
            connecting_blocks: vec![connecting_block.into()],
            flow_directions: vec![flow_direction],
            r_func,
            pref_func,
        }
    }
}

impl BlockKind for UnsteadyResistanceWithDistalPressure {
    fn name(&self) -> &str {
        &self.name
    }
    fn connecting_blocks(&self) -> &[String] {
        &self.connecting_blocks
    }
    fn flow_directions(&self) -> &[i32] {
        &self.flow_directions
    }
    fn num_equations(&self) -> usize {
        1
    }
    fn update_constant(&mut self, stamp: &mut LocalStamp) {
        stamp.f[(0, 0)] += 1.0;
    }
    fn update_time(&mut self, t: f64, stamp: &mut LocalStamp) {
        stamp.f[(0, 1)] = -self.r_func.eval(t);
        stamp.c_time[0] = -self.pref_func.eval(t);
    }
    fn update_solution(&mut self, _y_local: &Vec64, _ydot_local: &Vec64, _stamp: &mut LocalStamp) {}
}

/// Three-element Windkessel: `P - Pc = Rp*Q` and
/// `Q - (P - Pref)/Rd = C*Pc_dot`, with `Pc` an internal DOF.
pub struct UnsteadyRcrBlockWithDistalPressure {
    name: String,
    connecting_blocks: Vec<String>,
    flow_directions: Vec<i32>,
    rp_func: BcValueFn,
    c_func: BcValueFn,
    rd_func: BcValueFn,
    pref_func: BcValueFn,
    rd_at_t: f64,
    pref_at_t: f64,
}

impl UnsteadyRcrBlockWithDistalPressure {
    pub fn new(
        name: impl Into<String>,
        connecting_block: impl Into<String>,
        flow_direction: i32,
        rp_func: BcValueFn,
        c_func: BcValueFn,
        rd_func: BcValueFn,
        pref_func: BcValueFn,
    ) -> Self {
        Self {
            name: name.into(),
            connecting_blocks: vec![connecting_block.into()],
            flow_directions: vec![flow_direction],
            rp_func,
            c_func,
            rd_func,
            pref_func,
            rd_at_t: 0.0,
            pref_at_t: 0.0,
        }
    }
}

impl BlockKind for UnsteadyRcrBlockWithDistalPressure {
    fn name(&self) -> &str {
        &self.name
    }
    fn connecting_blocks(&self) -> &[String] {
        &self.connecting_blocks
    }
    fn flow_directions(&self) -> &[i32] {
        &self.flow_directions
    }
    fn num_equations(&self) -> usize {
        2
    }
    fn num_internal_vars(&self) -> usize {
        1
    }
    fn internal_var_names(&self) -> Vec<String> {
        vec![format!("var_0_{}", self.name)]
    }
    fn update_constant(&mut self, stamp: &mut LocalStamp) {
        // Local cols: [P(0), Q(1), Pc(2)].
        stamp.f[(0, 0)] += 1.0;
        stamp.f[(0, 2)] += -1.0;
        stamp.f[(1, 1)] += 1.0;
        stamp.e[(1, 2)] += -1.0; // coefficient on C is scaled in update_time
    }
    fn update_time(&mut self, t: f64, stamp: &mut LocalStamp) {
        let rp = self.rp_func.eval(t);
        let c = self.c_func.eval(t);
        self.rd_at_t = self.rd_func.eval(t);
        self.pref_at_t = self.pref_func.eval(t);
        stamp.f[(0, 1)] = -rp;
        stamp.f[(1, 0)] = -1.0 / self.rd_at_t;
        stamp.e[(1, 2)] = -c;
        stamp.c_time[1] = self.pref_at_t / self.rd_at_t;
    }
    fn update_solution(&mut self, _y_local: &Vec64, _ydot_local: &Vec64, _stamp: &mut LocalStamp) {}
}

/// Kim et al. two-compartment coronary boundary condition: an aortic-side
/// capacitor (`Ra`, `Ca`) in series with a myocardial-side compartment
/// (`Ram`, `Cim`, forced by `Pim(t)`) draining through `Rv` to `Pv(t)`.
pub struct OpenLoopCoronaryWithDistalPressureBlock {
    name: String,
    connecting_blocks: Vec<String>,
    flow_directions: Vec<i32>,
    pub ra: f64,
    pub ca: f64,
    pub ram: f64,
    pub cim: f64,
    pub rv: f64,
    pim_func: BcValueFn,
    pv_func: BcValueFn,
}

impl OpenLoopCoronaryWithDistalPressureBlock {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        connecting_block: impl Into<String>,
        flow_direction: i32,
        ra: f64,
        ca: f64,
        ram: f64,
        cim: f64,
        rv: f64,
        pim_func: BcValueFn,
        pv_func: BcValueFn,
    ) -> Self {
        Self {
            name: name.into(),
            connecting_blocks: vec![connecting_block.into()],
            flow_directions: vec![flow_direction],
            ra,
            ca,
            ram,
            cim,
            rv,
            pim_func,
            pv_func,
        }
    }
}

impl BlockKind for OpenLoopCoronaryWithDistalPressureBlock {
    fn name(&self) -> &str {
        &self.name
    }
    fn connecting_blocks(&self) -> &[String] {
        &self.connecting_blocks
    }
    fn flow_directions(&self) -> &[i32] {
        &self.flow_directions
    }
    fn num_equations(&self) -> usize {
        3
    }
    fn num_internal_vars(&self) -> usize {
        2
    }
    fn internal_var_names(&self) -> Vec<String> {
        vec![format!("var_0_{}", self.name), format!("var_1_{}", self.name)]
    }
    fn update_constant(&mut self, stamp: &mut LocalStamp) {
        // Local cols: [P(0), Q(1), Pa(2), Pimc(3)].
        stamp.f[(0, 0)] += 1.0;
        stamp.f[(0, 1)] += -self.ra;
        stamp.f[(0, 2)] += -1.0;

        stamp.e[(1, 2)] += self.ca;
        stamp.f[(1, 1)] += -1.0;
        stamp.f[(1, 2)] += 1.0 / self.ram;
        stamp.f[(1, 3)] += -1.0 / self.ram;

        stamp.e[(2, 3)] += self.cim;
        stamp.f[(2, 2)] += -1.0 / self.ram;
        stamp.f[(2, 3)] += 1.0 / self.ram + 1.0 / self.rv;
    }
    fn update_time(&mut self, t: f64, stamp: &mut LocalStamp) {
        let pim_dot = self.pim_func.eval_derivative(t);
        let pv = self.pv_func.eval(t);
        stamp.c_time[2] = -self.cim * pim_dot - pv / self.rv;
    }
    fn update_solution(&mut self, _y_local: &Vec64, _ydot_local: &Vec64, _stamp: &mut LocalStamp) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_ref_fixes_q_to_the_lookup_value() {
        let mut bc = UnsteadyFlowRef::new("BC0_inlet", "V0", 1, BcValueFn::constant(7.5));
        let mut stamp = LocalStamp::zeros(1, 2);
        bc.update_constant(&mut stamp);
        bc.update_time(0.3, &mut stamp);
        assert_eq!(stamp.f[(0, 1)], 1.0);
        assert_eq!(stamp.c_time[0], -7.5);
    }

    #[test]
    fn flow_ref_forcing_survives_clear_nonlinear() {
        // update_time runs once per step; clear_nonlinear runs every
        // Newton iterate and must not wipe the time-forcing it wrote.
        let mut bc = UnsteadyFlowRef::new("BC0_inlet", "V0", 1, BcValueFn::constant(7.5));
        let mut stamp = LocalStamp::zeros(1, 2);
        bc.update_constant(&mut stamp);
        bc.update_time(0.3, &mut stamp);
        stamp.clear_nonlinear();
        stamp.clear_nonlinear();
        assert_eq!(stamp.c_time[0], -7.5);
    }

    #[test]
    fn rcr_row_one_couples_capacitor_to_distal_pressure() {
        let mut bc = UnsteadyRcrBlockWithDistalPressure::new(
            "BC0_outlet",
            "V0",
            -1,
            BcValueFn::constant(1.0),
            BcValueFn::constant(1e-3),
            BcValueFn::constant(9.0),
            BcValueFn::constant(0.0),
        );
        let mut stamp = LocalStamp::zeros(2, 3);
        bc.update_constant(&mut stamp);
        bc.update_time(0.0, &mut stamp);
        assert_eq!(stamp.f[(1, 0)], -1.0 / 9.0);
        assert_eq!(stamp.e[(1, 2)], -1e-3);
    }
}
