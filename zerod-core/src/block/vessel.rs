//! The `BloodVessel` block: a resistor-capacitor-inductor-stenosis
//! lumped segment between an inlet and an outlet wire.

use super::BlockKind;
use crate::stamp::LocalStamp;
use zerod_math::Vec64;

/// Local column layout: `[P_in, Q_in, P_out, Q_out]`, plus `Pc` at
/// column 4 when `capacitance != 0`.
pub struct BloodVessel {
    name: String,
    connecting_blocks: Vec<String>,
    flow_directions: Vec<i32>,
    pub resistance: f64,
    pub capacitance: f64,
    pub inductance: f64,
    pub stenosis_coefficient: f64,
}

impl BloodVessel {
    pub fn new(
        name: impl Into<String>,
        inlet_block: impl Into<String>,
        outlet_block: impl Into<String>,
        resistance: f64,
        capacitance: f64,
        inductance: f64,
        stenosis_coefficient: f64,
    ) -> Self {
        Self {
            name: name.into(),
            connecting_blocks: vec![inlet_block.into(), outlet_block.into()],
            flow_directions: vec![1, -1],
            resistance,
            capacitance,
            inductance,
            stenosis_coefficient,
        }
    }

    pub fn has_capacitor(&self) -> bool {
        self.capacitance != 0.0
    }
}

impl BlockKind for BloodVessel {
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
        if self.has_capacitor() {
            1
        } else {
            0
        }
    }

    fn internal_var_names(&self) -> Vec<String> {
        if self.has_capacitor() {
            vec![format!("var_0_{}", self.name)]
        } else {
            Vec::new()
        }
    }

    fn update_constant(&mut self, stamp: &mut LocalStamp) {
        // P_in - P_out - R * Q_in [- L * Qdot_in - stenosis term] = 0
        stamp.f[(0, 0)] += 1.0; // P_in
        stamp.f[(0, 2)] += -1.0; // P_out
        stamp.f[(0, 1)] += -self.resistance; // Q_in
        stamp.e[(0, 1)] += -self.inductance; // Qdot_in

        // Mass continuity through the segment: Q_in - Q_out [- C * Pc_dot] = 0.
        // Without a capacitor this is a plain equality; with one, the
        // capacitor's own charge/discharge current accounts for the
        // difference between inflow and outflow.
        stamp.f[(1, 1)] += 1.0; // Q_in
        stamp.f[(1, 3)] += -1.0; // Q_out
        if self.has_capacitor() {
            stamp.e[(1, 4)] += -self.capacitance; // Pc_dot
        }
    }

    fn update_time(&mut self, _t: f64, _stamp: &mut LocalStamp) {}

    fn update_solution(&mut self, y_local: &Vec64, _ydot_local: &Vec64, stamp: &mut LocalStamp) {
        if self.stenosis_coefficient == 0.0 {
            return;
        }
        let q_in = y_local[1];
        stamp.c[0] += -self.stenosis_coefficient * q_in.abs() * q_in;
        stamp.dc_dy[(0, 1)] += -self.stenosis_coefficient * 2.0 * q_in.abs();
    }
}
