//! Junction blocks: mass conservation and pressure continuity (or, for
//! a `BloodVesselJunction`, a per-branch Poiseuille loss) at a network
//! node joining two or more wires.

use super::BlockKind;
use crate::stamp::LocalStamp;
use zerod_math::Vec64;

/// Mass conservation and pressure equality across `N` wires: `N-1`
/// pressure-equality rows plus one `sum(s_i * Q_i) = 0` row.
pub struct InternalJunction {
    name: String,
    connecting_blocks: Vec<String>,
    flow_directions: Vec<i32>,
}

impl InternalJunction {
    pub fn new(name: impl Into<String>, connecting_blocks: Vec<String>, flow_directions: Vec<i32>) -> Self {
        assert_eq!(connecting_blocks.len(), flow_directions.len());
        Self {
            name: name.into(),
            connecting_blocks,
            flow_directions,
        }
    }
}

impl BlockKind for InternalJunction {
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
        self.connecting_blocks.len()
    }

    fn update_constant(&mut self, stamp: &mut LocalStamp) {
        let n = self.connecting_blocks.len();
        // Columns: wire i occupies local cols [2i, 2i+1] = [P_i, Q_i].
        for i in 1..n {
            stamp.f[(i - 1, 0)] += 1.0;
            stamp.f[(i - 1, 2 * i)] += -1.0;
        }
        let mass_row = n - 1;
        for (i, &sign) in self.flow_directions.iter().enumerate() {
            stamp.f[(mass_row, 2 * i + 1)] += sign as f64;
        }
    }

    fn update_time(&mut self, _t: f64, _stamp: &mut LocalStamp) {}

    fn update_solution(&mut self, _y_local: &Vec64, _ydot_local: &Vec64, _stamp: &mut LocalStamp) {}
}

/// Like `InternalJunction`, but each outlet branch `j` carries a
/// Poiseuille-like resistive loss `P_in - P_out_j = R_j * Q_out_j`
/// instead of a plain pressure equality.
pub struct BloodVesselJunction {
    name: String,
    connecting_blocks: Vec<String>,
    flow_directions: Vec<i32>,
    /// Number of incoming wires (a prefix of `connecting_blocks`); the
    /// remainder are outlets, each with an entry in `outlet_resistance`.
    num_inlets: usize,
    outlet_resistance: Vec<f64>,
}

impl BloodVesselJunction {
    pub fn new(
        name: impl Into<String>,
        connecting_blocks: Vec<String>,
        flow_directions: Vec<i32>,
        num_inlets: usize,
        outlet_resistance: Vec<f64>,
    ) -> Self {
        assert_eq!(connecting_blocks.len(), flow_directions.len());
        assert_eq!(connecting_blocks.len() - num_inlets, outlet_resistance.len());
        Self {
            name: name.into(),
            connecting_blocks,
            flow_directions,
            num_inlets,
            outlet_resistance,
        }
    }
}

impl BlockKind for BloodVesselJunction {
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
        self.connecting_blocks.len()
    }

    fn update_constant(&mut self, stamp: &mut LocalStamp) {
        let n_in = self.num_inlets;
        let n = self.connecting_blocks.len();
        let mut row = 0;
        for i in 1..n_in {
            stamp.f[(row, 0)] += 1.0;
            stamp.f[(row, 2 * i)] += -1.0;
            row += 1;
        }
        for (j, &r) in self.outlet_resistance.iter().enumerate() {
            let outlet_idx = n_in + j;
            stamp.f[(row, 0)] += 1.0;
            stamp.f[(row, 2 * outlet_idx)] += -1.0;
            stamp.f[(row, 2 * outlet_idx + 1)] += -r;
            row += 1;
        }
        let mass_row = n - 1;
        for (i, &sign) in self.flow_directions.iter().enumerate() {
            stamp.f[(mass_row, 2 * i + 1)] += sign as f64;
        }
    }

    fn update_time(&mut self, _t: f64, _stamp: &mut LocalStamp) {}

    fn update_solution(&mut self, _y_local: &Vec64, _ydot_local: &Vec64, _stamp: &mut LocalStamp) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mass_conservation_row_signs_match_flow_directions() {
        let mut j = InternalJunction::new(
            "J0",
            vec!["V0".into(), "V1".into(), "V2".into()],
            vec![1, -1, -1],
        );
        let mut stamp = LocalStamp::zeros(3, 6);
        j.update_constant(&mut stamp);
        assert_eq!(stamp.f[(2, 1)], 1.0);
        assert_eq!(stamp.f[(2, 3)], -1.0);
        assert_eq!(stamp.f[(2, 5)], -1.0);
        assert_eq!(stamp.f[(0, 0)], 1.0);
        assert_eq!(stamp.f[(0, 2)], -1.0);
    }
}
