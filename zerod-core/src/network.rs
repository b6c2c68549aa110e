//! Wiring, global DOF assignment, and the dense assembler.

use crate::block::BlockKind;
use crate::error::ConfigError;
use crate::stamp::LocalStamp;
use crate::wire::Wire;
use std::collections::HashMap;
use zerod_math::{Mat64, Vec64};

/// A fully wired block graph: blocks, their shared wires, and the
/// cached index arrays each block needs to scatter its local stamp
/// into the global system.
pub struct Network {
    blocks: Vec<Box<dyn BlockKind>>,
    wires: Vec<Wire>,
    var_name_list: Vec<String>,
    neq: usize,
    row_offset: Vec<usize>,
    col_index: Vec<Vec<usize>>,
    stamps: Vec<LocalStamp>,
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("neq", &self.neq)
            .field("var_name_list", &self.var_name_list)
            .finish()
    }
}

fn wire_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl Network {
    /// Wires the block list and assigns global DOF indices. Blocks
    /// whose declared shapes (connecting-block count vs.
    /// flow-direction count, or internal-variable count vs. named
    /// internal count) disagree are rejected here, before any
    /// integration begins.
    pub fn build(blocks: Vec<Box<dyn BlockKind>>) -> Result<Self, ConfigError> {
        for b in &blocks {
            if b.connecting_blocks().len() != b.flow_directions().len() {
                return Err(ConfigError::new(format!(
                    "block '{}' has {} connecting blocks but {} flow directions",
                    b.name(),
                    b.connecting_blocks().len(),
                    b.flow_directions().len()
                )));
            }
            if b.internal_var_names().len() != b.num_internal_vars() {
                return Err(ConfigError::new(format!(
                    "block '{}' declares {} internal vars but names {}",
                    b.name(),
                    b.num_internal_vars(),
                    b.internal_var_names().len()
                )));
            }
            if b.num_equations() == 0 {
                return Err(ConfigError::new(format!(
                    "block '{}' contributes zero equations",
                    b.name()
                )));
            }
        }

        // Pass 1: create one wire per unordered (block, neighbor) pair, in
        // first-seen order (deterministic: iteration order of the block list).
        let mut wire_index: HashMap<(String, String), usize> = HashMap::new();
        let mut wires: Vec<Wire> = Vec::new();
        let mut next_dof = 0usize;
        for b in &blocks {
            for other in b.connecting_blocks() {
                let key = wire_key(b.name(), other);
                if wire_index.contains_key(&key) {
                    continue;
                }
                let idx = wires.len();
                wire_index.insert(key, idx);
                wires.push(Wire::new(b.name(), other.clone(), next_dof));
                next_dof += 2;
            }
        }

        // Pass 2: append internal DOFs, block by block.
        let mut internal_dof_start: Vec<usize> = Vec::with_capacity(blocks.len());
        for b in &blocks {
            internal_dof_start.push(next_dof);
            next_dof += b.num_internal_vars();
        }
        let neq = next_dof;

        // var_name_list: wires first (in creation order), then internals.
        let mut var_name_list = Vec::with_capacity(neq);
        for w in &wires {
            var_name_list.push(w.name_p());
            var_name_list.push(w.name_q());
        }
        for b in &blocks {
            var_name_list.extend(b.internal_var_names());
        }

        // Row offsets and per-block column-index arrays.
        let mut row_offset = Vec::with_capacity(blocks.len());
        let mut col_index = Vec::with_capacity(blocks.len());
        let mut row_cursor = 0usize;
        for (bi, b) in blocks.iter().enumerate() {
            row_offset.push(row_cursor);
            row_cursor += b.num_equations();

            let mut cols = Vec::with_capacity(2 * b.connecting_blocks().len() + b.num_internal_vars());
            for other in b.connecting_blocks() {
                let key = wire_key(b.name(), other);
                let widx = wire_index[&key];
                cols.push(wires[widx].dof_p);
                cols.push(wires[widx].dof_q());
            }
            for k in 0..b.num_internal_vars() {
                cols.push(internal_dof_start[bi] + k);
            }
            col_index.push(cols);
        }
        debug_assert_eq!(row_cursor, neq);

        let stamps = blocks
            .iter()
            .map(|b| LocalStamp::zeros(b.num_equations(), 2 * b.connecting_blocks().len() + b.num_internal_vars()))
            .collect();

        Ok(Self {
            blocks,
            wires,
            var_name_list,
            neq,
            row_offset,
            col_index,
            stamps,
        })
    }

    pub fn neq(&self) -> usize {
        self.neq
    }

    pub fn var_name_list(&self) -> &[String] {
        &self.var_name_list
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub fn blocks(&self) -> &[Box<dyn BlockKind>] {
        &self.blocks
    }

    pub fn block_by_name(&self, name: &str) -> Option<&dyn BlockKind> {
        self.blocks.iter().find(|b| b.name() == name).map(|b| b.as_ref())
    }

    /// Runs `update_constant` on every block, into their persistent
    /// local stamps.
    pub fn update_constant(&mut self) {
        for (b, stamp) in self.blocks.iter_mut().zip(self.stamps.iter_mut()) {
            b.update_constant(stamp);
        }
    }

    /// Runs `update_time` on every block, once per outer time step.
    pub fn update_time(&mut self, t: f64) {
        for (b, stamp) in self.blocks.iter_mut().zip(self.stamps.iter_mut()) {
            b.update_time(t, stamp);
        }
    }

    /// Runs `update_solution` on every block, once per Newton iterate.
    pub fn update_solution(&mut self, y: &Vec64, ydot: &Vec64) {
        for (bi, (b, stamp)) in self.blocks.iter_mut().zip(self.stamps.iter_mut()).enumerate() {
            stamp.clear_nonlinear();
            let cols = &self.col_index[bi];
            let y_local = Vec64::from_iterator(cols.len(), cols.iter().map(|&c| y[c]));
            let ydot_local = Vec64::from_iterator(cols.len(), cols.iter().map(|&c| ydot[c]));
            b.update_solution(&y_local, &ydot_local, stamp);
        }
    }

    /// Scatters every block's local stamp into the dense global
    /// matrices and residual vector.
    pub fn assemble(&self) -> (Mat64, Mat64, Vec64, Mat64, Mat64) {
        let n = self.neq;
        let mut e = Mat64::zeros(n, n);
        let mut f = Mat64::zeros(n, n);
        let mut c = Vec64::zeros(n);
        let mut dc_dy = Mat64::zeros(n, n);
        let mut dc_dydot = Mat64::zeros(n, n);

        for (bi, stamp) in self.stamps.iter().enumerate() {
            let r0 = self.row_offset[bi];
            let cols = &self.col_index[bi];
            let neq_b = stamp.c.len();
            for lr in 0..neq_b {
                let gr = r0 + lr;
                c[gr] += stamp.c_time[lr] + stamp.c[lr];
                for (lc, &gc) in cols.iter().enumerate() {
                    e[(gr, gc)] += stamp.e[(lr, lc)];
                    f[(gr, gc)] += stamp.f[(lr, lc)];
                    dc_dy[(gr, gc)] += stamp.dc_dy[(lr, lc)];
                    dc_dydot[(gr, gc)] += stamp.dc_dydot[(lr, lc)];
                }
            }
        }

        (e, f, c, dc_dy, dc_dydot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BloodVessel, UnsteadyFlowRef, UnsteadyResistanceWithDistalPressure};
    use zerod_math::BcValueFn;

    fn single_r_vessel_network() -> Network {
        let inlet: Box<dyn BlockKind> =
            Box::new(UnsteadyFlowRef::new("BC0_inlet", "V0", 1, BcValueFn::constant(100.0)));
        let vessel: Box<dyn BlockKind> =
            Box::new(BloodVessel::new("V0", "BC0_inlet", "BC0_outlet", 10.0, 0.0, 0.0, 0.0));
        let outlet: Box<dyn BlockKind> = Box::new(UnsteadyResistanceWithDistalPressure::new(
            "BC0_outlet",
            "V0",
            -1,
            BcValueFn::constant(1e-6),
            BcValueFn::constant(0.0),
        ));
        Network::build(vec![inlet, vessel, outlet]).unwrap()
    }

    #[test]
    fn wiring_produces_two_dofs_per_wire_and_matches_equation_count() {
        let net = single_r_vessel_network();
        assert_eq!(net.wires().len(), 2);
        assert_eq!(net.neq(), 4);
        assert_eq!(net.var_name_list().len(), 4);
    }

    #[test]
    fn var_name_list_uses_expected_prefixes() {
        let net = single_r_vessel_network();
        for name in net.var_name_list() {
            assert!(name.starts_with("P_") || name.starts_with("Q_"));
        }
    }

    #[test]
    fn rejects_mismatched_flow_direction_count() {
        struct Bad;
        impl BlockKind for Bad {
            fn name(&self) -> &str {
                "bad"
            }
            fn connecting_blocks(&self) -> &[String] {
                &[]
            }
            fn flow_directions(&self) -> &[i32] {
                &[1]
            }
            fn num_equations(&self) -> usize {
                1
            }
            fn update_constant(&mut self, _stamp: &mut LocalStamp) {}
            fn update_time(&mut self, _t: f64, _stamp: &mut LocalStamp) {}
            fn update_solution(&mut self, _y: &Vec64, _ydot: &Vec64, _stamp: &mut LocalStamp) {}
        }
        let err = Network::build(vec![Box::new(Bad)]).unwrap_err();
        assert!(err.to_string().contains("flow directions"));
    }
}
