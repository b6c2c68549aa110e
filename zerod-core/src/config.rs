//! JSON input schema and block-graph construction.
//!
//! Deserialization mirrors the field names of the existing 0D solver
//! input format exactly, so existing model files stay loadable.

use crate::block::{
    Block, BloodVessel, BloodVesselJunction, InternalJunction, OpenLoopCoronaryWithDistalPressureBlock,
    UnsteadyFlowRef, UnsteadyPressureRef, UnsteadyRcrBlockWithDistalPressure, UnsteadyResistanceWithDistalPressure,
};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use zerod_math::BcValueFn;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SimulationParametersConfig {
    pub number_of_cardiac_cycles: usize,
    pub number_of_time_pts_per_cardiac_cycle: usize,
    #[serde(default)]
    pub cardiac_cycle_period: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct VesselElementValues {
    #[serde(default, rename = "R_poiseuille")]
    pub r_poiseuille: f64,
    #[serde(default)]
    pub c: f64,
    #[serde(default)]
    pub l: f64,
    #[serde(default)]
    pub stenosis_coefficient: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct VesselBcMap {
    #[serde(default)]
    pub inlet: Option<String>,
    #[serde(default)]
    pub outlet: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VesselConfig {
    pub vessel_id: u64,
    pub vessel_name: String,
    #[serde(default)]
    pub vessel_length: f64,
    pub zero_d_element_type: String,
    #[serde(default)]
    pub zero_d_element_values: VesselElementValues,
    #[serde(default)]
    pub boundary_conditions: VesselBcMap,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct JunctionValues {
    #[serde(default, rename = "R_poiseuille")]
    pub r_poiseuille: Vec<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JunctionConfig {
    pub junction_name: String,
    pub junction_type: String,
    pub inlet_vessels: Vec<u64>,
    pub outlet_vessels: Vec<u64>,
    #[serde(default)]
    pub junction_values: Option<JunctionValues>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "bc_type", content = "bc_values")]
pub enum BcValues {
    RESISTANCE {
        #[serde(rename = "R")]
        r: f64,
        #[serde(rename = "Pd")]
        pd: f64,
    },
    RCR {
        #[serde(rename = "Rp")]
        rp: f64,
        #[serde(rename = "C")]
        c: f64,
        #[serde(rename = "Rd")]
        rd: f64,
        #[serde(rename = "Pd")]
        pd: f64,
    },
    FLOW {
        t: Vec<f64>,
        #[serde(rename = "Q")]
        q: Vec<f64>,
    },
    PRESSURE {
        t: Vec<f64>,
        #[serde(rename = "P")]
        p: Vec<f64>,
    },
    CORONARY {
        #[serde(rename = "Ra1")]
        ra1: f64,
        #[serde(rename = "Ra2")]
        ra2: f64,
        #[serde(rename = "Ca")]
        ca: f64,
        #[serde(rename = "Cc")]
        cc: f64,
        #[serde(rename = "Rv1")]
        rv1: f64,
        #[serde(rename = "P_v")]
        p_v: f64,
        t: Vec<f64>,
        #[serde(rename = "Pim")]
        pim: Vec<f64>,
    },
}

impl BcValues {
    /// The time span covered by this BC's own series, if it has one.
    fn period(&self) -> Option<f64> {
        match self {
            BcValues::FLOW { t, .. } | BcValues::PRESSURE { t, .. } => t.last().map(|last| last - t[0]),
            BcValues::CORONARY { t, .. } => t.last().map(|last| last - t[0]),
            _ => None,
        }
    }

    /// Collapses any time-series field to its period mean, producing a
    /// steady (constant-equivalent) boundary condition. Used by the
    /// steady-BC prelude; `RESISTANCE`/`RCR` are already constant.
    fn to_steady_mean(&self) -> Self {
        match self {
            BcValues::FLOW { t, q } => {
                let mean = BcValueFn::from_table(t, q).map(|f| f.mean_value(400)).unwrap_or(q[0]);
                BcValues::FLOW { t: t.clone(), q: vec![mean; t.len()] }
            }
            BcValues::PRESSURE { t, p } => {
                let mean = BcValueFn::from_table(t, p).map(|f| f.mean_value(400)).unwrap_or(p[0]);
                BcValues::PRESSURE { t: t.clone(), p: vec![mean; t.len()] }
            }
            BcValues::CORONARY { ra1, ra2, ca, cc, rv1, p_v, t, pim } => {
                let mean = BcValueFn::from_table(t, pim).map(|f| f.mean_value(400)).unwrap_or(pim[0]);
                BcValues::CORONARY {
                    ra1: *ra1,
                    ra2: *ra2,
                    ca: *ca,
                    cc: *cc,
                    rv1: *rv1,
                    p_v: *p_v,
                    t: t.clone(),
                    pim: vec![mean; t.len()],
                }
            }
            other => other.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BoundaryConditionConfig {
    pub bc_name: String,
    #[serde(flatten)]
    pub values: BcValues,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SimulationConfig {
    pub simulation_parameters: SimulationParametersConfig,
    pub vessels: Vec<VesselConfig>,
    #[serde(default)]
    pub junctions: Vec<JunctionConfig>,
    #[serde(default)]
    pub boundary_conditions: Vec<BoundaryConditionConfig>,
}

/// A vessel's resolved upstream/downstream neighbor names, keyed by
/// role rather than by the order in which the config mentions them.
#[derive(Default)]
struct VesselEnds {
    inlet: Option<String>,
    outlet: Option<String>,
}

impl VesselEnds {
    fn set_inlet(&mut self, vessel_id: u64, name: &str) -> Result<(), ConfigError> {
        if let Some(existing) = &self.inlet {
            return Err(ConfigError::new(format!(
                "vessel {} has two inlet connections ('{}' and '{}')",
                vessel_id, existing, name
            )));
        }
        self.inlet = Some(name.to_string());
        Ok(())
    }

    fn set_outlet(&mut self, vessel_id: u64, name: &str) -> Result<(), ConfigError> {
        if let Some(existing) = &self.outlet {
            return Err(ConfigError::new(format!(
                "vessel {} has two outlet connections ('{}' and '{}')",
                vessel_id, existing, name
            )));
        }
        self.outlet = Some(name.to_string());
        Ok(())
    }
}

/// Derived, fixed time-stepping parameters for one run.
#[derive(Debug, Clone, Copy)]
pub struct SolverParameters {
    pub dt: f64,
    pub total_steps: usize,
    pub cardiac_cycle_period: f64,
    pub number_of_time_pts_per_cardiac_cycle: usize,
}

impl SimulationConfig {
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::new(format!("cannot read input file {}: {}", path.display(), e)))?;
        serde_json::from_str(&text).map_err(|e| ConfigError::new(format!("malformed input JSON: {}", e)))
    }

    /// Cardiac-cycle period rule: every time-series BC must span the
    /// same period; the first one seen fixes it if none is prescribed.
    pub fn derive_solver_parameters(&self) -> Result<SolverParameters, ConfigError> {
        let mut period = self.simulation_parameters.cardiac_cycle_period;
        for bc in &self.boundary_conditions {
            if let Some(p) = bc.values.period() {
                match period {
                    None => period = Some(p),
                    Some(existing) if (existing - p).abs() > 1e-9 => {
                        return Err(ConfigError::new(format!(
                            "boundary condition '{}' has period {} but the run's cardiac cycle period is {}",
                            bc.bc_name, p, existing
                        )));
                    }
                    _ => {}
                }
            }
        }
        let period = period.unwrap_or(1.0);
        let pts = self.simulation_parameters.number_of_time_pts_per_cardiac_cycle;
        if pts < 2 {
            return Err(ConfigError::new("number_of_time_pts_per_cardiac_cycle must be >= 2"));
        }
        let dt = period / ((pts - 1) as f64);
        let total_steps = (pts - 1) * self.simulation_parameters.number_of_cardiac_cycles + 1;
        Ok(SolverParameters {
            dt,
            total_steps,
            cardiac_cycle_period: period,
            number_of_time_pts_per_cardiac_cycle: pts,
        })
    }

    /// A deep copy with every unsteady boundary condition collapsed to
    /// its cycle mean, and the coarse 11-point/3-cycle override applied
    /// — the model the steady-BC prelude actually integrates.
    pub fn to_steady_mean(&self) -> Self {
        let mut mean = self.clone();
        for bc in &mut mean.boundary_conditions {
            bc.values = bc.values.to_steady_mean();
        }
        mean.simulation_parameters.number_of_time_pts_per_cardiac_cycle = 11;
        mean.simulation_parameters.number_of_cardiac_cycles = 3;
        mean
    }

    /// Builds the full block set: junctions, vessels, and boundary
    /// conditions, wired exactly as `build_network` expects (every
    /// block lists the names of the blocks it connects to).
    pub fn build_blocks(&self) -> Result<Vec<Block>, ConfigError> {
        let mut blocks = Vec::new();

        // Resolve each vessel's true inlet/outlet neighbor by role, not by
        // the order in which the config happens to mention them: a vessel
        // listed as a junction's inlet_vessel has that junction as its
        // *outlet* (flow runs vessel -> junction), and vice versa.
        let mut vessel_ends: HashMap<u64, VesselEnds> =
            self.vessels.iter().map(|v| (v.vessel_id, VesselEnds::default())).collect();

        for junction in &self.junctions {
            for &vid in &junction.inlet_vessels {
                let ends = vessel_ends
                    .get_mut(&vid)
                    .ok_or_else(|| ConfigError::new(format!("junction '{}' references unknown vessel {}", junction.junction_name, vid)))?;
                ends.set_outlet(vid, &junction.junction_name)?;
            }
            for &vid in &junction.outlet_vessels {
                let ends = vessel_ends
                    .get_mut(&vid)
                    .ok_or_else(|| ConfigError::new(format!("junction '{}' references unknown vessel {}", junction.junction_name, vid)))?;
                ends.set_inlet(vid, &junction.junction_name)?;
            }
        }

        let bc_by_name: HashMap<&str, &BoundaryConditionConfig> =
            self.boundary_conditions.iter().map(|b| (b.bc_name.as_str(), b)).collect();

        for v in &self.vessels {
            let ends = vessel_ends.get_mut(&v.vessel_id).unwrap();
            if let Some(bc_name) = &v.boundary_conditions.inlet {
                if !bc_by_name.contains_key(bc_name.as_str()) {
                    return Err(ConfigError::new(format!("vessel {} references unknown boundary condition '{}'", v.vessel_id, bc_name)));
                }
                ends.set_inlet(v.vessel_id, &format!("BC{}_inlet", v.vessel_id))?;
            }
            if let Some(bc_name) = &v.boundary_conditions.outlet {
                if !bc_by_name.contains_key(bc_name.as_str()) {
                    return Err(ConfigError::new(format!("vessel {} references unknown boundary condition '{}'", v.vessel_id, bc_name)));
                }
                ends.set_outlet(v.vessel_id, &format!("BC{}_outlet", v.vessel_id))?;
            }
        }

        for junction in &self.junctions {
            let name = junction.junction_name.clone();
            let mut connecting = Vec::new();
            let mut directions = Vec::new();
            for &vid in &junction.inlet_vessels {
                connecting.push(format!("V{}", vid));
                directions.push(1);
            }
            for &vid in &junction.outlet_vessels {
                connecting.push(format!("V{}", vid));
                directions.push(-1);
            }
            match junction.junction_type.as_str() {
                "NORMAL_JUNCTION" | "internal_junction" => {
                    blocks.push(Block::InternalJunction(InternalJunction::new(name, connecting, directions)));
                }
                "BloodVesselJunction" => {
                    let r = junction
                        .junction_values
                        .as_ref()
                        .map(|v| v.r_poiseuille.clone())
                        .unwrap_or_default();
                    if r.len() != junction.outlet_vessels.len() {
                        return Err(ConfigError::new(format!(
                            "junction '{}' needs one R_poiseuille value per outlet vessel",
                            junction.junction_name
                        )));
                    }
                    blocks.push(Block::BloodVesselJunction(BloodVesselJunction::new(
                        name,
                        connecting,
                        directions,
                        junction.inlet_vessels.len(),
                        r,
                    )));
                }
                other => return Err(ConfigError::new(format!("unknown junction type '{}'", other))),
            }
        }

        for v in &self.vessels {
            if v.zero_d_element_type != "BloodVessel" {
                return Err(ConfigError::new(format!("unsupported zero_d_element_type '{}'", v.zero_d_element_type)));
            }
            let ends = vessel_ends.get(&v.vessel_id).unwrap();
            let inlet = ends
                .inlet
                .clone()
                .ok_or_else(|| ConfigError::new(format!("vessel {} has no inlet connection (neither a junction nor a boundary condition)", v.vessel_id)))?;
            let outlet = ends
                .outlet
                .clone()
                .ok_or_else(|| ConfigError::new(format!("vessel {} has no outlet connection (neither a junction nor a boundary condition)", v.vessel_id)))?;
            blocks.push(Block::BloodVessel(BloodVessel::new(
                format!("V{}", v.vessel_id),
                inlet,
                outlet,
                v.zero_d_element_values.r_poiseuille,
                v.zero_d_element_values.c,
                v.zero_d_element_values.l,
                v.zero_d_element_values.stenosis_coefficient,
            )));
        }

        for v in &self.vessels {
            if let Some(bc_name) = &v.boundary_conditions.inlet {
                let bc = bc_by_name[bc_name.as_str()];
                blocks.push(build_inlet_bc_block(v.vessel_id, bc)?);
            }
            if let Some(bc_name) = &v.boundary_conditions.outlet {
                let bc = bc_by_name[bc_name.as_str()];
                blocks.push(build_outlet_bc_block(v.vessel_id, bc)?);
            }
        }

        Ok(blocks)
    }
}

/// Lifts a concrete block list into the trait-object form `Network::build`
/// expects, preserving order.
pub fn boxed_blocks(blocks: Vec<Block>) -> Vec<Box<dyn crate::block::BlockKind>> {
    blocks.into_iter().map(|b| Box::new(b) as Box<dyn crate::block::BlockKind>).collect()
}

fn build_inlet_bc_block(vessel_id: u64, bc: &BoundaryConditionConfig) -> Result<Block, ConfigError> {
    let name = format!("BC{}_inlet", vessel_id);
    let connecting = format!("V{}", vessel_id);
    match &bc.values {
        BcValues::FLOW { t, q } => {
            let f = BcValueFn::from_table(t, q).map_err(|e| ConfigError::new(e.to_string()))?;
            Ok(Block::UnsteadyFlowRef(UnsteadyFlowRef::new(name, connecting, 1, f)))
        }
        BcValues::PRESSURE { t, p } => {
            let f = BcValueFn::from_table(t, p).map_err(|e| ConfigError::new(e.to_string()))?;
            Ok(Block::UnsteadyPressureRef(UnsteadyPressureRef::new(name, connecting, 1, f)))
        }
        other => Err(ConfigError::new(format!(
            "boundary condition '{}' of type {:?} cannot be used as an inlet condition",
            bc.bc_name, other
        ))),
    }
}

fn build_outlet_bc_block(vessel_id: u64, bc: &BoundaryConditionConfig) -> Result<Block, ConfigError> {
    let name = format!("BC{}_outlet", vessel_id);
    let connecting = format!("V{}", vessel_id);
    match &bc.values {
        BcValues::RESISTANCE { r, pd } => Ok(Block::UnsteadyResistanceWithDistalPressure(
            UnsteadyResistanceWithDistalPressure::new(name, connecting, -1, BcValueFn::constant(*r), BcValueFn::constant(*pd)),
        )),
        BcValues::RCR { rp, c, rd, pd } => Ok(Block::UnsteadyRcrBlockWithDistalPressure(UnsteadyRcrBlockWithDistalPressure::new(
            name,
            connecting,
            -1,
            BcValueFn::constant(*rp),
            BcValueFn::constant(*c),
            BcValueFn::constant(*rd),
            BcValueFn::constant(*pd),
        ))),
        BcValues::FLOW { t, q } => {
            let f = BcValueFn::from_table(t, q).map_err(|e| ConfigError::new(e.to_string()))?;
            Ok(Block::UnsteadyFlowRef(UnsteadyFlowRef::new(name, connecting, -1, f)))
        }
        BcValues::PRESSURE { t, p } => {
            let f = BcValueFn::from_table(t, p).map_err(|e| ConfigError::new(e.to_string()))?;
            Ok(Block::UnsteadyPressureRef(UnsteadyPressureRef::new(name, connecting, -1, f)))
        }
        BcValues::CORONARY { ra1, ra2, ca, cc, rv1, p_v, t, pim } => {
            let pim_fn = BcValueFn::from_table(t, pim).map_err(|e| ConfigError::new(e.to_string()))?;
            let pv_fn = BcValueFn::constant(*p_v);
            Ok(Block::OpenLoopCoronaryWithDistalPressure(OpenLoopCoronaryWithDistalPressureBlock::new(
                name, connecting, -1, *ra1, *ca, *ra2, *cc, *rv1, pim_fn, pv_fn,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "simulation_parameters": {
                "number_of_cardiac_cycles": 2,
                "number_of_time_pts_per_cardiac_cycle": 3
            },
            "vessels": [
                {
                    "vessel_id": 0,
                    "vessel_name": "branch0_seg0",
                    "vessel_length": 1.0,
                    "zero_d_element_type": "BloodVessel",
                    "zero_d_element_values": {"R_poiseuille": 10.0},
                    "boundary_conditions": {"inlet": "INFLOW", "outlet": "OUTFLOW"}
                }
            ],
            "junctions": [],
            "boundary_conditions": [
                {"bc_name": "INFLOW", "bc_type": "FLOW", "bc_values": {"t": [0.0, 1.0], "Q": [100.0, 100.0]}},
                {"bc_name": "OUTFLOW", "bc_type": "RESISTANCE", "bc_values": {"R": 1e-6, "Pd": 0.0}}
            ]
        }"#
    }

    #[test]
    fn parses_minimal_single_vessel_model() {
        let config: SimulationConfig = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(config.vessels.len(), 1);
        let blocks = config.build_blocks().unwrap();
        assert_eq!(blocks.len(), 3);
    }

    #[test]
    fn derives_dt_and_total_steps() {
        let config: SimulationConfig = serde_json::from_str(sample_json()).unwrap();
        let params = config.derive_solver_parameters().unwrap();
        assert!((params.dt - 0.5).abs() < 1e-12);
        assert_eq!(params.total_steps, 5);
    }
}
