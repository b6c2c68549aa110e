//! Steady-state boundary-condition prelude: runs a short, coarse
//! simulation on cycle-averaged boundary conditions and hands its
//! converged capacitor states to the pulsatile run as initial
//! conditions, instead of starting the real run from zero.

use crate::block::BlockKind;
use crate::config::{boxed_blocks, SimulationConfig};
use crate::error::ConfigError;
use crate::network::Network;
use crate::run;
use zerod_math::Vec64;

/// Builds and runs the steady-mean model, then returns the initial
/// condition the pulsatile run should start from: zero everywhere
/// except the capacitor-bearing internal DOFs, which carry the
/// steady-state values reached by the coarse run.
pub fn steady_initial_condition(config: &SimulationConfig) -> Result<(Vec64, Vec64), ConfigError> {
    let mean_config = config.to_steady_mean();
    let mean_solver = mean_config.derive_solver_parameters()?;

    let concrete_blocks = mean_config.build_blocks()?;
    let capacitor_state_names: Vec<String> = concrete_blocks
        .iter()
        .filter(|b| b.has_capacitor_state())
        .flat_map(|b| b.internal_var_names())
        .collect();

    let mut mean_network = Network::build(boxed_blocks(concrete_blocks))
        .map_err(|e| ConfigError::new(format!("steady prelude: {}", e)))?;

    let y0 = Vec64::zeros(mean_network.neq());
    let ydot0 = Vec64::zeros(mean_network.neq());

    log::info!(
        "running steady boundary-condition prelude ({} steps)",
        mean_solver.total_steps
    );
    let trajectory = run::run(&mut mean_network, y0, ydot0, 0.0, &mean_solver)
        .map_err(|e| ConfigError::new(format!("steady prelude failed to converge: {}", e)))?;

    // Rebuild the full (pulsatile) block graph so the returned initial
    // condition is indexed against its DOF layout, not the mean run's.
    let full_blocks = config.build_blocks()?;
    let full_network = Network::build(boxed_blocks(full_blocks))
        .map_err(|e| ConfigError::new(format!("pulsatile network: {}", e)))?;

    let mut y_ic = Vec64::zeros(full_network.neq());
    let ydot_ic = Vec64::zeros(full_network.neq());

    for state_name in &capacitor_state_names {
        let steady_idx = mean_network
            .var_name_list()
            .iter()
            .position(|n| n == state_name);
        let full_idx = full_network.var_name_list().iter().position(|n| n == state_name);
        if let (Some(si), Some(fi)) = (steady_idx, full_idx) {
            y_ic[fi] = trajectory.y_final[si];
        }
    }

    Ok((y_ic, ydot_ic))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_r_vessel_config() -> SimulationConfig {
        let json = r#"{
            "simulation_parameters": {
                "number_of_cardiac_cycles": 2,
                "number_of_time_pts_per_cardiac_cycle": 5,
                "cardiac_cycle_period": 1.0
            },
            "vessels": [
                {
                    "vessel_id": 0,
                    "vessel_name": "branch0_seg0",
                    "vessel_length": 1.0,
                    "zero_d_element_type": "BloodVessel",
                    "zero_d_element_values": {"R_poiseuille": 10.0, "C": 1.0},
                    "boundary_conditions": {"inlet": "INFLOW", "outlet": "OUTFLOW"}
                }
            ],
            "junctions": [],
            "boundary_conditions": [
                {"bc_name": "INFLOW", "bc_type": "FLOW", "bc_values": {"t": [0.0, 0.5, 1.0], "Q": [100.0, 120.0, 100.0]}},
                {"bc_name": "OUTFLOW", "bc_type": "RESISTANCE", "bc_values": {"R": 1.0, "Pd": 0.0}}
            ]
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn steady_prelude_produces_nonzero_capacitor_ic() {
        let config = single_r_vessel_config();
        let (y_ic, _ydot_ic) = steady_initial_condition(&config).unwrap();
        assert!(y_ic.iter().any(|&v| v.abs() > 1e-9));
    }
}
