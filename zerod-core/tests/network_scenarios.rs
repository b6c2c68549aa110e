//! Whole-network scenarios exercising the public assembly/integration
//! API end to end, each checked against a closed-form steady-state
//! solution of the underlying circuit.

use zerod_core::SimulationConfig;

fn find<'a>(names: &'a [String], needle: &str) -> usize {
    names.iter().position(|n| n == needle).unwrap_or_else(|| panic!("no DOF named '{}' in {:?}", needle, names))
}

#[test]
fn single_r_vessel_reaches_exact_steady_state() {
    let json = r#"{
        "simulation_parameters": {
            "number_of_cardiac_cycles": 2,
            "number_of_time_pts_per_cardiac_cycle": 4,
            "cardiac_cycle_period": 1.0
        },
        "vessels": [{
            "vessel_id": 0,
            "vessel_name": "branch0_seg0",
            "vessel_length": 1.0,
            "zero_d_element_type": "BloodVessel",
            "zero_d_element_values": {"R_poiseuille": 10.0},
            "boundary_conditions": {"inlet": "INFLOW", "outlet": "OUTFLOW"}
        }],
        "boundary_conditions": [
            {"bc_name": "INFLOW", "bc_type": "FLOW", "bc_values": {"t": [0.0, 1.0], "Q": [100.0, 100.0]}},
            {"bc_name": "OUTFLOW", "bc_type": "RESISTANCE", "bc_values": {"R": 1.0, "Pd": 0.0}}
        ]
    }"#;
    let config: SimulationConfig = serde_json::from_str(json).unwrap();
    let solver = config.derive_solver_parameters().unwrap();
    let blocks = config.build_blocks().unwrap();
    let mut network = zerod_core::Network::build(zerod_core::config::boxed_blocks(blocks)).unwrap();
    let neq = network.neq();

    let trajectory = zerod_core::run(
        &mut network,
        zerod_math::Vec64::zeros(neq),
        zerod_math::Vec64::zeros(neq),
        0.0,
        &solver,
    )
    .unwrap();

    let names = network.var_name_list().to_vec();
    let y = &trajectory.y_final;
    let p_in = y[find(&names, "P_V0_BC0_inlet")];
    let q_in = y[find(&names, "Q_V0_BC0_inlet")];
    let p_out = y[find(&names, "P_V0_BC0_outlet")];
    let q_out = y[find(&names, "Q_V0_BC0_outlet")];

    // Pure resistor chain: algebraic system, exact on the first Newton solve.
    assert!((q_in - 100.0).abs() < 1e-8);
    assert!((q_out - 100.0).abs() < 1e-8);
    assert!((p_out - 100.0).abs() < 1e-6); // R_out * Q + Pd = 1 * 100
    assert!((p_in - 1100.0).abs() < 1e-6); // p_out + R_vessel * Q = 100 + 10*100
}

#[test]
fn junction_splits_flow_evenly_and_conserves_mass() {
    let json = r#"{
        "simulation_parameters": {
            "number_of_cardiac_cycles": 1,
            "number_of_time_pts_per_cardiac_cycle": 3,
            "cardiac_cycle_period": 1.0
        },
        "vessels": [
            {
                "vessel_id": 0, "vessel_name": "branch0_seg0", "vessel_length": 1.0,
                "zero_d_element_type": "BloodVessel",
                "zero_d_element_values": {"R_poiseuille": 0.0},
                "boundary_conditions": {"inlet": "INFLOW"}
            },
            {
                "vessel_id": 1, "vessel_name": "branch1_seg0", "vessel_length": 1.0,
                "zero_d_element_type": "BloodVessel",
                "zero_d_element_values": {"R_poiseuille": 0.0},
                "boundary_conditions": {"outlet": "OUT1"}
            },
            {
                "vessel_id": 2, "vessel_name": "branch2_seg0", "vessel_length": 1.0,
                "zero_d_element_type": "BloodVessel",
                "zero_d_element_values": {"R_poiseuille": 0.0},
                "boundary_conditions": {"outlet": "OUT2"}
            }
        ],
        "junctions": [
            {"junction_name": "J0", "junction_type": "NORMAL_JUNCTION", "inlet_vessels": [0], "outlet_vessels": [1, 2]}
        ],
        "boundary_conditions": [
            {"bc_name": "INFLOW", "bc_type": "FLOW", "bc_values": {"t": [0.0, 1.0], "Q": [100.0, 100.0]}},
            {"bc_name": "OUT1", "bc_type": "RESISTANCE", "bc_values": {"R": 1.0, "Pd": 0.0}},
            {"bc_name": "OUT2", "bc_type": "RESISTANCE", "bc_values": {"R": 1.0, "Pd": 0.0}}
        ]
    }"#;
    let config: SimulationConfig = serde_json::from_str(json).unwrap();
    let solver = config.derive_solver_parameters().unwrap();
    let blocks = config.build_blocks().unwrap();
    let mut network = zerod_core::Network::build(zerod_core::config::boxed_blocks(blocks)).unwrap();
    let neq = network.neq();

    let trajectory = zerod_core::run(
        &mut network,
        zerod_math::Vec64::zeros(neq),
        zerod_math::Vec64::zeros(neq),
        0.0,
        &solver,
    )
    .unwrap();

    let names = network.var_name_list().to_vec();
    let y = &trajectory.y_final;
    let q1 = y[find(&names, "Q_V1_BC1_outlet")];
    let q2 = y[find(&names, "Q_V2_BC2_outlet")];

    assert!((q1 - 50.0).abs() < 1e-6);
    assert!((q2 - 50.0).abs() < 1e-6);
    assert!((q1 + q2 - 100.0).abs() < 1e-9);
}

#[test]
fn rcr_capacitor_converges_to_windkessel_steady_state() {
    let json = r#"{
        "simulation_parameters": {
            "number_of_cardiac_cycles": 2,
            "number_of_time_pts_per_cardiac_cycle": 3,
            "cardiac_cycle_period": 1.0
        },
        "vessels": [{
            "vessel_id": 0,
            "vessel_name": "branch0_seg0",
            "vessel_length": 1.0,
            "zero_d_element_type": "BloodVessel",
            "zero_d_element_values": {"R_poiseuille": 10.0},
            "boundary_conditions": {"inlet": "INFLOW", "outlet": "OUTFLOW"}
        }],
        "boundary_conditions": [
            {"bc_name": "INFLOW", "bc_type": "FLOW", "bc_values": {"t": [0.0, 1.0], "Q": [100.0, 100.0]}},
            {"bc_name": "OUTFLOW", "bc_type": "RCR", "bc_values": {"Rp": 1.0, "C": 0.02, "Rd": 5.0, "Pd": 0.0}}
        ]
    }"#;
    let config: SimulationConfig = serde_json::from_str(json).unwrap();
    let mean_config = config.to_steady_mean();
    let mean_solver = mean_config.derive_solver_parameters().unwrap();
    let blocks = mean_config.build_blocks().unwrap();
    let mut network = zerod_core::Network::build(zerod_core::config::boxed_blocks(blocks)).unwrap();
    let neq = network.neq();

    // tau = Rd * C = 0.1s; the coarse 3-cycle/1.0s-period prelude runs for
    // 3.0s, i.e. 30 time constants, so the capacitor is fully relaxed.
    let trajectory = zerod_core::run(
        &mut network,
        zerod_math::Vec64::zeros(neq),
        zerod_math::Vec64::zeros(neq),
        0.0,
        &mean_solver,
    )
    .unwrap();

    let names = network.var_name_list().to_vec();
    let y = &trajectory.y_final;
    let p_node = y[find(&names, "P_V0_BC0_outlet")];
    let pc = y[find(&names, "var_0_BC0_outlet")];

    // Steady state: Q = 100 (forced), P = Rd*Q + Pd = 500, Pc = P - Rp*Q = 400.
    assert!((p_node - 500.0).abs() < 1.0);
    assert!((pc - 400.0).abs() < 1.0);
}

#[test]
fn resistive_vessel_orients_correctly_between_a_bc_inlet_and_a_junction_outlet() {
    // V0's true inlet is a boundary condition and its true outlet is a
    // junction; V1's true inlet is that same junction and its true
    // outlet is a boundary condition. This exercises the case where a
    // vessel's inlet/outlet must be resolved by role rather than by
    // the order junctions/BCs happen to be declared in.
    let json = r#"{
        "simulation_parameters": {
            "number_of_cardiac_cycles": 2,
            "number_of_time_pts_per_cardiac_cycle": 4,
            "cardiac_cycle_period": 1.0
        },
        "vessels": [
            {
                "vessel_id": 0, "vessel_name": "branch0_seg0", "vessel_length": 1.0,
                "zero_d_element_type": "BloodVessel",
                "zero_d_element_values": {"R_poiseuille": 5.0},
                "boundary_conditions": {"inlet": "INFLOW"}
            },
            {
                "vessel_id": 1, "vessel_name": "branch1_seg0", "vessel_length": 1.0,
                "zero_d_element_type": "BloodVessel",
                "zero_d_element_values": {"R_poiseuille": 0.0},
                "boundary_conditions": {"outlet": "OUTFLOW"}
            }
        ],
        "junctions": [
            {"junction_name": "J0", "junction_type": "NORMAL_JUNCTION", "inlet_vessels": [0], "outlet_vessels": [1]}
        ],
        "boundary_conditions": [
            {"bc_name": "INFLOW", "bc_type": "FLOW", "bc_values": {"t": [0.0, 1.0], "Q": [100.0, 100.0]}},
            {"bc_name": "OUTFLOW", "bc_type": "RESISTANCE", "bc_values": {"R": 1.0, "Pd": 0.0}}
        ]
    }"#;
    let config: SimulationConfig = serde_json::from_str(json).unwrap();
    let solver = config.derive_solver_parameters().unwrap();
    let blocks = config.build_blocks().unwrap();
    let mut network = zerod_core::Network::build(zerod_core::config::boxed_blocks(blocks)).unwrap();
    let neq = network.neq();

    let trajectory = zerod_core::run(
        &mut network,
        zerod_math::Vec64::zeros(neq),
        zerod_math::Vec64::zeros(neq),
        0.0,
        &solver,
    )
    .unwrap();

    let names = network.var_name_list().to_vec();
    let y = &trajectory.y_final;
    let p_bc_inlet = y[find(&names, "P_V0_BC0_inlet")];
    let p_junction_side = y[find(&names, "P_J0_V0")];
    let p_bc_outlet = y[find(&names, "P_V1_BC1_outlet")];

    // Downstream: R_out * Q + Pd = 1 * 100 = 100, and V1 (R=0) carries
    // it straight through the junction.
    assert!((p_bc_outlet - 100.0).abs() < 1e-6);
    assert!((p_junction_side - 100.0).abs() < 1e-6);
    // Upstream: P_in - P_out = R * Q, so the BC-side pressure must sit
    // *above* the junction-side pressure by R*Q, not below it.
    assert!((p_bc_inlet - 600.0).abs() < 1e-6);
}

#[test]
fn coronary_block_reaches_three_resistor_steady_state() {
    let json = r#"{
        "simulation_parameters": {
            "number_of_cardiac_cycles": 2,
            "number_of_time_pts_per_cardiac_cycle": 3,
            "cardiac_cycle_period": 1.0
        },
        "vessels": [{
            "vessel_id": 0,
            "vessel_name": "branch0_seg0",
            "vessel_length": 1.0,
            "zero_d_element_type": "BloodVessel",
            "zero_d_element_values": {"R_poiseuille": 0.0},
            "boundary_conditions": {"inlet": "INFLOW", "outlet": "CORONARY"}
        }],
        "boundary_conditions": [
            {"bc_name": "INFLOW", "bc_type": "FLOW", "bc_values": {"t": [0.0, 1.0], "Q": [10.0, 10.0]}},
            {"bc_name": "CORONARY", "bc_type": "CORONARY", "bc_values": {
                "Ra1": 1.0, "Ra2": 2.0, "Ca": 0.01, "Cc": 0.01, "Rv1": 3.0, "P_v": 5.0,
                "t": [0.0, 1.0], "Pim": [20.0, 20.0]
            }}
        ]
    }"#;
    let config: SimulationConfig = serde_json::from_str(json).unwrap();
    let mean_config = config.to_steady_mean();
    let mean_solver = mean_config.derive_solver_parameters().unwrap();
    let blocks = mean_config.build_blocks().unwrap();
    let mut network = zerod_core::Network::build(zerod_core::config::boxed_blocks(blocks)).unwrap();
    let neq = network.neq();

    let trajectory = zerod_core::run(
        &mut network,
        zerod_math::Vec64::zeros(neq),
        zerod_math::Vec64::zeros(neq),
        0.0,
        &mean_solver,
    )
    .unwrap();

    let names = network.var_name_list().to_vec();
    let y = &trajectory.y_final;
    let p_node = y[find(&names, "P_V0_BC0_outlet")];

    // At steady state the two compartment capacitors carry no current, so
    // Ra, Ram (Ra2), and Rv1 act as three series resistors between the
    // vessel node and the venous reference pressure P_v.
    let expected = 5.0 + (1.0 + 2.0 + 3.0) * 10.0;
    assert!((p_node - expected).abs() < 2.0);
}
