//! Turns a raw DOF trajectory into either a flat "All" result keyed by
//! DOF name, or a "Branch" result folded onto `branch<b>_seg<s>`
//! vessel topology.

use crate::block::{Block, BlockKind};
use crate::config::SimulationConfig;
use crate::error::PostprocessError;
use crate::network::Network;
use crate::run::Trajectory;
use std::collections::HashMap;

/// One DOF's full time series, keyed by its variable name (e.g.
/// `"P_V0_BC0_outlet"`, `"Q_BC0_inlet_V0"`, `"var_0_V1"`).
pub struct AllResults {
    pub time: Vec<f64>,
    pub pressures: HashMap<String, Vec<f64>>,
    pub flows: HashMap<String, Vec<f64>>,
    pub internal: HashMap<String, Vec<f64>>,
}

/// Buckets every DOF in the trajectory by its `P_`/`Q_`/`var_` name
/// prefix. Any other prefix is a configuration bug, not user data, so
/// it is reported rather than silently dropped.
pub fn reshape_all(network: &Network, trajectory: &Trajectory) -> Result<AllResults, PostprocessError> {
    let mut pressures = HashMap::new();
    let mut flows = HashMap::new();
    let mut internal = HashMap::new();

    for (dof, name) in network.var_name_list().iter().enumerate() {
        let series: Vec<f64> = trajectory.y.iter().map(|y| y[dof]).collect();
        if name.starts_with("P_") {
            pressures.insert(name.clone(), series);
        } else if name.starts_with("Q_") {
            flows.insert(name.clone(), series);
        } else if name.starts_with("var_") {
            internal.insert(name.clone(), series);
        } else {
            return Err(PostprocessError::new(format!(
                "degree of freedom '{}' has no recognized P_/Q_/var_ prefix",
                name
            )));
        }
    }

    Ok(AllResults { time: trajectory.time.clone(), pressures, flows, internal })
}

/// One branch's folded pressure/flow arrays: `pressure[node][t]`,
/// `flow[node][t]`, with `node` 0 being the branch inlet and node
/// `s + 1` being the outlet of segment `s`.
pub struct BranchResult {
    pub pressure: Vec<Vec<f64>>,
    pub flow: Vec<Vec<f64>>,
}

pub struct BranchResults {
    pub time: Vec<f64>,
    pub branches: HashMap<u64, BranchResult>,
}

/// Parses a `branch<b>_seg<s>` vessel name, returning `(b, s)`.
fn parse_branch_segment(vessel_name: &str) -> Option<(u64, u64)> {
    let rest = vessel_name.strip_prefix("branch")?;
    let (branch_str, rest) = rest.split_once("_seg")?;
    let branch = branch_str.parse().ok()?;
    let seg = rest.parse().ok()?;
    Some((branch, seg))
}

/// Folds the trajectory onto `branch<b>_seg<s>` topology: for each
/// vessel, its outlet wire's pressure/flow become node `s + 1` of
/// branch `b`; segment 0's inlet wire additionally fills node 0.
pub fn reshape_branch(
    config: &SimulationConfig,
    network: &Network,
    trajectory: &Trajectory,
) -> Result<BranchResults, PostprocessError> {
    let concrete_blocks = config
        .build_blocks()
        .map_err(|e| PostprocessError::new(format!("cannot reconstruct branch topology: {}", e)))?;

    let vessel_neighbors: HashMap<u64, (String, String)> = config
        .vessels
        .iter()
        .zip(concrete_blocks.iter().filter(|b| matches!(b, Block::BloodVessel(_))))
        .map(|(v, b)| {
            let Block::BloodVessel(vessel) = b else { unreachable!() };
            (v.vessel_id, (vessel.connecting_blocks()[0].clone(), vessel.connecting_blocks()[1].clone()))
        })
        .collect();

    let dof_index: HashMap<&str, usize> =
        network.var_name_list().iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();

    let series_for = |name: &str| -> Option<Vec<f64>> {
        dof_index.get(name).map(|&dof| trajectory.y.iter().map(|y| y[dof]).collect())
    };

    let wire_series = |block_a: &str, block_b: &str| -> Option<(Vec<f64>, Vec<f64>)> {
        let p = network.wires().iter().find(|w| w.joins(block_a, block_b))?;
        Some((series_for(&p.name_p())?, series_for(&p.name_q())?))
    };

    let mut branches: HashMap<u64, BranchResult> = HashMap::new();

    for v in &config.vessels {
        let Some((branch, seg)) = parse_branch_segment(&v.vessel_name) else {
            continue;
        };
        let (inlet_neighbor, outlet_neighbor) = vessel_neighbors.get(&v.vessel_id).ok_or_else(|| {
            PostprocessError::new(format!("vessel {} has no reconstructed topology", v.vessel_id))
        })?;
        let vessel_block = format!("V{}", v.vessel_id);

        let entry = branches.entry(branch).or_insert_with(|| BranchResult { pressure: Vec::new(), flow: Vec::new() });
        let node = (seg + 1) as usize;
        while entry.pressure.len() <= node {
            entry.pressure.push(Vec::new());
            entry.flow.push(Vec::new());
        }

        let (p_out, q_out) = wire_series(&vessel_block, outlet_neighbor).ok_or_else(|| {
            PostprocessError::new(format!("vessel {} is missing its outlet wire trajectory", v.vessel_id))
        })?;
        entry.pressure[node] = p_out;
        entry.flow[node] = q_out;

        if seg == 0 {
            let (p_in, q_in) = wire_series(&vessel_block, inlet_neighbor).ok_or_else(|| {
                PostprocessError::new(format!("vessel {} is missing its inlet wire trajectory", v.vessel_id))
            })?;
            entry.pressure[0] = p_in;
            entry.flow[0] = q_in;
        }
    }

    Ok(BranchResults { time: trajectory.time.clone(), branches })
}

/// Trims a full trajectory down to its last cardiac cycle and rebases
/// time to start at the run's original initial time.
pub fn extract_last_cardiac_cycle(
    time: &[f64],
    series: &HashMap<String, Vec<f64>>,
    pts_per_cycle: usize,
) -> (Vec<f64>, HashMap<String, Vec<f64>>) {
    let total = time.len();
    if pts_per_cycle == 0 || pts_per_cycle > total {
        return (time.to_vec(), series.clone());
    }
    let start = total - pts_per_cycle;
    let t0 = time[0];
    let trimmed_time: Vec<f64> = time[start..].iter().map(|t| t - time[start] + t0).collect();
    let trimmed: HashMap<String, Vec<f64>> =
        series.iter().map(|(name, values)| (name.clone(), values[start..].to_vec())).collect();
    (trimmed_time, trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_branch_and_segment_indices() {
        assert_eq!(parse_branch_segment("branch3_seg1"), Some((3, 1)));
        assert_eq!(parse_branch_segment("not_a_branch_name"), None);
    }

    #[test]
    fn last_cycle_extraction_rebases_time_to_original_start() {
        let time = vec![5.0, 5.5, 6.0, 6.5, 7.0];
        let mut series = HashMap::new();
        series.insert("Q_a_b".to_string(), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let (t, s) = extract_last_cardiac_cycle(&time, &series, 3);
        assert_eq!(t, vec![5.0, 5.5, 6.0]);
        assert_eq!(s["Q_a_b"], vec![3.0, 4.0, 5.0]);
    }
}
