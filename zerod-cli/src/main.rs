//! Command-line entry point: loads a network model, optionally primes
//! it with a steady boundary-condition prelude, runs the pulsatile
//! Generalized-alpha integration, and writes the reshaped results.

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use zerod_core::reshape::{extract_last_cardiac_cycle, reshape_all, reshape_branch};
use zerod_core::{steady_initial_condition, Network, SimulationConfig};
use zerod_math::Vec64;

/// Run a 0D lumped-parameter vascular network simulation.
#[derive(Parser, Debug)]
#[command(name = "zerod", version, about = "0D vascular network DAE solver")]
struct Cli {
    /// Path to the input network JSON file
    input: PathBuf,

    /// Path to write the result JSON file
    output: PathBuf,

    /// Run the steady boundary-condition prelude and use its converged
    /// capacitor states as the pulsatile run's initial condition
    #[arg(long = "use-steady-ic")]
    use_steady_ic: bool,

    /// Load the initial condition from a previously saved state file
    /// instead of starting from zero (or the steady prelude)
    #[arg(long = "use-ics")]
    use_ics: bool,

    /// Path to the initial-condition file read when `--use-ics` is set
    #[arg(long = "ics-path")]
    ics_path: Option<PathBuf>,

    /// Initial time of the run, in seconds
    #[arg(long = "initial-time", default_value_t = 0.0)]
    initial_time: f64,

    /// Return only the last cardiac cycle of the solution
    #[arg(long = "return-last")]
    return_last: bool,

    /// Include the "All" (flat, per-DOF) result reshaping
    #[arg(long = "save-all", default_value_t = true)]
    save_all: bool,

    /// Include the "Branch" (per-vessel-topology) result reshaping
    #[arg(long = "save-branch", default_value_t = true)]
    save_branch: bool,

    /// Also persist the final state derivative alongside the solution,
    /// for use as a later `--use-ics` restart point
    #[arg(long = "save-yydot")]
    save_yydot: bool,

    /// Path to write the state/derivative file when `--save-yydot` is set
    #[arg(long = "yydot-path")]
    yydot_path: Option<PathBuf>,

    /// Enable debug-level logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[derive(Serialize, Deserialize, Default)]
struct IcFile {
    y: Vec<f64>,
    ydot: Vec<f64>,
    var_name_list: Vec<String>,
}

/// Reindexes a saved `(y, ydot)` pair from `ic`'s own DOF ordering onto
/// `names`. A DOF present in `names` but absent from `ic` defaults to
/// zero rather than aborting the run.
fn reindex_ics(ic: &IcFile, names: &[String]) -> (Vec64, Vec64) {
    let lookup: HashMap<&str, usize> =
        ic.var_name_list.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();
    let mut y = Vec64::zeros(names.len());
    let mut ydot = Vec64::zeros(names.len());
    for (dest, name) in names.iter().enumerate() {
        if let Some(&src) = lookup.get(name.as_str()) {
            y[dest] = ic.y[src];
            ydot[dest] = ic.ydot[src];
        } else {
            log::warn!("DOF '{}' not present in initial-condition file, defaulting to zero", name);
        }
    }
    (y, ydot)
}

#[derive(Serialize, Default)]
struct AllResultJson {
    time: Vec<f64>,
    pressures: HashMap<String, Vec<f64>>,
    flows: HashMap<String, Vec<f64>>,
    internal: HashMap<String, Vec<f64>>,
}

#[derive(Serialize, Default)]
struct BranchResultJson {
    time: Vec<f64>,
    branches: HashMap<String, BranchJson>,
}

#[derive(Serialize)]
struct BranchJson {
    pressure: Vec<Vec<f64>>,
    flow: Vec<Vec<f64>>,
}

#[derive(Serialize, Default)]
struct OutputJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    all: Option<AllResultJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<BranchResultJson>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    simple_logger::SimpleLogger::new()
        .with_level(if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .init()
        .context("failed to initialize logger")?;

    if let Err(err) = run(&cli) {
        log::error!("{}", err);
        return Err(err);
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let config = SimulationConfig::load(&cli.input)
        .with_context(|| format!("loading network model from {}", cli.input.display()))?;
    let solver = config.derive_solver_parameters().context("deriving solver parameters")?;

    let concrete_blocks = config.build_blocks().context("building block graph")?;
    let mut network =
        Network::build(zerod_core::config::boxed_blocks(concrete_blocks)).context("wiring network")?;

    let (y0, ydot0) = if cli.use_ics {
        let path = cli
            .ics_path
            .as_ref()
            .context("--use-ics requires --ics-path")?;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading initial conditions from {}", path.display()))?;
        let ic: IcFile = serde_json::from_str(&text).context("parsing initial conditions file")?;
        reindex_ics(&ic, network.var_name_list())
    } else if cli.use_steady_ic {
        steady_initial_condition(&config).context("running steady boundary-condition prelude")?
    } else {
        (Vec64::zeros(network.neq()), Vec64::zeros(network.neq()))
    };

    let trajectory = zerod_core::run(&mut network, y0, ydot0, cli.initial_time, &solver)
        .context("running pulsatile simulation")?;

    let mut output = OutputJson::default();

    if cli.save_all {
        let all = reshape_all(&network, &trajectory).context("reshaping results (All mode)")?;
        let (time, pressures) = if cli.return_last {
            extract_last_cardiac_cycle(&all.time, &all.pressures, solver.number_of_time_pts_per_cardiac_cycle)
        } else {
            (all.time.clone(), all.pressures)
        };
        let (_, flows) = if cli.return_last {
            extract_last_cardiac_cycle(&all.time, &all.flows, solver.number_of_time_pts_per_cardiac_cycle)
        } else {
            (all.time.clone(), all.flows)
        };
        let (_, internal) = if cli.return_last {
            extract_last_cardiac_cycle(&all.time, &all.internal, solver.number_of_time_pts_per_cardiac_cycle)
        } else {
            (all.time.clone(), all.internal)
        };
        output.all = Some(AllResultJson { time, pressures, flows, internal });
    }

    if cli.save_branch {
        let branch =
            reshape_branch(&config, &network, &trajectory).context("reshaping results (Branch mode)")?;
        let branches: HashMap<String, BranchJson> = branch
            .branches
            .into_iter()
            .map(|(id, r)| (id.to_string(), BranchJson { pressure: r.pressure, flow: r.flow }))
            .collect();
        output.branch = Some(BranchResultJson { time: branch.time, branches });
    }

    let text = serde_json::to_string_pretty(&output).context("serializing results")?;
    std::fs::write(&cli.output, text)
        .with_context(|| format!("writing results to {}", cli.output.display()))?;

    if cli.save_yydot {
        let path = cli.yydot_path.as_ref().context("--save-yydot requires --yydot-path")?;
        let ic = IcFile {
            y: trajectory.y_final.iter().copied().collect(),
            ydot: trajectory.ydot_final.iter().copied().collect(),
            var_name_list: network.var_name_list().to_vec(),
        };
        let text = serde_json::to_string_pretty(&ic).context("serializing final state")?;
        std::fs::write(path, text).with_context(|| format!("writing final state to {}", path.display()))?;
    }

    log::info!("wrote results to {}", cli.output.display());
    Ok(())
}
