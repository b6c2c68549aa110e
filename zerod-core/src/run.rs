//! Drives a built `Network` through its full time grid with the
//! Generalized-alpha integrator, logging milestones along the way.

use crate::config::SolverParameters;
use crate::error::IntegrationError;
use crate::integrator::{self, IntegratorConfig};
use crate::network::Network;
use zerod_math::Vec64;

/// The complete trajectory of a run: one `y` sample per simulated time
/// point (including the initial state), and the matching time grid.
pub struct Trajectory {
    pub time: Vec<f64>,
    pub y: Vec<Vec64>,
    pub ydot: Vec<Vec64>,
    pub y_final: Vec64,
    pub ydot_final: Vec64,
}

/// Runs `network` over its exact time grid starting from `(y0, ydot0)`
/// at `t0`, with the default spectral radius of 0.1.
pub fn run(
    network: &mut Network,
    y0: Vec64,
    ydot0: Vec64,
    t0: f64,
    solver: &SolverParameters,
) -> Result<Trajectory, IntegrationError> {
    run_with_rho(network, y0, ydot0, t0, solver, 0.1)
}

pub fn run_with_rho(
    network: &mut Network,
    y0: Vec64,
    ydot0: Vec64,
    t0: f64,
    solver: &SolverParameters,
    rho: f64,
) -> Result<Trajectory, IntegrationError> {
    network.update_constant();
    let cfg = IntegratorConfig::new(rho, solver.dt);
    let grid = integrator::time_grid(t0, solver.dt, solver.total_steps);

    let mut y = y0;
    let mut ydot = ydot0;
    let mut ylist = Vec::with_capacity(grid.len());
    let mut ydotlist = Vec::with_capacity(grid.len());
    ylist.push(y.clone());
    ydotlist.push(ydot.clone());

    log::info!("starting 0D simulation: {} steps, dt = {:.6e}", solver.total_steps, solver.dt);

    for (step_index, &t_n) in grid.iter().take(grid.len().saturating_sub(1)).enumerate() {
        let result = integrator::step(network, &y, &ydot, t_n, step_index, &cfg)?;
        y = result.y;
        ydot = result.ydot;
        ylist.push(y.clone());
        ydotlist.push(ydot.clone());
        if step_index % 50 == 0 {
            log::debug!("step {} (t = {:.6}): {} Newton iterations", step_index, t_n, result.newton_iterations);
        }
    }

    log::info!("0D simulation completed");

    Ok(Trajectory {
        time: grid,
        y: ylist,
        ydot: ydotlist,
        y_final: y,
        ydot_final: ydot,
    })
}
