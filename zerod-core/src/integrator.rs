//! The Generalized-alpha time integrator: predictor, alpha-intermediate
//! residual/Jacobian, and the dense Newton inner loop.

use crate::error::IntegrationError;
use crate::network::Network;
use zerod_math::{argmax_abs, inf_norm, solve_dense, Vec64};

/// Derived Generalized-alpha parameters for a chosen spectral radius.
#[derive(Debug, Clone, Copy)]
pub struct GenAlphaParams {
    pub rho: f64,
    pub alpha_m: f64,
    pub alpha_f: f64,
    pub gamma: f64,
}

impl GenAlphaParams {
    pub fn from_rho(rho: f64) -> Self {
        let alpha_m = (3.0 - rho) / (2.0 * (1.0 + rho));
        let alpha_f = 1.0 / (1.0 + rho);
        let gamma = 0.5 + alpha_m - alpha_f;
        Self { rho, alpha_m, alpha_f, gamma }
    }
}

/// Fixed-step integration settings.
#[derive(Debug, Clone, Copy)]
pub struct IntegratorConfig {
    pub rho: f64,
    pub dt: f64,
    pub max_newton_iter: usize,
    pub newton_tol: f64,
}

impl IntegratorConfig {
    pub fn new(rho: f64, dt: f64) -> Self {
        Self {
            rho,
            dt,
            max_newton_iter: 30,
            newton_tol: 1e-8,
        }
    }
}

/// Outcome of one completed time step.
pub struct StepResult {
    pub y: Vec64,
    pub ydot: Vec64,
    pub newton_iterations: usize,
}

/// Advances the network state from `(y_n, ydot_n, t_n)` to `t_n + dt`
/// with a fixed-step Generalized-alpha Newton iteration.
pub fn step(
    network: &mut Network,
    y_n: &Vec64,
    ydot_n: &Vec64,
    t_n: f64,
    step_index: usize,
    cfg: &IntegratorConfig,
) -> Result<StepResult, IntegrationError> {
    let p = GenAlphaParams::from_rho(cfg.rho);

    let mut ydot_kp1 = ydot_n * ((p.gamma - 1.0) / p.gamma);
    let mut y_kp1 = y_n.clone();

    let t_af = t_n + p.alpha_f * cfg.dt;
    network.update_time(t_af);

    let mut iterations = 0usize;
    loop {
        let y_af = y_n + p.alpha_f * (&y_kp1 - y_n);
        let ydot_am = ydot_n + p.alpha_m * (&ydot_kp1 - ydot_n);

        network.update_solution(&y_af, &ydot_am);
        let (e, f, c, dc_dy, dc_dydot) = network.assemble();

        let residual = &e * &ydot_am + &f * &y_af + &c;
        let jac = &e * p.alpha_m
            + &f * (p.alpha_f * p.gamma * cfg.dt)
            + &dc_dy * (p.alpha_f * p.gamma * cfg.dt)
            + &dc_dydot * p.alpha_m;

        let neg_residual = -&residual;
        let delta_ydot = solve_dense(&jac, &neg_residual).map_err(|e| {
            let (idx, val) = argmax_abs(&residual);
            IntegrationError::new(
                step_index,
                t_n,
                network.var_name_list().get(idx).cloned().unwrap_or_default(),
                val,
                e.to_string(),
            )
        })?;

        ydot_kp1 = &ydot_kp1 + &delta_ydot;
        y_kp1 = &y_kp1 + &delta_ydot * (p.gamma * cfg.dt);
        iterations += 1;

        let step_norm = inf_norm(&delta_ydot);
        if !step_norm.is_finite() {
            let (idx, val) = argmax_abs(&residual);
            return Err(IntegrationError::new(
                step_index,
                t_n,
                network.var_name_list().get(idx).cloned().unwrap_or_default(),
                val,
                "Newton step produced a non-finite update",
            ));
        }
        if step_norm < cfg.newton_tol {
            break;
        }
        if iterations >= cfg.max_newton_iter {
            let (idx, val) = argmax_abs(&residual);
            return Err(IntegrationError::new(
                step_index,
                t_n,
                network.var_name_list().get(idx).cloned().unwrap_or_default(),
                val,
                "Newton iteration failed to converge",
            ));
        }
    }

    Ok(StepResult {
        y: y_kp1,
        ydot: ydot_kp1,
        newton_iterations: iterations,
    })
}

/// The full, exact time grid `t_n = t0 + n*dt` for `n = 0..total_steps`.
/// Generated by integer step counting, never floating-point range
/// accumulation, so the grid has no drift over long runs.
pub fn time_grid(t0: f64, dt: f64, total_steps: usize) -> Vec<f64> {
    (0..total_steps).map(|n| t0 + (n as f64) * dt).collect()
}
