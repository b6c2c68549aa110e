//! Error taxonomy for network assembly, integration, and postprocessing.
//!
//! Each error type implements `std::error::Error` directly; callers
//! compose them with `anyhow::Context` at the process boundary rather
//! than threading a shared error enum through every layer.

use std::fmt;

/// The input model is malformed or internally inconsistent: an unknown
/// block/junction/BC type, a missing field, a stamp shape mismatch, or
/// an illegal combination of options.
#[derive(Clone)]
pub struct ConfigError {
    what: String,
}

impl ConfigError {
    pub fn new(what: impl Into<String>) -> Self {
        Self { what: what.into() }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid model configuration: {}", self.what)
    }
}

impl fmt::Debug for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigError({}) at {}:{}", self.what, file!(), line!())
    }
}

impl std::error::Error for ConfigError {}

/// Newton iteration failed to converge, or produced a non-finite
/// residual, during the time integration loop.
#[derive(Clone)]
pub struct IntegrationError {
    pub step: usize,
    pub time: f64,
    pub worst_dof: String,
    pub residual_norm: f64,
    reason: String,
}

impl IntegrationError {
    pub fn new(
        step: usize,
        time: f64,
        worst_dof: impl Into<String>,
        residual_norm: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            step,
            time,
            worst_dof: worst_dof.into(),
            residual_norm,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "integration failed at step {} (t = {:.6}): {} (worst DOF {}, |R| = {:.3e})",
            self.step, self.time, self.reason, self.worst_dof, self.residual_norm
        )
    }
}

impl fmt::Debug for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntegrationError({}) at {}:{}", self, file!(), line!())
    }
}

impl std::error::Error for IntegrationError {}

/// Postprocessing could not interpret the solution vector: an
/// unrecognized DOF name prefix, or a branch name that does not parse
/// as `branch<b>_seg<s>`.
#[derive(Clone)]
pub struct PostprocessError {
    what: String,
}

impl PostprocessError {
    pub fn new(what: impl Into<String>) -> Self {
        Self { what: what.into() }
    }
}

impl fmt::Display for PostprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not reshape simulation results: {}", self.what)
    }
}

impl fmt::Debug for PostprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PostprocessError({}) at {}:{}", self.what, file!(), line!())
    }
}

impl std::error::Error for PostprocessError {}
