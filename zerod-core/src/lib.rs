//! Block/wire assembly, Generalized-alpha time integration, and result
//! reshaping for a 0D lumped-parameter vascular network.

pub mod block;
pub mod config;
pub mod error;
pub mod integrator;
pub mod network;
pub mod reshape;
pub mod run;
pub mod stamp;
pub mod steady;
pub mod wire;

pub use block::{Block, BlockKind};
pub use config::{SimulationConfig, SolverParameters};
pub use error::{ConfigError, IntegrationError, PostprocessError};
pub use network::Network;
pub use reshape::{reshape_all, reshape_branch, AllResults, BranchResults};
pub use run::{run, Trajectory};
pub use steady::steady_initial_condition;
pub use wire::Wire;
