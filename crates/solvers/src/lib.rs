//! Dependency ordering and solving strategies for systems of equations.
//!
//! The usual entry point is [`EquationSystem`], which owns equations and a
//! variable table, repairs malformed equations as they are added, and runs a
//! [`SolverManager`]. The manager tries the [`SimultaneousEquationSolver`] on
//! cyclic systems and falls back to the [`IterativeSolver`].

mod config;
mod iterative;
mod manager;
mod order;
mod result;
mod system;

pub mod simultaneous;

pub use config::{Config, ConfigError};
pub use iterative::IterativeSolver;
pub use manager::{Solver, SolverManager};
pub use order::{Order, SystemAnalysis};
pub use result::{SolveMethod, SolveResult, SolveStep};
pub use simultaneous::SimultaneousEquationSolver;
pub use system::{EquationSystem, ResidualCheck};
