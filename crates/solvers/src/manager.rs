use std::collections::BTreeSet;

use skein_core::{Equation, VariableTable};
use tracing::{debug, info};

use crate::{
    Config, IterativeSolver, Order, SimultaneousEquationSolver, SolveResult, SystemAnalysis,
};

/// A strategy for solving the unknowns of an equation system.
pub trait Solver {
    /// A short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns `true` if this strategy applies to the system.
    fn can_handle(
        &self,
        equations: &[Equation],
        unknowns: &BTreeSet<String>,
        order: &Order,
        analysis: &SystemAnalysis,
    ) -> bool;

    /// Solves the system, writing values into `variables` as they are found.
    ///
    /// Failure is reported through [`SolveResult::success`], never by
    /// panicking.
    fn solve(
        &self,
        equations: &[Equation],
        variables: &mut VariableTable,
        order: &Order,
        config: &Config,
    ) -> SolveResult;
}

/// Tries each registered solver in priority order until one succeeds.
pub struct SolverManager {
    solvers: Vec<Box<dyn Solver>>,
}

impl Default for SolverManager {
    /// Registers the simultaneous solver, then the iterative solver.
    fn default() -> Self {
        Self::new(vec![
            Box::new(SimultaneousEquationSolver::default()),
            Box::new(IterativeSolver::default()),
        ])
    }
}

impl std::fmt::Debug for SolverManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.solvers.iter().map(|solver| solver.name()))
            .finish()
    }
}

impl SolverManager {
    #[must_use]
    pub fn new(solvers: Vec<Box<dyn Solver>>) -> Self {
        Self { solvers }
    }

    /// Solves the unknowns of `variables`.
    ///
    /// A solver that cannot handle the system is skipped. A solver that fails
    /// is followed by the next one, with the variable table restored to its
    /// state before the failed attempt. When every solver fails, the last
    /// result is returned with its partial progress kept in `variables`.
    pub fn solve(
        &self,
        equations: &[Equation],
        variables: &mut VariableTable,
        order: &Order,
        config: &Config,
    ) -> SolveResult {
        let known = variables.known_symbols();
        let unknowns = variables.unknown_symbols();
        if unknowns.is_empty() {
            return SolveResult::solved("no unknowns to solve", Vec::new());
        }

        let analysis = order.analyze_system(&known);
        let checkpoint = variables.checkpoint();
        let mut last: Option<SolveResult> = None;

        for solver in &self.solvers {
            if !solver.can_handle(equations, &unknowns, order, &analysis) {
                debug!(solver = solver.name(), "solver does not apply");
                continue;
            }
            if last.is_some() {
                variables.restore(&checkpoint);
            }

            let result = solver.solve(equations, variables, order, config);
            if result.success {
                info!(solver = solver.name(), solved = result.solved.len(), "system solved");
                return result;
            }

            debug!(
                solver = solver.name(),
                reason = %result.message,
                "solver failed, falling through"
            );
            last = Some(result);
        }

        last.unwrap_or_else(|| {
            SolveResult::failed(
                "no solver can handle the system",
                Vec::new(),
                unknowns.into_iter().collect(),
            )
        })
    }
}
