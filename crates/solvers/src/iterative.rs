//! Solves unknowns one at a time through direct-assignment equations.
//!
//! Each round collects every unknown that can be computed from the values
//! known at the start of the round, then computes them. When a round finds
//! nothing, three escape hatches are tried in turn before giving up: a scan of
//! all equations, conditional equations whose taken branch is already known,
//! and square cyclic blocks handed to the simultaneous solver.


use std::collections::BTreeSet;

use skein_core::{Equation, VariableTable};
use tracing::{debug, warn};

use crate::{
    Config, Order, SimultaneousEquationSolver, SolveMethod, SolveResult, SolveStep, Solver,
    SystemAnalysis,
};

/// A variable chosen for solving this round, with the equation that solves it.
struct Candidate<'a> {
    symbol: String,
    equation: &'a Equation,
    method: SolveMethod,
}

/// Solves a system by repeated direct substitution.
#[derive(Debug, Clone, Copy, Default)]
pub struct IterativeSolver {
    blocks: SimultaneousEquationSolver,
}

impl IterativeSolver {
    /// Creates a solver that hands cyclic blocks to `blocks`.
    #[must_use]
    pub fn new(blocks: SimultaneousEquationSolver) -> Self {
        Self { blocks }
    }

    /// Unknowns whose recorded solver equations can run now.
    fn graph_candidates<'a>(
        order: &'a Order,
        known: &BTreeSet<String>,
    ) -> Vec<Candidate<'a>> {
        order
            .solvable_symbols(known)
            .into_iter()
            .filter_map(|symbol| {
                let equation = order
                    .solvers_for(&symbol)
                    .find(|equation| equation.can_solve_for(&symbol, known))?;
                Some(Candidate {
                    symbol,
                    equation,
                    method: SolveMethod::Direct,
                })
            })
            .collect()
    }

    /// Unknowns that some equation in the system can solve now, whether or
    /// not the graph recorded it as a solver.
    fn fallback_candidates<'a>(
        equations: &'a [Equation],
        unknowns: &BTreeSet<String>,
        known: &BTreeSet<String>,
    ) -> Vec<Candidate<'a>> {
        unknowns
            .iter()
            .filter_map(|symbol| {
                let equation = equations
                    .iter()
                    .find(|equation| equation.can_solve_for(symbol, known))?;
                Some(Candidate {
                    symbol: symbol.clone(),
                    equation,
                    method: SolveMethod::Fallback,
                })
            })
            .collect()
    }

    /// Evaluates conditional assignments whose taken branch only needs known
    /// values, storing each result as it is found.
    fn solve_conditionals(
        equations: &[Equation],
        unknowns: &BTreeSet<String>,
        variables: &mut VariableTable,
        steps: &mut Vec<SolveStep>,
    ) -> bool {
        let mut progressed = false;

        for symbol in unknowns {
            let conditional = equations.iter().find(|equation| {
                equation.lhs().as_variable() == Some(symbol.as_str())
                    && equation.rhs().is_conditional()
            });
            let Some(equation) = conditional else {
                continue;
            };

            let value = match equation.rhs().evaluate(variables) {
                Ok(value) => value,
                Err(error) => {
                    debug!(%symbol, equation = %equation, %error, "conditional branch not ready");
                    continue;
                }
            };
            match variables.assign(symbol, value) {
                Ok(quantity) => {
                    steps.push(SolveStep {
                        variable: symbol.clone(),
                        equation: equation.to_string(),
                        method: SolveMethod::Conditional,
                        quantity,
                    });
                    progressed = true;
                }
                Err(error) => {
                    debug!(%symbol, %error, "conditional result rejected");
                }
            }
        }

        progressed
    }

    /// Hands each square cyclic block of the remaining unknowns to the
    /// simultaneous solver.
    ///
    /// A block is a strongly connected component of the unknowns together
    /// with the equations whose unknowns all lie in it. A block that fails to
    /// solve or verify leaves the table as it was.
    fn solve_blocks(
        &self,
        equations: &[Equation],
        order: &Order,
        unknowns: &BTreeSet<String>,
        variables: &mut VariableTable,
        tolerance: f64,
        steps: &mut Vec<SolveStep>,
    ) -> bool {
        let mut progressed = false;

        for component in order.strongly_connected_components_among(unknowns) {
            let block: Vec<&Equation> = equations
                .iter()
                .filter(|equation| {
                    let mut pending = equation
                        .variables()
                        .iter()
                        .filter(|symbol| unknowns.contains(*symbol))
                        .peekable();
                    pending.peek().is_some() && pending.all(|symbol| component.contains(symbol))
                })
                .collect();
            if block.len() != component.len() {
                debug!(?component, equations = block.len(), "cyclic block is not square");
                continue;
            }

            let checkpoint = variables.checkpoint();
            let solved = self
                .blocks
                .solve_block(&block, &component, variables)
                .and_then(|block_steps| {
                    self.blocks.verify(&block, variables, tolerance)?;
                    Ok(block_steps)
                });
            match solved {
                Ok(block_steps) => {
                    debug!(?component, "solved cyclic block");
                    steps.extend(block_steps);
                    progressed = true;
                }
                Err(error) => {
                    debug!(?component, %error, "cyclic block not solved");
                    variables.restore(&checkpoint);
                }
            }
        }

        progressed
    }
}

impl Solver for IterativeSolver {
    fn name(&self) -> &'static str {
        "iterative"
    }

    fn can_handle(
        &self,
        _equations: &[Equation],
        unknowns: &BTreeSet<String>,
        _order: &Order,
        _analysis: &SystemAnalysis,
    ) -> bool {
        !unknowns.is_empty()
    }

    fn solve(
        &self,
        equations: &[Equation],
        variables: &mut VariableTable,
        order: &Order,
        config: &Config,
    ) -> SolveResult {
        let mut steps = Vec::new();
        let mut rounds = 0;

        while rounds < config.max_iterations() {
            let unknowns = variables.unknown_symbols();
            if unknowns.is_empty() {
                break;
            }
            rounds += 1;
            let known = variables.known_symbols();

            let mut candidates = Self::graph_candidates(order, &known);
            if candidates.is_empty() {
                candidates = Self::fallback_candidates(equations, &unknowns, &known);
            }

            if candidates.is_empty() {
                let progressed =
                    Self::solve_conditionals(equations, &unknowns, variables, &mut steps)
                        || self.solve_blocks(
                            equations,
                            order,
                            &unknowns,
                            variables,
                            config.tolerance(),
                            &mut steps,
                        );
                if progressed {
                    continue;
                }
                debug!(round = rounds, remaining = unknowns.len(), "no progress");
                break;
            }

            debug!(
                round = rounds,
                solving = ?candidates.iter().map(|c| c.symbol.as_str()).collect::<Vec<_>>(),
                "solving round"
            );

            for Candidate {
                symbol,
                equation,
                method,
            } in candidates
            {
                let solved = equation
                    .solve_for(&symbol, variables)
                    .map_err(|error| error.to_string())
                    .and_then(|value| {
                        variables
                            .assign(&symbol, value)
                            .map_err(|error| error.to_string())
                    });
                let quantity = match solved {
                    Ok(quantity) => quantity,
                    Err(error) => {
                        let remaining = variables.unknown_symbols().into_iter().collect();
                        return SolveResult::failed(
                            format!("failed to solve `{symbol}`: {error}"),
                            steps,
                            remaining,
                        );
                    }
                };

                match equation.is_satisfied(variables, config.tolerance()) {
                    Ok(true) => {}
                    Ok(false) => warn!(%symbol, equation = %equation, "residual check failed"),
                    Err(error) => {
                        warn!(%symbol, equation = %equation, %error, "residual check failed");
                    }
                }

                steps.push(SolveStep {
                    variable: symbol,
                    equation: equation.to_string(),
                    method,
                    quantity,
                });
            }
        }

        let remaining: Vec<String> = variables.unknown_symbols().into_iter().collect();
        if remaining.is_empty() {
            SolveResult::solved(
                format!("solved {} variables in {rounds} rounds", steps.len()),
                steps,
            )
        } else if rounds >= config.max_iterations() {
            SolveResult::failed(
                format!(
                    "stopped after {rounds} rounds with {} unknowns remaining",
                    remaining.len()
                ),
                steps,
                remaining,
            )
        } else {
            SolveResult::failed(
                format!("cannot solve: {}", remaining.join(", ")),
                steps,
                remaining,
            )
        }
    }
}
