//! Solves square systems of equations that are linear in their unknowns.
//!
//! The coefficient matrix is not read from the expression trees. It is
//! measured by probing each equation's residual with the unknowns set to
//! zero and one, which works for any unit-aware tree as long as the
//! equations are linear in the unknowns.

mod coefficients;
mod dimensions;
mod error;
mod limits;
#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use nalgebra::{DMatrix, DVector};
use skein_core::{Equation, Quantity, VariableTable};
use tracing::debug;

use crate::{Config, Order, SolveMethod, SolveResult, SolveStep, Solver, SystemAnalysis};

pub use error::Error;
pub use limits::{Limits, LimitsError};

/// Solves cyclic systems of `n` linear equations in `n` unknowns.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimultaneousEquationSolver {
    limits: Limits,
}

impl SimultaneousEquationSolver {
    #[must_use]
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Solves `equations` for `unknowns` and writes the values into
    /// `variables`.
    ///
    /// Each value is stored in the unknown's declared unit, or in the SI unit
    /// of its declared dimension when it has no unit. Unknowns with neither
    /// take the SI unit of the dimension the equations imply for them. The
    /// equations are not verified; see [`SimultaneousEquationSolver::verify`].
    ///
    /// # Errors
    ///
    /// Returns an error if the system is not square with at least two
    /// unknowns, a residual cannot be evaluated, an equation is not linear, or
    /// the matrix is too ill-conditioned to solve. No value is written unless
    /// the linear solve succeeds.
    pub fn solve_block(
        &self,
        equations: &[&Equation],
        unknowns: &[String],
        variables: &mut VariableTable,
    ) -> Result<Vec<SolveStep>, Error> {
        let n = unknowns.len();
        if equations.len() != n {
            return Err(Error::NotSquare {
                equations: equations.len(),
                unknowns: n,
            });
        }
        if n < 2 {
            return Err(Error::TooSmall(n));
        }

        let system = coefficients::extract(
            equations,
            unknowns,
            variables,
            self.limits.linearity_tolerance(),
        )?;
        let solution = self.solve_linear(system.matrix, &system.constants)?;

        let label = equations
            .iter()
            .map(|equation| equation.name())
            .collect::<Vec<_>>()
            .join(", ");

        let mut steps = Vec::with_capacity(n);
        for ((symbol, unit), &value) in unknowns.iter().zip(system.units).zip(solution.iter()) {
            let quantity = variables.assign(symbol, Quantity::new(value, unit))?;
            steps.push(SolveStep {
                variable: symbol.clone(),
                equation: label.clone(),
                method: SolveMethod::Simultaneous,
                quantity,
            });
        }

        Ok(steps)
    }

    /// Checks every equation's residual against `tolerance`.
    ///
    /// # Errors
    ///
    /// Returns the worst residual if it exceeds `tolerance`, or the first
    /// equation that cannot be evaluated.
    pub fn verify(
        &self,
        equations: &[&Equation],
        variables: &VariableTable,
        tolerance: f64,
    ) -> Result<(), Error> {
        let mut worst: Option<(f64, &Equation)> = None;

        for &equation in equations {
            let residual =
                equation
                    .scaled_residual(variables)
                    .map_err(|source| Error::Evaluation {
                        equation: equation.to_string(),
                        source,
                    })?;
            if worst.is_none_or(|(largest, _)| residual > largest) {
                worst = Some((residual, equation));
            }
        }

        match worst {
            Some((residual, equation)) if residual > tolerance || residual.is_nan() => {
                Err(Error::Residual {
                    equation: equation.to_string(),
                    residual,
                    tolerance,
                })
            }
            _ => Ok(()),
        }
    }

    /// Solves `A·x = b` after checking the condition number of `A`.
    ///
    /// The SVD used for the condition number also solves systems above the
    /// large-system threshold; smaller systems use LU decomposition.
    fn solve_linear(
        &self,
        matrix: DMatrix<f64>,
        constants: &DVector<f64>,
    ) -> Result<DVector<f64>, Error> {
        let n = matrix.nrows();
        let svd = matrix.clone().svd(true, true);

        let (largest, smallest) = svd
            .singular_values
            .iter()
            .fold((0.0_f64, f64::INFINITY), |(largest, smallest), &value| {
                (largest.max(value), smallest.min(value))
            });
        let condition = if smallest > 0.0 {
            largest / smallest
        } else {
            f64::INFINITY
        };

        if !condition.is_finite() || condition > self.limits.max_condition_number() {
            debug!(condition, n, "matrix is ill-conditioned");
            return Err(Error::IllConditioned { condition });
        }
        debug!(condition, n, "solving linear system");

        if n > self.limits.large_system_threshold() {
            svd.solve(constants, f64::EPSILON)
                .map_err(|message| Error::Singular(message.to_string()))
        } else {
            matrix
                .lu()
                .solve(constants)
                .ok_or_else(|| Error::Singular("LU decomposition is singular".to_string()))
        }
    }
}

/// Returns the equations that mention at least one of `unknowns`.
fn active_equations<'a>(equations: &'a [Equation], unknowns: &BTreeSet<String>) -> Vec<&'a Equation> {
    equations
        .iter()
        .filter(|equation| equation.variables().iter().any(|symbol| unknowns.contains(symbol)))
        .collect()
}

impl Solver for SimultaneousEquationSolver {
    fn name(&self) -> &'static str {
        "simultaneous"
    }

    /// Accepts cyclic systems with as many equations mentioning an unknown as
    /// there are unknowns, and at least two unknowns.
    fn can_handle(
        &self,
        equations: &[Equation],
        unknowns: &BTreeSet<String>,
        _order: &Order,
        analysis: &SystemAnalysis,
    ) -> bool {
        analysis.has_cycles()
            && unknowns.len() >= 2
            && active_equations(equations, unknowns).len() == unknowns.len()
    }

    fn solve(
        &self,
        equations: &[Equation],
        variables: &mut VariableTable,
        _order: &Order,
        config: &Config,
    ) -> SolveResult {
        let unknowns = variables.unknown_symbols();
        let active = active_equations(equations, &unknowns);
        let symbols: Vec<String> = unknowns.iter().cloned().collect();

        let steps = match self.solve_block(&active, &symbols, variables) {
            Ok(steps) => steps,
            Err(error) => {
                return SolveResult::failed(error.to_string(), Vec::new(), symbols);
            }
        };

        let all: Vec<&Equation> = equations.iter().collect();
        match self.verify(&all, variables, config.tolerance()) {
            Ok(()) => SolveResult::solved(
                format!("solved {} unknowns simultaneously", steps.len()),
                steps,
            ),
            Err(error) => SolveResult::failed(
                format!("values were written but do not satisfy the system: {error}"),
                steps,
                symbols,
            ),
        }
    }
}
