use skein_core::{EvalError, Equation, Quantity, VarId, Variable, VariableTable};
use skein_rebuild::EquationReconstructor;
use tracing::warn;

use crate::{Config, Order, SolveResult, SolverManager, SystemAnalysis};

/// The residual of one equation at the current variable values.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualCheck {
    pub equation: String,
    pub residual: Result<Quantity, EvalError>,
    pub satisfied: bool,
}

/// A set of equations together with the variables they relate.
///
/// Equations are checked against the variable table as they are added.
/// References to missing variables are repaired when possible and the
/// equation is dropped otherwise.
#[derive(Debug)]
pub struct EquationSystem {
    equations: Vec<Equation>,
    variables: VariableTable,
    config: Config,
    manager: SolverManager,
    reconstructor: Option<EquationReconstructor>,
}

impl EquationSystem {
    /// Creates a system over `variables` with no equations.
    #[must_use]
    pub fn new(variables: VariableTable) -> Self {
        Self {
            equations: Vec::new(),
            variables,
            config: Config::default(),
            manager: SolverManager::default(),
            reconstructor: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_manager(mut self, manager: SolverManager) -> Self {
        self.manager = manager;
        self
    }

    #[must_use]
    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    #[must_use]
    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    /// Returns the variable table for direct edits.
    pub fn variables_mut(&mut self) -> &mut VariableTable {
        self.reconstructor = None;
        &mut self.variables
    }

    /// Adds or replaces a variable.
    pub fn insert_variable(&mut self, variable: Variable) -> VarId {
        self.reconstructor = None;
        self.variables.insert(variable)
    }

    /// Adds an equation, repairing references to missing variables.
    ///
    /// Returns `false` if the equation references variables that cannot be
    /// rebound, in which case it is dropped.
    pub fn add_equation(&mut self, equation: Equation) -> bool {
        let variables = &self.variables;
        let reconstructor = self
            .reconstructor
            .get_or_insert_with(|| EquationReconstructor::from_table(variables));

        match reconstructor.fix_malformed_equation(&equation) {
            Some(fixed) => {
                self.equations.push(fixed);
                true
            }
            None => {
                warn!(
                    name = equation.name(),
                    equation = %equation,
                    missing = ?reconstructor.missing_symbols(&equation),
                    "dropping equation that cannot be reconstructed"
                );
                false
            }
        }
    }

    /// Builds the dependency graph for the current equations and values.
    #[must_use]
    pub fn order(&self) -> Order {
        Order::build(&self.equations, &self.variables)
    }

    #[must_use]
    pub fn analyze(&self) -> SystemAnalysis {
        self.order().analyze_system(&self.variables.known_symbols())
    }

    /// Solves the unknowns, storing their values in the variable table.
    pub fn solve(&mut self) -> SolveResult {
        let order = self.order();
        self.manager
            .solve(&self.equations, &mut self.variables, &order, &self.config)
    }

    /// Evaluates the residual of every equation.
    #[must_use]
    pub fn verify(&self) -> Vec<ResidualCheck> {
        self.equations
            .iter()
            .map(|equation| {
                let residual = equation.residual(&self.variables);
                let satisfied = equation
                    .is_satisfied(&self.variables, self.config.tolerance())
                    .unwrap_or(false);
                ResidualCheck {
                    equation: equation.name().to_string(),
                    residual,
                    satisfied,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use skein_core::{Expression, parse::parse_equation};

    fn pipe() -> EquationSystem {
        EquationSystem::new(
            [
                Variable::known("pipe_D", Quantity::parse(4.0, "in").unwrap()),
                Variable::known("pipe_t", Quantity::parse(0.25, "in").unwrap()),
                Variable::unknown("d"),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn repairs_and_solves() {
        let mut system = pipe();
        let malformed = Equation::assignment("bore", "d", Expression::var("(D - t * 2)"));

        assert!(system.add_equation(malformed));
        assert_eq!(
            system.equations()[0].rhs().variables().into_iter().collect::<Vec<_>>(),
            vec!["pipe_D", "pipe_t"]
        );

        let result = system.solve();
        assert!(result.success, "{result}");
        assert_relative_eq!(system.variables().value("d").unwrap().value(), 3.5);
        assert!(system.verify().iter().all(|check| check.satisfied));
    }

    #[test]
    fn drops_unrepairable_equations() {
        let mut system = pipe();

        assert!(!system.add_equation(parse_equation("bore", "d = D - wall").unwrap()));
        assert!(system.equations().is_empty());

        let analysis = system.analyze();
        assert!(!analysis.can_solve);
        assert!(analysis.unsolvable.contains("d"));
    }

    #[test]
    fn new_variables_refresh_reconstruction() {
        let mut system = pipe();
        assert!(!system.add_equation(parse_equation("area", "A = d * d").unwrap()));

        system.insert_variable(Variable::unknown("flow_A"));
        assert!(system.add_equation(parse_equation("area", "A = d * d").unwrap()));
        assert_eq!(system.equations()[0].lhs(), &Expression::var("flow_A"));
    }

    #[test]
    fn verify_reports_unsolved_equations() {
        let mut system = pipe();
        system.add_equation(parse_equation("bore", "d = pipe_D - 2 * pipe_t").unwrap());

        let checks = system.verify();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].equation, "bore");
        assert!(checks[0].residual.is_err());
        assert!(!checks[0].satisfied);
    }
}
