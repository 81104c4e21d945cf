use approx::assert_relative_eq;
use skein_core::{Equation, Quantity, Unit, Variable, VariableTable, parse::parse_equation};

use super::{Error, Limits, SimultaneousEquationSolver};
use crate::{Config, Order, Solver};

fn equations(texts: &[&str]) -> Vec<Equation> {
    texts
        .iter()
        .map(|text| parse_equation(*text, text).unwrap())
        .collect()
}

fn unknowns(symbols: &[&str]) -> Vec<String> {
    symbols.iter().map(ToString::to_string).collect()
}

fn table(variables: Vec<Variable>) -> VariableTable {
    variables.into_iter().collect()
}

#[test]
fn solves_two_by_two() {
    let equations = equations(&["x + y = 3", "2 * x - y = 0"]);
    let refs: Vec<&Equation> = equations.iter().collect();
    let mut variables = table(vec![Variable::unknown("x"), Variable::unknown("y")]);

    let steps = SimultaneousEquationSolver::default()
        .solve_block(&refs, &unknowns(&["x", "y"]), &mut variables)
        .unwrap();

    assert_eq!(steps.len(), 2);
    assert_relative_eq!(variables.value("x").unwrap().value(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(variables.value("y").unwrap().value(), 2.0, epsilon = 1e-9);
}

#[test]
fn keeps_declared_units() {
    let inch = Unit::parse("in").unwrap();
    let equations = equations(&["a + b = 10[in]", "a - b = 2[in]"]);
    let refs: Vec<&Equation> = equations.iter().collect();
    let mut variables = table(vec![
        Variable::unknown_in("a", inch.clone()),
        Variable::unknown_in("b", Unit::parse("ft").unwrap()),
    ]);

    SimultaneousEquationSolver::default()
        .solve_block(&refs, &unknowns(&["a", "b"]), &mut variables)
        .unwrap();

    let a = variables.value("a").unwrap();
    let b = variables.value("b").unwrap();
    assert_eq!(a.unit(), &inch);
    assert_relative_eq!(a.value(), 6.0, epsilon = 1e-9);
    assert_relative_eq!(b.to(&inch).unwrap().value(), 4.0, epsilon = 1e-9);
}

#[test]
fn rejects_ill_conditioned_matrix() {
    let equations = equations(&["x + y = 2", "x + 1.000000000000001 * y = 2"]);
    let refs: Vec<&Equation> = equations.iter().collect();
    let mut variables = table(vec![Variable::unknown("x"), Variable::unknown("y")]);

    let error = SimultaneousEquationSolver::default()
        .solve_block(&refs, &unknowns(&["x", "y"]), &mut variables)
        .unwrap_err();

    assert!(matches!(error, Error::IllConditioned { .. }));
    assert!(!variables.get("x").unwrap().is_known());
}

#[test]
fn rejects_non_square_systems() {
    let equations = equations(&["x + y = 3"]);
    let refs: Vec<&Equation> = equations.iter().collect();
    let mut variables = table(vec![Variable::unknown("x"), Variable::unknown("y")]);
    let solver = SimultaneousEquationSolver::default();

    assert_eq!(
        solver.solve_block(&refs, &unknowns(&["x", "y"]), &mut variables),
        Err(Error::NotSquare {
            equations: 1,
            unknowns: 2
        })
    );
    assert_eq!(
        solver.solve_block(&refs, &unknowns(&["x"]), &mut variables),
        Err(Error::TooSmall(1))
    );
}

#[test]
fn large_systems_solve_through_svd() {
    let equations = equations(&["x + y + z = 6", "x - y = -1", "y - z = -1"]);
    let refs: Vec<&Equation> = equations.iter().collect();
    let mut variables = table(vec![
        Variable::unknown("x"),
        Variable::unknown("y"),
        Variable::unknown("z"),
    ]);
    let solver = SimultaneousEquationSolver::new(Limits::new(1e12, 2, 1e-9).unwrap());

    solver
        .solve_block(&refs, &unknowns(&["x", "y", "z"]), &mut variables)
        .unwrap();

    assert_relative_eq!(variables.value("x").unwrap().value(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(variables.value("y").unwrap().value(), 2.0, epsilon = 1e-9);
    assert_relative_eq!(variables.value("z").unwrap().value(), 3.0, epsilon = 1e-9);
}

#[test]
fn handles_only_cyclic_square_systems() {
    let solver = SimultaneousEquationSolver::default();

    let cyclic = equations(&["x + y = 3", "2 * x - y = 0"]);
    let variables = table(vec![Variable::unknown("x"), Variable::unknown("y")]);
    let order = Order::build(&cyclic, &variables);
    let analysis = order.analyze_system(&variables.known_symbols());
    assert!(solver.can_handle(&cyclic, &analysis.unknowns, &order, &analysis));

    let acyclic = equations(&["x = 3", "y = 2 * x"]);
    let order = Order::build(&acyclic, &variables);
    let analysis = order.analyze_system(&variables.known_symbols());
    assert!(!solver.can_handle(&acyclic, &analysis.unknowns, &order, &analysis));
}

#[test]
fn solve_reports_success() {
    let equations = equations(&["x + y = 3", "2 * x - y = 0"]);
    let mut variables = table(vec![Variable::unknown("x"), Variable::unknown("y")]);
    let order = Order::build(&equations, &variables);

    let result = SimultaneousEquationSolver::default().solve(
        &equations,
        &mut variables,
        &order,
        &Config::default(),
    );

    assert!(result.success, "{result}");
    assert_eq!(result.solved, vec!["x", "y"]);
    assert!(result.remaining.is_empty());
}

#[test]
fn solves_undeclared_unknowns_in_implied_units() {
    let equations = equations(&["x + y = L", "x - y = d"]);
    let mut variables = table(vec![
        Variable::known("L", Quantity::parse(3.0, "m").unwrap()),
        Variable::known("d", Quantity::parse(1.0, "m").unwrap()),
        Variable::unknown("x"),
        Variable::unknown("y"),
    ]);
    let order = Order::build(&equations, &variables);

    let result = SimultaneousEquationSolver::default().solve(
        &equations,
        &mut variables,
        &order,
        &Config::default(),
    );

    assert!(result.success, "{result}");
    let metre = Unit::parse("m").unwrap();
    let x = variables.value("x").unwrap();
    let y = variables.value("y").unwrap();
    assert_eq!(x.unit(), &metre);
    assert_relative_eq!(x.value(), 2.0, epsilon = 1e-9);
    assert_relative_eq!(y.to(&metre).unwrap().value(), 1.0, epsilon = 1e-9);
}

#[test]
fn inconsistent_solution_names_block_unknowns() {
    let equations = equations(&["x + y = 3", "2 * x - y = 0", "a = 2"]);
    let mut variables = table(vec![
        Variable::known("a", Quantity::dimensionless(1.0)),
        Variable::unknown("x"),
        Variable::unknown("y"),
    ]);
    let order = Order::build(&equations, &variables);

    let result = SimultaneousEquationSolver::default().solve(
        &equations,
        &mut variables,
        &order,
        &Config::default(),
    );

    assert!(!result.success);
    assert_eq!(result.remaining, vec!["x", "y"]);
    assert_eq!(result.steps.len(), 2);
    assert!(result.message.contains("a = 2"), "{result}");
}

#[test]
fn verify_names_worst_residual() {
    let equations = equations(&["x + y = 3", "2 * x - y = 0"]);
    let refs: Vec<&Equation> = equations.iter().collect();
    let variables = table(vec![
        Variable::known("x", Quantity::dimensionless(1.0)),
        Variable::known("y", Quantity::dimensionless(1.5)),
    ]);

    let error = SimultaneousEquationSolver::default()
        .verify(&refs, &variables, 1e-6)
        .unwrap_err();

    let Error::Residual { equation, residual, .. } = error else {
        panic!("expected a residual error");
    };
    assert_eq!(equation, "2 * x - y = 0");
    assert_relative_eq!(residual, 0.5);
}
