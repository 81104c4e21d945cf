use std::collections::BTreeSet;

use skein_core::{Equation, Expression, Quantity, Variable, VariableTable, parse::parse_equation};

use super::Order;

fn equation(text: &str) -> Equation {
    parse_equation(text, text).unwrap()
}

fn set(symbols: &[&str]) -> BTreeSet<String> {
    symbols.iter().map(ToString::to_string).collect()
}

fn order_of(equations: &[&str], known: &BTreeSet<String>) -> Order {
    let mut order = Order::new();
    for text in equations {
        order.add_equation(&equation(text), known);
    }
    order
}

#[test]
fn orders_acyclic_chain() {
    let known = set(&["a"]);
    let order = order_of(&["d = c - b", "c = b + a", "b = a * 2"], &known);

    let solving_order = order.get_solving_order(&known);
    assert_eq!(solving_order, vec!["b", "c", "d"]);

    for (position, symbol) in solving_order.iter().enumerate() {
        for dependency in order.dependencies(symbol) {
            if !known.contains(&dependency) {
                let before = solving_order.iter().position(|s| *s == dependency).unwrap();
                assert!(before < position, "{dependency} must precede {symbol}");
            }
        }
    }
}

#[test]
fn simple_assignments_come_first() {
    let known = set(&["a"]);
    let order = order_of(&["y = a * 2", "x = a"], &known);

    assert_eq!(order.get_solving_order(&known), vec!["x", "y"]);
}

#[test]
fn symbols_without_solvers_are_omitted() {
    let known = set(&["x"]);
    let order = order_of(&["y = x + z"], &known);

    let solving_order = order.get_solving_order(&known);
    assert!(solving_order.is_empty());

    let (can_solve, unsolvable) = order.can_solve_system(&known);
    assert!(!can_solve);
    assert_eq!(unsolvable, set(&["y", "z"]));
}

#[test]
fn detects_cycles_and_components() {
    let known = set(&["a"]);
    let order = order_of(&["x = y + a", "y = x * 2", "z = x"], &known);

    let cycles = order.detect_cycles();
    assert!(!cycles.is_empty());
    for cycle in &cycles {
        assert_eq!(cycle.iter().cloned().collect::<BTreeSet<_>>(), set(&["x", "y"]));
    }

    assert_eq!(
        order.get_strongly_connected_components(),
        vec![vec!["x".to_string(), "y".to_string()]]
    );
    assert!(order.get_solving_order(&known).is_empty());
}

#[test]
fn acyclic_graphs_have_no_cycles() {
    let known = set(&["a"]);
    let order = order_of(&["b = a", "c = a + b", "d = b * c"], &known);

    assert!(order.detect_cycles().is_empty());
    assert!(order.get_strongly_connected_components().is_empty());
}

#[test]
fn long_chains_do_not_exhaust_the_stack() {
    const LENGTH: usize = 100_000;
    let known = set(&["v0"]);
    let mut order = Order::new();
    for i in 1..=LENGTH {
        let link = Equation::assignment(
            format!("link {i}"),
            format!("v{i}"),
            Expression::var(format!("v{}", i - 1)) * 2.0,
        );
        order.add_equation(&link, &known);
    }

    assert!(order.detect_cycles().is_empty());

    let closing = Equation::assignment("closing", "v1", Expression::var(format!("v{LENGTH}")));
    order.add_equation(&closing, &known);
    let cycles = order.detect_cycles();

    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].len(), LENGTH);
    assert_eq!(cycles[0][0], "v1");
    assert_eq!(cycles[0][LENGTH - 1], format!("v{LENGTH}"));
}

#[test]
fn self_dependency_is_a_component_without_solver() {
    let order = order_of(&["x = 0.5 * x + 1"], &BTreeSet::new());

    assert_eq!(order.get_strongly_connected_components(), vec![vec!["x".to_string()]]);
    assert_eq!(order.detect_cycles(), vec![vec!["x".to_string()]]);
    assert!(!order.has_solver("x"));
}

#[test]
fn implicit_equations_link_every_unknown() {
    let known = BTreeSet::new();
    let order = order_of(&["x + y = 3", "2 * x - y = 0"], &known);

    assert_eq!(order.dependencies("x"), set(&["y"]));
    assert_eq!(order.dependencies("y"), set(&["x"]));
    assert!(!order.has_solver("x"));
    assert!(!order.has_solver("y"));
    assert_eq!(order.unsolvable_variables(&known), set(&["x", "y"]));
}

#[test]
fn reversed_assignments_are_recorded() {
    let known = set(&["a"]);
    let order = order_of(&["a * 3 = b"], &known);

    assert_eq!(order.dependencies("b"), set(&["a"]));
    assert_eq!(order.solvers_for("b").count(), 1);
    assert_eq!(order.get_solving_order(&known), vec!["b"]);
}

#[test]
fn components_among_a_subset() {
    let known = set(&["a"]);
    let order = order_of(&["x = y + a", "y = x * 2", "w = x + q", "q = w"], &known);

    assert_eq!(
        order.strongly_connected_components_among(&set(&["x", "y"])),
        vec![vec!["x".to_string(), "y".to_string()]]
    );
    assert!(order.strongly_connected_components_among(&set(&["x", "w"])).is_empty());
    assert_eq!(order.get_strongly_connected_components().len(), 2);
}

#[test]
fn solvable_symbols_follow_known_values() {
    let order = order_of(&["b = a * 2", "c = b + 1"], &set(&["a"]));

    assert_eq!(order.solvable_symbols(&set(&["a"])), set(&["b"]));
    assert_eq!(order.solvable_symbols(&set(&["a", "b"])), set(&["c"]));
    assert_eq!(order.dependents("b"), set(&["c"]));
}

#[test]
fn build_covers_unused_variables() {
    let variables: VariableTable = [
        Variable::known("x", Quantity::dimensionless(3.0)),
        Variable::unknown("y"),
        Variable::unknown("unused"),
    ]
    .into_iter()
    .collect();
    let order = Order::build(&[equation("y = 2 * x")], &variables);

    let analysis = order.analyze_system(&variables.known_symbols());
    assert_eq!(analysis.unknowns, set(&["unused", "y"]));
    assert_eq!(analysis.solving_order, vec!["y"]);
    assert_eq!(analysis.unsolvable, set(&["unused"]));
    assert!(!analysis.can_solve);
    assert!(!analysis.has_cycles());
}
