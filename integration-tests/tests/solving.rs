use std::collections::BTreeSet;

use approx::assert_relative_eq;
use integration_tests::{equations, init_tracing, table};
use skein_core::{Quantity, Unit, Variable, VariableTable};
use skein_solvers::{EquationSystem, Order, SolveMethod};

fn system(texts: &[&str], variables: VariableTable) -> EquationSystem {
    let mut system = EquationSystem::new(variables);
    for equation in equations(texts) {
        assert!(system.add_equation(equation));
    }
    system
}

#[test]
fn direct_assignment() {
    init_tracing();
    let mut system = system(&["y = 2 * x"], table(&[("x", 3.0)], &["y"]));

    let result = system.solve();

    assert!(result.success, "{result}");
    assert_relative_eq!(system.variables().value("y").unwrap().value(), 6.0);
}

#[test]
fn direct_assignment_in_declared_unit() {
    init_tracing();
    let variables: VariableTable = [
        Variable::known("x", Quantity::parse(3.0, "m").unwrap()),
        Variable::unknown_in("y", Unit::parse("cm").unwrap()),
    ]
    .into_iter()
    .collect();
    let mut system = system(&["y = 2 * x"], variables);

    let result = system.solve();

    assert!(result.success, "{result}");
    let y = system.variables().value("y").unwrap();
    assert_eq!(y.unit(), &Unit::parse("cm").unwrap());
    assert_relative_eq!(y.value(), 600.0, epsilon = 1e-9);
}

#[test]
fn wall_thickness_round_trip() {
    init_tracing();
    let variables: VariableTable = [
        Variable::known("T_bar", Quantity::parse(0.147, "in").unwrap()),
        Variable::known("U_m", Quantity::dimensionless(0.125)),
        Variable::unknown("T").with_name("minimum wall thickness"),
    ]
    .into_iter()
    .collect();
    let mut system = system(&["T = T_bar * (1 - U_m)"], variables);

    let result = system.solve();

    assert!(result.success, "{result}");
    let thickness = system.variables().value("T").unwrap();
    assert_eq!(thickness.unit(), &Unit::parse("in").unwrap());
    assert_relative_eq!(thickness.value(), 0.128625, epsilon = 1e-6);
}

#[test]
fn two_by_two_simultaneous() {
    init_tracing();
    let mut system = system(&["x + y = 3", "2 * x - y = 0"], table(&[], &["x", "y"]));

    assert!(system.analyze().has_cycles());
    let result = system.solve();

    assert!(result.success, "{result}");
    assert_eq!(result.step("x").unwrap().method, SolveMethod::Simultaneous);
    assert_relative_eq!(system.variables().value("x").unwrap().value(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(system.variables().value("y").unwrap().value(), 2.0, epsilon = 1e-9);
}

#[test]
fn simultaneous_lengths_without_declared_units() {
    init_tracing();
    let variables: VariableTable = [
        Variable::known("L", Quantity::parse(3.0, "m").unwrap()),
        Variable::known("d", Quantity::parse(1.0, "m").unwrap()),
        Variable::unknown("x"),
        Variable::unknown("y"),
    ]
    .into_iter()
    .collect();
    let mut system = system(&["x + y = L", "x - y = d"], variables);

    let result = system.solve();

    assert!(result.success, "{result}");
    let metre = Unit::parse("m").unwrap();
    let x = system.variables().value("x").unwrap().to(&metre).unwrap();
    let y = system.variables().value("y").unwrap().to(&metre).unwrap();
    assert_relative_eq!(x.value(), 2.0, epsilon = 1e-9);
    assert_relative_eq!(y.value(), 1.0, epsilon = 1e-9);
}

#[test]
fn ill_conditioned_system_falls_back_to_iteration() {
    init_tracing();
    let mut system = system(
        &["x = if(a > 0, a, y)", "y = (x - a) * 1e13 + 5"],
        table(&[("a", 1.0)], &["x", "y"]),
    );

    assert!(system.analyze().has_cycles());
    let result = system.solve();

    assert!(result.success, "{result}");
    assert_eq!(result.step("x").unwrap().method, SolveMethod::Conditional);
    assert_eq!(result.step("y").unwrap().method, SolveMethod::Direct);
    assert_relative_eq!(system.variables().value("y").unwrap().value(), 5.0);
}

#[test]
fn ill_conditioned_unsolvable_system_fails() {
    init_tracing();
    let mut system = system(
        &["x + y = 2", "x + 1.000000000000001 * y = 2"],
        table(&[], &["x", "y"]),
    );

    let result = system.solve();

    assert!(!result.success);
    assert_eq!(result.remaining, vec!["x", "y"]);
    assert!(!system.variables().get("x").unwrap().is_known());
}

#[test]
fn mixed_acyclic_and_cyclic_system() {
    init_tracing();
    let mut system = system(
        &[
            "total = x + y",
            "x + y = b + 1",
            "x - y = 1",
            "b = a * 2",
        ],
        table(&[("a", 1.0)], &["b", "x", "y", "total"]),
    );

    let result = system.solve();

    assert!(result.success, "{result}");
    assert_relative_eq!(system.variables().value("total").unwrap().value(), 3.0, epsilon = 1e-9);
    assert!(system.verify().iter().all(|check| check.satisfied));
}

#[test]
fn unsolvable_variables_are_reported() {
    init_tracing();
    let system = system(&["y = x + z", "w = x * 2"], table(&[("x", 1.0)], &["y", "z", "w"]));

    let order = system.order();
    let known = system.variables().known_symbols();
    let analysis = order.analyze_system(&known);

    assert!(analysis.unsolvable.contains("z"));
    assert!(!order.get_solving_order(&known).contains(&"z".to_string()));
    assert_eq!(analysis.solving_order, vec!["w"]);
}

#[test]
fn solving_order_respects_dependencies() {
    // A layered system: each `v_i` depends on up to two earlier variables.
    let texts: Vec<String> = (1..20)
        .rev()
        .map(|i| format!("v{i} = v{} + v{} * 2", i / 2, (i - 1) / 3))
        .collect();
    let texts: Vec<&str> = texts.iter().map(String::as_str).collect();
    let unknown: Vec<String> = (1..20).map(|i| format!("v{i}")).collect();
    let unknown: Vec<&str> = unknown.iter().map(String::as_str).collect();
    let variables = table(&[("v0", 1.0)], &unknown);

    let order = Order::build(&equations(&texts), &variables);
    let known = variables.known_symbols();
    let solving_order = order.get_solving_order(&known);

    let unique: BTreeSet<&String> = solving_order.iter().collect();
    assert_eq!(solving_order.len(), 19);
    assert_eq!(unique.len(), 19);
    for (position, symbol) in solving_order.iter().enumerate() {
        for dependency in order.dependencies(symbol) {
            if let Some(before) = solving_order.iter().position(|s| *s == dependency) {
                assert!(before < position, "{dependency} must precede {symbol}");
            } else {
                assert!(known.contains(&dependency));
            }
        }
    }
    assert!(order.detect_cycles().is_empty());
}

#[test]
fn cycle_detection_finds_feedback_loops() {
    let variables = table(&[("a", 1.0)], &["p", "q", "r"]);
    let order = Order::build(&equations(&["p = a + r", "q = p * 2", "r = q - 1"]), &variables);

    let cycles = order.detect_cycles();
    assert!(!cycles.is_empty());
    assert_eq!(
        order.get_strongly_connected_components(),
        vec![vec!["p".to_string(), "q".to_string(), "r".to_string()]]
    );
}

#[test]
fn result_displays_solving_log() {
    let mut system = system(&["y = 2 * x"], table(&[("x", 3.0)], &["y"]));

    let log = system.solve().to_string();

    assert!(log.starts_with("solved:"), "{log}");
    assert!(log.contains("y = 6  [direct: y = 2 * x]"), "{log}");
}
