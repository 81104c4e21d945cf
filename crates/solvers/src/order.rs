//! The dependency graph between variables of an equation system.
//!
//! An edge `a → b` means the equation that solves `b` needs the value of `a`.
//! The graph answers which variables can be computed, in what order, and
//! which groups of variables are mutually dependent and must be solved
//! together.

mod analysis;
#[cfg(test)]
mod tests;

use std::{
    cmp::Reverse,
    collections::{BTreeSet, BinaryHeap, HashMap, HashSet},
};

use petgraph::{
    Direction,
    algo::tarjan_scc,
    graph::{DiGraph, Neighbors, NodeIndex},
};
use skein_core::{Equation, VariableTable};

pub use analysis::SystemAnalysis;

/// Dequeue priority of a ready symbol; lower values are taken first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Readiness {
    Known,
    SimpleAssignment,
    Computed,
}

/// Depth-first search colors for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// A dependency graph over variable symbols, built from a set of equations.
#[derive(Debug, Clone, Default)]
pub struct Order {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
    equations: Vec<Equation>,
    solvers: HashMap<String, Vec<usize>>,
}

impl Order {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph for `equations`, with a node for every variable in
    /// `variables` whether or not an equation mentions it.
    #[must_use]
    pub fn build(equations: &[Equation], variables: &VariableTable) -> Self {
        let mut order = Self::new();
        for symbol in variables.symbols() {
            order.get_or_add_symbol(symbol);
        }

        let known = variables.known_symbols();
        for equation in equations {
            order.add_equation(equation, &known);
        }
        order
    }

    /// Adds an equation's dependencies to the graph.
    ///
    /// If one side is a bare variable reference, every symbol on the other
    /// side becomes a dependency of it, and the equation is recorded as a
    /// solver for it when it is a true assignment. Otherwise each unknown in
    /// the equation depends on every other symbol in it, and the equation is
    /// recorded for each unknown it can be solved for.
    pub fn add_equation(&mut self, equation: &Equation, known: &BTreeSet<String>) {
        for symbol in equation.variables() {
            self.get_or_add_symbol(symbol);
        }
        let index = self.equations.len();
        self.equations.push(equation.clone());

        let lhs = equation.lhs();
        let rhs = equation.rhs();
        let sides = lhs
            .as_variable()
            .map(|target| (target, rhs))
            .or_else(|| rhs.as_variable().map(|target| (target, lhs)));

        if let Some((target, source)) = sides {
            let inputs = source.variables();
            for input in &inputs {
                self.add_dependency(input, target);
            }
            if !inputs.contains(target) {
                self.record_solver(target, index);
            }
            return;
        }

        let symbols = equation.variables();
        for unknown in symbols.iter().filter(|symbol| !known.contains(*symbol)) {
            for other in symbols.iter().filter(|other| *other != unknown) {
                self.add_dependency(other, unknown);
            }
            if equation.can_solve_for(unknown, known) {
                self.record_solver(unknown, index);
            }
        }
    }

    /// Returns every symbol in the graph.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.node_map.contains_key(symbol)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the equations recorded as able to solve `symbol`.
    pub fn solvers_for(&self, symbol: &str) -> impl Iterator<Item = &Equation> {
        self.solvers
            .get(symbol)
            .into_iter()
            .flatten()
            .map(|&index| &self.equations[index])
    }

    /// Returns `true` if at least one equation was recorded as a solver for
    /// `symbol`.
    #[must_use]
    pub fn has_solver(&self, symbol: &str) -> bool {
        self.solvers.contains_key(symbol)
    }

    /// Returns the symbols `symbol` depends on.
    #[must_use]
    pub fn dependencies(&self, symbol: &str) -> BTreeSet<String> {
        self.neighbors(symbol, Direction::Incoming)
    }

    /// Returns the symbols that depend on `symbol`.
    #[must_use]
    pub fn dependents(&self, symbol: &str) -> BTreeSet<String> {
        self.neighbors(symbol, Direction::Outgoing)
    }

    /// Returns the unknown symbols that a recorded solver equation can compute
    /// from `known` alone.
    #[must_use]
    pub fn solvable_symbols(&self, known: &BTreeSet<String>) -> BTreeSet<String> {
        self.solvers
            .iter()
            .filter(|(symbol, _)| !known.contains(*symbol))
            .filter(|(symbol, _)| {
                self.solvers_for(symbol)
                    .any(|equation| equation.can_solve_for(symbol, known))
            })
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }

    /// Returns a topological solving order for the unknown symbols.
    ///
    /// Known symbols seed the order, along with unknowns that have a solver
    /// and no dependencies. Among ready symbols, those assigned by a plain
    /// `a = b` equation come first; ties keep the order symbols became ready.
    /// Symbols with no solver, and everything that depends on them or sits in
    /// a cycle, are left out. Known symbols are not included in the result.
    #[must_use]
    pub fn get_solving_order(&self, known: &BTreeSet<String>) -> Vec<String> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|node| {
                let count = self
                    .graph
                    .neighbors_directed(node, Direction::Incoming)
                    .count();
                (node, count)
            })
            .collect();

        let mut queued = HashSet::new();
        let mut ready = BinaryHeap::new();
        let mut sequence = 0_usize;

        let mut enqueue = |node: NodeIndex, ready: &mut BinaryHeap<_>| {
            if queued.insert(node) {
                let readiness = self.readiness(&self.graph[node], known);
                ready.push(Reverse((readiness, sequence, node)));
                sequence += 1;
            }
        };

        for node in self.graph.node_indices() {
            let symbol = &self.graph[node];
            if known.contains(symbol) || (in_degree[&node] == 0 && self.has_solver(symbol)) {
                enqueue(node, &mut ready);
            }
        }

        let mut order = Vec::new();
        while let Some(Reverse((_, _, node))) = ready.pop() {
            let symbol = &self.graph[node];
            if !known.contains(symbol) {
                order.push(symbol.clone());
            }

            for dependent in self.graph.neighbors_directed(node, Direction::Outgoing) {
                let Some(degree) = in_degree.get_mut(&dependent) else {
                    continue;
                };
                *degree = degree.saturating_sub(1);

                let dependent_symbol = &self.graph[dependent];
                if *degree == 0
                    && (known.contains(dependent_symbol) || self.has_solver(dependent_symbol))
                {
                    enqueue(dependent, &mut ready);
                }
            }
        }

        order
    }

    /// Returns one representative cycle for each back edge found by a
    /// depth-first search.
    ///
    /// Each cycle lists its symbols in dependency order, starting from the
    /// symbol the back edge returns to.
    #[must_use]
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut colors = vec![Color::White; self.graph.node_count()];
        let mut cycles = Vec::new();

        for root in self.graph.node_indices() {
            if colors[root.index()] != Color::White {
                continue;
            }
            colors[root.index()] = Color::Gray;

            // The stack holds the current path with each node's unvisited
            // successors.
            let mut stack = vec![(root, self.successors(root))];
            while let Some((_, successors)) = stack.last_mut() {
                let Some(next) = successors.next() else {
                    if let Some((node, _)) = stack.pop() {
                        colors[node.index()] = Color::Black;
                    }
                    continue;
                };

                match colors[next.index()] {
                    Color::White => {
                        colors[next.index()] = Color::Gray;
                        stack.push((next, self.successors(next)));
                    }
                    Color::Gray => {
                        if let Some(start) = stack.iter().position(|(on_path, _)| *on_path == next)
                        {
                            cycles.push(
                                stack[start..]
                                    .iter()
                                    .map(|(member, _)| self.graph[*member].clone())
                                    .collect(),
                            );
                        }
                    }
                    Color::Black => {}
                }
            }
        }

        cycles
    }

    /// Returns the strongly connected components that need simultaneous
    /// treatment: those with two or more symbols, or one symbol that depends
    /// on itself.
    #[must_use]
    pub fn get_strongly_connected_components(&self) -> Vec<Vec<String>> {
        components(&self.graph)
    }

    /// Returns the strongly connected components of the graph restricted to
    /// `symbols`.
    #[must_use]
    pub fn strongly_connected_components_among(
        &self,
        symbols: &BTreeSet<String>,
    ) -> Vec<Vec<String>> {
        let mut subgraph = DiGraph::<String, ()>::new();
        let mut nodes = HashMap::new();

        for symbol in symbols.iter().filter(|symbol| self.contains(symbol)) {
            nodes.insert(symbol.as_str(), subgraph.add_node(symbol.clone()));
        }
        for edge in self.graph.raw_edges() {
            let source = self.graph[edge.source()].as_str();
            let target = self.graph[edge.target()].as_str();
            if let (Some(&from), Some(&to)) = (nodes.get(source), nodes.get(target)) {
                subgraph.update_edge(from, to, ());
            }
        }

        components(&subgraph)
    }

    /// Returns the unknown symbols that cannot be reached from known values,
    /// either because no equation solves them or because the solving order
    /// never gets to them.
    #[must_use]
    pub fn unsolvable_variables(&self, known: &BTreeSet<String>) -> BTreeSet<String> {
        let reachable: HashSet<String> = self.get_solving_order(known).into_iter().collect();

        self.symbols()
            .filter(|symbol| !known.contains(*symbol))
            .filter(|symbol| !self.has_solver(symbol) || !reachable.contains(*symbol))
            .map(str::to_string)
            .collect()
    }

    /// Returns whether every unknown can be reached from known values, along
    /// with the symbols that cannot.
    #[must_use]
    pub fn can_solve_system(&self, known: &BTreeSet<String>) -> (bool, BTreeSet<String>) {
        let unsolvable = self.unsolvable_variables(known);
        (unsolvable.is_empty(), unsolvable)
    }

    /// Collects ordering, cycle, and solvability information in one report.
    #[must_use]
    pub fn analyze_system(&self, known: &BTreeSet<String>) -> SystemAnalysis {
        let unknowns = self
            .symbols()
            .filter(|symbol| !known.contains(*symbol))
            .map(str::to_string)
            .collect();
        let (can_solve, unsolvable) = self.can_solve_system(known);

        SystemAnalysis {
            unknowns,
            solving_order: self.get_solving_order(known),
            cycles: self.detect_cycles(),
            strongly_connected_components: self.get_strongly_connected_components(),
            unsolvable,
            can_solve,
        }
    }

    /// Ranks a ready symbol for dequeueing.
    fn readiness(&self, symbol: &str, known: &BTreeSet<String>) -> Readiness {
        if known.contains(symbol) {
            Readiness::Known
        } else if self.solvers_for(symbol).any(|equation| {
            equation.lhs().as_variable().is_some() && equation.rhs().as_variable().is_some()
        }) {
            Readiness::SimpleAssignment
        } else {
            Readiness::Computed
        }
    }

    fn successors(&self, node: NodeIndex) -> Neighbors<'_, ()> {
        self.graph.neighbors_directed(node, Direction::Outgoing)
    }

    fn neighbors(&self, symbol: &str, direction: Direction) -> BTreeSet<String> {
        self.node_map
            .get(symbol)
            .into_iter()
            .flat_map(|&node| self.graph.neighbors_directed(node, direction))
            .map(|node| self.graph[node].clone())
            .collect()
    }

    fn add_dependency(&mut self, input: &str, target: &str) {
        let from = self.get_or_add_symbol(input);
        let to = self.get_or_add_symbol(target);
        self.graph.update_edge(from, to, ());
    }

    fn record_solver(&mut self, symbol: &str, equation: usize) {
        let solvers = self.solvers.entry(symbol.to_string()).or_default();
        if !solvers.contains(&equation) {
            solvers.push(equation);
        }
    }

    /// Returns the node index for a symbol, adding it to the graph if it does not exist.
    fn get_or_add_symbol(&mut self, symbol: &str) -> NodeIndex {
        if let Some(&node) = self.node_map.get(symbol) {
            return node;
        }
        let node = self.graph.add_node(symbol.to_string());
        self.node_map.insert(symbol.to_string(), node);
        node
    }
}

/// Runs Tarjan's algorithm and keeps the components that form cycles.
///
/// Symbols within each component are sorted, and components are sorted by
/// their first symbol.
fn components(graph: &DiGraph<String, ()>) -> Vec<Vec<String>> {
    let mut components: Vec<Vec<String>> = tarjan_scc(graph)
        .into_iter()
        .filter(|component| match component.as_slice() {
            [only] => graph.contains_edge(*only, *only),
            _ => true,
        })
        .map(|component| {
            let mut symbols: Vec<String> =
                component.into_iter().map(|node| graph[node].clone()).collect();
            symbols.sort();
            symbols
        })
        .collect();
    components.sort();
    components
}
