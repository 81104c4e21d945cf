use std::collections::BTreeSet;

/// A summary of how an equation system can be solved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemAnalysis {
    /// Symbols without a value.
    pub unknowns: BTreeSet<String>,

    /// Unknown symbols in an order that solves each one after its inputs.
    pub solving_order: Vec<String>,

    /// One representative cycle per back edge in the dependency graph.
    pub cycles: Vec<Vec<String>>,

    /// Groups of mutually dependent symbols.
    pub strongly_connected_components: Vec<Vec<String>>,

    /// Unknowns that cannot be reached from known values one at a time.
    pub unsolvable: BTreeSet<String>,

    /// Whether every unknown can be reached from known values one at a time.
    pub can_solve: bool,
}

impl SystemAnalysis {
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}
