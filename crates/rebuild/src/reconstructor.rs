use std::collections::HashSet;

use skein_core::{Equation, VariableTable};
use tracing::{debug, info};

use crate::{CompositeExpressionRebuilder, NamespaceMapper, namespace::NamespacePolicy};

/// Repairs equations whose references were bound before their sub-system
/// was namespaced into the live system.
#[derive(Debug, Clone)]
pub struct EquationReconstructor {
    live: HashSet<String>,
    mapper: NamespaceMapper,
}

impl EquationReconstructor {
    /// Creates a reconstructor over the given live symbols.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let live: HashSet<String> = symbols.into_iter().map(Into::into).collect();
        let mapper = NamespaceMapper::new(live.iter().cloned());
        Self { live, mapper }
    }

    /// Creates a reconstructor over every symbol in `variables`.
    #[must_use]
    pub fn from_table(variables: &VariableTable) -> Self {
        Self::new(variables.symbols())
    }

    /// Replaces the policy used when a base name exists in several namespaces.
    #[must_use]
    pub fn with_policy(mut self, policy: NamespacePolicy) -> Self {
        self.mapper = self.mapper.with_policy(policy);
        self
    }

    /// Returns the referenced symbols absent from the live system.
    #[must_use]
    pub fn missing_symbols(&self, equation: &Equation) -> Vec<String> {
        equation
            .variables()
            .iter()
            .filter(|symbol| !self.live.contains(*symbol))
            .cloned()
            .collect()
    }

    /// Returns a version of `equation` whose references all resolve to live
    /// symbols, or `None` if it cannot be repaired.
    ///
    /// A valid equation is returned unchanged. A repaired equation is a new
    /// value with the same name.
    pub fn fix_malformed_equation(&mut self, equation: &Equation) -> Option<Equation> {
        let missing = self.missing_symbols(equation);
        if missing.is_empty() {
            return Some(equation.clone());
        }
        debug!(equation = %equation, ?missing, "reconstructing equation");

        let mut rebuilder = CompositeExpressionRebuilder::new(&self.live, &mut self.mapper);
        let lhs = rebuilder.rebuild(equation.lhs())?;
        let rhs = rebuilder.rebuild(equation.rhs())?;

        let repaired = Equation::new(equation.name(), lhs, rhs);
        info!(from = %equation, to = %repaired, "reconstructed equation");
        Some(repaired)
    }
}
