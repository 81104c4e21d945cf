use std::collections::HashMap;

use tracing::{debug, warn};

/// A live symbol that ends in `{namespace}_{base}` for some base name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Candidate {
    pub namespace: String,
    pub symbol: String,
}

/// Chooses among several namespaces that all contain the same base name.
///
/// Returns the index of the chosen candidate, or `None` to refuse the mapping.
pub type NamespacePolicy = fn(base: &str, candidates: &[Candidate]) -> Option<usize>;

/// Picks the alphabetically first namespace.
///
/// This is a heuristic: when a base name exists in several sub-systems there
/// is no information in the malformed text to say which one was meant.
#[must_use]
pub fn first_alphabetical(_base: &str, candidates: &[Candidate]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.namespace.cmp(&b.namespace))
        .map(|(index, _)| index)
}

/// Maps unprefixed base names to namespaced live symbols.
///
/// Lookups are memoized for the life of the mapper.
#[derive(Debug, Clone)]
pub struct NamespaceMapper {
    symbols: Vec<String>,
    policy: NamespacePolicy,
    cache: HashMap<String, Option<String>>,
}

impl NamespaceMapper {
    /// Creates a mapper over the given live symbols using [`first_alphabetical`].
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut symbols: Vec<String> = symbols.into_iter().map(Into::into).collect();
        symbols.sort();
        symbols.dedup();

        Self {
            symbols,
            policy: first_alphabetical,
            cache: HashMap::new(),
        }
    }

    /// Replaces the policy used for ambiguous names.
    #[must_use]
    pub fn with_policy(mut self, policy: NamespacePolicy) -> Self {
        self.policy = policy;
        self.cache.clear();
        self
    }

    /// Returns every live symbol of the form `{namespace}_{base}`.
    #[must_use]
    pub fn candidates(&self, base: &str) -> Vec<Candidate> {
        self.symbols
            .iter()
            .filter_map(|symbol| {
                let prefix = symbol.strip_suffix(base)?.strip_suffix('_')?;
                (!prefix.is_empty()).then(|| Candidate {
                    namespace: prefix.to_string(),
                    symbol: symbol.clone(),
                })
            })
            .collect()
    }

    /// Resolves a base name to a single namespaced symbol.
    ///
    /// A unique candidate maps directly; several candidates are settled by the
    /// policy and logged as ambiguous; no candidate gives `None`.
    pub fn resolve(&mut self, base: &str) -> Option<String> {
        if let Some(cached) = self.cache.get(base) {
            return cached.clone();
        }

        let candidates = self.candidates(base);
        let resolved = match candidates.as_slice() {
            [] => {
                debug!(base, "no namespace contains variable");
                None
            }
            [only] => Some(only.symbol.clone()),
            _ => {
                let chosen = (self.policy)(base, &candidates)
                    .and_then(|index| candidates.get(index))
                    .map(|candidate| candidate.symbol.clone());
                warn!(
                    base,
                    candidates = ?candidates.iter().map(|c| &c.namespace).collect::<Vec<_>>(),
                    chosen = ?chosen,
                    "ambiguous namespace for variable"
                );
                chosen
            }
        };

        self.cache.insert(base.to_string(), resolved.clone());
        resolved
    }
}
