use std::{
    collections::{BTreeSet, HashMap},
    ops::Index,
};

use thiserror::Error;

use crate::{Dimension, Quantity, QuantityError, Unit};

/// A stable handle to a variable stored in a [`VariableTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(usize);

impl VarId {
    /// Returns the arena index of the variable.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named physical variable, known or unknown.
///
/// A variable may declare a unit before it is solved. When a value is
/// assigned it is converted into that unit, so results come back in the
/// units the problem was written in.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    symbol: String,
    name: String,
    dimension: Option<Dimension>,
    unit: Option<Unit>,
    quantity: Option<Quantity>,
    known: bool,
}

impl Variable {
    /// Creates a known variable holding `quantity`.
    pub fn known(symbol: impl Into<String>, quantity: Quantity) -> Self {
        let symbol = symbol.into();
        Self {
            name: symbol.clone(),
            symbol,
            dimension: Some(quantity.dimension()),
            unit: Some(quantity.unit().clone()),
            quantity: Some(quantity),
            known: true,
        }
    }

    /// Creates an unknown variable with no declared unit or dimension.
    pub fn unknown(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            name: symbol.clone(),
            symbol,
            dimension: None,
            unit: None,
            quantity: None,
            known: false,
        }
    }

    /// Creates an unknown variable whose result should be expressed in `unit`.
    pub fn unknown_in(symbol: impl Into<String>, unit: Unit) -> Self {
        Self {
            dimension: Some(unit.dimension()),
            unit: Some(unit),
            ..Self::unknown(symbol)
        }
    }

    /// Sets a descriptive name for the variable.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared dimension, if any.
    #[must_use]
    pub fn dimension(&self) -> Option<Dimension> {
        self.dimension
    }

    /// Returns the declared unit, if any.
    #[must_use]
    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
    }

    #[must_use]
    pub fn quantity(&self) -> Option<&Quantity> {
        self.quantity.as_ref()
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        self.known
    }
}

/// Errors that can occur when assigning a value to a variable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssignError {
    #[error("variable `{0}` does not exist")]
    Missing(String),

    #[error("value for `{symbol}` does not match its declared unit")]
    Conversion {
        symbol: String,
        #[source]
        source: QuantityError,
    },

    #[error("value for `{symbol}` has dimension {found}, expected {expected}")]
    Dimension {
        symbol: String,
        expected: Dimension,
        found: Dimension,
    },
}

/// Saved quantity and known-flag state of every variable in a table.
#[derive(Debug, Clone)]
pub struct Checkpoint(Vec<(Option<Quantity>, bool)>);

/// An arena of variables addressed by symbol or by [`VarId`].
///
/// The table is the single mutable store a solve works against: solvers take
/// it by `&mut` and write results in place, so every holder of a symbol or
/// handle observes the update.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    variables: Vec<Variable>,
    index: HashMap<String, VarId>,
}

impl VariableTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a variable, replacing any existing variable with the same
    /// symbol while keeping its handle.
    pub fn insert(&mut self, variable: Variable) -> VarId {
        if let Some(&id) = self.index.get(&variable.symbol) {
            self.variables[id.0] = variable;
            return id;
        }

        let id = VarId(self.variables.len());
        self.index.insert(variable.symbol.clone(), id);
        self.variables.push(variable);
        id
    }

    #[must_use]
    pub fn id(&self, symbol: &str) -> Option<VarId> {
        self.index.get(symbol).copied()
    }

    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&Variable> {
        self.id(symbol).map(|id| &self.variables[id.0])
    }

    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Iterates over variables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    /// Iterates over all symbols in insertion order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(Variable::symbol)
    }

    /// Returns the value of a known variable.
    #[must_use]
    pub fn value(&self, symbol: &str) -> Option<&Quantity> {
        self.get(symbol)
            .filter(|variable| variable.known)
            .and_then(Variable::quantity)
    }

    #[must_use]
    pub fn known_symbols(&self) -> BTreeSet<String> {
        self.variables
            .iter()
            .filter(|variable| variable.known)
            .map(|variable| variable.symbol.clone())
            .collect()
    }

    #[must_use]
    pub fn unknown_symbols(&self) -> BTreeSet<String> {
        self.variables
            .iter()
            .filter(|variable| !variable.known)
            .map(|variable| variable.symbol.clone())
            .collect()
    }

    /// Assigns a value to a variable and marks it known.
    ///
    /// The value is converted to the variable's declared unit when one
    /// exists; otherwise the computed unit is kept. Returns the stored value.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable does not exist or the value's
    /// dimension does not match the declared one.
    pub fn assign(&mut self, symbol: &str, quantity: Quantity) -> Result<Quantity, AssignError> {
        let id = self
            .id(symbol)
            .ok_or_else(|| AssignError::Missing(symbol.to_string()))?;
        let variable = &mut self.variables[id.0];

        let stored = match &variable.unit {
            Some(unit) => quantity
                .to(unit)
                .map_err(|source| AssignError::Conversion {
                    symbol: symbol.to_string(),
                    source,
                })?,
            None => {
                if let Some(expected) = variable.dimension {
                    if expected != quantity.dimension() {
                        return Err(AssignError::Dimension {
                            symbol: symbol.to_string(),
                            expected,
                            found: quantity.dimension(),
                        });
                    }
                }
                quantity
            }
        };

        variable.quantity = Some(stored.clone());
        variable.known = true;
        Ok(stored)
    }

    /// Marks a variable unknown again, keeping its declared unit.
    pub fn forget(&mut self, symbol: &str) {
        if let Some(id) = self.id(symbol) {
            let variable = &mut self.variables[id.0];
            variable.quantity = None;
            variable.known = false;
        }
    }

    /// Captures the quantity and known flag of every variable.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(
            self.variables
                .iter()
                .map(|variable| (variable.quantity.clone(), variable.known))
                .collect(),
        )
    }

    /// Restores state captured by [`VariableTable::checkpoint`].
    ///
    /// Variables inserted after the checkpoint was taken are left untouched.
    pub fn restore(&mut self, checkpoint: &Checkpoint) {
        for (variable, (quantity, known)) in self.variables.iter_mut().zip(&checkpoint.0) {
            variable.quantity.clone_from(quantity);
            variable.known = *known;
        }
    }
}

impl Index<VarId> for VariableTable {
    type Output = Variable;

    fn index(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }
}

impl FromIterator<Variable> for VariableTable {
    fn from_iter<T: IntoIterator<Item = Variable>>(iter: T) -> Self {
        let mut table = Self::new();
        for variable in iter {
            table.insert(variable);
        }
        table
    }
}
