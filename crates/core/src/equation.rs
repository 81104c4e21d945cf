use std::{collections::BTreeSet, fmt, sync::OnceLock};

use thiserror::Error;

use crate::{EvalError, Expression, Quantity, VariableTable};

/// Errors that can occur when solving an equation for one of its variables.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// The symbol is not alone on either side, so direct assignment is
    /// impossible.
    #[error("equation `{equation}` is not a direct assignment to `{symbol}`")]
    NotDirect { equation: String, symbol: String },

    #[error("failed to evaluate `{equation}`")]
    Eval {
        equation: String,
        #[source]
        source: EvalError,
    },
}

/// A named relationship `lhs = rhs` between expressions.
///
/// Equations whose left (or right) side is a bare variable reference can be
/// solved for that variable by evaluating the other side. Any other equation
/// is only checked, never solved directly.
#[derive(Debug, Clone)]
pub struct Equation {
    name: String,
    lhs: Expression,
    rhs: Expression,
    variables: OnceLock<BTreeSet<String>>,
}

impl Equation {
    pub fn new(name: impl Into<String>, lhs: Expression, rhs: Expression) -> Self {
        Self {
            name: name.into(),
            lhs,
            rhs,
            variables: OnceLock::new(),
        }
    }

    /// Creates a direct assignment `target = rhs`.
    pub fn assignment(name: impl Into<String>, target: impl Into<String>, rhs: Expression) -> Self {
        Self::new(name, Expression::var(target), rhs)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn lhs(&self) -> &Expression {
        &self.lhs
    }

    #[must_use]
    pub fn rhs(&self) -> &Expression {
        &self.rhs
    }

    /// Returns every symbol referenced on either side.
    ///
    /// The set is computed once and cached for the life of the equation.
    pub fn variables(&self) -> &BTreeSet<String> {
        self.variables.get_or_init(|| {
            let mut symbols = self.lhs.variables();
            symbols.extend(self.rhs.variables());
            symbols
        })
    }

    #[must_use]
    pub fn lhs_variables(&self) -> BTreeSet<String> {
        self.lhs.variables()
    }

    #[must_use]
    pub fn rhs_variables(&self) -> BTreeSet<String> {
        self.rhs.variables()
    }

    /// Returns the assigned symbol if the left side is a bare reference that
    /// does not also appear on the right.
    #[must_use]
    pub fn assignment_target(&self) -> Option<&str> {
        self.lhs
            .as_variable()
            .filter(|symbol| !self.rhs.variables().contains(*symbol))
    }

    /// Returns `true` if the equation can be solved for `symbol` by direct
    /// assignment once every symbol in `known` has a value.
    #[must_use]
    pub fn can_solve_for(&self, symbol: &str, known: &BTreeSet<String>) -> bool {
        match self.source_side(symbol) {
            Some(side) => {
                let inputs = side.variables();
                !inputs.contains(symbol) && inputs.is_subset(known)
            }
            None => false,
        }
    }

    /// Evaluates the side opposite `symbol`, giving the value `symbol` must take.
    ///
    /// # Errors
    ///
    /// Returns an error if `symbol` is not alone on either side or the other
    /// side fails to evaluate.
    pub fn solve_for(&self, symbol: &str, variables: &VariableTable) -> Result<Quantity, SolveError> {
        let side = self
            .source_side(symbol)
            .filter(|side| !side.variables().contains(symbol))
            .ok_or_else(|| SolveError::NotDirect {
                equation: self.to_string(),
                symbol: symbol.to_string(),
            })?;

        side.evaluate(variables).map_err(|source| SolveError::Eval {
            equation: self.to_string(),
            source,
        })
    }

    /// Evaluates `lhs - rhs`, expressed in the unit of the left side.
    ///
    /// # Errors
    ///
    /// Returns an error if either side fails to evaluate or the sides have
    /// different dimensions.
    pub fn residual(&self, variables: &VariableTable) -> Result<Quantity, EvalError> {
        let lhs = self.lhs.evaluate(variables)?;
        let rhs = self.rhs.evaluate(variables)?;
        Ok(lhs.try_sub(&rhs)?)
    }

    /// Returns the residual scaled by the larger side magnitude (in SI units),
    /// with magnitudes below one treated as one.
    ///
    /// # Errors
    ///
    /// Returns an error if the residual cannot be evaluated.
    pub fn scaled_residual(&self, variables: &VariableTable) -> Result<f64, EvalError> {
        let lhs = self.lhs.evaluate(variables)?;
        let rhs = self.rhs.evaluate(variables)?;
        let difference = lhs.try_sub(&rhs)?.si_value().abs();
        let scale = lhs.si_value().abs().max(rhs.si_value().abs()).max(1.0);
        Ok(difference / scale)
    }

    /// Returns `true` if the scaled residual is within `tolerance`.
    ///
    /// # Errors
    ///
    /// Returns an error if the residual cannot be evaluated.
    pub fn is_satisfied(&self, variables: &VariableTable, tolerance: f64) -> Result<bool, EvalError> {
        Ok(self.scaled_residual(variables)? <= tolerance)
    }

    /// Returns the side that would be evaluated to solve for `symbol`.
    fn source_side(&self, symbol: &str) -> Option<&Expression> {
        if self.lhs.as_variable() == Some(symbol) {
            Some(&self.rhs)
        } else if self.rhs.as_variable() == Some(symbol) {
            Some(&self.lhs)
        } else {
            None
        }
    }
}

impl PartialEq for Equation {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.lhs == other.lhs && self.rhs == other.rhs
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}
