//! Immutable expression trees over named variables and unit-bearing constants.
//!
//! An [`Expression`] is a closed set of node kinds. Trees are evaluated
//! against a [`VariableTable`](crate::VariableTable) and report the symbols
//! they reference, which is all the solvers need from them.

mod display;
mod evaluate;
mod operator;

use std::{
    collections::BTreeSet,
    ops::{Add, Div, Mul, Neg, Sub},
};

pub use evaluate::EvalError;
pub use operator::{BinaryOperator, Comparison, UnaryFunction};

use crate::Quantity;

/// An expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A reference to a variable by symbol.
    Variable(String),

    /// A constant quantity.
    Constant(Quantity),

    /// A binary operation or two-argument function.
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// A single-argument function, including negation.
    Unary {
        function: UnaryFunction,
        operand: Box<Expression>,
    },

    /// A branch selected by comparing two expressions.
    ///
    /// Only the taken branch is evaluated, so a conditional may evaluate even
    /// when variables in the other branch have no value.
    Conditional {
        condition: Box<Condition>,
        then: Box<Expression>,
        otherwise: Box<Expression>,
    },
}

/// The test of a conditional expression: `left <comparison> right`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub comparison: Comparison,
    pub left: Expression,
    pub right: Expression,
}

impl Expression {
    /// Creates a variable reference.
    pub fn var(symbol: impl Into<String>) -> Self {
        Self::Variable(symbol.into())
    }

    #[must_use]
    pub fn constant(quantity: Quantity) -> Self {
        Self::Constant(quantity)
    }

    /// Creates a dimensionless numeric constant.
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self::Constant(Quantity::dimensionless(value))
    }

    #[must_use]
    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        Self::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn unary(function: UnaryFunction, operand: Expression) -> Self {
        Self::Unary {
            function,
            operand: Box::new(operand),
        }
    }

    #[must_use]
    pub fn conditional(condition: Condition, then: Expression, otherwise: Expression) -> Self {
        Self::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// Returns the symbol if this node is a bare variable reference.
    #[must_use]
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Self::Variable(symbol) => Some(symbol),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_conditional(&self) -> bool {
        matches!(self, Self::Conditional { .. })
    }

    /// Returns every symbol referenced anywhere in the tree.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<String> {
        let mut symbols = BTreeSet::new();
        self.collect_variables(&mut symbols);
        symbols
    }

    fn collect_variables(&self, symbols: &mut BTreeSet<String>) {
        match self {
            Self::Variable(symbol) => {
                symbols.insert(symbol.clone());
            }
            Self::Constant(_) => {}
            Self::Binary { left, right, .. } => {
                left.collect_variables(symbols);
                right.collect_variables(symbols);
            }
            Self::Unary { operand, .. } => operand.collect_variables(symbols),
            Self::Conditional {
                condition,
                then,
                otherwise,
            } => {
                condition.left.collect_variables(symbols);
                condition.right.collect_variables(symbols);
                then.collect_variables(symbols);
                otherwise.collect_variables(symbols);
            }
        }
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<Quantity> for Expression {
    fn from(quantity: Quantity) -> Self {
        Self::Constant(quantity)
    }
}

macro_rules! binary_operator {
    ($trait:ident, $method:ident, $operator:expr) => {
        impl<R: Into<Expression>> $trait<R> for Expression {
            type Output = Expression;

            fn $method(self, rhs: R) -> Expression {
                Expression::binary($operator, self, rhs.into())
            }
        }
    };
}

binary_operator!(Add, add, BinaryOperator::Add);
binary_operator!(Sub, sub, BinaryOperator::Sub);
binary_operator!(Mul, mul, BinaryOperator::Mul);
binary_operator!(Div, div, BinaryOperator::Div);

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        Expression::unary(UnaryFunction::Neg, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_variables_from_every_branch() {
        let expression = Expression::conditional(
            Condition {
                comparison: Comparison::Gt,
                left: Expression::var("a"),
                right: Expression::number(0.0),
            },
            Expression::var("b") * 2.0,
            -Expression::var("c"),
        );

        let symbols: Vec<_> = expression.variables().into_iter().collect();

        assert_eq!(symbols, vec!["a", "b", "c"]);
        assert!(expression.is_conditional());
    }

    #[test]
    fn bare_references_are_recognized() {
        assert_eq!(Expression::var("x").as_variable(), Some("x"));
        assert_eq!((Expression::var("x") + 1.0).as_variable(), None);
    }
}
