use std::cmp::Ordering;

use crate::{Quantity, QuantityError};

/// Binary operators, including the two-argument functions `max` and `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Max,
    Min,
}

impl BinaryOperator {
    /// Returns the infix symbol, or the function name for `max` and `min`.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
            Self::Max => "max",
            Self::Min => "min",
        }
    }

    /// Returns `true` for operators written in function-call form.
    #[must_use]
    pub fn is_function(self) -> bool {
        matches!(self, Self::Max | Self::Min)
    }

    /// Looks up a two-argument function by name.
    #[must_use]
    pub fn from_function_name(name: &str) -> Option<Self> {
        match name {
            "max" => Some(Self::Max),
            "min" => Some(Self::Min),
            _ => None,
        }
    }

    /// Applies the operator to two quantities.
    ///
    /// # Errors
    ///
    /// Returns an error if the operands are dimensionally incompatible or the
    /// operation is undefined for them.
    pub fn apply(self, left: &Quantity, right: &Quantity) -> Result<Quantity, QuantityError> {
        match self {
            Self::Add => left.try_add(right),
            Self::Sub => left.try_sub(right),
            Self::Mul => left.try_mul(right),
            Self::Div => left.try_div(right),
            Self::Pow => left.powf(right),
            Self::Max => left.max(right),
            Self::Min => left.min(right),
        }
    }
}

/// Single-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryFunction {
    Neg,
    Abs,
    Sqrt,
    Exp,
    Ln,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
}

impl UnaryFunction {
    /// Every function that can be written in call form, i.e. all but `Neg`.
    pub const NAMED: [Self; 11] = [
        Self::Abs,
        Self::Sqrt,
        Self::Exp,
        Self::Ln,
        Self::Log10,
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Asin,
        Self::Acos,
        Self::Atan,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Neg => "neg",
            Self::Abs => "abs",
            Self::Sqrt => "sqrt",
            Self::Exp => "exp",
            Self::Ln => "ln",
            Self::Log10 => "log10",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
        }
    }

    /// Looks up a function by the name used in call form.
    ///
    /// `log` is accepted as an alias for the natural logarithm.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "log" {
            return Some(Self::Ln);
        }
        Self::NAMED.into_iter().find(|function| function.name() == name)
    }

    /// Applies the function to a quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the operand has a dimension the function does not
    /// accept or lies outside its domain.
    pub fn apply(self, operand: &Quantity) -> Result<Quantity, QuantityError> {
        let name = self.name();
        match self {
            Self::Neg => Ok(operand.negate()),
            Self::Abs => Ok(operand.abs()),
            Self::Sqrt => operand.sqrt(),
            Self::Exp => operand.map_dimensionless(name, f64::exp),
            Self::Ln => operand.map_dimensionless(name, f64::ln),
            Self::Log10 => operand.map_dimensionless(name, f64::log10),
            Self::Sin => operand.map_dimensionless(name, f64::sin),
            Self::Cos => operand.map_dimensionless(name, f64::cos),
            Self::Tan => operand.map_dimensionless(name, f64::tan),
            Self::Asin => operand.map_dimensionless(name, f64::asin),
            Self::Acos => operand.map_dimensionless(name, f64::acos),
            Self::Atan => operand.map_dimensionless(name, f64::atan),
        }
    }
}

/// Comparison operators used in conditional expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Comparison {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }

    /// Returns whether an ordering between two operands satisfies the comparison.
    #[must_use]
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Gt => ordering == Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
        }
    }
}
