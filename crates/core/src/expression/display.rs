use std::fmt;

use super::{BinaryOperator, Expression, UnaryFunction};

const ADDITIVE: u8 = 1;
const MULTIPLICATIVE: u8 = 2;
const NEGATION: u8 = 3;
const POWER: u8 = 4;
const ATOM: u8 = 5;

impl Expression {
    /// Binding strength of the node when written as text.
    fn precedence(&self) -> u8 {
        match self {
            Self::Binary { operator, .. } => match operator {
                BinaryOperator::Add | BinaryOperator::Sub => ADDITIVE,
                BinaryOperator::Mul | BinaryOperator::Div => MULTIPLICATIVE,
                BinaryOperator::Pow => POWER,
                BinaryOperator::Max | BinaryOperator::Min => ATOM,
            },
            Self::Unary {
                function: UnaryFunction::Neg,
                ..
            } => NEGATION,
            Self::Constant(quantity) if quantity.value().is_sign_negative() => NEGATION,
            _ => ATOM,
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Expression, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

impl fmt::Display for Expression {
    /// Writes the expression in the syntax accepted by the parser, adding
    /// parentheses only where precedence requires them.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(symbol) => write!(f, "{symbol}"),
            Self::Constant(quantity) => {
                if quantity.unit().is_unity() {
                    write!(f, "{}", quantity.value())
                } else {
                    write!(f, "{}[{}]", quantity.value(), quantity.unit())
                }
            }
            Self::Binary {
                operator,
                left,
                right,
            } if operator.is_function() => {
                write!(f, "{}({left}, {right})", operator.symbol())
            }
            Self::Binary {
                operator,
                left,
                right,
            } => {
                let own = self.precedence();
                let left_parens = if *operator == BinaryOperator::Pow {
                    left.precedence() <= own
                } else {
                    left.precedence() < own
                };
                let right_parens = if *operator == BinaryOperator::Pow {
                    right.precedence() < own
                } else {
                    right.precedence() <= own
                };

                write_operand(f, left, left_parens)?;
                write!(f, " {} ", operator.symbol())?;
                write_operand(f, right, right_parens)
            }
            Self::Unary {
                function: UnaryFunction::Neg,
                operand,
            } => {
                write!(f, "-")?;
                write_operand(f, operand, operand.precedence() < NEGATION)
            }
            Self::Unary { function, operand } => write!(f, "{}({operand})", function.name()),
            Self::Conditional {
                condition,
                then,
                otherwise,
            } => write!(
                f,
                "if({} {} {}, {then}, {otherwise})",
                condition.left,
                condition.comparison.symbol(),
                condition.right
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{
        Quantity,
        expression::{Comparison, Condition},
    };

    #[test]
    fn parenthesizes_by_precedence() {
        let d = Expression::var("D");
        let t = Expression::var("T");
        let c = Expression::var("c");

        let expression = d - (t - c) * 2.0;

        assert_eq!(expression.to_string(), "D - (T - c) * 2");
    }

    #[test]
    fn keeps_right_operands_grouped() {
        let expression = Expression::var("a") - (Expression::var("b") - Expression::var("c"));
        let power = Expression::binary(
            BinaryOperator::Pow,
            -Expression::var("x"),
            Expression::number(2.0),
        );

        assert_eq!(expression.to_string(), "a - (b - c)");
        assert_eq!(power.to_string(), "(-x) ^ 2");
    }

    #[test]
    fn writes_functions_units_and_conditionals() {
        let expression = Expression::conditional(
            Condition {
                comparison: Comparison::Le,
                left: Expression::var("t"),
                right: Expression::constant(Quantity::parse(0.25, "in").unwrap()),
            },
            Expression::unary(UnaryFunction::Sqrt, Expression::var("A")),
            Expression::binary(
                BinaryOperator::Max,
                Expression::var("a"),
                Expression::var("b"),
            ),
        );

        assert_eq!(
            expression.to_string(),
            "if(t <= 0.25[in], sqrt(A), max(a, b))"
        );
    }
}
