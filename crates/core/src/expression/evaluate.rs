use thiserror::Error;

use crate::{Quantity, QuantityError, VariableTable};

use super::Expression;

/// Errors that can occur when evaluating an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The expression references a symbol that is not in the table.
    #[error("variable `{0}` is not defined")]
    Missing(String),

    /// The referenced variable exists but has no value yet.
    #[error("variable `{0}` has no value")]
    Unknown(String),

    /// A unit or domain error in the arithmetic itself.
    #[error(transparent)]
    Quantity(#[from] QuantityError),
}

impl Expression {
    /// Evaluates the expression against the current variable values.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced variable is missing or has no value,
    /// or if an operation is dimensionally inconsistent or out of domain.
    pub fn evaluate(&self, variables: &VariableTable) -> Result<Quantity, EvalError> {
        match self {
            Self::Variable(symbol) => {
                if !variables.contains(symbol) {
                    return Err(EvalError::Missing(symbol.clone()));
                }
                variables
                    .value(symbol)
                    .cloned()
                    .ok_or_else(|| EvalError::Unknown(symbol.clone()))
            }
            Self::Constant(quantity) => Ok(quantity.clone()),
            Self::Binary {
                operator,
                left,
                right,
            } => {
                let left = left.evaluate(variables)?;
                let right = right.evaluate(variables)?;
                Ok(operator.apply(&left, &right)?)
            }
            Self::Unary { function, operand } => {
                let operand = operand.evaluate(variables)?;
                Ok(function.apply(&operand)?)
            }
            Self::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let left = condition.left.evaluate(variables)?;
                let right = condition.right.evaluate(variables)?;
                if condition.comparison.holds(left.compare(&right)?) {
                    then.evaluate(variables)
                } else {
                    otherwise.evaluate(variables)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::{
        Unit, Variable,
        expression::{Comparison, Condition},
    };

    fn variables() -> VariableTable {
        [
            Variable::known("x", Quantity::dimensionless(3.0)),
            Variable::known("L", Quantity::parse(2.0, "ft").unwrap()),
            Variable::unknown("y"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn evaluates_arithmetic() {
        let expression = Expression::var("x") * 2.0 + 1.0;

        let value = expression.evaluate(&variables()).unwrap();

        assert_relative_eq!(value.value(), 7.0);
    }

    #[test]
    fn carries_units_through_arithmetic() {
        let inch = Unit::parse("in").unwrap();
        let expression = Expression::var("L") + Expression::constant(Quantity::new(6.0, inch));

        let value = expression.evaluate(&variables()).unwrap();

        assert_relative_eq!(value.value(), 2.5);
        assert_eq!(value.unit().to_string(), "ft");
    }

    #[test]
    fn reports_missing_and_unknown_variables() {
        let variables = variables();

        assert_eq!(
            Expression::var("z").evaluate(&variables),
            Err(EvalError::Missing("z".to_string()))
        );
        assert_eq!(
            Expression::var("y").evaluate(&variables),
            Err(EvalError::Unknown("y".to_string()))
        );
    }

    #[test]
    fn reports_dimension_errors() {
        let expression = Expression::var("L") + Expression::var("x");

        assert!(matches!(
            expression.evaluate(&variables()),
            Err(EvalError::Quantity(QuantityError::Incompatible { .. }))
        ));
    }

    #[test]
    fn reports_out_of_range_unit_exponents() {
        let variables = variables();
        let overflow = |text: &str| {
            crate::parse::parse_expression(text)
                .unwrap()
                .evaluate(&variables)
        };

        assert!(matches!(
            overflow("(L^2)^100"),
            Err(EvalError::Quantity(QuantityError::ExponentOverflow { .. }))
        ));
        assert!(matches!(
            overflow("L^100 * L^100"),
            Err(EvalError::Quantity(QuantityError::ExponentOverflow { .. }))
        ));
        assert_eq!(
            overflow("L^100").unwrap().unit().dimension(),
            crate::Dimension::LENGTH.powi(100).unwrap()
        );
    }

    #[test]
    fn conditional_only_evaluates_taken_branch() {
        let expression = Expression::conditional(
            Condition {
                comparison: Comparison::Gt,
                left: Expression::var("x"),
                right: Expression::number(0.0),
            },
            Expression::var("x") * 10.0,
            Expression::var("y"),
        );

        let value = expression.evaluate(&variables()).unwrap();

        assert_relative_eq!(value.value(), 30.0);
    }
}
