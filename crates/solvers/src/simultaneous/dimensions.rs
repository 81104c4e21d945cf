use std::collections::{HashMap, HashSet};

use skein_core::{
    Dimension, Equation, Expression, Quantity, Unit, Variable, VariableTable,
    expression::{BinaryOperator, UnaryFunction},
};

/// Returns the unit each unknown is probed and solved in.
///
/// A declared unit wins, then the SI unit of a declared dimension. An unknown
/// with neither takes the SI unit of the dimension its equations imply, and
/// is dimensionless if they imply nothing.
pub(super) fn probe_units(
    equations: &[&Equation],
    unknowns: &[String],
    variables: &VariableTable,
) -> Vec<Unit> {
    let mut inference = Inference {
        variables,
        open: unknowns
            .iter()
            .filter(|symbol| {
                variables
                    .get(symbol)
                    .is_none_or(|variable| variable.dimension().is_none())
            })
            .cloned()
            .collect(),
        inferred: HashMap::new(),
    };
    inference.run(equations);

    unknowns
        .iter()
        .map(|symbol| {
            let variable = variables.get(symbol);
            if let Some(unit) = variable.and_then(Variable::unit) {
                return unit.clone();
            }
            let dimension = variable
                .and_then(Variable::dimension)
                .or_else(|| inference.inferred.get(symbol).copied())
                .unwrap_or(Dimension::DIMENSIONLESS);
            Unit::si(dimension)
        })
        .collect()
}

/// Propagates dimensions from the determined side of each equation into
/// undetermined unknowns.
struct Inference<'a> {
    variables: &'a VariableTable,
    open: HashSet<String>,
    inferred: HashMap<String, Dimension>,
}

impl Inference<'_> {
    /// Sweeps the equations until nothing new is inferred.
    fn run(&mut self, equations: &[&Equation]) {
        while !self.open.is_empty() && self.sweep(equations) {}
    }

    fn sweep(&mut self, equations: &[&Equation]) -> bool {
        let mut progress = false;
        for equation in equations {
            let target = self
                .dimension_of(equation.lhs())
                .or_else(|| self.dimension_of(equation.rhs()));
            let Some(target) = target else {
                continue;
            };
            progress |= self.constrain(equation.lhs(), target);
            progress |= self.constrain(equation.rhs(), target);
        }
        progress
    }

    fn dimension_of_symbol(&self, symbol: &str) -> Option<Dimension> {
        if let Some(dimension) = self.inferred.get(symbol) {
            return Some(*dimension);
        }
        if self.open.contains(symbol) {
            return None;
        }
        let variable = self.variables.get(symbol)?;
        variable
            .dimension()
            .or_else(|| variable.quantity().map(Quantity::dimension))
    }

    /// Returns the dimension of `expression`, if the current knowledge fixes it.
    fn dimension_of(&self, expression: &Expression) -> Option<Dimension> {
        match expression {
            Expression::Variable(symbol) => self.dimension_of_symbol(symbol),
            Expression::Constant(quantity) => Some(quantity.dimension()),
            Expression::Binary {
                operator,
                left,
                right,
            } => match operator {
                BinaryOperator::Add
                | BinaryOperator::Sub
                | BinaryOperator::Max
                | BinaryOperator::Min => self
                    .dimension_of(left)
                    .or_else(|| self.dimension_of(right)),
                BinaryOperator::Mul => {
                    let left = self.dimension_of(left)?;
                    left.checked_mul(self.dimension_of(right)?)
                }
                BinaryOperator::Div => {
                    let left = self.dimension_of(left)?;
                    left.checked_div(self.dimension_of(right)?)
                }
                BinaryOperator::Pow => {
                    let base = self.dimension_of(left)?;
                    if base.is_dimensionless() {
                        return Some(base);
                    }
                    let Expression::Constant(exponent) = right.as_ref() else {
                        return None;
                    };
                    let power = exponent.si_value();
                    let integral = exponent.dimension().is_dimensionless()
                        && power.fract() == 0.0
                        && power.abs() <= f64::from(i8::MAX);
                    if integral { base.powi(power as i32) } else { None }
                }
            },
            Expression::Unary { function, operand } => match function {
                UnaryFunction::Neg | UnaryFunction::Abs => self.dimension_of(operand),
                UnaryFunction::Sqrt => self.dimension_of(operand)?.root(2),
                _ => Some(Dimension::DIMENSIONLESS),
            },
            Expression::Conditional {
                then, otherwise, ..
            } => self
                .dimension_of(then)
                .or_else(|| self.dimension_of(otherwise)),
        }
    }

    /// Requires `expression` to have dimension `target`, fixing any open
    /// unknown this pins down. Returns `true` if an unknown was fixed.
    fn constrain(&mut self, expression: &Expression, target: Dimension) -> bool {
        match expression {
            Expression::Variable(symbol) => {
                if !self.open.remove(symbol) {
                    return false;
                }
                self.inferred.insert(symbol.clone(), target);
                true
            }
            Expression::Constant(_) => false,
            Expression::Binary {
                operator,
                left,
                right,
            } => match operator {
                BinaryOperator::Add
                | BinaryOperator::Sub
                | BinaryOperator::Max
                | BinaryOperator::Min => {
                    self.constrain(left, target) | self.constrain(right, target)
                }
                BinaryOperator::Mul => match (self.dimension_of(left), self.dimension_of(right)) {
                    (Some(known), None) => target
                        .checked_div(known)
                        .is_some_and(|rest| self.constrain(right, rest)),
                    (None, Some(known)) => target
                        .checked_div(known)
                        .is_some_and(|rest| self.constrain(left, rest)),
                    _ => false,
                },
                BinaryOperator::Div => match (self.dimension_of(left), self.dimension_of(right)) {
                    (Some(numerator), None) => numerator
                        .checked_div(target)
                        .is_some_and(|denominator| self.constrain(right, denominator)),
                    (None, Some(denominator)) => target
                        .checked_mul(denominator)
                        .is_some_and(|numerator| self.constrain(left, numerator)),
                    _ => false,
                },
                BinaryOperator::Pow => false,
            },
            Expression::Unary { function, operand } => match function {
                UnaryFunction::Neg | UnaryFunction::Abs => self.constrain(operand, target),
                UnaryFunction::Sqrt => target
                    .powi(2)
                    .is_some_and(|squared| self.constrain(operand, squared)),
                _ => self.constrain(operand, Dimension::DIMENSIONLESS),
            },
            Expression::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let mut progress = self.constrain(then, target) | self.constrain(otherwise, target);
                let compared = self
                    .dimension_of(&condition.left)
                    .or_else(|| self.dimension_of(&condition.right));
                if let Some(compared) = compared {
                    progress |= self.constrain(&condition.left, compared)
                        | self.constrain(&condition.right, compared);
                }
                progress
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use skein_core::parse::parse_equation;

    fn units(texts: &[&str], variables: &VariableTable, unknowns: &[&str]) -> Vec<String> {
        let equations: Vec<Equation> = texts
            .iter()
            .map(|text| parse_equation(*text, text).unwrap())
            .collect();
        let refs: Vec<&Equation> = equations.iter().collect();
        let unknowns: Vec<String> = unknowns.iter().map(ToString::to_string).collect();

        probe_units(&refs, &unknowns, variables)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn undeclared_unknowns_take_implied_dimensions() {
        let variables: VariableTable = [
            Variable::known("L", Quantity::parse(3.0, "ft").unwrap()),
            Variable::known("t", Quantity::parse(2.0, "s").unwrap()),
            Variable::unknown("x"),
            Variable::unknown("v"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            units(&["x + 2 * L = 3[m]", "v * t = x"], &variables, &["x", "v"]),
            vec!["m", "m/s"]
        );
    }

    #[test]
    fn declared_units_are_kept() {
        let variables: VariableTable = [
            Variable::known("L", Quantity::parse(3.0, "m").unwrap()),
            Variable::unknown_in("x", Unit::parse("in").unwrap()),
            Variable::unknown("y"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            units(&["x + y = L", "x - y = 0[m]"], &variables, &["x", "y"]),
            vec!["in", "m"]
        );
    }

    #[test]
    fn inference_spreads_over_several_sweeps() {
        let variables: VariableTable = [
            Variable::known("L", Quantity::parse(3.0, "m").unwrap()),
            Variable::unknown("r"),
            Variable::unknown("x"),
            Variable::unknown("y"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            units(
                &["y = r / 3", "x = 2 * r", "x + r = L"],
                &variables,
                &["r", "x", "y"]
            ),
            vec!["m", "m", "m"]
        );
    }

    #[test]
    fn unconstrained_unknowns_are_dimensionless() {
        let variables: VariableTable = [Variable::unknown("x"), Variable::unknown("y")]
            .into_iter()
            .collect();

        assert_eq!(
            units(&["x + y = 3", "2 * x - y = 0"], &variables, &["x", "y"]),
            vec!["", ""]
        );
    }
}
