use std::{cmp::Ordering, fmt};

use thiserror::Error;

use crate::{Dimension, Unit, UnitError};

/// Errors that can occur in quantity arithmetic and conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantityError {
    /// The operands of an operation have different dimensions.
    #[error("cannot {operation} quantities of dimension {left} and {right}")]
    Incompatible {
        operation: &'static str,
        left: Dimension,
        right: Dimension,
    },

    /// The operation requires a dimensionless operand.
    #[error("`{operation}` requires a dimensionless quantity, got dimension {dimension}")]
    NotDimensionless {
        operation: &'static str,
        dimension: Dimension,
    },

    /// A dimensioned quantity was raised to a power its unit cannot take.
    #[error("cannot raise a quantity of dimension {dimension} to the power {exponent}")]
    FractionalPower { exponent: f64, dimension: Dimension },

    /// The operand is outside the domain of a function.
    #[error("{value} is outside the domain of `{function}`")]
    Domain { function: &'static str, value: f64 },

    #[error("division by zero")]
    DivisionByZero,

    /// A unit exponent of the result does not fit the supported range.
    #[error("unit exponents of the {operation} result are out of range")]
    ExponentOverflow { operation: &'static str },

    /// One of the compared values is NaN.
    #[error("quantities {left} and {right} are not comparable")]
    NotComparable { left: f64, right: f64 },
}

/// A numeric value carried together with its unit.
///
/// Arithmetic is dimension-checked: addition, subtraction and comparison
/// convert the right operand into the left operand's unit and fail if the
/// dimensions differ, while multiplication and division combine units.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    value: f64,
    unit: Unit,
}

impl Quantity {
    /// Creates a quantity from a value expressed in `unit`.
    #[must_use]
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Creates a plain dimensionless quantity.
    #[must_use]
    pub fn dimensionless(value: f64) -> Self {
        Self::new(value, Unit::dimensionless())
    }

    /// Creates a quantity from a value and a unit symbol such as `"in"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit symbol cannot be parsed.
    pub fn parse(value: f64, unit: &str) -> Result<Self, UnitError> {
        Ok(Self::new(value, Unit::parse(unit)?))
    }

    /// Returns the value expressed in this quantity's own unit.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.unit.dimension()
    }

    /// Returns the value expressed in coherent SI units.
    #[must_use]
    pub fn si_value(&self) -> f64 {
        self.value * self.unit.factor()
    }

    /// Converts the quantity into `unit`.
    ///
    /// # Errors
    ///
    /// Returns an error if `unit` has a different dimension.
    pub fn to(&self, unit: &Unit) -> Result<Self, QuantityError> {
        if !self.unit.is_compatible(unit) {
            return Err(QuantityError::Incompatible {
                operation: "convert",
                left: self.dimension(),
                right: unit.dimension(),
            });
        }
        Ok(Self::new(self.si_value() / unit.factor(), unit.clone()))
    }

    /// Adds `other`, expressing the result in this quantity's unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions differ.
    pub fn try_add(&self, other: &Self) -> Result<Self, QuantityError> {
        let other = self.align("add", other)?;
        Ok(Self::new(self.value + other, self.unit.clone()))
    }

    /// Subtracts `other`, expressing the result in this quantity's unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions differ.
    pub fn try_sub(&self, other: &Self) -> Result<Self, QuantityError> {
        let other = self.align("subtract", other)?;
        Ok(Self::new(self.value - other, self.unit.clone()))
    }

    /// Multiplies two quantities, combining their units.
    ///
    /// # Errors
    ///
    /// Returns an error if a unit exponent of the product is out of range.
    pub fn try_mul(&self, other: &Self) -> Result<Self, QuantityError> {
        let unit = self
            .unit
            .checked_mul(&other.unit)
            .ok_or(QuantityError::ExponentOverflow {
                operation: "multiply",
            })?;
        Ok(Self::new(self.value * other.value, unit))
    }

    /// Divides by `other`, combining units.
    ///
    /// # Errors
    ///
    /// Returns an error if `other` is zero or a unit exponent of the quotient
    /// is out of range.
    pub fn try_div(&self, other: &Self) -> Result<Self, QuantityError> {
        #[allow(clippy::float_cmp)]
        if other.value == 0.0 {
            return Err(QuantityError::DivisionByZero);
        }
        let unit = self
            .unit
            .checked_div(&other.unit)
            .ok_or(QuantityError::ExponentOverflow { operation: "divide" })?;
        Ok(Self::new(self.value / other.value, unit))
    }

    /// Raises the quantity to a dimensionless power.
    ///
    /// Dimensionless bases accept any exponent. A dimensioned base accepts
    /// integer exponents and exact integer roots (`0.5`, `1/3`, ...) whose
    /// result still has integer dimension exponents.
    ///
    /// # Errors
    ///
    /// Returns an error if the exponent has a dimension, the base's unit
    /// cannot be raised to it, or a resulting unit exponent is out of range.
    pub fn powf(&self, exponent: &Self) -> Result<Self, QuantityError> {
        let power = exponent.require_dimensionless("pow")?;

        if self.dimension().is_dimensionless() {
            return Ok(Self::dimensionless(self.si_value().powf(power)));
        }

        if power.fract() == 0.0 && power.abs() <= f64::from(i8::MAX) {
            let power = power as i32;
            let unit = self
                .unit
                .powi(power)
                .ok_or(QuantityError::ExponentOverflow { operation: "pow" })?;
            return Ok(Self::new(self.value.powi(power), unit));
        }

        let root = 1.0 / power;
        if root.fract().abs() < 1e-9 && root > 0.0 && root <= f64::from(i8::MAX) {
            if let Some(unit) = self.unit.root(root.round() as i8) {
                return Ok(Self::new(self.value.powf(power), unit));
            }
        }

        Err(QuantityError::FractionalPower {
            exponent: power,
            dimension: self.dimension(),
        })
    }

    /// Square root, halving the unit exponents.
    ///
    /// # Errors
    ///
    /// Returns an error for negative values or units without a square root.
    pub fn sqrt(&self) -> Result<Self, QuantityError> {
        if self.value < 0.0 {
            return Err(QuantityError::Domain {
                function: "sqrt",
                value: self.value,
            });
        }
        match self.unit.root(2) {
            Some(unit) => Ok(Self::new(self.value.sqrt(), unit)),
            None if self.dimension().is_dimensionless() => {
                Ok(Self::dimensionless(self.si_value().sqrt()))
            }
            None => Err(QuantityError::FractionalPower {
                exponent: 0.5,
                dimension: self.dimension(),
            }),
        }
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        Self::new(-self.value, self.unit.clone())
    }

    #[must_use]
    pub fn abs(&self) -> Self {
        Self::new(self.value.abs(), self.unit.clone())
    }

    /// Applies a function defined on plain numbers to a dimensionless quantity.
    ///
    /// The function receives the SI value, so angles in degrees are passed in
    /// radians.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity has a dimension or the result is not
    /// finite.
    pub fn map_dimensionless(
        &self,
        function: &'static str,
        f: impl Fn(f64) -> f64,
    ) -> Result<Self, QuantityError> {
        let value = self.require_dimensionless(function)?;
        let result = f(value);
        if result.is_finite() {
            Ok(Self::dimensionless(result))
        } else {
            Err(QuantityError::Domain { function, value })
        }
    }

    /// Compares two quantities of the same dimension.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions differ or either value is NaN.
    pub fn compare(&self, other: &Self) -> Result<Ordering, QuantityError> {
        let other = self.align("compare", other)?;
        self.value
            .partial_cmp(&other)
            .ok_or(QuantityError::NotComparable {
                left: self.value,
                right: other,
            })
    }

    /// Returns the larger of two quantities, in the unit of the larger one.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantities cannot be compared.
    pub fn max(&self, other: &Self) -> Result<Self, QuantityError> {
        Ok(match self.compare(other)? {
            Ordering::Less => other.clone(),
            _ => self.clone(),
        })
    }

    /// Returns the smaller of two quantities, in the unit of the smaller one.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantities cannot be compared.
    pub fn min(&self, other: &Self) -> Result<Self, QuantityError> {
        Ok(match self.compare(other)? {
            Ordering::Greater => other.clone(),
            _ => self.clone(),
        })
    }

    /// Returns `other`'s value expressed in this quantity's unit.
    fn align(&self, operation: &'static str, other: &Self) -> Result<f64, QuantityError> {
        if !self.unit.is_compatible(&other.unit) {
            return Err(QuantityError::Incompatible {
                operation,
                left: self.dimension(),
                right: other.dimension(),
            });
        }
        Ok(other.si_value() / self.unit.factor())
    }

    fn require_dimensionless(&self, operation: &'static str) -> Result<f64, QuantityError> {
        if self.dimension().is_dimensionless() {
            Ok(self.si_value())
        } else {
            Err(QuantityError::NotDimensionless {
                operation,
                dimension: self.dimension(),
            })
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.unit.to_string();
        if unit.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {unit}", self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn q(value: f64, unit: &str) -> Quantity {
        Quantity::parse(value, unit).unwrap()
    }

    #[test]
    fn converts_between_compatible_units() {
        let length = q(12.0, "in").to(&Unit::parse("ft").unwrap()).unwrap();

        assert_relative_eq!(length.value(), 1.0, epsilon = 1e-12);
        assert_eq!(length.unit().to_string(), "ft");
    }

    #[test]
    fn conversion_rejects_other_dimensions() {
        let result = q(1.0, "in").to(&Unit::parse("s").unwrap());

        assert!(matches!(result, Err(QuantityError::Incompatible { .. })));
    }

    #[test]
    fn addition_keeps_left_unit() {
        let sum = q(1.0, "ft").try_add(&q(6.0, "in")).unwrap();

        assert_relative_eq!(sum.value(), 1.5, epsilon = 1e-12);
        assert_eq!(sum.unit().to_string(), "ft");
        assert!(q(1.0, "ft").try_sub(&q(1.0, "lbf")).is_err());
    }

    #[test]
    fn multiplication_by_dimensionless_keeps_unit() {
        let thickness = q(0.147, "in")
            .try_mul(&Quantity::dimensionless(0.875))
            .unwrap();

        assert_relative_eq!(thickness.value(), 0.128_625, epsilon = 1e-12);
        assert_eq!(thickness.unit().to_string(), "in");
    }

    #[test]
    fn division_combines_units_and_rejects_zero() {
        let stress = q(100.0, "lbf").try_div(&q(2.0, "in^2")).unwrap();
        let in_psi = stress.to(&Unit::parse("psi").unwrap()).unwrap();

        assert_relative_eq!(in_psi.value(), 50.0, max_relative = 1e-9);
        assert_eq!(
            q(1.0, "m").try_div(&q(0.0, "s")),
            Err(QuantityError::DivisionByZero)
        );
    }

    #[test]
    fn powers_and_roots() {
        let area = q(3.0, "ft").powf(&Quantity::dimensionless(2.0)).unwrap();
        assert_relative_eq!(area.value(), 9.0);
        assert_eq!(area.unit().to_string(), "ft^2");

        let side = area.sqrt().unwrap();
        assert_relative_eq!(side.value(), 3.0);
        assert_eq!(side.unit().to_string(), "ft");

        let half = area.powf(&Quantity::dimensionless(0.5)).unwrap();
        assert_relative_eq!(half.value(), 3.0);

        assert!(q(2.0, "ft").powf(&Quantity::dimensionless(1.5)).is_err());
        assert!(q(2.0, "ft").powf(&q(1.0, "s")).is_err());
    }

    #[test]
    fn out_of_range_unit_exponents_are_errors() {
        let squared = q(2.0, "m").powf(&Quantity::dimensionless(2.0)).unwrap();
        let large = q(2.0, "m").powf(&Quantity::dimensionless(100.0)).unwrap();

        assert_eq!(
            squared.powf(&Quantity::dimensionless(100.0)),
            Err(QuantityError::ExponentOverflow { operation: "pow" })
        );
        assert_eq!(
            large.try_mul(&large),
            Err(QuantityError::ExponentOverflow {
                operation: "multiply"
            })
        );
        assert_eq!(
            large.try_div(&large.powf(&Quantity::dimensionless(-1.0)).unwrap()),
            Err(QuantityError::ExponentOverflow { operation: "divide" })
        );
    }

    #[test]
    fn dimensionless_functions_use_si_values() {
        let sine = q(90.0, "deg").map_dimensionless("sin", f64::sin).unwrap();
        assert_relative_eq!(sine.value(), 1.0, epsilon = 1e-12);

        assert!(q(1.0, "in").map_dimensionless("sin", f64::sin).is_err());
        assert!(matches!(
            Quantity::dimensionless(-1.0).map_dimensionless("ln", f64::ln),
            Err(QuantityError::Domain { .. })
        ));
    }

    #[test]
    fn compares_across_units() {
        assert_eq!(q(1.0, "ft").compare(&q(11.0, "in")), Ok(Ordering::Greater));
        assert_eq!(q(1.0, "ft").max(&q(13.0, "in")).unwrap(), q(13.0, "in"));
        assert_eq!(q(1.0, "ft").min(&q(13.0, "in")).unwrap(), q(1.0, "ft"));
    }

    #[test]
    fn displays_value_and_unit() {
        assert_eq!(q(2.5, "lbf/in^2").to_string(), "2.5 lbf/in^2");
        assert_eq!(Quantity::dimensionless(0.125).to_string(), "0.125");
    }
}
