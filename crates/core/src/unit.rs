mod registry;

use std::fmt;

use thiserror::Error;

use crate::Dimension;

/// SI base unit symbols, in the exponent order of [`Dimension`].
const SI_SYMBOLS: [&str; 7] = ["m", "kg", "s", "A", "K", "mol", "cd"];

/// Errors that can occur when parsing a unit symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("unknown unit `{0}`")]
    Unknown(String),

    #[error("invalid exponent `{exponent}` in unit `{text}`")]
    InvalidExponent { text: String, exponent: String },

    #[error("malformed unit expression `{0}`")]
    Malformed(String),

    #[error("exponents of unit `{0}` are out of range")]
    ExponentOverflow(String),
}

/// A unit of measure: a product of named unit symbols raised to integer
/// powers, with a scale factor relative to the coherent SI unit of the same
/// dimension.
///
/// Units are built by parsing symbols such as `in`, `lbf/in^2` or `m/s^2`,
/// or by multiplying and dividing other units. Terms with the same symbol are
/// merged, so `in * in` becomes `in^2` and `in / in` cancels to a
/// dimensionless unit. Exponents are `i8`; operations that would leave that
/// range return `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    terms: Vec<(String, i8)>,
    factor: f64,
    dimension: Dimension,
}

impl Unit {
    /// The plain dimensionless unit with a factor of one.
    #[must_use]
    pub fn dimensionless() -> Self {
        Self {
            terms: Vec::new(),
            factor: 1.0,
            dimension: Dimension::DIMENSIONLESS,
        }
    }

    /// Returns the coherent SI unit for a dimension (factor one).
    #[must_use]
    pub fn si(dimension: Dimension) -> Self {
        let terms = SI_SYMBOLS
            .iter()
            .zip(dimension.exponents())
            .filter(|(_, exponent)| *exponent != 0)
            .map(|(symbol, exponent)| ((*symbol).to_string(), exponent))
            .collect();

        Self {
            terms,
            factor: 1.0,
            dimension,
        }
    }

    /// Parses a unit expression like `lbf/in^2`, `N*m` or `kg/m/s^2`.
    ///
    /// An empty string or `1` parses as the dimensionless unit.
    ///
    /// # Errors
    ///
    /// Returns an error if a symbol is not in the registry, an exponent is not
    /// an integer, or the expression is malformed.
    pub fn parse(text: &str) -> Result<Self, UnitError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "1" {
            return Ok(Self::dimensionless());
        }

        let mut unit = Self::dimensionless();
        let mut dividing = false;
        let mut term = String::new();

        for ch in trimmed.chars().chain(std::iter::once('*')) {
            match ch {
                '*' | '/' | '·' => {
                    let atom = Self::parse_term(term.trim(), trimmed)?;
                    let combined = if dividing {
                        unit.checked_div(&atom)
                    } else {
                        unit.checked_mul(&atom)
                    };
                    unit = combined
                        .ok_or_else(|| UnitError::ExponentOverflow(trimmed.to_string()))?;
                    dividing = ch == '/';
                    term.clear();
                }
                _ => term.push(ch),
            }
        }

        Ok(unit)
    }

    /// Parses a single `symbol` or `symbol^n` term.
    fn parse_term(term: &str, text: &str) -> Result<Self, UnitError> {
        if term.is_empty() {
            return Err(UnitError::Malformed(text.to_string()));
        }
        if term == "1" {
            return Ok(Self::dimensionless());
        }

        let (symbol, exponent) = match term.split_once('^') {
            Some((symbol, exponent)) => {
                let exponent =
                    exponent
                        .trim()
                        .parse::<i8>()
                        .map_err(|_| UnitError::InvalidExponent {
                            text: text.to_string(),
                            exponent: exponent.to_string(),
                        })?;
                (symbol.trim(), exponent)
            }
            None => (term, 1),
        };

        let (factor, dimension) =
            registry::lookup(symbol).ok_or_else(|| UnitError::Unknown(symbol.to_string()))?;

        Self {
            terms: vec![(symbol.to_string(), 1)],
            factor,
            dimension,
        }
        .powi(i32::from(exponent))
        .ok_or_else(|| UnitError::ExponentOverflow(text.to_string()))
    }

    /// Returns the conversion factor to the coherent SI unit.
    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Returns `true` for the plain dimensionless unit (no terms, factor one).
    #[must_use]
    pub fn is_unity(&self) -> bool {
        self.terms.is_empty() && (self.factor - 1.0).abs() < f64::EPSILON
    }

    /// Returns `true` if values in `other` can be converted to this unit.
    #[must_use]
    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }

    /// Raises the unit to an integer power.
    #[must_use]
    pub fn powi(&self, power: i32) -> Option<Self> {
        let mut terms = Vec::with_capacity(self.terms.len());
        for (symbol, exponent) in &self.terms {
            let exponent = i32::from(*exponent)
                .checked_mul(power)
                .and_then(|scaled| i8::try_from(scaled).ok())?;
            if exponent != 0 {
                terms.push((symbol.clone(), exponent));
            }
        }

        Some(Self {
            terms,
            factor: self.factor.powi(power),
            dimension: self.dimension.powi(power)?,
        })
    }

    /// Multiplies two units, merging terms with the same symbol.
    #[must_use]
    pub fn checked_mul(&self, other: &Unit) -> Option<Self> {
        self.combine(other, 1)
    }

    /// Divides by `other`, merging terms with the same symbol.
    #[must_use]
    pub fn checked_div(&self, other: &Unit) -> Option<Self> {
        self.combine(other, -1)
    }

    /// Takes the `n`th root of the unit, if every term exponent divides by `n`.
    #[must_use]
    pub fn root(&self, n: i8) -> Option<Self> {
        if n == 0 || self.terms.iter().any(|(_, exponent)| exponent % n != 0) {
            return None;
        }

        Some(Self {
            terms: self
                .terms
                .iter()
                .map(|(symbol, exponent)| (symbol.clone(), exponent / n))
                .collect(),
            factor: self.factor.powf(1.0 / f64::from(n)),
            dimension: self.dimension.root(n)?,
        })
    }

    /// Merges the terms of `other` raised to `sign` into this unit's terms.
    fn combine(&self, other: &Unit, sign: i8) -> Option<Self> {
        let mut terms = self.terms.clone();
        for (symbol, exponent) in &other.terms {
            let exponent = sign.checked_mul(*exponent)?;
            match terms.iter_mut().find(|(existing, _)| existing == symbol) {
                Some((_, existing)) => *existing = existing.checked_add(exponent)?,
                None => terms.push((symbol.clone(), exponent)),
            }
        }
        terms.retain(|(_, exponent)| *exponent != 0);

        let (factor, dimension) = if sign > 0 {
            (
                self.factor * other.factor,
                self.dimension.checked_mul(other.dimension)?,
            )
        } else {
            (
                self.factor / other.factor,
                self.dimension.checked_div(other.dimension)?,
            )
        };

        Some(Self {
            terms,
            factor,
            dimension,
        })
    }
}

impl fmt::Display for Unit {
    /// Writes the unit in a form that [`Unit::parse`] accepts, with numerator
    /// terms first and each denominator term introduced by `/`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numerator: Vec<_> = self.terms.iter().filter(|(_, e)| *e > 0).collect();
        let denominator: Vec<_> = self.terms.iter().filter(|(_, e)| *e < 0).collect();

        if numerator.is_empty() && !denominator.is_empty() {
            write!(f, "1")?;
        }
        for (index, (symbol, exponent)) in numerator.iter().enumerate() {
            if index > 0 {
                write!(f, "*")?;
            }
            write_term(f, symbol, i16::from(*exponent))?;
        }
        for (symbol, exponent) in denominator {
            write!(f, "/")?;
            write_term(f, symbol, -i16::from(*exponent))?;
        }
        Ok(())
    }
}

fn write_term(f: &mut fmt::Formatter<'_>, symbol: &str, exponent: i16) -> fmt::Result {
    if exponent == 1 {
        write!(f, "{symbol}")
    } else {
        write!(f, "{symbol}^{exponent}")
    }
}
