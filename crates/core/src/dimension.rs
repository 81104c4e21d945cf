use std::fmt;

/// Symbols of the seven ISQ base dimensions, in exponent order.
const BASE_SYMBOLS: [&str; 7] = ["L", "M", "T", "I", "Θ", "N", "J"];

/// A dimension signature expressed as integer exponents of the ISQ base
/// dimensions: length, mass, time, electric current, thermodynamic
/// temperature, amount of substance, and luminous intensity.
///
/// Dimensions follow the same exponent order `uom` uses for its `ISQ` type,
/// but are carried at runtime so that equations built from text can mix
/// quantities freely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Dimension([i8; 7]);

impl Dimension {
    pub const DIMENSIONLESS: Self = Self([0; 7]);
    pub const LENGTH: Self = Self([1, 0, 0, 0, 0, 0, 0]);
    pub const MASS: Self = Self([0, 1, 0, 0, 0, 0, 0]);
    pub const TIME: Self = Self([0, 0, 1, 0, 0, 0, 0]);
    pub const CURRENT: Self = Self([0, 0, 0, 1, 0, 0, 0]);
    pub const TEMPERATURE: Self = Self([0, 0, 0, 0, 1, 0, 0]);
    pub const AMOUNT: Self = Self([0, 0, 0, 0, 0, 1, 0]);
    pub const LUMINOSITY: Self = Self([0, 0, 0, 0, 0, 0, 1]);

    /// Creates a dimension from raw base exponents.
    #[must_use]
    pub const fn new(exponents: [i8; 7]) -> Self {
        Self(exponents)
    }

    /// Returns the base exponents in ISQ order.
    #[must_use]
    pub const fn exponents(&self) -> [i8; 7] {
        self.0
    }

    #[must_use]
    pub fn is_dimensionless(&self) -> bool {
        *self == Self::DIMENSIONLESS
    }

    /// Raises the dimension to an integer power.
    ///
    /// Returns `None` if an exponent leaves the `i8` range.
    #[must_use]
    pub fn powi(self, power: i32) -> Option<Self> {
        let mut exponents = self.0;
        for exponent in &mut exponents {
            *exponent = i32::from(*exponent)
                .checked_mul(power)
                .and_then(|scaled| i8::try_from(scaled).ok())?;
        }
        Some(Self(exponents))
    }

    /// Multiplies two dimensions by adding their exponents.
    ///
    /// Returns `None` if an exponent leaves the `i8` range.
    #[must_use]
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        self.zip_exponents(rhs, i8::checked_add)
    }

    /// Divides two dimensions by subtracting their exponents.
    ///
    /// Returns `None` if an exponent leaves the `i8` range.
    #[must_use]
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        self.zip_exponents(rhs, i8::checked_sub)
    }

    /// Takes the `n`th root, if every exponent is divisible by `n`.
    #[must_use]
    pub fn root(self, n: i8) -> Option<Self> {
        if n == 0 || self.0.iter().any(|exponent| exponent % n != 0) {
            return None;
        }
        let mut exponents = self.0;
        for exponent in &mut exponents {
            *exponent /= n;
        }
        Some(Self(exponents))
    }

    fn zip_exponents(self, rhs: Self, op: fn(i8, i8) -> Option<i8>) -> Option<Self> {
        let mut exponents = self.0;
        for (exponent, other) in exponents.iter_mut().zip(rhs.0) {
            *exponent = op(*exponent, other)?;
        }
        Some(Self(exponents))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "1");
        }

        let mut first = true;
        for (symbol, exponent) in BASE_SYMBOLS.iter().zip(self.0) {
            if exponent == 0 {
                continue;
            }
            if !first {
                write!(f, "·")?;
            }
            first = false;
            if exponent == 1 {
                write!(f, "{symbol}")?;
            } else {
                write!(f, "{symbol}^{exponent}")?;
            }
        }
        Ok(())
    }
}
