use thiserror::Error;

/// Numerical limits for the simultaneous solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    max_condition_number: f64,
    large_system_threshold: usize,
    linearity_tolerance: f64,
}

/// Errors that can occur when validating simultaneous solver limits.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LimitsError {
    #[error("max_condition_number must be finite and greater than one")]
    ConditionNumber,

    #[error("linearity_tolerance must be finite and positive")]
    Linearity,
}

impl Default for Limits {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1e12, 50, 1e-9).unwrap()
    }
}

impl Limits {
    /// Creates validated limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the condition number ceiling is not finite and
    /// greater than one, or the linearity tolerance is not finite and positive.
    pub fn new(
        max_condition_number: f64,
        large_system_threshold: usize,
        linearity_tolerance: f64,
    ) -> Result<Self, LimitsError> {
        if !max_condition_number.is_finite() || max_condition_number <= 1.0 {
            return Err(LimitsError::ConditionNumber);
        }
        if !linearity_tolerance.is_finite() || linearity_tolerance <= 0.0 {
            return Err(LimitsError::Linearity);
        }

        Ok(Self {
            max_condition_number,
            large_system_threshold,
            linearity_tolerance,
        })
    }

    /// Returns the largest condition number accepted before giving up.
    #[must_use]
    pub fn max_condition_number(&self) -> f64 {
        self.max_condition_number
    }

    /// Returns the number of unknowns above which the SVD solve replaces LU.
    #[must_use]
    pub fn large_system_threshold(&self) -> usize {
        self.large_system_threshold
    }

    /// Returns the relative deviation from a linear prediction that marks an
    /// equation as nonlinear.
    #[must_use]
    pub fn linearity_tolerance(&self) -> f64 {
        self.linearity_tolerance
    }
}
