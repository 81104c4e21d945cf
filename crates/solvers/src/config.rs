use thiserror::Error;

/// Configuration shared by the equation solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iterations: usize,
    tolerance: f64,
}

/// Errors that can occur when validating a solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tolerance must be finite and positive")]
    Tolerance,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(100, 1e-6).unwrap()
    }
}

impl Config {
    /// Creates a new config with a validated tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerance is not finite and positive.
    pub fn new(max_iterations: usize, tolerance: f64) -> Result<Self, ConfigError> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ConfigError::Tolerance);
        }

        Ok(Self {
            max_iterations,
            tolerance,
        })
    }

    /// Returns the maximum number of rounds of the iterative solver.
    #[must_use]
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Returns the relative residual tolerance used to verify equations.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}
