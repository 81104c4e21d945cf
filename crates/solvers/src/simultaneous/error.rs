use skein_core::{AssignError, EvalError};

/// Reasons the simultaneous solver cannot solve a system.
///
/// None of these are fatal to a solve; they tell the caller to try another
/// strategy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("system is not square: {equations} equations for {unknowns} unknowns")]
    NotSquare { equations: usize, unknowns: usize },

    #[error("simultaneous solving needs at least two unknowns, found {0}")]
    TooSmall(usize),

    #[error("residual of `{equation}` cannot be evaluated")]
    Evaluation {
        equation: String,
        #[source]
        source: EvalError,
    },

    #[error("residual of `{equation}` is not finite")]
    NonFinite { equation: String },

    #[error(transparent)]
    Assign(#[from] AssignError),

    #[error("`{equation}` is not linear in the unknowns (relative deviation {deviation:e})")]
    Nonlinear { equation: String, deviation: f64 },

    #[error("matrix is ill-conditioned (condition number {condition:e})")]
    IllConditioned { condition: f64 },

    #[error("linear solve failed: {0}")]
    Singular(String),

    #[error("worst residual {residual:e} in `{equation}` exceeds tolerance {tolerance:e}")]
    Residual {
        equation: String,
        residual: f64,
        tolerance: f64,
    },
}
