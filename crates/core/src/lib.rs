//! Core types for the skein equation solver.
//!
//! This crate defines the data every solver works against:
//!
//! - [`Dimension`], [`Unit`], [`Quantity`] — values with runtime-checked units
//! - [`Variable`], [`VariableTable`] — named values, known or unknown, stored
//!   in an arena addressed by symbol or [`VarId`]
//! - [`Expression`] — an immutable expression tree over variables and constants
//! - [`Equation`] — a named `lhs = rhs` relationship with residual checking and
//!   direct-assignment solving
//! - [`parse`] — a recursive-descent parser for expressions and equations

mod dimension;
mod equation;
mod quantity;
mod unit;
mod variable;

pub mod expression;
pub mod parse;

pub use dimension::Dimension;
pub use equation::{Equation, SolveError};
pub use expression::{EvalError, Expression};
pub use quantity::{Quantity, QuantityError};
pub use unit::{Unit, UnitError};
pub use variable::{AssignError, Checkpoint, VarId, Variable, VariableTable};
