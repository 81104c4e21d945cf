//! Repair of equations whose variable references were bound before their
//! sub-system was composed into a larger, namespaced system.
//!
//! Composition renames `D` to `branch_D`. References built earlier keep the
//! old name, and some arrive as flattened text such as `"(D - (T - c) * 2.0)"`.
//! [`EquationReconstructor`] finds such references, maps their identifiers to
//! namespaced live symbols, and rebuilds the expression tree.

mod namespace;
mod pattern;
mod rebuilder;
mod reconstructor;

pub use namespace::{Candidate, NamespaceMapper, NamespacePolicy, first_alphabetical};
pub use pattern::{ExpressionParser, is_function_name};
pub use rebuilder::CompositeExpressionRebuilder;
pub use reconstructor::EquationReconstructor;
