//! Shared fixtures for the end-to-end tests.

use skein_core::{Equation, Quantity, Variable, VariableTable, parse::parse_equation};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a log subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// Parses equations written as `lhs = rhs`, naming each after its text.
///
/// # Panics
///
/// Panics if any equation does not parse.
#[must_use]
pub fn equations(texts: &[&str]) -> Vec<Equation> {
    texts
        .iter()
        .map(|text| parse_equation(*text, text).expect("equation should parse"))
        .collect()
}

/// Builds a table of known dimensionless values and unknowns.
#[must_use]
pub fn table(known: &[(&str, f64)], unknown: &[&str]) -> VariableTable {
    known
        .iter()
        .map(|&(symbol, value)| Variable::known(symbol, Quantity::dimensionless(value)))
        .chain(unknown.iter().map(|&symbol| Variable::unknown(symbol)))
        .collect()
}
