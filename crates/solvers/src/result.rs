use std::fmt;

use skein_core::Quantity;

/// How a variable's value was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveMethod {
    /// Evaluated through a solver equation recorded in the dependency graph.
    Direct,
    /// Evaluated through an equation found by scanning the whole system.
    Fallback,
    /// Evaluated through a conditional equation whose taken branch was known.
    Conditional,
    /// Solved together with other unknowns as a linear system.
    Simultaneous,
}

impl fmt::Display for SolveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Direct => "direct",
            Self::Fallback => "fallback",
            Self::Conditional => "conditional",
            Self::Simultaneous => "simultaneous",
        };
        f.write_str(name)
    }
}

/// One solved variable.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveStep {
    pub variable: String,
    pub equation: String,
    pub method: SolveMethod,
    pub quantity: Quantity,
}

/// The outcome of a solve.
///
/// Values are written into the variable table as they are found, so a failed
/// result still leaves every variable in `solved` with its value.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    pub success: bool,
    pub message: String,
    pub steps: Vec<SolveStep>,
    pub solved: Vec<String>,
    pub remaining: Vec<String>,
}

impl SolveResult {
    /// Creates a successful result.
    pub fn solved(message: impl Into<String>, steps: Vec<SolveStep>) -> Self {
        Self::new(true, message, steps, Vec::new())
    }

    /// Creates a failed result naming the symbols still unknown.
    pub fn failed(message: impl Into<String>, steps: Vec<SolveStep>, remaining: Vec<String>) -> Self {
        Self::new(false, message, steps, remaining)
    }

    fn new(
        success: bool,
        message: impl Into<String>,
        steps: Vec<SolveStep>,
        remaining: Vec<String>,
    ) -> Self {
        let solved = steps.iter().map(|step| step.variable.clone()).collect();
        Self {
            success,
            message: message.into(),
            steps,
            solved,
            remaining,
        }
    }

    /// Returns the step that solved `symbol`, if any.
    #[must_use]
    pub fn step(&self, symbol: &str) -> Option<&SolveStep> {
        self.steps.iter().find(|step| step.variable == symbol)
    }
}

impl fmt::Display for SolveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "solved" } else { "failed" };
        writeln!(f, "{status}: {}", self.message)?;

        for (index, step) in self.steps.iter().enumerate() {
            writeln!(
                f,
                "  {:>3}. {} = {}  [{}: {}]",
                index + 1,
                step.variable,
                step.quantity,
                step.method,
                step.equation,
            )?;
        }

        if !self.remaining.is_empty() {
            writeln!(f, "  unknown: {}", self.remaining.join(", "))?;
        }
        Ok(())
    }
}
