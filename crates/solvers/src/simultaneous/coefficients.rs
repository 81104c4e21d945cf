use nalgebra::{DMatrix, DVector};
use skein_core::{Equation, Quantity, Unit, VariableTable};

use super::{Error, dimensions};

/// A linear system `A·x = b` recovered from equation residuals.
///
/// Unknown `j` is measured in `units[j]`.
#[derive(Debug, Clone)]
pub(super) struct LinearSystem {
    pub matrix: DMatrix<f64>,
    pub constants: DVector<f64>,
    pub units: Vec<Unit>,
}

/// Evaluates every residual with the unknowns set to `point`.
struct Probe<'a> {
    equations: &'a [&'a Equation],
    unknowns: &'a [String],
    units: &'a [Unit],
    scratch: VariableTable,
}

impl Probe<'_> {
    fn residuals(&mut self, point: &[f64]) -> Result<DVector<f64>, Error> {
        for ((symbol, unit), &value) in self.unknowns.iter().zip(self.units).zip(point) {
            self.scratch
                .assign(symbol, Quantity::new(value, unit.clone()))?;
        }

        let mut residuals = DVector::zeros(self.equations.len());
        for (row, equation) in self.equations.iter().enumerate() {
            let residual = equation
                .residual(&self.scratch)
                .map_err(|source| Error::Evaluation {
                    equation: equation.to_string(),
                    source,
                })?
                .si_value();
            if !residual.is_finite() {
                return Err(Error::NonFinite {
                    equation: equation.to_string(),
                });
            }
            residuals[row] = residual;
        }
        Ok(residuals)
    }
}

/// Recovers the coefficient matrix by finite differences.
///
/// Residuals are probed with every unknown at zero and with each unknown in
/// turn at one. Column `j` of the matrix is the change caused by unknown `j`
/// and the constants are the negated baseline. One more probe with every
/// unknown at one must match the linear prediction, or the system is
/// rejected as nonlinear.
pub(super) fn extract(
    equations: &[&Equation],
    unknowns: &[String],
    variables: &VariableTable,
    linearity_tolerance: f64,
) -> Result<LinearSystem, Error> {
    let n = unknowns.len();
    let units = dimensions::probe_units(equations, unknowns, variables);

    let mut probe = Probe {
        equations,
        unknowns,
        units: &units,
        scratch: variables.clone(),
    };

    let mut point = vec![0.0; n];
    let baseline = probe.residuals(&point)?;

    let mut matrix = DMatrix::zeros(equations.len(), n);
    for column in 0..n {
        point[column] = 1.0;
        let perturbed = probe.residuals(&point)?;
        point[column] = 0.0;
        matrix.set_column(column, &(perturbed - &baseline));
    }

    let measured = probe.residuals(&vec![1.0; n])?;
    for (row, equation) in equations.iter().enumerate() {
        let coefficients = matrix.row(row);
        let predicted = baseline[row] + coefficients.sum();
        let scale = 1.0 + baseline[row].abs() + coefficients.abs().sum();
        let deviation = (measured[row] - predicted).abs() / scale;
        if deviation > linearity_tolerance {
            return Err(Error::Nonlinear {
                equation: equation.to_string(),
                deviation,
            });
        }
    }

    Ok(LinearSystem {
        matrix,
        constants: -baseline,
        units,
    })
}
