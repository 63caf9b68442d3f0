use std::ops::RangeInclusive;

use crate::models::dwhr::core::OperatingPoint;

use super::{Bounds, Lookup, MalformedCoefficientsError, Variable};

/// Curve-fit map `Σ a_ij · x^i · y^j` over one or two variables.
///
/// Inputs are clamped to the fitted domain before evaluation, so the fit is
/// never evaluated where it was not validated.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Polynomial {
    pub(super) x: Bounds,
    pub(super) y: Option<Bounds>,
    terms: Vec<Term>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Term {
    x_power: i32,
    y_power: i32,
    coefficient: f64,
}

impl Polynomial {
    /// Builds a single-variable polynomial from coefficients ordered from the
    /// highest power down to the constant term.
    pub(super) fn one_d(
        variable: Variable,
        domain: RangeInclusive<f64>,
        coefficients: &[f64],
    ) -> Result<Self, MalformedCoefficientsError> {
        check_coefficients(coefficients)?;
        let order = coefficients.len() - 1;
        let terms = coefficients
            .iter()
            .enumerate()
            .map(|(k, &coefficient)| Term {
                x_power: power(order - k),
                y_power: 0,
                coefficient,
            })
            .collect();

        Ok(Self {
            x: Bounds::new(variable, domain)?,
            y: None,
            terms,
        })
    }

    /// Builds a two-variable polynomial from `(order + 1)²` coefficients.
    ///
    /// Coefficient `k` multiplies `x^i · y^j` with `i = k / (order + 1)` and
    /// `j = k % (order + 1)`.
    pub(super) fn two_d(
        variables: [Variable; 2],
        domains: [RangeInclusive<f64>; 2],
        coefficients: &[f64],
    ) -> Result<Self, MalformedCoefficientsError> {
        check_coefficients(coefficients)?;
        let side = coefficients.len().isqrt();
        if side * side != coefficients.len() {
            return Err(MalformedCoefficientsError::NonSquareCoefficients(
                coefficients.len(),
            ));
        }

        let terms = coefficients
            .iter()
            .enumerate()
            .map(|(k, &coefficient)| Term {
                x_power: power(k / side),
                y_power: power(k % side),
                coefficient,
            })
            .collect();

        let [x_domain, y_domain] = domains;
        Ok(Self {
            x: Bounds::new(variables[0], x_domain)?,
            y: Some(Bounds::new(variables[1], y_domain)?),
            terms,
        })
    }

    pub(super) fn lookup(&self, point: &OperatingPoint) -> Lookup {
        let (x, x_clamped) = self.x.clamp(self.x.variable.value(point));
        let (y, y_clamped) = match &self.y {
            Some(bounds) => bounds.clamp(bounds.variable.value(point)),
            None => (0.0, false),
        };

        let value = self
            .terms
            .iter()
            .map(|term| term.coefficient * x.powi(term.x_power) * y.powi(term.y_power))
            .sum();

        Lookup {
            value,
            extrapolated: x_clamped || y_clamped,
        }
    }
}

fn check_coefficients(coefficients: &[f64]) -> Result<(), MalformedCoefficientsError> {
    if coefficients.is_empty() {
        return Err(MalformedCoefficientsError::NoCoefficients);
    }
    if let Some(index) = coefficients.iter().position(|c| !c.is_finite()) {
        return Err(MalformedCoefficientsError::NonFiniteCoefficient { index });
    }
    Ok(())
}

fn power(exponent: usize) -> i32 {
    i32::try_from(exponent).unwrap_or(i32::MAX)
}
