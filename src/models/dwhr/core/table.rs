//! Performance maps relating operating conditions to effectiveness.
//!
//! A [`CoefficientTable`] is either tabulated (loaded from CSV and linearly or
//! bilinearly interpolated) or a polynomial curve fit built in code. Every
//! strategy clamps out-of-range inputs to the map's domain and reports the
//! clamping through [`Lookup::extrapolated`].

mod axis;
mod curve;
mod error;
mod grid;
mod load;
mod polynomial;
mod variable;

use std::{io::Read, ops::RangeInclusive};

pub use error::MalformedCoefficientsError;
pub use variable::{FlowUnit, MapOutput, Variable};

use curve::Curve;
use grid::Grid;
use polynomial::Polynomial;

use super::OperatingPoint;

/// Value of a performance map at an operating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lookup {
    /// Map output, either an effectiveness or a correction factor.
    pub value: f64,
    /// True if any input fell outside the map's domain and was clamped.
    pub extrapolated: bool,
}

/// Valid range of one variable of a performance map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub variable: Variable,
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    fn new(
        variable: Variable,
        domain: RangeInclusive<f64>,
    ) -> Result<Self, MalformedCoefficientsError> {
        let (min, max) = domain.into_inner();
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(MalformedCoefficientsError::InvalidDomain { variable, min, max });
        }
        Ok(Self { variable, min, max })
    }

    /// Clamps a value into the bounds, flagging whether it had to move.
    fn clamp(&self, value: f64) -> (f64, bool) {
        if value < self.min || value.is_nan() {
            (self.min, true)
        } else if value > self.max {
            (self.max, true)
        } else {
            (value, false)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Map {
    Curve(Curve),
    Grid(Grid),
    Polynomial(Polynomial),
}

/// A performance map for a drain water heat recovery device.
///
/// Tables are immutable once built and can be shared across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTable {
    map: Map,
    output: MapOutput,
}

impl CoefficientTable {
    /// Loads a tabulated map from CSV.
    ///
    /// The header must contain one output column (`effectiveness` or
    /// `correction_factor`) and one or two variable columns (`flow_ratio`,
    /// `drain_flow_gpm`, `drain_flow_lpm`, `supply_flow_gpm`,
    /// `supply_flow_lpm`). One variable gives a piecewise-linear curve; two
    /// give a bilinear grid, listed one point per row.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedCoefficientsError`] if the CSV cannot be read, the
    /// header is not a recognized layout, an entry is not a finite number, or
    /// the points do not form a valid curve or grid.
    pub fn load<R: Read>(source: R) -> Result<Self, MalformedCoefficientsError> {
        load::load(source)
    }

    /// Builds a tabulated map over one variable from `(x, value)` points.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedCoefficientsError`] if a value is not finite or the
    /// breakpoints are fewer than two or repeat.
    pub fn curve(
        variable: Variable,
        points: impl IntoIterator<Item = (f64, f64)>,
        output: MapOutput,
    ) -> Result<Self, MalformedCoefficientsError> {
        let points: Vec<_> = points.into_iter().collect();
        if let Some(index) = points
            .iter()
            .position(|(x, v)| !(x.is_finite() && v.is_finite()))
        {
            return Err(MalformedCoefficientsError::NonNumeric {
                row: index + 1,
                column: variable.to_string(),
                value: format!("{:?}", points[index]),
            });
        }
        Ok(Self {
            map: Map::Curve(Curve::from_points(variable, points)?),
            output,
        })
    }

    /// Builds a polynomial fit in one variable.
    ///
    /// Coefficients run from the highest power down to the constant term.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedCoefficientsError`] if there are no coefficients,
    /// one is not finite, or the domain is empty.
    pub fn polynomial(
        variable: Variable,
        domain: RangeInclusive<f64>,
        coefficients: &[f64],
        output: MapOutput,
    ) -> Result<Self, MalformedCoefficientsError> {
        Ok(Self {
            map: Map::Polynomial(Polynomial::one_d(variable, domain, coefficients)?),
            output,
        })
    }

    /// Builds a polynomial fit in two variables.
    ///
    /// For `n = order + 1`, coefficient `k` multiplies `x^(k / n) · y^(k % n)`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedCoefficientsError`] if the coefficient count is not
    /// a perfect square, a coefficient is not finite, or a domain is empty.
    pub fn polynomial_2d(
        variables: [Variable; 2],
        domains: [RangeInclusive<f64>; 2],
        coefficients: &[f64],
        output: MapOutput,
    ) -> Result<Self, MalformedCoefficientsError> {
        Ok(Self {
            map: Map::Polynomial(Polynomial::two_d(variables, domains, coefficients)?),
            output,
        })
    }

    /// Evaluates the map at an operating point.
    #[must_use]
    pub fn lookup(&self, point: &OperatingPoint) -> Lookup {
        match &self.map {
            Map::Curve(curve) => curve.lookup(point),
            Map::Grid(grid) => grid.lookup(point),
            Map::Polynomial(poly) => poly.lookup(point),
        }
    }

    /// What the map's value represents.
    #[must_use]
    pub fn output(&self) -> MapOutput {
        self.output
    }

    /// The map's independent variables, in order.
    #[must_use]
    pub fn variables(&self) -> Vec<Variable> {
        self.domain().into_iter().map(|b| b.variable).collect()
    }

    /// The valid range of each independent variable.
    #[must_use]
    pub fn domain(&self) -> Vec<Bounds> {
        let of_axis = |axis: &axis::Axis| Bounds {
            variable: axis.variable,
            min: axis.min(),
            max: axis.max(),
        };
        match &self.map {
            Map::Curve(curve) => vec![of_axis(&curve.axis)],
            Map::Grid(grid) => vec![of_axis(&grid.x), of_axis(&grid.y)],
            Map::Polynomial(poly) => std::iter::once(poly.x).chain(poly.y).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{f64::VolumeRate, volume_rate::gallon_per_minute};

    fn point(drain: f64, supply: f64) -> OperatingPoint {
        OperatingPoint::new(
            VolumeRate::new::<gallon_per_minute>(drain),
            VolumeRate::new::<gallon_per_minute>(supply),
        )
    }

    #[test]
    fn loaded_and_built_curves_agree() {
        let loaded =
            CoefficientTable::load("flow_ratio,effectiveness\n0.5,0.40\n1.0,0.55\n".as_bytes())
                .unwrap();
        let built = CoefficientTable::curve(
            Variable::FlowRatio,
            [(0.5, 0.40), (1.0, 0.55)],
            MapOutput::Effectiveness,
        )
        .unwrap();

        assert_eq!(loaded, built);
        assert_relative_eq!(
            loaded.lookup(&point(2.0, 1.5)).value,
            0.475,
            epsilon = 1e-12
        );
    }

    #[test]
    fn polynomial_domains_are_reported() {
        let table = CoefficientTable::polynomial_2d(
            [
                Variable::DrainFlow(FlowUnit::GallonsPerMinute),
                Variable::SupplyFlow(FlowUnit::GallonsPerMinute),
            ],
            [0.5..=7.5, 0.0..=7.5],
            &[1.0, 0.0, 0.0, 0.0],
            MapOutput::CorrectionFactor,
        )
        .unwrap();

        let domain = table.domain();
        assert_eq!(domain.len(), 2);
        assert_relative_eq!(domain[0].min, 0.5);
        assert_relative_eq!(domain[1].max, 7.5);
        assert_eq!(table.output(), MapOutput::CorrectionFactor);
        assert_relative_eq!(table.lookup(&point(3.0, 3.0)).value, 1.0);
    }

    #[test]
    fn built_curves_reject_non_finite_points() {
        assert!(matches!(
            CoefficientTable::curve(
                Variable::FlowRatio,
                [(0.5, 0.4), (1.0, f64::INFINITY)],
                MapOutput::Effectiveness,
            ),
            Err(MalformedCoefficientsError::NonNumeric { row: 2, .. })
        ));
    }

    #[test]
    fn bounds_clamp() {
        let bounds = Bounds::new(Variable::FlowRatio, 0.5..=1.0).unwrap();
        assert_eq!(bounds.clamp(0.75), (0.75, false));
        assert_eq!(bounds.clamp(0.1), (0.5, true));
        assert_eq!(bounds.clamp(2.0), (1.0, true));
        assert_eq!(bounds.clamp(f64::NAN), (0.5, true));
    }
}
