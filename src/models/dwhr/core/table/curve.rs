use crate::models::dwhr::core::OperatingPoint;

use super::{
    Lookup, MalformedCoefficientsError, Variable,
    axis::{Axis, lerp},
};

/// Piecewise-linear map over a single variable.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Curve {
    pub(super) axis: Axis,
    values: Vec<f64>,
}

impl Curve {
    /// Builds a curve from `(x, value)` points in any order.
    pub(super) fn from_points(
        variable: Variable,
        mut points: Vec<(f64, f64)>,
    ) -> Result<Self, MalformedCoefficientsError> {
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (breakpoints, values) = points.into_iter().unzip();
        Ok(Self {
            axis: Axis::new(variable, breakpoints)?,
            values,
        })
    }

    pub(super) fn lookup(&self, point: &OperatingPoint) -> Lookup {
        let bracket = self.axis.locate(self.axis.variable.value(point));
        Lookup {
            value: lerp(
                self.values[bracket.index],
                self.values[bracket.index + 1],
                bracket.weight,
            ),
            extrapolated: bracket.extrapolated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{f64::VolumeRate, volume_rate::gallon_per_minute};

    fn at_ratio(ratio: f64) -> OperatingPoint {
        OperatingPoint::new(
            VolumeRate::new::<gallon_per_minute>(2.0),
            VolumeRate::new::<gallon_per_minute>(2.0 * ratio),
        )
    }

    #[test]
    fn interpolates_unsorted_points() {
        let curve =
            Curve::from_points(Variable::FlowRatio, vec![(1.0, 0.55), (0.5, 0.40)]).unwrap();

        let lookup = curve.lookup(&at_ratio(0.75));
        assert_relative_eq!(lookup.value, 0.475, epsilon = 1e-12);
        assert!(!lookup.extrapolated);
    }

    #[test]
    fn clamps_outside_the_domain() {
        let curve =
            Curve::from_points(Variable::FlowRatio, vec![(0.5, 0.40), (1.0, 0.55)]).unwrap();

        let low = curve.lookup(&at_ratio(0.25));
        assert_relative_eq!(low.value, 0.40);
        assert!(low.extrapolated);

        let high = curve.lookup(&at_ratio(1.5));
        assert_relative_eq!(high.value, 0.55);
        assert!(high.extrapolated);
    }
}
