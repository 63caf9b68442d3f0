use crate::models::dwhr::core::OperatingPoint;

use super::{
    Lookup, MalformedCoefficientsError, Variable,
    axis::{Axis, lerp},
};

/// Bilinear map over two variables on a complete rectangular grid.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Grid {
    pub(super) x: Axis,
    pub(super) y: Axis,
    /// Row-major values, indexed `ix * y.len() + iy`.
    values: Vec<f64>,
}

impl Grid {
    /// Builds a grid from `(x, y, value)` points in long format.
    ///
    /// Every combination of the distinct `x` and `y` values must appear
    /// exactly once. `-0` and `0` are the same breakpoint.
    pub(super) fn from_points(
        variables: [Variable; 2],
        points: &[(f64, f64, f64)],
    ) -> Result<Self, MalformedCoefficientsError> {
        let points: Vec<_> = points
            .iter()
            .map(|&(px, py, value)| (unsigned_zero(px), unsigned_zero(py), value))
            .collect();
        let x = Axis::new(variables[0], distinct(points.iter().map(|p| p.0)))?;
        let y = Axis::new(variables[1], distinct(points.iter().map(|p| p.1)))?;

        let mut cells = vec![None; x.len() * y.len()];
        for &(px, py, value) in &points {
            let (Some(ix), Some(iy)) = (x.position(px), y.position(py)) else {
                return Err(MalformedCoefficientsError::IncompleteGrid { x: px, y: py });
            };
            let cell = &mut cells[ix * y.len() + iy];
            if cell.is_some() {
                return Err(MalformedCoefficientsError::DuplicatePoint { x: px, y: py });
            }
            *cell = Some(value);
        }

        let values = cells
            .into_iter()
            .enumerate()
            .map(|(i, cell)| {
                cell.ok_or_else(|| MalformedCoefficientsError::IncompleteGrid {
                    x: x.breakpoint(i / y.len()),
                    y: y.breakpoint(i % y.len()),
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { x, y, values })
    }

    pub(super) fn lookup(&self, point: &OperatingPoint) -> Lookup {
        let bx = self.x.locate(self.x.variable.value(point));
        let by = self.y.locate(self.y.variable.value(point));
        let at = |ix: usize, iy: usize| self.values[ix * self.y.len() + iy];

        let lower = lerp(
            at(bx.index, by.index),
            at(bx.index + 1, by.index),
            bx.weight,
        );
        let upper = lerp(
            at(bx.index, by.index + 1),
            at(bx.index + 1, by.index + 1),
            bx.weight,
        );

        Lookup {
            value: lerp(lower, upper, by.weight),
            extrapolated: bx.extrapolated || by.extrapolated,
        }
    }
}

fn distinct(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut values: Vec<f64> = values.collect();
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| a.total_cmp(b).is_eq());
    values
}

fn unsigned_zero(value: f64) -> f64 {
    value + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{f64::VolumeRate, volume_rate::gallon_per_minute};

    use crate::models::dwhr::core::table::FlowUnit;

    const DRAIN: Variable = Variable::DrainFlow(FlowUnit::GallonsPerMinute);
    const SUPPLY: Variable = Variable::SupplyFlow(FlowUnit::GallonsPerMinute);

    fn grid() -> Grid {
        Grid::from_points(
            [DRAIN, SUPPLY],
            &[
                (1.0, 1.0, 0.40),
                (1.0, 3.0, 0.50),
                (3.0, 1.0, 0.30),
                (3.0, 3.0, 0.60),
            ],
        )
        .unwrap()
    }

    fn point(drain: f64, supply: f64) -> OperatingPoint {
        OperatingPoint::new(
            VolumeRate::new::<gallon_per_minute>(drain),
            VolumeRate::new::<gallon_per_minute>(supply),
        )
    }

    #[test]
    fn corners_are_exact() {
        assert_relative_eq!(grid().lookup(&point(1.0, 3.0)).value, 0.50, epsilon = 1e-12);
        assert_relative_eq!(grid().lookup(&point(3.0, 1.0)).value, 0.30, epsilon = 1e-12);
    }

    #[test]
    fn center_is_the_mean_of_corners() {
        let lookup = grid().lookup(&point(2.0, 2.0));
        assert_relative_eq!(lookup.value, 0.45, epsilon = 1e-12);
        assert!(!lookup.extrapolated);
    }

    #[test]
    fn either_axis_out_of_range_is_extrapolated() {
        let lookup = grid().lookup(&point(2.0, 5.0));
        assert!(lookup.extrapolated);
        assert_relative_eq!(lookup.value, 0.55, epsilon = 1e-12);
    }

    #[test]
    fn incomplete_grids_are_rejected() {
        let result = Grid::from_points(
            [DRAIN, SUPPLY],
            &[(1.0, 1.0, 0.4), (1.0, 3.0, 0.5), (3.0, 1.0, 0.3)],
        );
        assert!(matches!(
            result,
            Err(MalformedCoefficientsError::IncompleteGrid { x, y }) if x == 3.0 && y == 3.0
        ));
    }

    #[test]
    fn duplicate_points_are_rejected() {
        let result = Grid::from_points(
            [DRAIN, SUPPLY],
            &[
                (1.0, 1.0, 0.4),
                (1.0, 1.0, 0.41),
                (1.0, 3.0, 0.5),
                (3.0, 1.0, 0.3),
                (3.0, 3.0, 0.6),
            ],
        );
        assert!(matches!(
            result,
            Err(MalformedCoefficientsError::DuplicatePoint { .. })
        ));
    }

    #[test]
    fn signed_zeros_share_a_breakpoint() {
        let grid = Grid::from_points(
            [DRAIN, SUPPLY],
            &[
                (-0.0, 1.0, 0.4),
                (0.0, 3.0, 0.5),
                (1.0, 1.0, 0.4),
                (1.0, 3.0, 0.5),
            ],
        )
        .unwrap();
        assert_eq!(grid.x.len(), 2);
        assert_relative_eq!(grid.lookup(&point(0.0, 3.0)).value, 0.5, epsilon = 1e-12);

        let result = Grid::from_points(
            [DRAIN, SUPPLY],
            &[
                (-0.0, 1.0, 0.4),
                (-0.0, 2.0, 0.5),
                (1.0, 1.0, 0.4),
                (1.0, 2.0, 0.5),
                (0.0, 1.0, 0.3),
            ],
        );
        assert!(matches!(
            result,
            Err(MalformedCoefficientsError::DuplicatePoint { x, y }) if x == 0.0 && y == 1.0
        ));
    }
}
