use super::{MalformedCoefficientsError, Variable};

/// Sorted breakpoints along one variable of a tabulated map.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Axis {
    pub(super) variable: Variable,
    breakpoints: Vec<f64>,
}

/// Position of a value relative to an axis.
///
/// `index` is the lower breakpoint of the bracketing segment and `weight` the
/// fractional distance toward the upper one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Bracket {
    pub(super) index: usize,
    pub(super) weight: f64,
    pub(super) extrapolated: bool,
}

impl Axis {
    /// Creates an axis from strictly increasing breakpoints.
    pub(super) fn new(
        variable: Variable,
        breakpoints: Vec<f64>,
    ) -> Result<Self, MalformedCoefficientsError> {
        if breakpoints.len() < 2 {
            return Err(MalformedCoefficientsError::TooFewBreakpoints {
                variable,
                found: breakpoints.len(),
            });
        }
        if let Some(pair) = breakpoints.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(MalformedCoefficientsError::DuplicateBreakpoint {
                variable,
                value: pair[1],
            });
        }
        Ok(Self {
            variable,
            breakpoints,
        })
    }

    pub(super) fn len(&self) -> usize {
        self.breakpoints.len()
    }

    pub(super) fn min(&self) -> f64 {
        self.breakpoints[0]
    }

    pub(super) fn max(&self) -> f64 {
        self.breakpoints[self.breakpoints.len() - 1]
    }

    pub(super) fn position(&self, value: f64) -> Option<usize> {
        self.breakpoints
            .binary_search_by(|point| point.total_cmp(&value))
            .ok()
    }

    pub(super) fn breakpoint(&self, index: usize) -> f64 {
        self.breakpoints[index]
    }

    /// Brackets a value, clamping to the nearest end when it falls outside.
    pub(super) fn locate(&self, value: f64) -> Bracket {
        let last_segment = self.breakpoints.len() - 2;

        // NaN fails both comparisons and clamps low.
        if !(value >= self.min()) {
            return Bracket {
                index: 0,
                weight: 0.0,
                extrapolated: true,
            };
        }
        if value > self.max() {
            return Bracket {
                index: last_segment,
                weight: 1.0,
                extrapolated: true,
            };
        }

        let index = self
            .breakpoints
            .partition_point(|&b| b <= value)
            .saturating_sub(1)
            .min(last_segment);
        let lower = self.breakpoints[index];
        let upper = self.breakpoints[index + 1];

        Bracket {
            index,
            weight: (value - lower) / (upper - lower),
            extrapolated: false,
        }
    }
}

/// Linear interpolation between `a` and `b`.
pub(super) fn lerp(a: f64, b: f64, weight: f64) -> f64 {
    a + weight * (b - a)
}
