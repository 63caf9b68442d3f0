use std::ops::Deref;

use uom::si::{f64::Ratio, ratio::ratio};

use crate::support::constraint::{Constrained, ConstraintResult, UnitIntervalUpperOpen};

/// The effectiveness of a drain water heat recovery device.
///
/// The effectiveness is the fraction of the available temperature difference
/// between the drain water and the incoming mains water that is transferred
/// to the supply stream.
///
/// The effectiveness must be in the interval [0, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effectiveness(Constrained<Ratio, UnitIntervalUpperOpen>);

impl Effectiveness {
    /// Create an [`Effectiveness`] from a scalar value.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the value lies outside the interval [0, 1).
    pub fn new(value: f64) -> ConstraintResult<Self> {
        let quantity = Ratio::new::<ratio>(value);
        Self::from_quantity(quantity)
    }

    /// Create an [`Effectiveness`] from a ratio quantity.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the quantity lies outside the interval [0, 1).
    pub fn from_quantity(quantity: Ratio) -> ConstraintResult<Self> {
        Ok(Self(UnitIntervalUpperOpen::new(quantity)?))
    }
}

impl Deref for Effectiveness {
    type Target = Ratio;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
