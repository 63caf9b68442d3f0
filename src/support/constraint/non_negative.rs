use std::cmp::Ordering;

use num_traits::Zero;

use super::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a value is non-negative (zero or greater).
///
/// # Examples
///
/// ```
/// use dwhr_models::support::constraint::{Constrained, NonNegative};
/// use uom::si::{f64::VolumeRate, volume_rate::gallon_per_minute};
///
/// // A closed tap is a valid flow rate.
/// let idle = NonNegative::new(VolumeRate::new::<gallon_per_minute>(0.0)).unwrap();
/// assert_eq!(idle.into_inner().get::<gallon_per_minute>(), 0.0);
///
/// let shower = Constrained::<_, NonNegative>::new(2.1).unwrap();
/// assert_eq!(shower.into_inner(), 2.1);
///
/// assert!(NonNegative::new(-0.5).is_err());
/// assert!(NonNegative::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NonNegative;

impl NonNegative {
    /// Constructs a [`Constrained<T, NonNegative>`] if the value is non-negative.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is negative or not a number (`NaN`).
    pub fn new<T: PartialOrd + Zero>(
        value: T,
    ) -> Result<Constrained<T, NonNegative>, ConstraintError> {
        Constrained::<T, NonNegative>::new(value)
    }
}

impl<T: PartialOrd + Zero> Constraint<T> for NonNegative {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match value.partial_cmp(&T::zero()) {
            Some(Ordering::Greater | Ordering::Equal) => Ok(()),
            Some(Ordering::Less) => Err(ConstraintError::Negative),
            None => Err(ConstraintError::NotANumber),
        }
    }
}
