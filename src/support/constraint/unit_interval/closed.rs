use std::{cmp::Ordering, marker::PhantomData};

use crate::support::constraint::{Constrained, Constraint, ConstraintError, UnitBounds};

/// Marker type enforcing that a value lies in the closed unit interval: `0 ≤ x ≤ 1`.
///
/// Used for fractions that may legitimately reach either endpoint, such as the
/// share of recovered heat that is actually utilized.
///
/// # Examples
///
/// ```
/// use dwhr_models::support::constraint::{Constrained, UnitInterval};
/// use uom::si::{f64::Ratio, ratio::{percent, ratio}};
///
/// let all = UnitInterval::new(1.0).unwrap();
/// assert_eq!(all.into_inner(), 1.0);
///
/// let r = Constrained::<Ratio, UnitInterval>::new(Ratio::new::<percent>(85.0)).unwrap();
/// assert!((r.as_ref().get::<ratio>() - 0.85).abs() < 1e-12);
///
/// assert!(UnitInterval::new(-0.0001).is_err());
/// assert!(UnitInterval::new(1.0001).is_err());
/// assert!(UnitInterval::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnitInterval;

impl UnitInterval {
    /// Constructs `Constrained<T, UnitInterval>` if 0 ≤ value ≤ 1.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::BelowMinimum`] if less than zero.
    /// - [`ConstraintError::AboveMaximum`] if greater than one.
    /// - [`ConstraintError::NotANumber`] if comparison is undefined (e.g., NaN).
    pub fn new<T: UnitBounds>(value: T) -> Result<Constrained<T, UnitInterval>, ConstraintError> {
        Constrained::<T, UnitInterval>::new(value)
    }

    /// Returns the upper bound (one) as a constrained value.
    #[must_use]
    pub fn one<T: UnitBounds>() -> Constrained<T, UnitInterval> {
        Constrained::<T, UnitInterval> {
            value: T::one(),
            _marker: PhantomData,
        }
    }
}

impl<T: UnitBounds> Constraint<T> for UnitInterval {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match (value.partial_cmp(&T::zero()), value.partial_cmp(&T::one())) {
            (None, _) | (_, None) => Err(ConstraintError::NotANumber),
            (Some(Ordering::Less), _) => Err(ConstraintError::BelowMinimum),
            (_, Some(Ordering::Greater)) => Err(ConstraintError::AboveMaximum),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::support::constraint::*;

    #[test]
    fn endpoints_are_inside() {
        assert!(UnitInterval::new(0.0).is_ok());
        assert!(UnitInterval::new(1.0).is_ok());
        assert_eq!(UnitInterval::one::<f64>().into_inner(), 1.0);
    }

    #[test]
    fn out_of_range() {
        assert_eq!(
            UnitInterval::new(-1e-15),
            Err(ConstraintError::BelowMinimum)
        );
        assert_eq!(
            UnitInterval::new(1.0 + 1e-15),
            Err(ConstraintError::AboveMaximum)
        );
        assert_eq!(
            UnitInterval::new(f64::INFINITY),
            Err(ConstraintError::AboveMaximum)
        );
        assert_eq!(
            UnitInterval::new(f64::NAN),
            Err(ConstraintError::NotANumber)
        );
    }
}
