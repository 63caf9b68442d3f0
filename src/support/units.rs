//! Extensions to [`uom`].
//!
//! This crate uses [`uom`] for all physical units (flow rates, temperatures,
//! energies). This module provides extensions that are useful for modeling
//! but aren't included in [`uom`].
//!
//! ## Temperature differences
//!
//! The [`TemperatureDifference`] trait provides a [`minus`](TemperatureDifference::minus) method
//! for subtracting one absolute temperature from another to get a temperature interval:
//!
//! ```
//! use uom::si::f64::ThermodynamicTemperature;
//! use uom::si::{temperature_interval, thermodynamic_temperature::degree_fahrenheit};
//! use dwhr_models::support::units::TemperatureDifference;
//!
//! let drain = ThermodynamicTemperature::new::<degree_fahrenheit>(100.4);
//! let mains = ThermodynamicTemperature::new::<degree_fahrenheit>(60.0);
//! let lift = drain.minus(mains);
//! assert!((lift.get::<temperature_interval::degree_fahrenheit>() - 40.4).abs() < 1e-9);
//! ```
//!
//! This extension trait is currently needed due to limitations in [`uom`].
//! See [`TemperatureDifference`] for details.

mod temperature_difference;

pub use temperature_difference::TemperatureDifference;
