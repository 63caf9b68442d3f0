use thiserror::Error;
use uom::si::f64::{Energy, ThermodynamicTemperature, Time, VolumeRate};

use crate::support::constraint::{ConstraintError, NonNegative, StrictlyPositive};

use super::Effectiveness;

/// One water-use event of a draw profile.
///
/// All of the mixed fixture flow goes down the drain. The hot flow is the
/// part of it drawn from the water heater.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawEvent {
    /// Time at which the draw begins, relative to the start of the profile.
    pub start_time: Time,

    /// Length of the draw.
    pub duration: Time,

    /// Mixed fixture flow, which is also the drain-side flow.
    pub drain_flow: VolumeRate,

    /// Portion of the fixture flow supplied by the water heater.
    pub hot_flow: VolumeRate,

    /// Cold mains water temperature.
    pub inlet_temperature: ThermodynamicTemperature,

    /// Temperature of the water entering the drain side of the device.
    pub drain_temperature: ThermodynamicTemperature,
}

/// Reasons a [`DrawEvent`] is not physically valid.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DrawEventError {
    #[error("duration must be positive")]
    Duration(#[source] ConstraintError),

    #[error("drain flow must be non-negative")]
    DrainFlow(#[source] ConstraintError),

    #[error("hot water flow must be non-negative")]
    HotFlow(#[source] ConstraintError),

    #[error("hot water flow {hot_flow:?} exceeds drain flow {drain_flow:?}")]
    HotExceedsDrain {
        hot_flow: VolumeRate,
        drain_flow: VolumeRate,
    },

    /// A time, flow, or temperature is infinite or NaN.
    #[error("`{0}` is not finite")]
    NonFinite(&'static str),
}

impl DrawEvent {
    /// Checks the event's physical invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DrawEventError`] if the duration is not positive, a flow is
    /// negative, the hot flow exceeds the drain flow, or any field is not
    /// finite.
    pub fn validate(&self) -> Result<(), DrawEventError> {
        let finite = [
            ("start_time", self.start_time.is_finite()),
            ("duration", self.duration.is_finite()),
            ("drain_flow", self.drain_flow.is_finite()),
            ("hot_flow", self.hot_flow.is_finite()),
            ("inlet_temperature", self.inlet_temperature.is_finite()),
            ("drain_temperature", self.drain_temperature.is_finite()),
        ];
        if let Some((field, _)) = finite.iter().find(|(_, ok)| !ok) {
            return Err(DrawEventError::NonFinite(*field));
        }

        StrictlyPositive::new(self.duration).map_err(DrawEventError::Duration)?;
        NonNegative::new(self.drain_flow).map_err(DrawEventError::DrainFlow)?;
        NonNegative::new(self.hot_flow).map_err(DrawEventError::HotFlow)?;

        if self.hot_flow > self.drain_flow {
            return Err(DrawEventError::HotExceedsDrain {
                hot_flow: self.hot_flow,
                drain_flow: self.drain_flow,
            });
        }

        Ok(())
    }
}

/// Why an event recovered no heat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InactiveReason {
    /// Nothing flows down the drain.
    NoDrainFlow,
    /// Nothing flows through the supply side of the device.
    NoSupplyFlow,
    /// The drain water is no warmer than the mains water.
    NoTemperatureLift,
}

/// Whether the device was recovering heat during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStatus {
    /// The device recovered heat.
    ///
    /// `extrapolated` is true if the operating point was outside the
    /// performance map's domain and was clamped to it.
    Active { extrapolated: bool },

    /// The device recovered no heat.
    Inactive(InactiveReason),
}

impl EventStatus {
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active { .. })
    }

    #[must_use]
    pub fn is_extrapolated(self) -> bool {
        matches!(self, Self::Active { extrapolated: true })
    }
}

/// A [`DrawEvent`] together with the device's computed performance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatedEvent {
    /// The event as given.
    pub event: DrawEvent,

    /// Flow through the supply side of the device.
    pub supply_flow: VolumeRate,

    /// Device effectiveness, absent when the event is inactive.
    pub effectiveness: Option<Effectiveness>,

    /// Supply water temperature leaving the device.
    ///
    /// Equal to the inlet temperature when the event is inactive.
    pub preheated_supply_temperature: ThermodynamicTemperature,

    /// Heat transferred to the supply stream.
    pub heat_recovered: Energy,

    /// Water-heating energy avoided, after utilization losses.
    pub energy_saved: Energy,

    /// Heat an ideal device would transfer at the same flows.
    pub max_recoverable: Energy,

    /// Energy needed to heat the fixture flow from the mains temperature
    /// without heat recovery.
    pub baseline_energy: Energy,

    pub status: EventStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::{
        thermodynamic_temperature::degree_fahrenheit, time::minute, volume_rate::gallon_per_minute,
    };

    fn shower() -> DrawEvent {
        DrawEvent {
            start_time: Time::new::<minute>(0.0),
            duration: Time::new::<minute>(8.0),
            drain_flow: VolumeRate::new::<gallon_per_minute>(2.0),
            hot_flow: VolumeRate::new::<gallon_per_minute>(1.2),
            inlet_temperature: ThermodynamicTemperature::new::<degree_fahrenheit>(55.0),
            drain_temperature: ThermodynamicTemperature::new::<degree_fahrenheit>(100.4),
        }
    }

    #[test]
    fn a_typical_shower_is_valid() {
        assert_eq!(shower().validate(), Ok(()));
    }

    #[test]
    fn zero_flow_is_valid() {
        let event = DrawEvent {
            drain_flow: VolumeRate::new::<gallon_per_minute>(0.0),
            hot_flow: VolumeRate::new::<gallon_per_minute>(0.0),
            ..shower()
        };
        assert_eq!(event.validate(), Ok(()));
    }

    #[test]
    fn invalid_events() {
        let zero_duration = DrawEvent {
            duration: Time::new::<minute>(0.0),
            ..shower()
        };
        assert_eq!(
            zero_duration.validate(),
            Err(DrawEventError::Duration(ConstraintError::Zero))
        );

        let negative_flow = DrawEvent {
            drain_flow: VolumeRate::new::<gallon_per_minute>(-1.0),
            ..shower()
        };
        assert_eq!(
            negative_flow.validate(),
            Err(DrawEventError::DrainFlow(ConstraintError::Negative))
        );

        let too_hot = DrawEvent {
            hot_flow: VolumeRate::new::<gallon_per_minute>(2.5),
            ..shower()
        };
        assert!(matches!(
            too_hot.validate(),
            Err(DrawEventError::HotExceedsDrain { .. })
        ));

        let nan_temperature = DrawEvent {
            inlet_temperature: ThermodynamicTemperature::new::<degree_fahrenheit>(f64::NAN),
            ..shower()
        };
        assert_eq!(
            nan_temperature.validate(),
            Err(DrawEventError::NonFinite("inlet_temperature"))
        );
    }
}
