use uom::{
    ConstZero,
    si::{
        f64::{Energy, Ratio, ThermodynamicTemperature, Time, Volume},
        ratio::ratio,
        thermodynamic_temperature::kelvin,
        time::second,
        volume::cubic_meter,
    },
};

use super::EvaluatedEvent;

/// Number and total duration of a subset of events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventTally {
    pub count: usize,
    pub duration: Time,
}

impl EventTally {
    fn add(&mut self, duration: Time) {
        self.count += 1;
        self.duration += duration;
    }
}

impl Default for EventTally {
    fn default() -> Self {
        Self {
            count: 0,
            duration: Time::ZERO,
        }
    }
}

/// Whole-profile results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSummary {
    pub event_count: usize,
    pub total_duration: Time,

    /// Water drawn at the fixtures.
    pub total_volume: Volume,

    pub heat_recovered: Energy,
    pub energy_saved: Energy,
    pub max_recoverable: Energy,
    pub baseline_energy: Energy,

    /// Energy saved as a fraction of the baseline, zero if the baseline is.
    pub savings_fraction: Ratio,

    pub inactive: EventTally,

    /// Active events whose operating point was outside the map's domain.
    pub extrapolated: EventTally,

    /// Duration-weighted effectiveness of active events.
    pub mean_effectiveness: Option<Ratio>,

    /// Supply-volume-weighted preheated supply temperature of active events.
    pub mean_preheated_temperature: Option<ThermodynamicTemperature>,
}

/// Rolls evaluated events up into a [`ProfileSummary`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAggregator;

impl ResultAggregator {
    /// Summarizes events, accumulating in the order given.
    #[must_use]
    pub fn summarize(events: &[EvaluatedEvent]) -> ProfileSummary {
        let mut summary = ProfileSummary {
            event_count: events.len(),
            total_duration: Time::ZERO,
            total_volume: Volume::ZERO,
            heat_recovered: Energy::ZERO,
            energy_saved: Energy::ZERO,
            max_recoverable: Energy::ZERO,
            baseline_energy: Energy::ZERO,
            savings_fraction: Ratio::ZERO,
            inactive: EventTally::default(),
            extrapolated: EventTally::default(),
            mean_effectiveness: None,
            mean_preheated_temperature: None,
        };

        let mut active_seconds = 0.0;
        let mut weighted_effectiveness = 0.0;
        let mut supply_volume = 0.0;
        let mut weighted_temperature = 0.0;

        for evaluated in events {
            let event = &evaluated.event;
            summary.total_duration += event.duration;
            summary.total_volume += event.drain_flow * event.duration;
            summary.heat_recovered += evaluated.heat_recovered;
            summary.energy_saved += evaluated.energy_saved;
            summary.max_recoverable += evaluated.max_recoverable;
            summary.baseline_energy += evaluated.baseline_energy;

            if !evaluated.status.is_active() {
                summary.inactive.add(event.duration);
                continue;
            }
            if evaluated.status.is_extrapolated() {
                summary.extrapolated.add(event.duration);
            }

            let seconds = event.duration.get::<second>();
            let volume: Volume = evaluated.supply_flow * event.duration;
            let volume = volume.get::<cubic_meter>();
            if let Some(effectiveness) = evaluated.effectiveness {
                active_seconds += seconds;
                weighted_effectiveness += effectiveness.get::<ratio>() * seconds;
            }
            supply_volume += volume;
            weighted_temperature += evaluated.preheated_supply_temperature.get::<kelvin>() * volume;
        }

        if summary.baseline_energy > Energy::ZERO {
            summary.savings_fraction = summary.energy_saved / summary.baseline_energy;
        }
        if active_seconds > 0.0 {
            summary.mean_effectiveness =
                Some(Ratio::new::<ratio>(weighted_effectiveness / active_seconds));
        }
        if supply_volume > 0.0 {
            summary.mean_preheated_temperature = Some(ThermodynamicTemperature::new::<kelvin>(
                weighted_temperature / supply_volume,
            ));
        }

        summary
    }
}
