//! Whole-profile analysis.

mod error;

use std::thread;

use tracing::{debug, warn};
use uom::si::{energy::btu_it, ratio::ratio};

pub use error::{AnalyzeError, ProfileFormatError};

use super::{
    CoefficientTable, DrawEvent, EvaluatedEvent, PerformanceModel, ProfileSummary, ResultAggregator,
};

/// Per-event results of a profile, in input order, with their summary.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub events: Vec<EvaluatedEvent>,
    pub summary: ProfileSummary,
}

/// Runs a [`PerformanceModel`] over draw profiles using a shared map.
#[derive(Debug, Clone, Copy)]
pub struct ProfileAnalyzer<'a> {
    model: &'a PerformanceModel,
    table: &'a CoefficientTable,
}

impl<'a> ProfileAnalyzer<'a> {
    #[must_use]
    pub fn new(model: &'a PerformanceModel, table: &'a CoefficientTable) -> Self {
        Self { model, table }
    }

    /// Analyzes one draw profile.
    ///
    /// Every event is validated before any is evaluated.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzeError::Format`] if the profile is empty or an event
    /// is invalid, and [`AnalyzeError::Evaluate`] with the event's index if
    /// an evaluation fails.
    pub fn analyze(&self, events: &[DrawEvent]) -> Result<Analysis, AnalyzeError> {
        check_profile(events)?;

        let events = events
            .iter()
            .enumerate()
            .map(|(index, event)| {
                self.model
                    .evaluate(event, self.table)
                    .map_err(|source| AnalyzeError::Evaluate { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let summary = ResultAggregator::summarize(&events);

        if summary.extrapolated.count > 0 {
            warn!(
                count = summary.extrapolated.count,
                "operating points outside the performance map were clamped"
            );
        }
        debug!(
            events = summary.event_count,
            inactive = summary.inactive.count,
            energy_saved_btu = summary.energy_saved.get::<btu_it>(),
            savings_fraction = summary.savings_fraction.get::<ratio>(),
            "analyzed draw profile"
        );

        Ok(Analysis { events, summary })
    }

    /// Analyzes each profile on its own thread.
    ///
    /// Results are returned in input order. A failing or panicking profile
    /// does not affect the others.
    pub fn analyze_profiles<P>(&self, profiles: &[P]) -> Vec<Result<Analysis, AnalyzeError>>
    where
        P: AsRef<[DrawEvent]> + Sync,
    {
        thread::scope(|scope| {
            let workers: Vec<_> = profiles
                .iter()
                .map(|profile| scope.spawn(move || self.analyze(profile.as_ref())))
                .collect();

            workers
                .into_iter()
                .enumerate()
                .map(|(index, worker)| {
                    worker.join().unwrap_or_else(|_| {
                        warn!(profile = index, "profile worker panicked");
                        Err(AnalyzeError::WorkerPanicked)
                    })
                })
                .collect()
        })
    }
}

/// Analyzes one draw profile.
///
/// # Errors
///
/// See [`ProfileAnalyzer::analyze`].
pub fn analyze(
    events: &[DrawEvent],
    model: &PerformanceModel,
    table: &CoefficientTable,
) -> Result<Analysis, AnalyzeError> {
    ProfileAnalyzer::new(model, table).analyze(events)
}

/// Checks that a profile is non-empty and every event is valid.
///
/// # Errors
///
/// Returns [`ProfileFormatError`] for the first problem found.
pub fn check_profile(events: &[DrawEvent]) -> Result<(), ProfileFormatError> {
    if events.is_empty() {
        return Err(ProfileFormatError::Empty);
    }
    for (index, event) in events.iter().enumerate() {
        event
            .validate()
            .map_err(|source| ProfileFormatError::InvalidEvent { index, source })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::{
        f64::{ThermodynamicTemperature, Time, VolumeRate},
        thermodynamic_temperature::degree_fahrenheit,
        time::minute,
        volume_rate::gallon_per_minute,
    };

    use crate::models::dwhr::core::{
        DrawEventError, EvaluateError, MapOutput, PerformanceConfig, Variable,
    };

    fn draw(start: f64, gpm: f64) -> DrawEvent {
        DrawEvent {
            start_time: Time::new::<minute>(start),
            duration: Time::new::<minute>(2.0),
            drain_flow: VolumeRate::new::<gallon_per_minute>(gpm),
            hot_flow: VolumeRate::new::<gallon_per_minute>(gpm / 2.0),
            inlet_temperature: ThermodynamicTemperature::new::<degree_fahrenheit>(55.0),
            drain_temperature: ThermodynamicTemperature::new::<degree_fahrenheit>(100.4),
        }
    }

    fn table() -> CoefficientTable {
        CoefficientTable::curve(
            Variable::FlowRatio,
            [(0.5, 0.40), (1.0, 0.55)],
            MapOutput::Effectiveness,
        )
        .unwrap()
    }

    fn model() -> PerformanceModel {
        PerformanceModel::new(PerformanceConfig::default()).unwrap()
    }

    #[test]
    fn preserves_order_and_length() {
        let (model, table) = (model(), table());
        let events = [draw(0.0, 2.0), draw(5.0, 0.0), draw(9.0, 1.5)];

        let analysis = analyze(&events, &model, &table).unwrap();

        assert_eq!(analysis.events.len(), 3);
        for (evaluated, event) in analysis.events.iter().zip(&events) {
            assert_eq!(&evaluated.event, event);
        }
        assert_eq!(analysis.summary.inactive.count, 1);
    }

    #[test]
    fn empty_profile_is_a_format_error() {
        let (model, table) = (model(), table());
        assert!(matches!(
            analyze(&[], &model, &table),
            Err(AnalyzeError::Format(ProfileFormatError::Empty))
        ));
    }

    #[test]
    fn invalid_events_are_reported_before_evaluation() {
        let (model, table) = (model(), table());
        let mut bad = draw(3.0, 1.0);
        bad.duration = Time::new::<minute>(-1.0);

        let err = analyze(&[draw(0.0, 1.0), bad], &model, &table).unwrap_err();
        assert!(matches!(
            err,
            AnalyzeError::Format(ProfileFormatError::InvalidEvent {
                index: 1,
                source: DrawEventError::Duration(_),
            })
        ));
    }

    #[test]
    fn evaluation_errors_carry_the_event_index() {
        let model = model();
        let table = CoefficientTable::curve(
            Variable::FlowRatio,
            [(0.5, 0.40), (1.0, 1.5)],
            MapOutput::Effectiveness,
        )
        .unwrap();

        let err = analyze(&[draw(0.0, 1.0), draw(4.0, 2.0)], &model, &table).unwrap_err();
        assert!(matches!(
            err,
            AnalyzeError::Evaluate {
                index: 0,
                source: EvaluateError::InvalidEffectiveness(_),
            }
        ));
    }

    #[test]
    fn profiles_fail_independently() {
        let (model, table) = (model(), table());
        let analyzer = ProfileAnalyzer::new(&model, &table);
        let profiles = vec![
            vec![draw(0.0, 2.0), draw(3.0, 1.0)],
            vec![],
            vec![draw(0.0, 1.5)],
        ];

        let results = analyzer.analyze_profiles(&profiles);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().events.len(), 2);
        assert!(matches!(
            results[1],
            Err(AnalyzeError::Format(ProfileFormatError::Empty))
        ));
        assert_eq!(
            results[2].as_ref().unwrap(),
            &analyzer.analyze(&profiles[2]).unwrap()
        );
    }
}
