//! Effectiveness, recovered heat, and savings for a single draw event.

mod config;
mod error;
mod fixture;
mod water;

pub use config::{FixtureHeatModel, FixtureSolveConfig, Installation, PerformanceConfig};
pub use error::{EvaluateError, InvalidEffectivenessError, PerformanceConfigError};
pub use water::WaterProperties;

use tracing::trace;
use uom::{
    ConstZero,
    si::{
        f64::{Energy, Ratio, TemperatureInterval, ThermodynamicTemperature, Time, VolumeRate},
        ratio::ratio,
    },
};

use crate::support::{
    constraint::{Constrained, StrictlyPositive, UnitInterval},
    units::TemperatureDifference,
};

use super::{
    CoefficientTable, DrawEvent, Effectiveness, EvaluatedEvent, EventStatus, InactiveReason,
    MapOutput, OperatingPoint,
};

/// Computes the performance of a drain water heat recovery device.
///
/// For each draw the model determines the flow through the device's supply
/// side from the installation, looks up the effectiveness in a performance
/// map, and applies the heat exchanger effectiveness definition:
///
/// ```text
/// T_pre = T_in + ε (T_drain - T_in)
/// Q     = ρ V̇_supply c_p (T_pre - T_in) Δt
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceModel {
    config: PerformanceConfig,
    rated_effectiveness: Effectiveness,
    utilization: Constrained<f64, UnitInterval>,
}

/// Supply-side outlet state at a given supply flow.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Preheat {
    effectiveness: Effectiveness,
    extrapolated: bool,
    temperature: ThermodynamicTemperature,
}

impl PerformanceModel {
    /// Creates a model from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PerformanceConfigError`] if the rated effectiveness is not in
    /// [0, 1), the utilization is not in [0, 1], a water property is not
    /// positive, a temperature is not finite, the water heater is not hotter
    /// than the fixture, or the solver tolerance is not positive.
    pub fn new(config: PerformanceConfig) -> Result<Self, PerformanceConfigError> {
        let rated_effectiveness = Effectiveness::new(config.rated_effectiveness)
            .map_err(PerformanceConfigError::RatedEffectiveness)?;
        let utilization = UnitInterval::new(config.utilization)
            .map_err(PerformanceConfigError::Utilization)?;
        StrictlyPositive::new(config.water.cp).map_err(PerformanceConfigError::SpecificHeat)?;
        StrictlyPositive::new(config.water.density).map_err(PerformanceConfigError::Density)?;
        StrictlyPositive::new(config.solver.flow_tol)
            .map_err(PerformanceConfigError::FlowTolerance)?;

        for (name, temperature) in [
            ("fixture temperature", config.fixture_temperature),
            ("water heater temperature", config.water_heater_temperature),
        ] {
            if !temperature.is_finite() {
                return Err(PerformanceConfigError::NonFinite(name));
            }
        }
        if !config.fixture_heat.is_finite() {
            return Err(PerformanceConfigError::NonFinite("flow-ratio coefficient"));
        }
        if config.water_heater_temperature <= config.fixture_temperature {
            return Err(PerformanceConfigError::WaterHeaterBelowFixture);
        }

        Ok(Self {
            config,
            rated_effectiveness,
            utilization,
        })
    }

    #[must_use]
    pub fn config(&self) -> &PerformanceConfig {
        &self.config
    }

    /// Evaluates a draw event against a performance map.
    ///
    /// Events with no drain flow, no supply flow, or drain water no warmer
    /// than the mains are returned as inactive with zero recovered heat.
    /// The event is assumed to satisfy [`DrawEvent::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`EvaluateError`] if the map yields an effectiveness outside
    /// [0, 1) or the unequal-fixture supply flow cannot be solved.
    pub fn evaluate(
        &self,
        event: &DrawEvent,
        table: &CoefficientTable,
    ) -> Result<EvaluatedEvent, EvaluateError> {
        let lift = event.drain_temperature.minus(event.inlet_temperature);

        if event.drain_flow <= VolumeRate::ZERO {
            return Ok(self.inactive(event, VolumeRate::ZERO, InactiveReason::NoDrainFlow));
        }
        if lift <= TemperatureInterval::ZERO {
            let supply_flow = self.supply_flow_without_recovery(event);
            return Ok(self.inactive(event, supply_flow, InactiveReason::NoTemperatureLift));
        }

        let supply_flow = match self.config.installation {
            Installation::EqualFlow => event.drain_flow,
            Installation::UnequalWaterHeater => event.hot_flow,
            Installation::UnequalFixture => fixture::cold_supply_flow(self, event, table)?,
        };
        if supply_flow <= VolumeRate::ZERO {
            return Ok(self.inactive(event, supply_flow, InactiveReason::NoSupplyFlow));
        }

        let preheat = self.preheat(event, supply_flow, table)?;
        let heat_recovered = self.heat(
            supply_flow,
            lift * preheat.effectiveness.get::<ratio>(),
            event.duration,
        );

        trace!(
            effectiveness = preheat.effectiveness.get::<ratio>(),
            extrapolated = preheat.extrapolated,
            "evaluated draw event"
        );

        Ok(EvaluatedEvent {
            event: *event,
            supply_flow,
            effectiveness: Some(preheat.effectiveness),
            preheated_supply_temperature: preheat.temperature,
            heat_recovered,
            energy_saved: heat_recovered * *self.utilization.as_ref(),
            max_recoverable: self.heat(supply_flow, lift, event.duration),
            baseline_energy: self.baseline(event),
            status: EventStatus::Active {
                extrapolated: preheat.extrapolated,
            },
        })
    }

    /// Looks up the effectiveness at an operating point.
    ///
    /// Correction-factor maps are scaled by the rated effectiveness. The
    /// returned flag is true if the map clamped the operating point.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidEffectivenessError`] if the result is outside [0, 1).
    pub fn effectiveness(
        &self,
        point: &OperatingPoint,
        table: &CoefficientTable,
    ) -> Result<(Effectiveness, bool), InvalidEffectivenessError> {
        let lookup = table.lookup(point);
        let value = match table.output() {
            MapOutput::Effectiveness => lookup.value,
            MapOutput::CorrectionFactor => lookup.value * self.rated_effectiveness.get::<ratio>(),
        };

        let effectiveness =
            Effectiveness::new(value).map_err(|source| InvalidEffectivenessError {
                value,
                operating_point: *point,
                source,
            })?;

        Ok((effectiveness, lookup.extrapolated))
    }

    fn preheat(
        &self,
        event: &DrawEvent,
        supply_flow: VolumeRate,
        table: &CoefficientTable,
    ) -> Result<Preheat, InvalidEffectivenessError> {
        let (effectiveness, extrapolated) = match self.config.fixture_heat {
            FixtureHeatModel::LogFlowRatio { coefficient }
                if self.config.installation == Installation::UnequalFixture =>
            {
                fixture::log_flow_ratio_effectiveness(
                    self,
                    event.drain_flow,
                    supply_flow,
                    coefficient,
                    table,
                )?
            }
            _ => {
                let point = OperatingPoint::new(event.drain_flow, supply_flow);
                self.effectiveness(&point, table)?
            }
        };
        let lift = event.drain_temperature.minus(event.inlet_temperature);

        Ok(Preheat {
            effectiveness,
            extrapolated,
            temperature: event.inlet_temperature + lift * effectiveness.get::<ratio>(),
        })
    }

    /// Supply flow when the device transfers no heat.
    fn supply_flow_without_recovery(&self, event: &DrawEvent) -> VolumeRate {
        match self.config.installation {
            Installation::EqualFlow => event.drain_flow,
            Installation::UnequalWaterHeater => event.hot_flow,
            Installation::UnequalFixture => {
                fixture::required_cold_flow(self, event.drain_flow, event.inlet_temperature)
            }
        }
    }

    fn inactive(
        &self,
        event: &DrawEvent,
        supply_flow: VolumeRate,
        reason: InactiveReason,
    ) -> EvaluatedEvent {
        trace!(?reason, "inactive draw event");

        EvaluatedEvent {
            event: *event,
            supply_flow,
            effectiveness: None,
            preheated_supply_temperature: event.inlet_temperature,
            heat_recovered: Energy::ZERO,
            energy_saved: Energy::ZERO,
            max_recoverable: Energy::ZERO,
            baseline_energy: self.baseline(event),
            status: EventStatus::Inactive(reason),
        }
    }

    /// Energy to heat the whole fixture flow from the mains temperature.
    fn baseline(&self, event: &DrawEvent) -> Energy {
        let fixture_temperature = self.config.fixture_temperature;
        let delta_t = fixture_temperature.minus(event.inlet_temperature);
        if delta_t <= TemperatureInterval::ZERO {
            return Energy::ZERO;
        }
        self.heat(event.drain_flow, delta_t, event.duration)
    }

    /// Heat to change a water flow's temperature by `delta_t` over `duration`.
    fn heat(&self, flow: VolumeRate, delta_t: TemperatureInterval, duration: Time) -> Energy {
        let water = &self.config.water;
        let capacitance_rate = water.density * flow * water.cp;
        capacitance_rate * delta_t * duration
    }

    /// Fraction of recovered heat that displaces water heater energy.
    #[must_use]
    pub fn utilization(&self) -> Ratio {
        Ratio::new::<ratio>(*self.utilization.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{
        energy::btu_it, thermodynamic_temperature::degree_fahrenheit, time::minute,
        volume_rate::gallon_per_minute,
    };

    use crate::models::dwhr::core::Variable;

    fn gpm(value: f64) -> VolumeRate {
        VolumeRate::new::<gallon_per_minute>(value)
    }

    fn fahrenheit(value: f64) -> ThermodynamicTemperature {
        ThermodynamicTemperature::new::<degree_fahrenheit>(value)
    }

    fn shower() -> DrawEvent {
        DrawEvent {
            start_time: Time::new::<minute>(0.0),
            duration: Time::new::<minute>(8.0),
            drain_flow: gpm(2.0),
            hot_flow: gpm(1.2),
            inlet_temperature: fahrenheit(55.0),
            drain_temperature: fahrenheit(100.4),
        }
    }

    fn ratio_table() -> CoefficientTable {
        CoefficientTable::curve(
            Variable::FlowRatio,
            [(0.5, 0.40), (1.0, 0.55)],
            MapOutput::Effectiveness,
        )
        .unwrap()
    }

    fn model(installation: Installation) -> PerformanceModel {
        PerformanceModel::new(PerformanceConfig::default().with_installation(installation))
            .unwrap()
    }

    #[test]
    fn equal_flow_shower() {
        let result = model(Installation::EqualFlow)
            .evaluate(&shower(), &ratio_table())
            .unwrap();

        assert_eq!(
            result.status,
            EventStatus::Active {
                extrapolated: false,
            }
        );
        assert_eq!(result.supply_flow, gpm(2.0));
        assert_relative_eq!(result.effectiveness.unwrap().get::<ratio>(), 0.55);
        assert_relative_eq!(
            result
                .preheated_supply_temperature
                .get::<degree_fahrenheit>(),
            55.0 + 0.55 * 45.4,
            epsilon = 1e-9
        );

        // 16 gal of water, at 4.1868 kJ/kg·K per Btu/lb·°F.
        let pounds = 16.0 * 3.785_412e-3 * 997.047 / 0.453_592_37;
        let btu_per_lb_f = 4.184 / 4.1868;
        assert_relative_eq!(
            result.heat_recovered.get::<btu_it>(),
            pounds * btu_per_lb_f * 0.55 * 45.4,
            max_relative = 1e-6
        );
        assert_eq!(result.energy_saved, result.heat_recovered);
        assert_relative_eq!(
            result.max_recoverable.get::<btu_it>(),
            pounds * btu_per_lb_f * 45.4,
            max_relative = 1e-6
        );
        assert_relative_eq!(
            result.baseline_energy.get::<btu_it>(),
            pounds * btu_per_lb_f * 50.0,
            max_relative = 1e-6
        );
    }

    #[test]
    fn water_heater_installation_preheats_hot_flow() {
        // Ratio 1.2 / 2.0 = 0.6 interpolates to 0.43.
        let result = model(Installation::UnequalWaterHeater)
            .evaluate(&shower(), &ratio_table())
            .unwrap();

        assert_eq!(result.supply_flow, gpm(1.2));
        assert_relative_eq!(
            result.effectiveness.unwrap().get::<ratio>(),
            0.43,
            epsilon = 1e-12
        );
    }

    #[test]
    fn interpolates_between_breakpoints() {
        let result = model(Installation::UnequalWaterHeater)
            .evaluate(
                &DrawEvent {
                    hot_flow: gpm(1.5),
                    ..shower()
                },
                &ratio_table(),
            )
            .unwrap();

        let eff = result.effectiveness.unwrap().get::<ratio>();
        assert_relative_eq!(eff, 0.475, epsilon = 1e-12);
        assert_relative_eq!(
            result
                .preheated_supply_temperature
                .get::<degree_fahrenheit>(),
            55.0 + 0.475 * 45.4,
            epsilon = 1e-9
        );
    }

    #[test]
    fn inactive_events() {
        let model = model(Installation::UnequalWaterHeater);
        let table = ratio_table();

        let no_drain = model
            .evaluate(
                &DrawEvent {
                    drain_flow: gpm(0.0),
                    hot_flow: gpm(0.0),
                    ..shower()
                },
                &table,
            )
            .unwrap();
        assert_eq!(
            no_drain.status,
            EventStatus::Inactive(InactiveReason::NoDrainFlow)
        );
        assert_eq!(no_drain.heat_recovered, Energy::ZERO);
        assert_eq!(no_drain.baseline_energy, Energy::ZERO);

        let cold_only = model
            .evaluate(
                &DrawEvent {
                    hot_flow: gpm(0.0),
                    ..shower()
                },
                &table,
            )
            .unwrap();
        assert_eq!(
            cold_only.status,
            EventStatus::Inactive(InactiveReason::NoSupplyFlow)
        );
        assert_eq!(cold_only.heat_recovered, Energy::ZERO);
        assert!(cold_only.effectiveness.is_none());
        assert!(cold_only.baseline_energy > Energy::ZERO);

        let cold_drain = model
            .evaluate(
                &DrawEvent {
                    drain_temperature: fahrenheit(50.0),
                    ..shower()
                },
                &table,
            )
            .unwrap();
        assert_eq!(
            cold_drain.status,
            EventStatus::Inactive(InactiveReason::NoTemperatureLift)
        );
        assert_eq!(cold_drain.preheated_supply_temperature, fahrenheit(55.0));
    }

    #[test]
    fn correction_factor_scales_rated_effectiveness() {
        let table = CoefficientTable::polynomial(
            Variable::DrainFlow(crate::models::dwhr::core::FlowUnit::GallonsPerMinute),
            0.5..=7.5,
            &[0.0, 1.1],
            MapOutput::CorrectionFactor,
        )
        .unwrap();

        let result = model(Installation::EqualFlow)
            .evaluate(&shower(), &table)
            .unwrap();
        assert_relative_eq!(
            result.effectiveness.unwrap().get::<ratio>(),
            0.42 * 1.1,
            epsilon = 1e-12
        );
    }

    #[test]
    fn effectiveness_is_never_clamped() {
        let table = CoefficientTable::curve(
            Variable::FlowRatio,
            [(0.5, 0.9), (1.0, 1.2)],
            MapOutput::Effectiveness,
        )
        .unwrap();

        let err = model(Installation::EqualFlow)
            .evaluate(&shower(), &table)
            .unwrap_err();
        let EvaluateError::InvalidEffectiveness(invalid) = err else {
            panic!("expected an invalid effectiveness error");
        };
        assert_relative_eq!(invalid.value, 1.2);
        assert_eq!(invalid.operating_point.drain_flow, gpm(2.0));
    }

    #[test]
    fn utilization_discounts_savings() {
        let model = PerformanceModel::new(PerformanceConfig::default().with_utilization(0.8))
            .unwrap();
        let result = model.evaluate(&shower(), &ratio_table()).unwrap();

        assert_relative_eq!(
            result.energy_saved.get::<btu_it>(),
            0.8 * result.heat_recovered.get::<btu_it>(),
            max_relative = 1e-12
        );
        assert_relative_eq!(model.utilization().get::<ratio>(), 0.8);
    }

    #[test]
    fn fixture_installation_recovers_heater_energy() {
        // Preheating the cold inlet reduces the hot water the fixture draws;
        // the heat recovered equals the drop in water heater energy.
        let model = PerformanceModel::new(
            PerformanceConfig::default()
                .with_installation(Installation::UnequalFixture)
                .with_solver(FixtureSolveConfig {
                    max_iters: 100,
                    flow_tol: gpm(1e-9),
                }),
        )
        .unwrap();
        let event = shower();
        let table = ratio_table();
        let result = model.evaluate(&event, &table).unwrap();

        let config = model.config();
        let cold = result.supply_flow;
        let hot = event.drain_flow - cold;
        let hot_without = event.drain_flow
            - fixture::required_cold_flow(&model, event.drain_flow, event.inlet_temperature);
        let heater_rise = config
            .water_heater_temperature
            .minus(event.inlet_temperature);
        let heater_savings = model.heat(hot_without - hot, heater_rise, event.duration);

        assert_relative_eq!(
            result.heat_recovered.get::<btu_it>(),
            heater_savings.get::<btu_it>(),
            max_relative = 1e-4
        );
    }

    #[test]
    fn log_flow_ratio_heat_follows_the_cold_flow() {
        let model = PerformanceModel::new(
            PerformanceConfig::default()
                .with_installation(Installation::UnequalFixture)
                .with_fixture_heat(FixtureHeatModel::MANOUCHEHRI)
                .with_solver(FixtureSolveConfig {
                    max_iters: 200,
                    flow_tol: gpm(1e-9),
                }),
        )
        .unwrap();
        let table = CoefficientTable::curve(
            Variable::FlowRatio,
            [(0.0, 0.5), (1.0, 0.5)],
            MapOutput::Effectiveness,
        )
        .unwrap();

        let result = model.evaluate(&shower(), &table).unwrap();
        assert_relative_eq!(
            result.supply_flow.get::<gallon_per_minute>(),
            0.690_463,
            epsilon = 1e-5
        );

        // 0.5 (0.3452 ln(2 / c) + 1) c (100.4 - 55) over 8 min is
        // 171.4224 gal·°F.
        let pounds_f = 171.4224 * 3.785_412e-3 * 997.047 / 0.453_592_37;
        assert_relative_eq!(
            result.heat_recovered.get::<btu_it>(),
            pounds_f * 4.184 / 4.1868,
            max_relative = 1e-5
        );
    }

    #[test]
    fn log_flow_ratio_needs_an_unequal_fixture() {
        let config = PerformanceConfig::default().with_fixture_heat(FixtureHeatModel::MANOUCHEHRI);
        let with = PerformanceModel::new(config).unwrap();
        let without = model(Installation::EqualFlow);

        assert_eq!(
            with.evaluate(&shower(), &ratio_table()).unwrap(),
            without.evaluate(&shower(), &ratio_table()).unwrap()
        );
        let nan = FixtureHeatModel::LogFlowRatio {
            coefficient: f64::NAN,
        };
        assert_eq!(
            PerformanceModel::new(config.with_fixture_heat(nan)),
            Err(PerformanceConfigError::NonFinite("flow-ratio coefficient"))
        );
    }

    #[test]
    fn rejects_invalid_config() {
        assert_eq!(
            PerformanceModel::new(PerformanceConfig::default().with_rated_effectiveness(1.0)),
            Err(PerformanceConfigError::RatedEffectiveness(
                crate::support::constraint::ConstraintError::AboveMaximum,
            ))
        );
        assert!(matches!(
            PerformanceModel::new(PerformanceConfig::default().with_utilization(1.5)),
            Err(PerformanceConfigError::Utilization(_))
        ));
        assert!(matches!(
            PerformanceModel::new(
                PerformanceConfig::default().with_water_heater_temperature(fahrenheit(100.0)),
            ),
            Err(PerformanceConfigError::WaterHeaterBelowFixture)
        ));
    }
}
