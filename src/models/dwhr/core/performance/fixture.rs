//! Supply flow for installations that preheat only the fixture's cold inlet.
//!
//! Warmer cold-inlet water means the fixture mixes in less cold water to
//! reach its set temperature, which in turn changes the flow through the
//! device and its effectiveness. The cold flow is found by bisection so
//! that the fixture's mixing balance holds. The bracket runs from the cold
//! flow the fixture draws without recovery up to the whole fixture flow.

use std::convert::Infallible;

use tracing::trace;
use twine_core::{EquationProblem, Model};
use twine_solvers::equation::bisection;
use uom::si::{
    f64::{ThermodynamicTemperature, VolumeRate},
    ratio::ratio,
    temperature_interval::kelvin as delta_kelvin,
    volume_rate::cubic_meter_per_second,
};

use crate::{
    models::dwhr::core::{CoefficientTable, DrawEvent, Effectiveness, OperatingPoint},
    support::units::TemperatureDifference,
};

use super::{EvaluateError, InvalidEffectivenessError, PerformanceModel, Preheat};

/// Solves for the cold flow through the device.
///
/// # Errors
///
/// Returns [`EvaluateError`] if the map yields an invalid effectiveness at a
/// candidate flow or the solver fails to converge.
pub(super) fn cold_supply_flow(
    model: &PerformanceModel,
    event: &DrawEvent,
    table: &CoefficientTable,
) -> Result<VolumeRate, EvaluateError> {
    let fixture_flow = event.drain_flow;

    // With the whole fixture flow preheated, the fixture already needs all of
    // it as cold water: no mixing is possible.
    let full = model.preheat(event, fixture_flow, table)?;
    if required_cold_flow(model, fixture_flow, full.temperature) >= fixture_flow {
        return Ok(fixture_flow);
    }

    // Preheating only ever reduces the cold flow the fixture asks for.
    let without_recovery = required_cold_flow(model, fixture_flow, event.inlet_temperature);

    let solution = bisection::solve(
        &FixtureModel {
            model,
            event,
            table,
        },
        &FixtureBalance {
            model,
            fixture_flow,
        },
        [
            without_recovery.get::<cubic_meter_per_second>(),
            fixture_flow.get::<cubic_meter_per_second>(),
        ],
        &model.config().solver.bisection(),
        |_event: &bisection::Event<'_, _, _>| -> Option<bisection::Action> { None },
    )
    .map_err(|error| match error {
        bisection::Error::Model(source) => match source.downcast::<InvalidEffectivenessError>() {
            Ok(invalid) => EvaluateError::InvalidEffectiveness(*invalid),
            Err(source) => EvaluateError::Bisection(bisection::Error::Model(source)),
        },
        other => EvaluateError::Bisection(other),
    })?;

    if solution.status != bisection::Status::Converged {
        return Err(EvaluateError::FixtureFlowNotConverged {
            residual: VolumeRate::new::<cubic_meter_per_second>(solution.residual),
            iters: solution.iters,
        });
    }

    trace!(iters = solution.iters, "fixture supply flow converged");
    Ok(solution.snapshot.input)
}

/// Cold flow the fixture mixes with water heater water to reach its set
/// temperature, given the temperature arriving at its cold inlet.
pub(super) fn required_cold_flow(
    model: &PerformanceModel,
    fixture_flow: VolumeRate,
    cold_temperature: ThermodynamicTemperature,
) -> VolumeRate {
    let config = model.config();
    if cold_temperature >= config.fixture_temperature {
        return fixture_flow;
    }

    let heater_over_fixture = config
        .water_heater_temperature
        .minus(config.fixture_temperature);
    let heater_over_cold = config.water_heater_temperature.minus(cold_temperature);

    fixture_flow * heater_over_fixture.get::<delta_kelvin>()
        / heater_over_cold.get::<delta_kelvin>()
}

/// Equal-flow effectiveness at the cold flow, scaled by the log flow-ratio
/// correction.
///
/// The correction scales the heat rate at the cold flow, so it scales the
/// effectiveness seen by the cold stream by the same factor.
pub(super) fn log_flow_ratio_effectiveness(
    model: &PerformanceModel,
    fixture_flow: VolumeRate,
    cold_flow: VolumeRate,
    coefficient: f64,
    table: &CoefficientTable,
) -> Result<(Effectiveness, bool), InvalidEffectivenessError> {
    let equal_flow = OperatingPoint::new(cold_flow, cold_flow);
    let (base, extrapolated) = model.effectiveness(&equal_flow, table)?;

    let flow_ratio = (fixture_flow / cold_flow).get::<ratio>();
    let value = base.get::<ratio>() * (coefficient * flow_ratio.ln() + 1.0);
    let effectiveness = Effectiveness::new(value).map_err(|source| InvalidEffectivenessError {
        value,
        operating_point: OperatingPoint::new(fixture_flow, cold_flow),
        source,
    })?;

    Ok((effectiveness, extrapolated))
}

/// Evaluates the device at a candidate cold flow.
struct FixtureModel<'a> {
    model: &'a PerformanceModel,
    event: &'a DrawEvent,
    table: &'a CoefficientTable,
}

impl Model for FixtureModel<'_> {
    type Input = VolumeRate;
    type Output = Preheat;
    type Error = InvalidEffectivenessError;

    fn call(&self, cold_flow: &Self::Input) -> Result<Self::Output, Self::Error> {
        self.model.preheat(self.event, *cold_flow, self.table)
    }
}

/// Residual is `candidate - required` cold flow, in m³/s.
///
/// Not positive at the cold flow without recovery and positive at the full
/// fixture flow.
struct FixtureBalance<'a> {
    model: &'a PerformanceModel,
    fixture_flow: VolumeRate,
}

impl EquationProblem<1> for FixtureBalance<'_> {
    type Input = VolumeRate;
    type Output = Preheat;
    type Error = Infallible;

    fn input(&self, x: &[f64; 1]) -> Result<Self::Input, Self::Error> {
        Ok(VolumeRate::new::<cubic_meter_per_second>(x[0]))
    }

    fn residuals(
        &self,
        input: &Self::Input,
        output: &Self::Output,
    ) -> Result<[f64; 1], Self::Error> {
        let required = required_cold_flow(self.model, self.fixture_flow, output.temperature);
        Ok([(*input - required).get::<cubic_meter_per_second>()])
    }
}
