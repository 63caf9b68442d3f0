//! Drain water heat recovery models.
//!
//! This module provides a [`twine_core::Model`] implementation for
//! evaluating a single draw event, along with the profile analysis API it
//! is built on. The computational core is in the internal `core` module.
//!
//! # Example
//!
//! ```
//! use dwhr_models::models::dwhr::{
//!     CoefficientTable, DrawEvent, MapOutput, PerformanceConfig, PerformanceModel,
//!     ProfileAnalyzer, Variable,
//! };
//! use uom::si::{
//!     f64::{ThermodynamicTemperature, Time, VolumeRate},
//!     thermodynamic_temperature::degree_fahrenheit,
//!     time::minute,
//!     volume_rate::gallon_per_minute,
//! };
//!
//! let table = CoefficientTable::curve(
//!     Variable::FlowRatio,
//!     [(0.5, 0.40), (1.0, 0.55)],
//!     MapOutput::Effectiveness,
//! )
//! .unwrap();
//! let model = PerformanceModel::new(PerformanceConfig::default()).unwrap();
//!
//! let shower = DrawEvent {
//!     start_time: Time::new::<minute>(0.0),
//!     duration: Time::new::<minute>(8.0),
//!     drain_flow: VolumeRate::new::<gallon_per_minute>(2.0),
//!     hot_flow: VolumeRate::new::<gallon_per_minute>(1.2),
//!     inlet_temperature: ThermodynamicTemperature::new::<degree_fahrenheit>(55.0),
//!     drain_temperature: ThermodynamicTemperature::new::<degree_fahrenheit>(100.4),
//! };
//!
//! let analysis = ProfileAnalyzer::new(&model, &table).analyze(&[shower]).unwrap();
//! assert!(analysis.summary.energy_saved.value > 0.0);
//! ```

mod core;
pub mod io;

use thiserror::Error;
use twine_core::Model;

pub use self::core::{
    Analysis, AnalyzeError, Bounds, CoefficientTable, DrawEvent, DrawEventError, Effectiveness,
    EvaluateError, EvaluatedEvent, EventStatus, EventTally, FixtureHeatModel, FixtureSolveConfig,
    FlowUnit, InactiveReason, Installation, InvalidEffectivenessError, Lookup,
    MalformedCoefficientsError, MapOutput, OperatingPoint, PerformanceConfig,
    PerformanceConfigError, PerformanceModel, ProfileAnalyzer, ProfileFormatError, ProfileSummary,
    ResultAggregator, Variable, WaterProperties, analyze, check_profile,
};

/// Errors returned by [`DwhrModel`].
#[derive(Debug, Error)]
pub enum DwhrModelError {
    #[error("invalid draw event")]
    InvalidEvent(#[from] DrawEventError),

    #[error(transparent)]
    Evaluate(#[from] EvaluateError),
}

/// Evaluates one draw event with a fixed performance map.
///
/// The event is validated on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct DwhrModel {
    performance: PerformanceModel,
    table: CoefficientTable,
}

impl DwhrModel {
    #[must_use]
    pub fn new(performance: PerformanceModel, table: CoefficientTable) -> Self {
        Self { performance, table }
    }

    #[must_use]
    pub fn performance(&self) -> &PerformanceModel {
        &self.performance
    }

    #[must_use]
    pub fn table(&self) -> &CoefficientTable {
        &self.table
    }

    /// Returns an analyzer sharing this model's performance map.
    #[must_use]
    pub fn analyzer(&self) -> ProfileAnalyzer<'_> {
        ProfileAnalyzer::new(&self.performance, &self.table)
    }
}

impl Model for DwhrModel {
    type Input = DrawEvent;
    type Output = EvaluatedEvent;
    type Error = DwhrModelError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        input.validate()?;
        Ok(self.performance.evaluate(input, &self.table)?)
    }
}
