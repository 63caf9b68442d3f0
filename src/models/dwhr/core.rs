//! Drain water heat recovery performance and savings.
//!
//! A performance map ([`CoefficientTable`]) gives the device effectiveness
//! at an operating point. A [`PerformanceModel`] turns that effectiveness
//! into preheated supply temperature, recovered heat, and saved energy for
//! each [`DrawEvent`], and a [`ProfileAnalyzer`] runs it over whole draw
//! profiles, rolling results up with the [`ResultAggregator`].

mod analyze;
mod effectiveness;
mod event;
mod operating_point;
mod performance;
mod summary;
mod table;

pub use analyze::{
    Analysis, AnalyzeError, ProfileAnalyzer, ProfileFormatError, analyze, check_profile,
};
pub use effectiveness::Effectiveness;
pub use event::{DrawEvent, DrawEventError, EvaluatedEvent, EventStatus, InactiveReason};
pub use operating_point::OperatingPoint;
pub use performance::{
    EvaluateError, FixtureHeatModel, FixtureSolveConfig, Installation, InvalidEffectivenessError,
    PerformanceConfig, PerformanceConfigError, PerformanceModel, WaterProperties,
};
pub use summary::{EventTally, ProfileSummary, ResultAggregator};
pub use table::{
    Bounds, CoefficientTable, FlowUnit, Lookup, MalformedCoefficientsError, MapOutput, Variable,
};
