use thiserror::Error;
use twine_solvers::equation::bisection;
use uom::si::f64::VolumeRate;

use crate::{models::dwhr::core::OperatingPoint, support::constraint::ConstraintError};

/// A performance map produced an effectiveness outside [0, 1).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("effectiveness {value} is outside [0, 1) at {operating_point:?}")]
pub struct InvalidEffectivenessError {
    /// The effectiveness after applying any rated-effectiveness scaling.
    pub value: f64,

    pub operating_point: OperatingPoint,

    #[source]
    pub source: ConstraintError,
}

/// Errors that can occur while evaluating a draw event.
#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error(transparent)]
    InvalidEffectiveness(#[from] InvalidEffectivenessError),

    /// The unequal-fixture supply flow solve hit its iteration limit.
    #[error("fixture supply flow did not converge: residual={residual:?}")]
    FixtureFlowNotConverged {
        /// Best flow mismatch achieved.
        residual: VolumeRate,

        /// Iteration count performed by the solver.
        iters: usize,
    },

    /// The bisection solver encountered an error.
    #[error("bisection solver error")]
    Bisection(#[source] bisection::Error),
}

/// Errors that can occur when constructing a
/// [`PerformanceModel`](super::PerformanceModel).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PerformanceConfigError {
    #[error("rated effectiveness must be in [0, 1)")]
    RatedEffectiveness(#[source] ConstraintError),

    #[error("utilization must be in [0, 1]")]
    Utilization(#[source] ConstraintError),

    #[error("water specific heat must be positive")]
    SpecificHeat(#[source] ConstraintError),

    #[error("water density must be positive")]
    Density(#[source] ConstraintError),

    #[error("{0} must be finite")]
    NonFinite(&'static str),

    /// The water heater cannot supply water at the fixture temperature.
    #[error("water heater temperature must exceed the fixture temperature")]
    WaterHeaterBelowFixture,

    #[error("fixture solver flow tolerance must be positive")]
    FlowTolerance(#[source] ConstraintError),
}
