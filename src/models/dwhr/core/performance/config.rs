use twine_solvers::equation::bisection;
use uom::si::{
    f64::{ThermodynamicTemperature, VolumeRate},
    thermodynamic_temperature::degree_fahrenheit,
    volume_rate::{cubic_meter_per_second, gallon_per_minute},
};

use super::WaterProperties;

/// Which of the device's outlets the preheated supply water is plumbed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Installation {
    /// Preheated water feeds both the water heater and the fixture's cold
    /// inlet, so the supply flow equals the drain flow.
    #[default]
    EqualFlow,

    /// Preheated water feeds only the water heater.
    UnequalWaterHeater,

    /// Preheated water feeds only the fixture's cold inlet.
    UnequalFixture,
}

/// How an unequal-fixture installation reads recovered heat off the map.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum FixtureHeatModel {
    /// Looks the map up at the fixture's drain flow and the cold flow.
    #[default]
    Map,

    /// Looks the map up at equal drain and supply flows of the cold flow,
    /// then scales the recovered heat by `coefficient * ln(F / F_cold) + 1`,
    /// where `F` is the fixture flow.
    ///
    /// Pair with a map measured at equal flows.
    LogFlowRatio { coefficient: f64 },
}

impl FixtureHeatModel {
    /// Manouchehri's unequal-flow correlation.
    pub const MANOUCHEHRI: Self = Self::LogFlowRatio {
        coefficient: 0.3452,
    };

    pub(super) fn is_finite(&self) -> bool {
        match self {
            Self::Map => true,
            Self::LogFlowRatio { coefficient } => coefficient.is_finite(),
        }
    }
}

/// Configuration for a [`PerformanceModel`](super::PerformanceModel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceConfig {
    pub installation: Installation,

    /// Only used by [`Installation::UnequalFixture`].
    pub fixture_heat: FixtureHeatModel,

    /// Rated effectiveness, scaled by correction-factor maps.
    pub rated_effectiveness: f64,

    /// Mixed water temperature delivered at the fixture.
    pub fixture_temperature: ThermodynamicTemperature,

    /// Water heater set point.
    pub water_heater_temperature: ThermodynamicTemperature,

    pub water: WaterProperties,

    /// Fraction of recovered heat that displaces water heater energy.
    pub utilization: f64,

    pub solver: FixtureSolveConfig,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            installation: Installation::default(),
            fixture_heat: FixtureHeatModel::default(),
            rated_effectiveness: 0.42,
            fixture_temperature: ThermodynamicTemperature::new::<degree_fahrenheit>(105.0),
            water_heater_temperature: ThermodynamicTemperature::new::<degree_fahrenheit>(115.0),
            water: WaterProperties::default(),
            utilization: 1.0,
            solver: FixtureSolveConfig::default(),
        }
    }
}

impl PerformanceConfig {
    #[must_use]
    pub fn with_installation(mut self, installation: Installation) -> Self {
        self.installation = installation;
        self
    }

    #[must_use]
    pub fn with_fixture_heat(mut self, fixture_heat: FixtureHeatModel) -> Self {
        self.fixture_heat = fixture_heat;
        self
    }

    #[must_use]
    pub fn with_rated_effectiveness(mut self, rated_effectiveness: f64) -> Self {
        self.rated_effectiveness = rated_effectiveness;
        self
    }

    #[must_use]
    pub fn with_fixture_temperature(mut self, temperature: ThermodynamicTemperature) -> Self {
        self.fixture_temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_water_heater_temperature(mut self, temperature: ThermodynamicTemperature) -> Self {
        self.water_heater_temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_water(mut self, water: WaterProperties) -> Self {
        self.water = water;
        self
    }

    #[must_use]
    pub fn with_utilization(mut self, utilization: f64) -> Self {
        self.utilization = utilization;
        self
    }

    #[must_use]
    pub fn with_solver(mut self, solver: FixtureSolveConfig) -> Self {
        self.solver = solver;
        self
    }
}

/// Solver configuration for the unequal-fixture supply flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixtureSolveConfig {
    /// Maximum iteration count for the bisection solve.
    pub max_iters: usize,

    /// Absolute tolerance on the cold supply flow.
    pub flow_tol: VolumeRate,
}

impl Default for FixtureSolveConfig {
    fn default() -> Self {
        Self {
            max_iters: 100,
            flow_tol: VolumeRate::new::<gallon_per_minute>(0.01),
        }
    }
}

impl FixtureSolveConfig {
    /// Converts this configuration into a bisection solver configuration.
    ///
    /// Convergence is judged on the flow bracket alone; the residual is the
    /// flow mismatch in the same units, so the same tolerance applies.
    pub(super) fn bisection(&self) -> bisection::Config {
        let tol = self.flow_tol.get::<cubic_meter_per_second>();
        bisection::Config {
            max_iters: self.max_iters,
            x_abs_tol: tol,
            x_rel_tol: 0.0,
            residual_tol: tol,
        }
    }
}
