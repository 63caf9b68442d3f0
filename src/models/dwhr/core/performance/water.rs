use uom::si::{
    f64::{MassDensity, SpecificHeatCapacity},
    mass_density::kilogram_per_cubic_meter,
    specific_heat_capacity::kilojoule_per_kilogram_kelvin,
};

/// Constant properties of the water flowing through both sides of the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterProperties {
    pub cp: SpecificHeatCapacity,
    pub density: MassDensity,
}

impl WaterProperties {
    #[must_use]
    pub fn new(cp: SpecificHeatCapacity, density: MassDensity) -> Self {
        Self { cp, density }
    }
}

/// Liquid water near room temperature.
impl Default for WaterProperties {
    fn default() -> Self {
        Self::new(
            SpecificHeatCapacity::new::<kilojoule_per_kilogram_kelvin>(4.184),
            MassDensity::new::<kilogram_per_cubic_meter>(997.047),
        )
    }
}
