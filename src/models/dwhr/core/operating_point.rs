use uom::{
    ConstZero,
    si::{
        f64::{Ratio, VolumeRate},
        ratio::ratio,
        volume_rate::cubic_meter_per_second,
    },
};

/// Flow conditions through both sides of a DWHR device during a draw.
///
/// The drain side carries the fixture's mixed water on its way to the sewer.
/// The supply side carries potable water being preheated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingPoint {
    pub drain_flow: VolumeRate,
    pub supply_flow: VolumeRate,
}

impl OperatingPoint {
    #[must_use]
    pub fn new(drain_flow: VolumeRate, supply_flow: VolumeRate) -> Self {
        Self {
            drain_flow,
            supply_flow,
        }
    }

    /// Returns the supply-to-drain flow ratio.
    ///
    /// The ratio is zero when there is no drain flow.
    #[must_use]
    pub fn flow_ratio(&self) -> Ratio {
        if self.drain_flow <= VolumeRate::ZERO {
            return Ratio::ZERO;
        }
        Ratio::new::<ratio>(
            self.supply_flow.get::<cubic_meter_per_second>()
                / self.drain_flow.get::<cubic_meter_per_second>(),
        )
    }
}
