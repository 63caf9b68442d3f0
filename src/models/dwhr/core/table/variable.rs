use std::fmt;

use uom::si::{
    f64::VolumeRate,
    ratio::ratio,
    volume_rate::{gallon_per_minute, liter_per_minute},
};

use crate::models::dwhr::core::OperatingPoint;

/// Unit in which a flow axis of a performance map is tabulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowUnit {
    GallonsPerMinute,
    LitersPerMinute,
}

impl FlowUnit {
    fn get(self, flow: VolumeRate) -> f64 {
        match self {
            Self::GallonsPerMinute => flow.get::<gallon_per_minute>(),
            Self::LitersPerMinute => flow.get::<liter_per_minute>(),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::GallonsPerMinute => "gpm",
            Self::LitersPerMinute => "lpm",
        }
    }
}

/// Independent variable of a performance map.
///
/// Flow variables carry the unit the map was tabulated (or fit) in, so the
/// map is always evaluated in its own units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variable {
    /// Supply-side flow divided by drain-side flow.
    FlowRatio,
    /// Drain-side (fixture) flow rate.
    DrainFlow(FlowUnit),
    /// Supply-side (potable) flow rate.
    SupplyFlow(FlowUnit),
}

impl Variable {
    /// Evaluates this variable at an operating point, in the variable's unit.
    #[must_use]
    pub fn value(self, point: &OperatingPoint) -> f64 {
        match self {
            Self::FlowRatio => point.flow_ratio().get::<ratio>(),
            Self::DrainFlow(unit) => unit.get(point.drain_flow),
            Self::SupplyFlow(unit) => unit.get(point.supply_flow),
        }
    }

    /// Parses a table header such as `flow_ratio` or `drain_flow_gpm`.
    pub(super) fn from_column(name: &str) -> Option<Self> {
        let unit = |suffix: &str| match suffix {
            "gpm" => Some(FlowUnit::GallonsPerMinute),
            "lpm" => Some(FlowUnit::LitersPerMinute),
            _ => None,
        };

        if name == "flow_ratio" {
            Some(Self::FlowRatio)
        } else if let Some(suffix) = name.strip_prefix("drain_flow_") {
            unit(suffix).map(Self::DrainFlow)
        } else if let Some(suffix) = name.strip_prefix("supply_flow_") {
            unit(suffix).map(Self::SupplyFlow)
        } else {
            None
        }
    }

    /// True if both variables measure the same quantity, regardless of unit.
    pub(super) fn same_quantity(self, other: Self) -> bool {
        std::mem::discriminant(&self) == std::mem::discriminant(&other)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlowRatio => f.write_str("flow_ratio"),
            Self::DrainFlow(unit) => write!(f, "drain_flow_{}", unit.suffix()),
            Self::SupplyFlow(unit) => write!(f, "supply_flow_{}", unit.suffix()),
        }
    }
}

/// What a performance map's dependent column represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapOutput {
    /// Effectiveness of the device, directly.
    Effectiveness,
    /// Multiplier on the device's rated effectiveness.
    CorrectionFactor,
}

impl MapOutput {
    pub(super) fn from_column(name: &str) -> Option<Self> {
        match name {
            "effectiveness" => Some(Self::Effectiveness),
            "correction_factor" => Some(Self::CorrectionFactor),
            _ => None,
        }
    }
}

impl fmt::Display for MapOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Effectiveness => f.write_str("effectiveness"),
            Self::CorrectionFactor => f.write_str("correction_factor"),
        }
    }
}
