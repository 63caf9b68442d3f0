use std::io::Read;

use serde::Deserialize;
use tracing::debug;
use uom::{
    ConstZero,
    si::{
        f64::{ThermodynamicTemperature, Time, VolumeRate},
        thermodynamic_temperature::degree_fahrenheit,
        time::minute,
        volume_rate::gallon_per_minute,
    },
};

use crate::models::dwhr::core::{DrawEvent, ProfileFormatError};

use super::columns;

/// Values used for columns a draw profile may omit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileDefaults {
    /// Drain-side inlet temperature for rows without one.
    pub drain_temperature: ThermodynamicTemperature,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            drain_temperature: ThermodynamicTemperature::new::<degree_fahrenheit>(100.4),
        }
    }
}

impl ProfileDefaults {
    #[must_use]
    pub fn with_drain_temperature(mut self, temperature: ThermodynamicTemperature) -> Self {
        self.drain_temperature = temperature;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    #[serde(rename = "Start Time (min)", default)]
    start_time: Option<f64>,

    #[serde(rename = "Duration (min)")]
    duration: f64,

    #[serde(rename = "Flow Rate (gpm)")]
    flow_rate: f64,

    #[serde(rename = "Hot Water Flow Rate (gpm)")]
    hot_flow_rate: f64,

    #[serde(rename = "Mains Temperature (deg F)")]
    mains_temperature: f64,

    #[serde(rename = "Drain Temperature (deg F)", default)]
    drain_temperature: Option<f64>,
}

const REQUIRED: [&str; 4] = [
    columns::DURATION,
    columns::FLOW_RATE,
    columns::HOT_FLOW_RATE,
    columns::MAINS_TEMPERATURE,
];

/// Reads a draw profile in gallons per minute, minutes, and °F.
///
/// Required columns are `Duration (min)`, `Flow Rate (gpm)`,
/// `Hot Water Flow Rate (gpm)`, and `Mains Temperature (deg F)`. Rows
/// without a `Start Time (min)` begin when the previous draw ends, and rows
/// without a `Drain Temperature (deg F)` use the default. Other columns are
/// ignored.
///
/// Events are returned as read; use
/// [`check_profile`](crate::models::dwhr::check_profile) or the analyzer to
/// validate them.
///
/// # Errors
///
/// Returns [`ProfileFormatError`] if the source is not valid CSV, a required
/// column is missing, or a row cannot be parsed.
pub fn read_profile<R: Read>(
    source: R,
    defaults: &ProfileDefaults,
) -> Result<Vec<DrawEvent>, ProfileFormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?;
    if let Some(missing) = REQUIRED
        .into_iter()
        .find(|required| !headers.iter().any(|header| header == *required))
    {
        return Err(ProfileFormatError::MissingColumn(missing));
    }

    let mut clock = Time::ZERO;
    let mut events = Vec::new();
    for (i, row) in reader.deserialize::<ProfileRow>().enumerate() {
        let row = row.map_err(|source| ProfileFormatError::Row { row: i + 1, source })?;

        let start_time = row.start_time.map_or(clock, Time::new::<minute>);
        let duration = Time::new::<minute>(row.duration);
        clock = start_time + duration;

        events.push(DrawEvent {
            start_time,
            duration,
            drain_flow: VolumeRate::new::<gallon_per_minute>(row.flow_rate),
            hot_flow: VolumeRate::new::<gallon_per_minute>(row.hot_flow_rate),
            inlet_temperature: ThermodynamicTemperature::new::<degree_fahrenheit>(
                row.mains_temperature,
            ),
            drain_temperature: row.drain_temperature.map_or(
                defaults.drain_temperature,
                ThermodynamicTemperature::new::<degree_fahrenheit>,
            ),
        });
    }

    debug!(events = events.len(), "read draw profile");
    Ok(events)
}
