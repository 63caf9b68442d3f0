use std::io::Write;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uom::si::{
    energy::btu_it, ratio::ratio, thermodynamic_temperature::degree_fahrenheit, time::minute,
    volume::gallon, volume_rate::gallon_per_minute,
};

use crate::models::dwhr::core::{
    Analysis, EvaluatedEvent, EventStatus, InactiveReason, ProfileSummary,
};

/// Errors that can occur while writing an analysis report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report row")]
    Csv(#[from] csv::Error),

    #[error("failed to flush report")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct ReportRow {
    #[serde(rename = "Start Time (min)")]
    start_time: f64,

    #[serde(rename = "Duration (min)")]
    duration: f64,

    #[serde(rename = "Flow Rate (gpm)")]
    flow_rate: f64,

    #[serde(rename = "Hot Water Flow Rate (gpm)")]
    hot_flow_rate: f64,

    #[serde(rename = "Mains Temperature (deg F)")]
    mains_temperature: f64,

    #[serde(rename = "Drain Temperature (deg F)")]
    drain_temperature: f64,

    #[serde(rename = "Supply Flow Rate (gpm)")]
    supply_flow_rate: f64,

    #[serde(rename = "Effectiveness (-)")]
    effectiveness: Option<f64>,

    #[serde(rename = "Preheated Supply Temperature (deg F)")]
    preheated_temperature: f64,

    #[serde(rename = "Heat Recovered (Btu)")]
    heat_recovered: f64,

    #[serde(rename = "Energy Saved (Btu)")]
    energy_saved: f64,

    #[serde(rename = "Baseline Energy (Btu)")]
    baseline_energy: f64,

    #[serde(rename = "Status")]
    status: &'static str,
}

impl From<&EvaluatedEvent> for ReportRow {
    fn from(evaluated: &EvaluatedEvent) -> Self {
        let event = &evaluated.event;
        Self {
            start_time: event.start_time.get::<minute>(),
            duration: event.duration.get::<minute>(),
            flow_rate: event.drain_flow.get::<gallon_per_minute>(),
            hot_flow_rate: event.hot_flow.get::<gallon_per_minute>(),
            mains_temperature: event.inlet_temperature.get::<degree_fahrenheit>(),
            drain_temperature: event.drain_temperature.get::<degree_fahrenheit>(),
            supply_flow_rate: evaluated.supply_flow.get::<gallon_per_minute>(),
            effectiveness: evaluated.effectiveness.map(|e| e.get::<ratio>()),
            preheated_temperature: evaluated
                .preheated_supply_temperature
                .get::<degree_fahrenheit>(),
            heat_recovered: evaluated.heat_recovered.get::<btu_it>(),
            energy_saved: evaluated.energy_saved.get::<btu_it>(),
            baseline_energy: evaluated.baseline_energy.get::<btu_it>(),
            status: status_label(evaluated.status),
        }
    }
}

fn status_label(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Active {
            extrapolated: false,
        } => "Active",
        EventStatus::Active { extrapolated: true } => "Active (Extrapolated)",
        EventStatus::Inactive(InactiveReason::NoDrainFlow) => "Inactive (No Drain Flow)",
        EventStatus::Inactive(InactiveReason::NoSupplyFlow) => "Inactive (No Supply Flow)",
        EventStatus::Inactive(InactiveReason::NoTemperatureLift) => {
            "Inactive (No Temperature Lift)"
        }
    }
}

const BTU_PER_THERM: f64 = 100_000.0;

fn summary_rows(summary: &ProfileSummary) -> Vec<(&'static str, String)> {
    let optional = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
    let energy_saved = summary.energy_saved.get::<btu_it>();

    vec![
        ("Events", summary.event_count.to_string()),
        (
            "Total Duration (min)",
            summary.total_duration.get::<minute>().to_string(),
        ),
        (
            "Total Volume (gal)",
            summary.total_volume.get::<gallon>().to_string(),
        ),
        (
            "Heat Recovered (Btu)",
            summary.heat_recovered.get::<btu_it>().to_string(),
        ),
        ("Energy Saved (Btu)", energy_saved.to_string()),
        (
            "Energy Saved (therm)",
            (energy_saved / BTU_PER_THERM).to_string(),
        ),
        (
            "Max Recoverable (Btu)",
            summary.max_recoverable.get::<btu_it>().to_string(),
        ),
        (
            "Baseline Energy (Btu)",
            summary.baseline_energy.get::<btu_it>().to_string(),
        ),
        (
            "Savings Fraction (-)",
            summary.savings_fraction.get::<ratio>().to_string(),
        ),
        ("Inactive Events", summary.inactive.count.to_string()),
        (
            "Inactive Duration (min)",
            summary.inactive.duration.get::<minute>().to_string(),
        ),
        ("Extrapolated Events", summary.extrapolated.count.to_string()),
        (
            "Extrapolated Duration (min)",
            summary.extrapolated.duration.get::<minute>().to_string(),
        ),
        (
            "Mean Effectiveness (-)",
            optional(summary.mean_effectiveness.map(|e| e.get::<ratio>())),
        ),
        (
            "Mean Preheated Supply Temperature (deg F)",
            optional(
                summary
                    .mean_preheated_temperature
                    .map(|t| t.get::<degree_fahrenheit>()),
            ),
        ),
    ]
}

/// Writes an analysis as CSV.
///
/// One row is written per event, in order, in gallons per minute, minutes,
/// °F, and Btu. A `Summary` line follows, then one `name,value` row per
/// summary statistic.
///
/// # Errors
///
/// Returns [`ReportError`] if writing to the sink fails.
pub fn write_report<W: Write>(sink: W, analysis: &Analysis) -> Result<(), ReportError> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(sink);

    for evaluated in &analysis.events {
        writer.serialize(ReportRow::from(evaluated))?;
    }

    writer.write_record(["Summary"])?;
    for (name, value) in summary_rows(&analysis.summary) {
        writer.write_record([name, value.as_str()])?;
    }
    writer.flush()?;

    debug!(rows = analysis.events.len(), "wrote analysis report");
    Ok(())
}
