//! Tabular input and output for draw profiles.
//!
//! Profiles and reports use the units of the field data: gallons per minute,
//! minutes, degrees Fahrenheit, and Btu. Everything inside the model is a
//! [`uom`] quantity, so units only appear here.

mod profile;
mod report;

use std::path::{Path, PathBuf};

pub use profile::{ProfileDefaults, read_profile};
pub use report::{ReportError, write_report};

/// Profile column names.
mod columns {
    pub(super) const DURATION: &str = "Duration (min)";
    pub(super) const FLOW_RATE: &str = "Flow Rate (gpm)";
    pub(super) const HOT_FLOW_RATE: &str = "Hot Water Flow Rate (gpm)";
    pub(super) const MAINS_TEMPERATURE: &str = "Mains Temperature (deg F)";
}

/// Returns the report path for a profile: `<stem>_Analyzed.csv` in the same
/// directory.
///
/// ```
/// use std::path::Path;
/// use dwhr_models::models::dwhr::io::analyzed_path;
///
/// assert_eq!(
///     analyzed_path("profiles/house_12.csv"),
///     Path::new("profiles/house_12_Analyzed.csv"),
/// );
/// ```
pub fn analyzed_path(profile: impl AsRef<Path>) -> PathBuf {
    let profile = profile.as_ref();
    let stem = profile
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    profile.with_file_name(format!("{stem}_Analyzed.csv"))
}
