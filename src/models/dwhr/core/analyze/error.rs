use thiserror::Error;

use crate::models::dwhr::core::{DrawEventError, EvaluateError};

/// A draw profile cannot be analyzed as given.
///
/// Event indices and row numbers count from zero and one, respectively;
/// row numbers exclude the header.
#[derive(Debug, Error)]
pub enum ProfileFormatError {
    #[error("profile contains no draw events")]
    Empty,

    #[error("draw event {index} is invalid")]
    InvalidEvent {
        index: usize,
        #[source]
        source: DrawEventError,
    },

    /// The profile source could not be read as CSV.
    #[error("failed to read profile")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header.
    #[error("profile is missing the `{0}` column")]
    MissingColumn(&'static str),

    /// A row could not be parsed into a draw event.
    #[error("profile row {row} is malformed")]
    Row {
        row: usize,
        #[source]
        source: csv::Error,
    },
}

/// Errors that can occur while analyzing a draw profile.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Format(#[from] ProfileFormatError),

    #[error("failed to evaluate draw event {index}")]
    Evaluate {
        index: usize,
        #[source]
        source: EvaluateError,
    },

    /// The thread analyzing this profile panicked.
    #[error("profile worker panicked")]
    WorkerPanicked,
}
