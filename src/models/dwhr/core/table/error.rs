use thiserror::Error;

use super::Variable;

/// Errors that can occur while loading or constructing a [`CoefficientTable`].
///
/// Data rows are numbered from 1, not counting the header.
///
/// [`CoefficientTable`]: super::CoefficientTable
#[derive(Debug, Error)]
pub enum MalformedCoefficientsError {
    /// The source could not be read as CSV.
    #[error("failed to read coefficient table")]
    Csv(#[from] csv::Error),

    /// A header names neither a known variable nor an output column.
    #[error("unrecognized column `{0}`")]
    UnknownColumn(String),

    /// A header repeats a variable or a second output column was found.
    #[error("column `{0}` duplicates another column")]
    DuplicateColumn(String),

    /// Neither `effectiveness` nor `correction_factor` is present.
    #[error("missing output column (expected `effectiveness` or `correction_factor`)")]
    MissingOutput,

    /// No independent variable column is present.
    #[error("no independent variable columns")]
    MissingVariable,

    /// More independent variables than any interpolation strategy supports.
    #[error("{0} independent variables declared, at most 2 are supported")]
    TooManyVariables(usize),

    /// An entry could not be parsed as a finite number.
    #[error("row {row}: `{value}` in column `{column}` is not a finite number")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },

    /// A variable does not span an interval.
    #[error("`{variable}` needs at least two distinct breakpoints, found {found}")]
    TooFewBreakpoints { variable: Variable, found: usize },

    /// A one-dimensional map lists the same breakpoint twice.
    #[error("`{variable}` repeats breakpoint {value}")]
    DuplicateBreakpoint { variable: Variable, value: f64 },

    /// A two-dimensional map lists the same grid point twice.
    #[error("grid point ({x}, {y}) appears more than once")]
    DuplicatePoint { x: f64, y: f64 },

    /// A two-dimensional map is not a complete rectangular grid.
    #[error("grid is missing the point ({x}, {y})")]
    IncompleteGrid { x: f64, y: f64 },

    /// A polynomial domain is empty, inverted, or not finite.
    #[error("invalid domain for `{variable}`: [{min}, {max}]")]
    InvalidDomain {
        variable: Variable,
        min: f64,
        max: f64,
    },

    /// A polynomial was given no coefficients.
    #[error("polynomial has no coefficients")]
    NoCoefficients,

    /// A two-variable polynomial needs `(order + 1)²` coefficients.
    #[error("{0} coefficients do not form a square two-variable polynomial")]
    NonSquareCoefficients(usize),

    /// A polynomial coefficient is NaN or infinite.
    #[error("polynomial coefficient {index} is not finite")]
    NonFiniteCoefficient { index: usize },
}
