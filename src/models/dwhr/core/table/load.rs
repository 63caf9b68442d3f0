//! CSV parsing for tabulated performance maps.
//!
//! The header names one or two independent variables and exactly one output
//! column; header names are matched case-insensitively. Each following row
//! is one tabulated point.
//!
//! ```text
//! flow_ratio,effectiveness
//! 0.5,0.40
//! 1.0,0.55
//! ```

use std::io::Read;

use tracing::debug;

use super::{
    CoefficientTable, Map, MalformedCoefficientsError, MapOutput, Variable, curve::Curve,
    grid::Grid,
};

/// A recognized column and its index in the header.
#[derive(Debug, Clone, Copy)]
struct Column<T> {
    kind: T,
    index: usize,
}

#[derive(Debug)]
enum Axes {
    One(Column<Variable>),
    Two(Column<Variable>, Column<Variable>),
}

#[derive(Debug)]
struct Layout {
    axes: Axes,
    output: Column<MapOutput>,
    names: Vec<String>,
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, MalformedCoefficientsError> {
        let names: Vec<String> = headers.iter().map(str::to_ascii_lowercase).collect();
        let mut variables: Vec<Column<Variable>> = Vec::new();
        let mut output: Option<Column<MapOutput>> = None;

        for (index, name) in names.iter().enumerate() {
            if let Some(kind) = MapOutput::from_column(name) {
                if output.is_some() {
                    return Err(MalformedCoefficientsError::DuplicateColumn(name.clone()));
                }
                output = Some(Column { kind, index });
            } else if let Some(kind) = Variable::from_column(name) {
                if variables.iter().any(|c| c.kind.same_quantity(kind)) {
                    return Err(MalformedCoefficientsError::DuplicateColumn(name.clone()));
                }
                variables.push(Column { kind, index });
            } else {
                return Err(MalformedCoefficientsError::UnknownColumn(name.clone()));
            }
        }

        let output = output.ok_or(MalformedCoefficientsError::MissingOutput)?;
        let axes = match variables.as_slice() {
            [] => return Err(MalformedCoefficientsError::MissingVariable),
            [x] => Axes::One(*x),
            [x, y] => Axes::Two(*x, *y),
            more => return Err(MalformedCoefficientsError::TooManyVariables(more.len())),
        };

        Ok(Self {
            axes,
            output,
            names,
        })
    }

    fn field(
        &self,
        record: &csv::StringRecord,
        index: usize,
        row: usize,
    ) -> Result<f64, MalformedCoefficientsError> {
        let raw = record.get(index).unwrap_or_default();
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| MalformedCoefficientsError::NonNumeric {
                row,
                column: self.names[index].clone(),
                value: raw.to_owned(),
            })
    }
}

pub(super) fn load<R: Read>(source: R) -> Result<CoefficientTable, MalformedCoefficientsError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    let layout = Layout::from_headers(reader.headers()?)?;

    let records = reader.records().collect::<Result<Vec<_>, _>>()?;
    let output = layout.output;

    let map = match layout.axes {
        Axes::One(x) => {
            let points = records
                .iter()
                .enumerate()
                .map(|(i, record)| {
                    Ok((
                        layout.field(record, x.index, i + 1)?,
                        layout.field(record, output.index, i + 1)?,
                    ))
                })
                .collect::<Result<Vec<_>, MalformedCoefficientsError>>()?;
            Map::Curve(Curve::from_points(x.kind, points)?)
        }
        Axes::Two(x, y) => {
            let points = records
                .iter()
                .enumerate()
                .map(|(i, record)| {
                    Ok((
                        layout.field(record, x.index, i + 1)?,
                        layout.field(record, y.index, i + 1)?,
                        layout.field(record, output.index, i + 1)?,
                    ))
                })
                .collect::<Result<Vec<_>, MalformedCoefficientsError>>()?;
            Map::Grid(Grid::from_points([x.kind, y.kind], &points)?)
        }
    };

    debug!(
        rows = records.len(),
        output = %output.kind,
        "loaded coefficient table"
    );

    Ok(CoefficientTable {
        map,
        output: output.kind,
    })
}
