//! Scenario source parsing
//!
//! The source is a UTF-8 CSV file with a header row, as exported by the
//! highD cut-in extractor. Only four columns are read; any others are ignored.

use crate::models::ScenarioRecord;
use std::io::Read;
use thiserror::Error;

/// Column holding the signed initial gap (target minus aggressor, m)
pub const COL_INITIAL_GAP: &str = "x_diff_abs";
/// Column holding the aggressor's recorded longitudinal velocity
pub const COL_AGGRESSOR_SPEED: &str = "xVelocity_cut_in";
/// Column holding the target's recorded longitudinal velocity
pub const COL_TARGET_SPEED: &str = "xVelocity_target";
/// Column holding the aggressor-minus-target lane difference
pub const COL_LANE_OFFSET: &str = "adjusted_laneId_diff";

/// Required columns, in record field order
pub const REQUIRED_COLUMNS: [&str; 4] = [
    COL_INITIAL_GAP,
    COL_AGGRESSOR_SPEED,
    COL_TARGET_SPEED,
    COL_LANE_OFFSET,
];

/// Errors raised while loading a scenario catalog
///
/// All of these are fatal at startup. Once a catalog is loaded it never
/// fails again.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Missing required column in scenario source: {column}")]
    MissingColumn { column: &'static str },

    #[error("Invalid value {value:?} in column {column} at line {line}")]
    InvalidValue {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("Scenario source contains no records")]
    Empty,

    #[error("Failed to read scenario source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed scenario source: {0}")]
    Csv(#[from] csv::Error),
}

impl CatalogError {
    /// True when the source was readable but its content is unusable
    ///
    /// False means the source itself could not be read (I/O failure).
    pub fn is_schema_error(&self) -> bool {
        match self {
            CatalogError::MissingColumn { .. }
            | CatalogError::InvalidValue { .. }
            | CatalogError::Empty => true,
            CatalogError::Io(_) => false,
            CatalogError::Csv(e) => !matches!(e.kind(), csv::ErrorKind::Io(_)),
        }
    }
}

/// Parse every data row of a scenario source, in file order
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<ScenarioRecord>, CatalogError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut indices = [0usize; 4];
    for (slot, column) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == column)
            .ok_or(CatalogError::MissingColumn { column })?;
    }

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let mut values = [0.0f64; 4];
        for ((value, &index), column) in values.iter_mut().zip(&indices).zip(REQUIRED_COLUMNS) {
            *value = parse_numeric(row.get(index), column, line)?;
        }
        let [initial_gap, aggressor_speed, target_speed, lane_offset] = values;
        let lane_offset = lane_offset_from(lane_offset).ok_or_else(|| CatalogError::InvalidValue {
            line,
            column: COL_LANE_OFFSET,
            value: row.get(indices[3]).unwrap_or_default().to_string(),
        })?;

        records.push(ScenarioRecord::new(
            initial_gap,
            aggressor_speed,
            target_speed,
            lane_offset,
        ));
    }

    Ok(records)
}

/// Lane offsets may be exported as floats ("1.0"); truncate toward zero.
/// Offsets whose aggressor lane would not fit an `i32` are rejected.
fn lane_offset_from(value: f64) -> Option<i32> {
    let offset = value.trunc();
    let min = f64::from(i32::MIN);
    let max = f64::from(i32::MAX - ScenarioRecord::TARGET_LANE);
    (min..=max).contains(&offset).then_some(offset as i32)
}

fn parse_numeric(raw: Option<&str>, column: &'static str, line: u64) -> Result<f64, CatalogError> {
    let raw = raw.unwrap_or_default();
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CatalogError::InvalidValue {
            line,
            column,
            value: raw.to_string(),
        }),
    }
}
