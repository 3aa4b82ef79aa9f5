//! Reads a parameters directory into a loosely-typed `RawParameterSet`,
//! deferring interpretation (and its validation errors) to
//! `SimulationParameters::from_raw`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, SimError};

/// A parameter's value as shaped by the CSV that holds it: a single cell
/// is a scalar, a single row is a vector, and anything with more than
/// one row is a (square) matrix.
#[derive(Debug, Clone)]
pub enum CsvValue {
    Scalar(f64),
    Vector(Vec<f64>),
    Matrix(Vec<Vec<f64>>),
}

/// The parameter directory, read but not yet validated: one entry per
/// `<name>.csv` file found, keyed by `name`.
pub type RawParameterSet = HashMap<String, CsvValue>;

/// Reads every `*.csv` file directly inside `dir` into a `RawParameterSet`.
pub fn load_directory(dir: &Path) -> Result<RawParameterSet> {
    let mut raw = RawParameterSet::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let value = load_csv_value(&path, &name)?;
        raw.insert(name, value);
    }
    Ok(raw)
}

/// Parses a single CSV file (no header row) into a `CsvValue`.
fn load_csv_value(path: &Path, name: &str) -> Result<CsvValue> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| SimError::ParameterParseError {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SimError::ParameterParseError {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        let row = record
            .iter()
            .map(|cell| {
                cell.trim()
                    .parse::<f64>()
                    .map_err(|e| SimError::ParameterParseError {
                        name: name.to_string(),
                        reason: format!("could not parse '{cell}' as a float: {e}"),
                    })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    match rows.len() {
        0 => Err(SimError::ParameterParseError {
            name: name.to_string(),
            reason: "CSV file is empty".to_string(),
        }),
        1 if rows[0].len() == 1 => Ok(CsvValue::Scalar(rows[0][0])),
        1 => Ok(CsvValue::Vector(rows.into_iter().next().unwrap())),
        _ => Ok(CsvValue::Matrix(rows)),
    }
}

impl CsvValue {
    pub fn as_scalar(&self, name: &str) -> Result<f64> {
        match self {
            CsvValue::Scalar(v) => Ok(*v),
            other => Err(SimError::ParameterParseError {
                name: name.to_string(),
                reason: format!("expected a scalar, got {}", other.shape_name()),
            }),
        }
    }

    pub fn as_vector(&self, name: &str) -> Result<Vec<f64>> {
        match self {
            CsvValue::Vector(v) => Ok(v.clone()),
            other => Err(SimError::ParameterParseError {
                name: name.to_string(),
                reason: format!("expected a vector, got {}", other.shape_name()),
            }),
        }
    }

    pub fn as_matrix(&self, name: &str) -> Result<Vec<Vec<f64>>> {
        match self {
            CsvValue::Matrix(m) => Ok(m.clone()),
            other => Err(SimError::ParameterParseError {
                name: name.to_string(),
                reason: format!("expected a matrix, got {}", other.shape_name()),
            }),
        }
    }

    fn shape_name(&self) -> &'static str {
        match self {
            CsvValue::Scalar(_) => "a scalar",
            CsvValue::Vector(_) => "a vector",
            CsvValue::Matrix(_) => "a matrix",
        }
    }
}
