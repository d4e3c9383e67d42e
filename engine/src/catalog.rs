//! Catalog ingestion from CSV or JSONL files.
//!
//! Absent text cells become empty strings. Absent numeric cells become 0.0;
//! numeric cells that are present but unparseable are rejected.

use crate::error::{CatalogError, Result};
use crate::normalize::NumericColumn;
use crate::VehicleRecord;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

pub const MODEL_NAME: &str = "Model_Name";
pub const ENGINE_TYPE: &str = "Engine_Type";
pub const FEATURES: &str = "Features";
pub const BODY_TYPE: &str = "Body_Type";

/// Catalog rows in file order; a record's position is its `VehicleIndex`.
pub type Catalog = Vec<VehicleRecord>;

pub const COLUMNS: [&str; 8] = [MODEL_NAME, "Price", "Mileage", "Seating", "Engine_CC", ENGINE_TYPE, FEATURES, BODY_TYPE];

pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let path = path.as_ref();
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_ascii_lowercase();
    let f = File::open(path)?;
    let records = match ext.as_str() {
        "csv" => read_csv(f)?,
        "jsonl" => read_jsonl(BufReader::new(f))?,
        other => return Err(CatalogError::UnsupportedFormat(other.to_string())),
    };
    tracing::info!(path = %path.display(), records = records.len(), "loaded catalog");
    Ok(records)
}

pub fn read_csv<R: Read>(reader: R) -> Result<Catalog> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut positions = [0usize; 8];
    for (slot, name) in positions.iter_mut().zip(COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| CatalogError::MissingColumn(name.to_string()))?;
    }

    let mut records = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row?;
        let cell = |col: usize| row.get(positions[col]).unwrap_or("");
        let number = |col: usize| parse_number(cell(col), i + 1, COLUMNS[col]);
        records.push(VehicleRecord {
            model_name: cell(0).to_string(),
            price: number(1)?,
            mileage: number(2)?,
            seating: number(3)?,
            engine_cc: number(4)?,
            engine_type: cell(5).to_string(),
            features: cell(6).to_string(),
            body_type: cell(7).to_string(),
        });
    }
    Ok(records)
}

pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Catalog> {
    let mut records = Vec::new();
    let mut row = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        row += 1;
        let obj: Value = serde_json::from_str(&line).map_err(|source| CatalogError::Json { line: i + 1, source })?;
        let number = |column: NumericColumn| json_number(&obj, column.header(), row);
        records.push(VehicleRecord {
            model_name: json_text(&obj, MODEL_NAME),
            price: number(NumericColumn::Price)?,
            mileage: number(NumericColumn::Mileage)?,
            seating: number(NumericColumn::Seating)?,
            engine_cc: number(NumericColumn::EngineCc)?,
            engine_type: json_text(&obj, ENGINE_TYPE),
            features: json_text(&obj, FEATURES),
            body_type: json_text(&obj, BODY_TYPE),
        });
    }
    Ok(records)
}

fn parse_number(raw: &str, row: usize, column: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CatalogError::InvalidNumber { row, column: column.to_string(), value: raw.to_string() })
}

fn json_text(obj: &Value, key: &str) -> String {
    match obj.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn json_number(obj: &Value, key: &str, row: usize) -> Result<f64> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| CatalogError::InvalidNumber { row, column: key.to_string(), value: n.to_string() }),
        Some(Value::String(s)) => parse_number(s, row, key),
        Some(other) => Err(CatalogError::InvalidNumber { row, column: key.to_string(), value: other.to_string() }),
    }
}
