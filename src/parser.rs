//! Decoders for upstream feed payloads.
//!
//! JSON payloads are either a bare array of records or an OData envelope
//! (`{"value": [...]}` for v4, `{"d": {"results": [...]}}` for v2). CSV
//! payloads need a header row; every cell becomes a string field.

use serde_json::Value;

use crate::analyzers::analyzer::records_from_values;
use crate::analyzers::types::RawRecord;
use crate::error::AnalysisError;

/// Decodes a JSON payload into records.
///
/// # Errors
///
/// Returns [`AnalysisError::MalformedPayload`] if the bytes are not JSON or
/// the root holds no record list, and [`AnalysisError::MalformedRecord`] if
/// an entry of the list is not an object.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<RawRecord>, AnalysisError> {
    let root: Value = serde_json::from_slice(bytes)
        .map_err(|e| AnalysisError::MalformedPayload(format!("invalid JSON: {e}")))?;
    let values = unwrap_envelope(root)?;
    records_from_values(&values)
}

/// Decodes a CSV payload with a header row into records.
///
/// # Errors
///
/// Returns [`AnalysisError::MalformedPayload`] on unreadable CSV, such as a
/// row whose field count differs from the header.
pub fn parse_records_csv(bytes: &[u8]) -> Result<Vec<RawRecord>, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| AnalysisError::MalformedPayload(format!("CSV header: {e}")))?
        .clone();

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.map_err(|e| {
            AnalysisError::MalformedPayload(format!("CSV parse error at line {}: {}", line + 2, e))
        })?;

        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(key, cell)| (key.to_string(), Value::String(cell.to_string())))
            .collect();
        records.push(record);
    }

    Ok(records)
}

fn unwrap_envelope(root: Value) -> Result<Vec<Value>, AnalysisError> {
    match root {
        Value::Array(values) => Ok(values),
        Value::Object(mut map) => {
            if let Some(Value::Array(values)) = map.remove("value") {
                return Ok(values);
            }
            if let Some(Value::Object(mut d)) = map.remove("d") {
                if let Some(Value::Array(values)) = d.remove("results") {
                    return Ok(values);
                }
            }
            Err(AnalysisError::MalformedPayload(
                "object payload has no `value` or `d.results` record list".to_string(),
            ))
        }
        other => Err(AnalysisError::MalformedPayload(format!(
            "expected a record list, found {}",
            match other {
                Value::Null => "null",
                Value::Bool(_) => "a boolean",
                Value::Number(_) => "a number",
                _ => "a string",
            }
        ))),
    }
}
