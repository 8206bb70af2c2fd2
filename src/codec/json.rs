use std::path::Path;

use serde_json::{json, Map, Value};

use crate::coordinates::Coordinate;
use crate::error::AppError;
use crate::metadata::{AuxMetadata, Marker};

/// Version written into the file envelope. Files without an envelope
/// (a bare array of records) are read as the legacy format.
pub const FORMAT_VERSION: u64 = 1;

/// How to treat individual records that cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Skip bad records and keep going.
    #[default]
    Lenient,
    /// Fail the whole load on the first bad record.
    Strict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedMarkers {
    pub markers: Vec<Marker>,
    pub skipped: Vec<SkippedRecord>,
}

/// `[[lat, lon], label, timestamp|null, altitude|null, metadata|null]`
fn encode_record(marker: &Marker) -> Value {
    json!([
        [marker.location.latitude, marker.location.longitude],
        marker.label,
        marker.timestamp,
        marker.altitude,
        marker.metadata
    ])
}

pub fn to_json_string(markers: &[Marker]) -> Result<String, AppError> {
    let records: Vec<Value> = markers.iter().map(encode_record).collect();
    let document = json!({
        "version": FORMAT_VERSION,
        "markers": records
    });
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Write the markers to `path`. The file is only touched once encoding succeeded.
pub fn save_json(path: &Path, markers: &[Marker]) -> Result<(), AppError> {
    let text = to_json_string(markers)?;
    std::fs::write(path, text)?;
    log::info!("Saved {} markers to {}", markers.len(), path.display());
    Ok(())
}

pub fn load_json(path: &Path, policy: LoadPolicy) -> Result<LoadedMarkers, AppError> {
    let text = std::fs::read_to_string(path)?;
    let loaded = from_json_str(&text, policy)?;
    log::info!(
        "Loaded {} markers from {} ({} skipped)",
        loaded.markers.len(),
        path.display(),
        loaded.skipped.len()
    );
    Ok(loaded)
}

pub fn from_json_str(text: &str, policy: LoadPolicy) -> Result<LoadedMarkers, AppError> {
    let document: Value =
        serde_json::from_str(text).map_err(|e| AppError::Decode(format!("invalid JSON: {}", e)))?;
    let records = records_of(&document)?;

    let mut loaded = LoadedMarkers::default();
    for (index, record) in records.iter().enumerate() {
        let fields = record
            .as_array()
            .ok_or_else(|| AppError::Decode(format!("record {} is not a sequence", index)))?;

        match decode_record(fields) {
            Ok(marker) => loaded.markers.push(marker),
            Err(reason) => match policy {
                LoadPolicy::Strict => {
                    return Err(AppError::Decode(format!("record {}: {}", index, reason)));
                }
                LoadPolicy::Lenient => {
                    log::warn!("Skipping record {}: {}", index, reason);
                    loaded.skipped.push(SkippedRecord { index, reason });
                }
            },
        }
    }
    Ok(loaded)
}

fn records_of(document: &Value) -> Result<&Vec<Value>, AppError> {
    match document {
        Value::Array(records) => Ok(records),
        Value::Object(envelope) => {
            let version = envelope
                .get("version")
                .and_then(Value::as_u64)
                .ok_or_else(|| AppError::Decode("missing format version".to_string()))?;
            if version > FORMAT_VERSION {
                return Err(AppError::Decode(format!("unsupported format version {}", version)));
            }
            envelope
                .get("markers")
                .and_then(Value::as_array)
                .ok_or_else(|| AppError::Decode("missing markers sequence".to_string()))
        }
        _ => Err(AppError::Decode("expected a sequence of records".to_string())),
    }
}

/// Trailing fields may be missing; they read as null.
fn decode_record(fields: &[Value]) -> Result<Marker, String> {
    if fields.len() < 2 {
        return Err(format!("expected at least 2 fields, found {}", fields.len()));
    }

    let location = decode_location(&fields[0])?;
    let label = fields[1]
        .as_str()
        .ok_or_else(|| "label is not a string".to_string())?
        .to_string();

    let timestamp = match fields.get(2) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => return Err(format!("timestamp is not a string: {}", other)),
    };

    let altitude = match fields.get(3) {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(other) => return Err(format!("altitude is not a number: {}", other)),
    };

    let metadata = match fields.get(4) {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(decode_metadata(map)?),
        Some(other) => return Err(format!("metadata is not a mapping: {}", other)),
    };

    Ok(Marker {
        location,
        label,
        timestamp,
        altitude,
        metadata,
    })
}

fn decode_location(value: &Value) -> Result<Coordinate, String> {
    let pair = match value.as_array() {
        Some(pair) if pair.len() == 2 => pair,
        _ => return Err(format!("location is not a 2-element pair: {}", value)),
    };
    match (pair[0].as_f64(), pair[1].as_f64()) {
        (Some(latitude), Some(longitude)) => {
            Coordinate::new(latitude, longitude).map_err(|e| e.to_string())
        }
        _ => Err(format!("location is not numeric: {}", value)),
    }
}

fn decode_metadata(map: &Map<String, Value>) -> Result<AuxMetadata, String> {
    map.iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => return Err(format!("metadata value for {} is not a scalar: {}", key, other)),
            };
            Ok((key.clone(), text))
        })
        .collect()
}
