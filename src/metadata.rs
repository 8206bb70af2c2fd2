// src/metadata.rs

use std::collections::BTreeMap;

use crate::coordinates::Coordinate;
use crate::error::AppError;

pub const CAMERA_MODEL_KEY: &str = "CameraModel";
pub const EXPOSURE_KEY: &str = "Exposure";
/// Placeholder stored for auxiliary fields the image does not carry.
pub const UNAVAILABLE: &str = "N/A";

/// Tolerance in degrees under which two coordinates are the same place.
pub const DEDUP_EPSILON: f64 = 1e-4;

pub type AuxMetadata = BTreeMap<String, String>;

/// A geotagged point in the marker collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub location: Coordinate,
    pub label: String,
    pub timestamp: Option<String>,
    pub altitude: Option<f64>,
    pub metadata: Option<AuxMetadata>,
}

impl Marker {
    /// Manually entered marker. Fails when the coordinate is out of range.
    pub fn new(label: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self, AppError> {
        Ok(Self::at(label, Coordinate::new(latitude, longitude)?))
    }

    pub fn at(label: impl Into<String>, location: Coordinate) -> Self {
        Self {
            location,
            label: label.into(),
            timestamp: None,
            altitude: None,
            metadata: None,
        }
    }

    /// Same place (within [`DEDUP_EPSILON`] on both axes) and same label.
    pub fn is_duplicate_of(&self, other: &Marker) -> bool {
        (self.location.latitude - other.location.latitude).abs() < DEDUP_EPSILON
            && (self.location.longitude - other.location.longitude).abs() < DEDUP_EPSILON
            && self.label == other.label
    }

    /// Human-readable lines for map popups and KML descriptions.
    pub fn description_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(timestamp) = &self.timestamp {
            match timestamp.split_once(' ') {
                Some((date, time)) if !time.contains(' ') => {
                    lines.push(format!("Time: {}", time));
                    lines.push(format!("Date: {}", date.replace(':', "-")));
                }
                _ => lines.push(format!("Timestamp: {}", timestamp)),
            }
        }

        if let Some(altitude) = self.altitude {
            lines.push(format!("Altitude: {:.1} m", altitude));
        }

        if let Some(metadata) = &self.metadata {
            if let Some(camera) = metadata.get(CAMERA_MODEL_KEY) {
                lines.push(format!("Camera: {}", camera));
            }
            if let Some(exposure) = metadata.get(EXPOSURE_KEY) {
                lines.push(format!("Exposure: {}", exposure));
            }
            for (key, value) in metadata {
                if key != CAMERA_MODEL_KEY && key != EXPOSURE_KEY {
                    lines.push(format!("{}: {}", key, value));
                }
            }
        }

        lines
    }
}

/// What the extractor found in one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub location: Option<Coordinate>,
    pub timestamp: Option<String>,
    pub altitude: Option<f64>,
    pub metadata: Option<AuxMetadata>,
}

impl Extraction {
    /// Turn a located extraction into a marker labelled with its source.
    pub fn into_marker(self, label: impl Into<String>) -> Option<Marker> {
        let location = self.location?;
        Some(Marker {
            location,
            label: label.into(),
            timestamp: self.timestamp,
            altitude: self.altitude,
            metadata: self.metadata,
        })
    }
}
