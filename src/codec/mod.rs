//! Marker persistence: a lossless JSON form and a one-way KML export.

pub mod json;
pub mod kml;

pub use json::{from_json_str, load_json, save_json, to_json_string, LoadPolicy, LoadedMarkers, SkippedRecord};
pub use kml::{export_kml, to_kml_string};
