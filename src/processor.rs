use std::io::Cursor;

use exif::{Exif, In, Reader, Tag, Value};

use crate::coordinates::{rationals_to_decimal_degrees, Coordinate};
use crate::error::ItemError;
use crate::metadata::{AuxMetadata, Extraction, CAMERA_MODEL_KEY, EXPOSURE_KEY, UNAVAILABLE};

/// Extract GPS position, timestamp, altitude and camera details from raw image bytes.
///
/// `remote` only changes how failures are described in the log.
pub fn extract_from_bytes(bytes: &[u8], source: &str, remote: bool) -> Result<Extraction, ItemError> {
    let origin = if remote { "remote" } else { "local" };

    log::trace!("Validating {} image: {}", origin, source);
    let (width, height) = image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ItemError::InvalidImage(e.to_string()))?
        .into_dimensions()
        .map_err(|e| {
            log::warn!("Could not decode {} image {}: {}", origin, source, e);
            ItemError::InvalidImage(e.to_string())
        })?;
    log::debug!("Dimensions for {}: {}x{}", source, width, height);

    log::trace!("Extracting EXIF data for image: {}", source);
    let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(e) => {
            log::debug!("No EXIF data found for {}: {}", source, e);
            return Ok(Extraction::default());
        }
    };

    let extraction = Extraction {
        location: read_location(&exif, source),
        timestamp: read_ascii(&exif, Tag::DateTime).or_else(|| read_ascii(&exif, Tag::DateTimeOriginal)),
        altitude: read_altitude(&exif),
        metadata: Some(read_aux_metadata(&exif)),
    };
    log::trace!("Extracted metadata for {}: {:?}", source, extraction);

    Ok(extraction)
}

/// Malformed or implausible GPS data reads as no location at all.
fn read_location(exif: &Exif, source: &str) -> Option<Coordinate> {
    let latitude = read_degrees(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, source)?;
    let longitude = read_degrees(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, source)?;

    let location = Coordinate::checked(latitude, longitude);
    if location.is_none() {
        log::warn!(
            "Ignoring out-of-range GPS position ({}, {}) in {}",
            latitude,
            longitude,
            source
        );
    }
    location
}

fn read_degrees(exif: &Exif, value_tag: Tag, ref_tag: Tag, source: &str) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let hemisphere = read_ascii(exif, ref_tag)?;

    match &field.value {
        Value::Rational(dms) => match rationals_to_decimal_degrees(dms, &hemisphere) {
            Ok(degrees) => {
                log::trace!("{}: {} {}", value_tag, degrees, hemisphere);
                Some(degrees)
            }
            Err(e) => {
                log::warn!("Ignoring {} in {}: {}", value_tag, source, e);
                None
            }
        },
        other => {
            log::warn!("Ignoring {} in {}: unexpected value {:?}", value_tag, source, other);
            None
        }
    }
}

fn read_altitude(exif: &Exif) -> Option<f64> {
    let field = exif.get_field(Tag::GPSAltitude, In::PRIMARY)?;
    let altitude = match &field.value {
        Value::Rational(v) if !v.is_empty() && v[0].denom != 0 => v[0].to_f64(),
        _ => return None,
    };

    let below_sea_level = exif
        .get_field(Tag::GPSAltitudeRef, In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        == Some(1);

    Some(if below_sea_level { -altitude } else { altitude })
}

fn read_aux_metadata(exif: &Exif) -> AuxMetadata {
    let mut metadata = AuxMetadata::new();
    metadata.insert(
        CAMERA_MODEL_KEY.to_string(),
        read_ascii(exif, Tag::Model).unwrap_or_else(|| UNAVAILABLE.to_string()),
    );
    metadata.insert(
        EXPOSURE_KEY.to_string(),
        read_exposure(exif).unwrap_or_else(|| UNAVAILABLE.to_string()),
    );
    metadata
}

fn read_exposure(exif: &Exif) -> Option<String> {
    let field = exif.get_field(Tag::ExposureTime, In::PRIMARY)?;
    match &field.value {
        Value::Rational(v) if !v.is_empty() && v[0].denom != 0 => Some(format_exposure(v[0].num, v[0].denom)),
        _ => Some(field.display_value().to_string()),
    }
}

/// `1/250` for unit fractions, decimal seconds otherwise.
fn format_exposure(num: u32, denom: u32) -> String {
    if num == 1 || (num != 0 && denom % num == 0 && num < denom) {
        format!("1/{}", denom / num)
    } else {
        let seconds = num as f64 / denom as f64;
        format!("{}", seconds)
    }
}

/// First ASCII component of a tag, trimmed of padding.
fn read_ascii(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(parts) => parts
            .first()
            .map(|raw| String::from_utf8_lossy(raw).trim_matches(|c: char| c == '\0' || c.is_whitespace()).to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}
