
use crate::error::{AppError, CoordinateError};

/// A latitude/longitude pair in decimal degrees.
///
/// Values built through [`Coordinate::new`] always lie within
/// `[-90, 90]` x `[-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AppError> {
        if !is_valid_latitude(latitude) {
            return Err(AppError::InvalidCoordinate(format!(
                "latitude {} is outside -90..=90",
                latitude
            )));
        }
        if !is_valid_longitude(longitude) {
            return Err(AppError::InvalidCoordinate(format!(
                "longitude {} is outside -180..=180",
                longitude
            )));
        }
        Ok(Self { latitude, longitude })
    }

    /// Range-checked constructor that treats implausible data as absent.
    pub fn checked(latitude: f64, longitude: f64) -> Option<Self> {
        Self::new(latitude, longitude).ok()
    }
}

pub fn is_valid_latitude(latitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude)
}

pub fn is_valid_longitude(longitude: f64) -> bool {
    (-180.0..=180.0).contains(&longitude)
}

/// Convert a degrees/minutes/seconds triple to signed decimal degrees.
///
/// The result is negated for the `S` and `W` hemispheres. No range check
/// is done here; callers validate with [`Coordinate::checked`].
pub fn to_decimal_degrees(
    degrees: f64,
    minutes: f64,
    seconds: f64,
    hemisphere_ref: &str,
) -> Result<f64, CoordinateError> {
    for (name, component) in [("degrees", degrees), ("minutes", minutes), ("seconds", seconds)] {
        if !component.is_finite() {
            return Err(CoordinateError::Malformed(format!(
                "{} is not a number ({})",
                name, component
            )));
        }
    }

    let value = degrees + minutes / 60.0 + seconds / 3600.0;
    match hemisphere_ref.trim() {
        "S" | "W" => Ok(-value),
        _ => Ok(value),
    }
}

/// Convert an EXIF rational triple (as stored in the GPS IFD) to decimal degrees.
pub fn rationals_to_decimal_degrees(
    rationals: &[exif::Rational],
    hemisphere_ref: &str,
) -> Result<f64, CoordinateError> {
    if rationals.len() != 3 {
        return Err(CoordinateError::Malformed(format!(
            "expected 3 components, found {}",
            rationals.len()
        )));
    }
    if let Some(zero) = rationals.iter().find(|r| r.denom == 0) {
        return Err(CoordinateError::Malformed(format!(
            "zero denominator in {}/{}",
            zero.num, zero.denom
        )));
    }
    to_decimal_degrees(
        rationals[0].to_f64(),
        rationals[1].to_f64(),
        rationals[2].to_f64(),
        hemisphere_ref,
    )
}
