use async_trait::async_trait;

use crate::coordinates::Coordinate;
use crate::error::AppError;
use crate::metadata::Marker;

/// Address lookup service.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the service knows no such address.
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, AppError>;
}

/// Geocode an address into a marker labelled with that address.
pub async fn locate_address(geocoder: &dyn Geocoder, address: &str) -> Result<Marker, AppError> {
    let address = address.trim();
    log::debug!("Geocoding address: {}", address);
    match geocoder.geocode(address).await? {
        Some(location) => {
            log::info!(
                "Geocoded '{}' to {}, {}",
                address,
                location.latitude,
                location.longitude
            );
            Ok(Marker::at(address, location))
        }
        None => Err(AppError::GeocodeNotFound(address.to_string())),
    }
}
