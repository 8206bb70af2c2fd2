use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::config::AppConfig;
use crate::coordinates::Coordinate;
use crate::error::AppError;
use crate::geocoder::Geocoder;

const GEOCODE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Geocoder backed by an OpenStreetMap Nominatim `/search` endpoint.
pub struct NominatimGeocoder {
    client: Client,
    base_url: Url,
}

impl NominatimGeocoder {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        log::debug!("Creating Nominatim client for URL: {}", config.geocoder_url);
        let base_url = Url::parse(&config.geocoder_url)
            .map_err(|e| AppError::Generic(format!("Invalid geocoder URL {}: {}", config.geocoder_url, e)))?;
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(GEOCODE_TIMEOUT)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn search_url(&self, address: &str) -> Result<Url, AppError> {
        let mut url = self
            .base_url
            .join("search")
            .map_err(|e| AppError::Generic(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("format", "json")
            .append_pair("limit", "1");
        Ok(url)
    }
}

/// First place of a Nominatim answer, if it parses and lies in range.
fn first_location(places: &[Place]) -> Option<Coordinate> {
    let place = places.first()?;
    let latitude = place.lat.parse().ok()?;
    let longitude = place.lon.parse().ok()?;
    Coordinate::checked(latitude, longitude)
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, AppError> {
        let url = self.search_url(address)?;
        log::trace!("Nominatim request: {}", url);
        let places: Vec<Place> = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(first_location(&places))
    }
}
