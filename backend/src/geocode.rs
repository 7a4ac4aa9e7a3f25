use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::error::{ZoneError, ZoneResult};
use crate::models::Coordinate;

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> ZoneResult<Coordinate>;
}

/// Geocoding JSON as returned by the Maps geocoding endpoint. Everything is
/// optional because the payload is not ours.
#[derive(Debug, Deserialize, Default)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    pub status: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: Option<Location>,
}

#[derive(Debug, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl GeocodeResponse {
    pub fn first_location(&self) -> ZoneResult<Coordinate> {
        let first = self.results.first().ok_or_else(|| {
            let status = self.status.as_deref().unwrap_or("no status");
            match &self.error_message {
                Some(msg) => ZoneError::geocode(format!("no results ({status}: {msg})")),
                None => ZoneError::geocode(format!("no results ({status})")),
            }
        })?;

        let location = first
            .geometry
            .as_ref()
            .and_then(|g| g.location.as_ref())
            .ok_or_else(|| ZoneError::geocode("first result has no geometry.location"))?;

        Ok(Coordinate::new(location.lat, location.lng))
    }
}

pub struct GoogleGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> ZoneResult<Coordinate> {
        if address.is_empty() {
            return Err(ZoneError::geocode("invalid address"));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ZoneError::geocode(format!("request failed: {e}")))?;

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| ZoneError::geocode(format!("unreadable response: {e}")))?;

        debug!(
            "geocode status={:?} results={}",
            body.status,
            body.results.len()
        );
        body.first_location()
    }
}
