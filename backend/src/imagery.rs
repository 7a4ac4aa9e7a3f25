use async_trait::async_trait;
use log::debug;

use crate::error::{ZoneError, ZoneResult};
use crate::models::Coordinate;

pub const ZOOM: u8 = 19;
pub const IMAGE_SIZE: u32 = 512;

#[async_trait]
pub trait ImageryProvider: Send + Sync {
    /// Encoded image bytes, unvalidated.
    async fn fetch_satellite_image(&self, coord: Coordinate) -> ZoneResult<Vec<u8>>;
}

pub struct GoogleStaticMaps {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleStaticMaps {
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

    fn query(&self, coord: Coordinate) -> [(&'static str, String); 5] {
        [
            ("center", format!("{},{}", coord.lat, coord.lng)),
            ("zoom", ZOOM.to_string()),
            ("size", format!("{IMAGE_SIZE}x{IMAGE_SIZE}")),
            ("maptype", "satellite".to_string()),
            ("key", self.api_key.clone()),
        ]
    }
}

#[async_trait]
impl ImageryProvider for GoogleStaticMaps {
    async fn fetch_satellite_image(&self, coord: Coordinate) -> ZoneResult<Vec<u8>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query(coord))
            .send()
            .await
            .map_err(|e| ZoneError::image_fetch(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ZoneError::image_fetch(format!("imagery service returned {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ZoneError::image_fetch(format!("body read failed: {e}")))?;

        debug!("fetched {} image bytes for {},{}", bytes.len(), coord.lat, coord.lng);
        Ok(bytes.to_vec())
    }
}
