//! Reverse geocoding: convert a captured coordinate to a display address.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use geomark_core::GeocoderConfig;

use crate::types::{Address, Coordinate, GeocodeError};

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

/// Client for a Nominatim-compatible reverse-geocoding service.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    reverse_url: Url,
}

impl GeocodeClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()
            .context("Failed to create geocoding client")?;

        let reverse_url = Url::parse(base_url)
            .and_then(|base| base.join("reverse"))
            .context("Invalid geocoder base URL")?;

        Ok(Self {
            client,
            reverse_url,
        })
    }

    pub fn from_config(config: &GeocoderConfig) -> Result<Self> {
        Self::new(&config.base_url, &config.user_agent)
    }

    /// Translate a coordinate into a display address.
    ///
    /// A well-formed response without a display name yields the "not found"
    /// sentinel, not an error; transport failures and non-2xx statuses do
    /// fail, and the caller decides how to surface them.
    pub async fn reverse(&self, coordinate: &Coordinate) -> Result<Address, GeocodeError> {
        let response = self
            .client
            .get(self.reverse_url.clone())
            .query(&[
                ("lat", coordinate.latitude.as_str()),
                ("lon", coordinate.longitude.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Reverse geocode returned status {}", status);
            return Err(GeocodeError::Status(status));
        }

        let body: ReverseResponse = response.json().await?;

        let address = match body.display_name {
            Some(name) => Address::new(name),
            None => Address::not_found(),
        };

        tracing::info!("Reverse geocoded {} to: {}", coordinate, address);
        Ok(address)
    }
}
