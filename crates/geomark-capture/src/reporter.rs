//! Delivery of captured locations to a remote collector.
//!
//! The component invokes this fire-and-forget: delivery failures are
//! logged, never surfaced to the user and never retried.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use url::Url;

use geomark_core::ReporterConfig;

use crate::types::{CapturedLocation, ReportError};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Payload the collector expects.
#[derive(Debug, Serialize)]
struct ReportPayload<'a> {
    latitude: &'a str,
    longitude: &'a str,
    address: &'a str,
    mobile: &'a str,
}

/// Client for the location collector endpoint.
#[derive(Debug, Clone)]
pub struct Reporter {
    client: Client,
    endpoint: Url,
    contact: String,
}

impl Reporter {
    /// `contact` identifies the reporting party and is always supplied by
    /// the embedding host.
    pub fn new(endpoint: &str, contact: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create reporter HTTP client")?;
        let endpoint = Url::parse(endpoint).context("Invalid reporter endpoint")?;

        Ok(Self {
            client,
            endpoint,
            contact: contact.to_string(),
        })
    }

    pub fn from_config(config: &ReporterConfig) -> Result<Self> {
        Self::new(&config.endpoint, &config.contact)
    }

    /// Deliver one captured location. The response is not inspected; only
    /// transport failures error.
    pub async fn send(&self, location: &CapturedLocation) -> Result<(), ReportError> {
        let payload = ReportPayload {
            latitude: &location.coordinate.latitude,
            longitude: &location.coordinate.longitude,
            address: location.address.as_str(),
            mobile: &self.contact,
        };

        self.client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await?;

        tracing::debug!("Reported captured location to {}", self.endpoint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, Coordinate};

    #[test]
    fn test_payload_shape() {
        let location = CapturedLocation {
            coordinate: Coordinate::from_degrees(12.345678, 98.765432),
            address: Address::new("Test Plaza"),
        };
        let payload = ReportPayload {
            latitude: &location.coordinate.latitude,
            longitude: &location.coordinate.longitude,
            address: location.address.as_str(),
            mobile: "+15550100",
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "latitude": "12.345678",
                "longitude": "98.765432",
                "address": "Test Plaza",
                "mobile": "+15550100",
            })
        );
    }

    #[test]
    fn test_new_rejects_bad_endpoint() {
        assert!(Reporter::new("not-a-url", "+15550100").is_err());
    }
}
