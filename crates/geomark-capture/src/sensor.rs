//! One-shot position acquisition.
//!
//! The platform geolocation concern sits behind [`LocationSensor`] so an
//! embedding host with a real positioning source can supply its own; the
//! bundled backend resolves the host's public IP to coordinates over HTTP.

use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use geomark_core::{SensorBackend, SensorConfig};

use crate::types::{Coordinate, SensorError};

/// Parameters for a single acquisition attempt.
#[derive(Debug, Clone)]
pub struct AcquireOptions {
    /// Request the most accurate fix the backend can produce
    pub high_accuracy: bool,
    /// How long to wait for a fix before giving up
    pub timeout: Duration,
    /// Maximum age of a previously obtained fix to reuse; zero never reuses
    pub maximum_age: Duration,
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

impl AcquireOptions {
    pub fn from_config(config: &SensorConfig) -> Self {
        Self {
            high_accuracy: config.high_accuracy,
            timeout: Duration::from_secs(config.timeout_secs),
            maximum_age: Duration::from_secs(config.maximum_age_secs),
        }
    }
}

/// A one-shot position source.
///
/// `acquire` resolves to a tagged result rather than invoking divergent
/// callbacks, and makes exactly one attempt; the caller decides whether to
/// try again.
pub trait LocationSensor {
    /// Whether this host can produce a position at all. Callers must not
    /// invoke `acquire` when this is false.
    fn is_supported(&self) -> bool {
        true
    }

    /// Acquire the current position once.
    fn acquire(
        &self,
        options: &AcquireOptions,
    ) -> impl Future<Output = Result<Coordinate, SensorError>> + Send;
}

#[derive(Debug, Deserialize)]
struct GeoIpResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

/// IP-geolocation backend.
///
/// Accuracy is whatever the resolver knows about the host's public IP;
/// `high_accuracy` is accepted for interface parity but cannot sharpen it.
#[derive(Debug)]
pub struct GeoIpSensor {
    client: Client,
    endpoint: Url,
    last_fix: Mutex<Option<(Instant, Coordinate)>>,
}

impl GeoIpSensor {
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create geoip HTTP client")?;
        let endpoint = Url::parse(endpoint).context("Invalid geoip endpoint")?;

        Ok(Self {
            client,
            endpoint,
            last_fix: Mutex::new(None),
        })
    }

    async fn fetch(&self) -> Result<Coordinate, SensorError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(request_error)?;

        if response.status() == StatusCode::FORBIDDEN {
            return Err(SensorError::PermissionDenied);
        }
        if !response.status().is_success() {
            tracing::debug!("GeoIP lookup returned status {}", response.status());
            return Err(SensorError::PositionUnavailable);
        }

        let body: GeoIpResponse = response.json().await.map_err(request_error)?;
        if body.status != "success" {
            tracing::debug!(
                "GeoIP lookup failed: {}",
                body.message.as_deref().unwrap_or("unknown reason")
            );
            return Err(SensorError::PositionUnavailable);
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinate::from_degrees(lat, lon)),
            _ => Err(SensorError::PositionUnavailable),
        }
    }
}

fn request_error(e: reqwest::Error) -> SensorError {
    if e.is_timeout() {
        SensorError::Timeout
    } else {
        SensorError::PositionUnavailable
    }
}

impl LocationSensor for GeoIpSensor {
    async fn acquire(&self, options: &AcquireOptions) -> Result<Coordinate, SensorError> {
        if !options.maximum_age.is_zero() {
            let last_fix = self.last_fix.lock();
            if let Some((at, fix)) = last_fix.as_ref() {
                if at.elapsed() <= options.maximum_age {
                    tracing::debug!("Reusing position fix aged {:?}", at.elapsed());
                    return Ok(fix.clone());
                }
            }
        }

        let coordinate = tokio::time::timeout(options.timeout, self.fetch())
            .await
            .map_err(|_| SensorError::Timeout)??;

        tracing::info!("GeoIP fix acquired: {}", coordinate);
        *self.last_fix.lock() = Some((Instant::now(), coordinate.clone()));
        Ok(coordinate)
    }
}

/// Sensor for hosts with no positioning capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSensor;

impl LocationSensor for NullSensor {
    fn is_supported(&self) -> bool {
        false
    }

    async fn acquire(&self, _options: &AcquireOptions) -> Result<Coordinate, SensorError> {
        Err(SensorError::Unsupported)
    }
}

/// Position source selected by configuration.
#[derive(Debug)]
pub enum SystemSensor {
    GeoIp(GeoIpSensor),
    Null(NullSensor),
}

impl SystemSensor {
    pub fn from_config(config: &SensorConfig) -> Result<Self> {
        match config.backend {
            SensorBackend::GeoIp => Ok(Self::GeoIp(GeoIpSensor::new(&config.endpoint)?)),
            SensorBackend::None => Ok(Self::Null(NullSensor)),
        }
    }
}

impl LocationSensor for SystemSensor {
    fn is_supported(&self) -> bool {
        match self {
            Self::GeoIp(sensor) => sensor.is_supported(),
            Self::Null(sensor) => sensor.is_supported(),
        }
    }

    async fn acquire(&self, options: &AcquireOptions) -> Result<Coordinate, SensorError> {
        match self {
            Self::GeoIp(sensor) => sensor.acquire(options).await,
            Self::Null(sensor) => sensor.acquire(options).await,
        }
    }
}
