use serde::{Deserialize, Serialize};

/// Sentinel address shown when the geocoder yields no display name
pub const ADDRESS_NOT_FOUND: &str = "Address not found";

/// A captured position.
///
/// Both fields are decimal strings fixed to 6 fractional digits. The
/// precision reduction happens once, at capture time, and is irreversible;
/// every consumer (cache, geocoder, reporter, render) sees the same strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: String,
    pub longitude: String,
}

impl Coordinate {
    /// Fix raw degrees to 6 fractional digits.
    pub fn from_degrees(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: format!("{:.6}", latitude),
            longitude: format!("{:.6}", longitude),
        }
    }

    /// Both fields parse as in-range decimal degrees.
    pub fn is_valid(&self) -> bool {
        let latitude = self.latitude.parse::<f64>();
        let longitude = self.longitude.parse::<f64>();
        matches!(
            (latitude, longitude),
            (Ok(lat), Ok(lon)) if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
        )
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Human-readable address derived from a coordinate; an opaque display
/// string, never produced independently of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The "not found" sentinel.
    pub fn not_found() -> Self {
        Self(ADDRESS_NOT_FOUND.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        self.0 == ADDRESS_NOT_FOUND
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The coordinate/address pair the component renders and caches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedLocation {
    pub coordinate: Coordinate,
    pub address: Address,
}

/// Position sensor errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("position acquisition timed out")]
    Timeout,
    #[error("no positioning capability on this host")]
    Unsupported,
}

/// Reverse-geocoding errors
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("reverse geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("reverse geocoding returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Report delivery errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report delivery failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Capture storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode cached location: {0}")]
    Encode(#[from] serde_json::Error),
}
