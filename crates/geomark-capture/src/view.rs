//! The capture state machine.
//!
//! One component serves both the caching/reporting and the bare variant;
//! [`FeatureConfig`] selects the behavior. The state is the sole driver of
//! rendering, and every pipeline failure lands in `Failed` with a specific
//! kind rather than leaving the view pending.

use tokio_util::sync::CancellationToken;

use geomark_core::{Config, FeatureConfig};

use crate::error::CaptureError;
use crate::geocode::GeocodeClient;
use crate::render::ViewSnapshot;
use crate::reporter::Reporter;
use crate::sensor::{AcquireOptions, LocationSensor, SystemSensor};
use crate::store::LocationStore;
use crate::types::CapturedLocation;

/// What the component is showing right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Acquisition in progress; the entry state on activation
    Loading,
    /// A location is on screen; terminal until the user clears
    Ready(CapturedLocation),
    /// Acquisition failed; terminal until the user retries
    Failed(CaptureError),
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn location(&self) -> Option<&CapturedLocation> {
        match self {
            Self::Ready(location) => Some(location),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<CaptureError> {
        match self {
            Self::Failed(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// The location capture component.
///
/// Generic over the position sensor so embedding hosts and tests can plug
/// in their own source; geocoder, reporter and store are configured at
/// construction.
pub struct LocationView<S> {
    features: FeatureConfig,
    sensor: S,
    geocoder: GeocodeClient,
    reporter: Option<Reporter>,
    store: LocationStore,
    acquire_options: AcquireOptions,
    state: ViewState,
    cancel: CancellationToken,
}

impl LocationView<SystemSensor> {
    /// Wire the component from configuration with the default backends.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let sensor = SystemSensor::from_config(&config.sensor)?;
        let geocoder = GeocodeClient::from_config(&config.geocoder)?;
        let reporter = if config.features.enable_reporting {
            Some(Reporter::from_config(&config.reporter)?)
        } else {
            None
        };
        let store = LocationStore::file(config.storage.effective_data_dir());

        Ok(Self::new(
            config.features,
            sensor,
            geocoder,
            reporter,
            store,
            AcquireOptions::from_config(&config.sensor),
        ))
    }
}

impl<S: LocationSensor> LocationView<S> {
    pub fn new(
        features: FeatureConfig,
        sensor: S,
        geocoder: GeocodeClient,
        reporter: Option<Reporter>,
        store: LocationStore,
        acquire_options: AcquireOptions,
    ) -> Self {
        Self {
            features,
            sensor,
            geocoder,
            reporter,
            store,
            acquire_options,
            state: ViewState::Loading,
            cancel: CancellationToken::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Flatten the current state into bindable fields.
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot::from_state(&self.state)
    }

    /// Token an embedding host can tie to its own lifecycle.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop reacting to in-flight work. A cancelled view never changes
    /// state again.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Run the acquisition cycle: cache probe, then sensor, geocoder,
    /// cache write and report. Enters Loading first and ends Ready or
    /// Failed, unless cancelled mid-flight.
    pub async fn activate(&mut self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.state = ViewState::Loading;

        let cancel = self.cancel.clone();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Capture cancelled mid-flight");
                return;
            }
            outcome = self.run_capture() => outcome,
        };

        self.state = match outcome {
            Ok(location) => ViewState::Ready(location),
            Err(kind) => {
                tracing::error!("Capture failed: {}", kind);
                ViewState::Failed(kind)
            }
        };
    }

    async fn run_capture(&self) -> Result<CapturedLocation, CaptureError> {
        if self.features.enable_cache {
            if let Some(entry) = self.store.read() {
                tracing::debug!("Cache hit; rendering stored location");
                return Ok(entry);
            }
            tracing::debug!("Cache miss; acquiring position");
        }

        if !self.sensor.is_supported() {
            return Err(CaptureError::Unsupported);
        }

        let coordinate = self.sensor.acquire(&self.acquire_options).await?;
        tracing::info!("Acquired position {}", coordinate);

        let address = self.geocoder.reverse(&coordinate).await.map_err(|e| {
            tracing::warn!("Reverse geocoding failed: {}", e);
            CaptureError::from(e)
        })?;

        let location = CapturedLocation {
            coordinate,
            address,
        };

        if self.features.enable_cache {
            self.store.write(&location).map_err(|e| {
                tracing::warn!("Failed to store captured location: {}", e);
                CaptureError::from(e)
            })?;
        }

        if self.features.enable_reporting {
            if let Some(reporter) = self.reporter.clone() {
                let report = location.clone();
                // Fire and forget; delivery failures are logged, never shown
                tokio::spawn(async move {
                    if let Err(e) = reporter.send(&report).await {
                        tracing::warn!("Location report failed: {}", e);
                    }
                });
            }
        }

        Ok(location)
    }

    /// Manual retry from Failed: full restart without clearing, so a warm
    /// cache satisfies the retry before the sensor is consulted.
    pub async fn retry(&mut self) {
        self.activate().await;
    }

    /// User-initiated clear: drop both cache keys, then restart with a
    /// fresh acquisition.
    pub async fn clear(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear stored location: {}", e);
            self.state = ViewState::Failed(CaptureError::StorageFailure);
            return;
        }
        self.activate().await;
    }
}

impl<S> Drop for LocationView<S> {
    fn drop(&mut self) {
        // In-flight work must not outlive the component
        self.cancel.cancel();
    }
}
