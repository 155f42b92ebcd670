pub mod config;

pub use config::{
    Config, FeatureConfig, GeocoderConfig, ReporterConfig, SensorBackend, SensorConfig,
    StorageConfig, ValidationResult,
};

use anyhow::Result;

/// Initialize the core component
pub fn init() -> Result<()> {
    // Initialize tracing/logging; harmless if the host already installed
    // a subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    tracing::info!("Geomark core initialized");
    Ok(())
}
