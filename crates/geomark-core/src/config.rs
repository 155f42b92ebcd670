use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Feature toggles for the capture component
    #[serde(default)]
    pub features: FeatureConfig,

    /// Position sensor settings
    #[serde(default)]
    pub sensor: SensorConfig,

    /// Reverse-geocoding settings
    #[serde(default)]
    pub geocoder: GeocoderConfig,

    /// Remote collector settings
    #[serde(default)]
    pub reporter: ReporterConfig,

    /// Local storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Feature toggles for the single capture component.
///
/// Caching and reporting are independent; a component with both disabled
/// still acquires and geocodes on every activation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Persist the captured location and serve it on later activations
    #[serde(default = "default_enable_cache")]
    pub enable_cache: bool,

    /// Forward each fresh capture to the remote collector
    #[serde(default)]
    pub enable_reporting: bool,
}

fn default_enable_cache() -> bool {
    true
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            enable_cache: default_enable_cache(),
            enable_reporting: false,
        }
    }
}

/// Which position source backs the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SensorBackend {
    /// IP geolocation over HTTP
    #[default]
    GeoIp,
    /// No positioning capability on this host
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Position source
    #[serde(default)]
    pub backend: SensorBackend,

    /// Endpoint for the geoip backend
    #[serde(default = "default_sensor_endpoint")]
    pub endpoint: String,

    /// Request the most accurate fix the backend can produce
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,

    /// Seconds to wait for a fix before giving up
    #[serde(default = "default_sensor_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum age of a reusable fix in seconds; 0 never reuses one
    #[serde(default)]
    pub maximum_age_secs: u64,
}

fn default_sensor_endpoint() -> String {
    "http://ip-api.com/json".to_string()
}

fn default_high_accuracy() -> bool {
    true
}

fn default_sensor_timeout_secs() -> u64 {
    10
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            backend: SensorBackend::default(),
            endpoint: default_sensor_endpoint(),
            high_accuracy: default_high_accuracy(),
            timeout_secs: default_sensor_timeout_secs(),
            maximum_age_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Base URL of the Nominatim-compatible reverse-geocoding service
    #[serde(default = "default_geocoder_base_url")]
    pub base_url: String,

    /// User-Agent sent with geocoding requests; Nominatim requires one
    #[serde(default = "default_geocoder_user_agent")]
    pub user_agent: String,
}

fn default_geocoder_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_geocoder_user_agent() -> String {
    "geomark/0.1.0 (https://github.com/geomark)".to_string()
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoder_base_url(),
            user_agent: default_geocoder_user_agent(),
        }
    }
}

/// Remote collector configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReporterConfig {
    /// Collector endpoint receiving captured locations
    #[serde(default)]
    pub endpoint: String,

    /// Contact identifier sent with each report; must be supplied by the
    /// embedding host, there is no usable default
    #[serde(default)]
    pub contact: String,
}

impl ReporterConfig {
    /// Check if the collector is configured (not placeholders)
    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty()
            && !self.contact.is_empty()
            && !self.contact.starts_with("YOUR_")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Directory holding the cached location; defaults to the platform
    /// data dir when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Directory the capture cache lives in.
    pub fn effective_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("geomark"),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        // Validate geocoder URL
        self.validate_url(&self.geocoder.base_url, "geocoder.base_url", &mut result);

        if self.geocoder.user_agent.is_empty() {
            result.add_error(
                "geocoder.user_agent",
                "User-Agent must be set; Nominatim rejects anonymous clients",
            );
        }

        // Validate sensor settings
        if self.sensor.backend == SensorBackend::GeoIp {
            self.validate_url(&self.sensor.endpoint, "sensor.endpoint", &mut result);
        }

        if self.sensor.timeout_secs == 0 {
            result.add_warning(
                "sensor.timeout_secs",
                "Sensor timeout of 0 fails every acquisition immediately",
            );
        } else if self.sensor.timeout_secs > 120 {
            result.add_warning(
                "sensor.timeout_secs",
                "Sensor timeout is unusually long (>120s)",
            );
        }

        // Validate reporter settings; only binding when reporting is enabled
        if self.features.enable_reporting {
            if !self.reporter.is_configured() {
                result.add_error(
                    "reporter",
                    "Reporting is enabled but endpoint/contact are not configured",
                );
            } else {
                self.validate_url(&self.reporter.endpoint, "reporter.endpoint", &mut result);
            }
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                // Check scheme
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                // Check host
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("geomark");

        Ok(config_dir.join("config.toml"))
    }
}
