//! Location capture component for Geomark
//!
//! Acquires the host position once, reverse-geocodes it via Nominatim,
//! caches the coordinate/address pair, optionally reports it to a remote
//! collector, and drives a Loading/Ready/Failed view.

pub mod error;
pub mod geocode;
pub mod render;
pub mod reporter;
pub mod sensor;
pub mod store;
pub mod types;
pub mod view;

pub use error::CaptureError;
pub use geocode::GeocodeClient;
pub use render::{map_embed_url, map_link, ViewSnapshot};
pub use reporter::Reporter;
pub use sensor::{AcquireOptions, GeoIpSensor, LocationSensor, NullSensor, SystemSensor};
pub use store::{FileStore, LocationStore, MemoryStore, ADDRESS_KEY, LOCATION_KEY};
pub use types::{
    Address, CapturedLocation, Coordinate, GeocodeError, ReportError, SensorError, StoreError,
    ADDRESS_NOT_FOUND,
};
pub use view::{LocationView, ViewState};
