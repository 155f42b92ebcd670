//! Flat render model for embedding hosts.
//!
//! Mirrors the view state into plain bindable fields plus the two map URLs
//! the success view links out to.

use crate::types::Coordinate;
use crate::view::ViewState;

const MAP_LINK_BASE: &str = "https://www.google.com/maps";
const MAP_EMBED_BASE: &str = "https://maps.google.com/maps";

/// Outbound link showing the coordinate on Google Maps.
pub fn map_link(coordinate: &Coordinate) -> String {
    format!("{}?q={}", MAP_LINK_BASE, coordinate)
}

/// Embeddable map URL for the coordinate.
pub fn map_embed_url(coordinate: &Coordinate) -> String {
    format!("{}?q={}&z=15&output=embed", MAP_EMBED_BASE, coordinate)
}

/// One flat snapshot of the view, ready for property binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub loading: bool,
    pub latitude: String,
    pub longitude: String,
    pub address: String,
    pub map_link: String,
    pub map_embed_url: String,
    pub error_message: String,
}

impl ViewSnapshot {
    pub fn from_state(state: &ViewState) -> Self {
        match state {
            ViewState::Loading => Self {
                loading: true,
                ..Self::default()
            },
            ViewState::Ready(location) => Self {
                loading: false,
                latitude: location.coordinate.latitude.clone(),
                longitude: location.coordinate.longitude.clone(),
                address: location.address.as_str().to_string(),
                map_link: map_link(&location.coordinate),
                map_embed_url: map_embed_url(&location.coordinate),
                error_message: String::new(),
            },
            ViewState::Failed(kind) => Self {
                loading: false,
                error_message: kind.user_message().to_string(),
                ..Self::default()
            },
        }
    }
}
