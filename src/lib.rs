//! # tripmap
//!
//! An interactive map panel for travel applications, modelled after the
//! Leaflet way of doing things.
//!
//! The panel binds one map instance to a host container, places markers
//! with popups, draws a decorative curved route between two points styled
//! by transport mode, and can layer a panorama ("street view") overlay on
//! top. Hosts plug in the container, the tile transport and the panorama
//! provider through traits, so the same panel runs in a browser shell, a
//! desktop shell or a headless test harness.

pub mod core;
pub mod data;
pub mod layers;
pub mod panel;
pub mod prelude;
pub mod runtime;
pub mod tiles;
pub mod traits;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::PanelConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::Map,
    viewport::Viewport,
};

pub use layers::{
    base::LayerTrait, marker::MarkerLayer, tile::TileLayer, vector::PolylineLayer,
};

pub use panel::{
    container::{HeadlessContainer, MapContainer},
    lifecycle::{MapLifecycle, MapViewState, MarkerKind, MarkerSpec},
    panorama::{PanoramaController, PanoramaState},
    path::{PathRenderer, PathRequest, TransportMode},
    MapPanel, PanelProps,
};

pub use ui::{controls::ControlKind, popup::Popup};

/// Installs an `env_logger` backend, honouring `RUST_LOG` and falling back
/// to `default_filter`. Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::trace!("logger already installed");
    }
}

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Tile fetch failed for {url}: {reason}")]
    TileFetch { url: String, reason: String },

    #[error("Panorama error: {0}")]
    Panorama(String),

    #[error("Layer error: {0}")]
    Layer(String),
}

/// Error type alias for convenience
pub type Error = MapError;
