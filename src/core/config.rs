//! Configuration for the map panel
//!
//! Every section has a `Default` matching the stock travel-app look, so a
//! host only needs to override what it cares about. Configurations can be
//! loaded from JSON, where missing fields fall back to their defaults.

use crate::core::constants::{
    DEFAULT_MAX_ZOOM, MAX_TILE_ZOOM, MARKER_ICON_ANCHOR, MARKER_ICON_SIZE, MARKER_POPUP_ANCHOR,
    PANORAMA_SEARCH_RADIUS_M, PATH_FIT_MAX_ZOOM, PATH_FIT_PADDING,
};
use crate::core::viewport::FitBoundsOptions;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level panel configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub tiles: TileLayerOptions,
    pub path: PathFitOptions,
    pub panorama: PanoramaConfig,
    pub marker_icon: MarkerIcon,
}

impl PanelConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PanelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        log::info!("loading panel config from {}", path.display());
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tiles.url_template.contains("{z}")
            || !self.tiles.url_template.contains("{x}")
            || !self.tiles.url_template.contains("{y}")
        {
            return Err(MapError::Config(format!(
                "tile url template '{}' must contain {{z}}, {{x}} and {{y}}",
                self.tiles.url_template
            )));
        }
        if self.tiles.url_template.contains("{s}") && self.tiles.subdomains.is_empty() {
            return Err(MapError::Config(
                "tile url template uses {s} but no subdomains are configured".to_string(),
            ));
        }
        if self.tiles.min_zoom > self.tiles.max_zoom {
            return Err(MapError::Config(format!(
                "tile min_zoom {} exceeds max_zoom {}",
                self.tiles.min_zoom, self.tiles.max_zoom
            )));
        }
        if self.tiles.max_zoom > MAX_TILE_ZOOM {
            return Err(MapError::Config(format!(
                "tile max_zoom {} exceeds {}",
                self.tiles.max_zoom, MAX_TILE_ZOOM
            )));
        }
        if self.path.padding < 0.0 {
            return Err(MapError::Config("path fit padding must not be negative".to_string()));
        }
        Ok(())
    }
}

/// Base tile layer options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileLayerOptions {
    pub url_template: String,
    pub subdomains: Vec<String>,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub attribution: Option<String>,
    /// Capacity of the in-memory tile cache, in tiles
    pub cache_size: usize,
}

impl Default for TileLayerOptions {
    fn default() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            min_zoom: 0,
            max_zoom: DEFAULT_MAX_ZOOM,
            attribution: Some("© OpenStreetMap contributors".to_string()),
            cache_size: 512,
        }
    }
}

/// How the viewport is fit around a freshly drawn route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathFitOptions {
    pub padding: f64,
    pub max_zoom: f64,
}

impl Default for PathFitOptions {
    fn default() -> Self {
        Self {
            padding: PATH_FIT_PADDING,
            max_zoom: PATH_FIT_MAX_ZOOM,
        }
    }
}

impl From<PathFitOptions> for FitBoundsOptions {
    fn from(options: PathFitOptions) -> Self {
        FitBoundsOptions {
            padding: options.padding,
            max_zoom: Some(options.max_zoom),
        }
    }
}

/// Panorama provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanoramaConfig {
    /// Client library URL; `{key}` is replaced with `api_key`
    pub script_url: String,
    pub api_key: String,
    pub search_radius_m: f64,
    /// Shown inside the overlay when no imagery exists at the target
    pub unavailable_message: String,
}

impl PanoramaConfig {
    pub fn resolved_script_url(&self) -> String {
        self.script_url.replace("{key}", &self.api_key)
    }
}

impl Default for PanoramaConfig {
    fn default() -> Self {
        Self {
            script_url: "https://maps.googleapis.com/maps/api/js?key={key}".to_string(),
            api_key: "YOUR_API_KEY".to_string(),
            search_radius_m: PANORAMA_SEARCH_RADIUS_M,
            unavailable_message: "Street View not available for this location".to_string(),
        }
    }
}

/// Default marker icon geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerIcon {
    pub icon_url: String,
    pub shadow_url: String,
    pub icon_size: (u32, u32),
    pub icon_anchor: (u32, u32),
    pub popup_anchor: (i32, i32),
    pub shadow_size: (u32, u32),
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self {
            icon_url: "https://unpkg.com/leaflet@1.7.1/dist/images/marker-icon.png".to_string(),
            shadow_url: "https://unpkg.com/leaflet@1.7.1/dist/images/marker-shadow.png"
                .to_string(),
            icon_size: MARKER_ICON_SIZE,
            icon_anchor: MARKER_ICON_ANCHOR,
            popup_anchor: MARKER_POPUP_ANCHOR,
            shadow_size: (41, 41),
        }
    }
}
