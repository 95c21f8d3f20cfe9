//! Base tile layer
//!
//! The layer knows which tiles cover a viewport and where to fetch them;
//! fetching itself is done by [`crate::tiles::TileLoader`].

use crate::{
    core::{
        config::TileLayerOptions,
        constants::{MAX_TILE_ZOOM, TILE_SIZE},
        geo::TileCoord,
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
    layer_options_json,
    tiles::source::{TileSource, UrlTemplateSource},
    Result,
};

pub struct TileLayer {
    properties: LayerProperties,
    options: TileLayerOptions,
    source: UrlTemplateSource,
}

impl TileLayer {
    pub fn new(id: String, options: TileLayerOptions) -> Self {
        let properties = LayerProperties::new(id, "Base tiles".to_string(), LayerType::Tile);
        let source =
            UrlTemplateSource::new(options.url_template.clone(), options.subdomains.clone());
        Self {
            properties,
            options,
            source,
        }
    }

    pub fn options_ref(&self) -> &TileLayerOptions {
        &self.options
    }

    pub fn attribution(&self) -> Option<&str> {
        self.options.attribution.as_deref()
    }

    pub fn tile_url(&self, coord: TileCoord) -> String {
        self.source.url(coord)
    }

    pub fn source(&self) -> &UrlTemplateSource {
        &self.source
    }

    /// Tile zoom used for a viewport, clamped to what the layer serves
    pub fn tile_zoom(&self, viewport: &Viewport) -> u8 {
        let zoom = viewport.zoom.round().max(0.0) as u8;
        zoom.min(self.options.max_zoom).max(self.options.min_zoom)
    }

    /// Tiles covering the viewport at the layer's tile zoom
    pub fn visible_tiles(&self, viewport: &Viewport) -> Vec<TileCoord> {
        let zoom = self.tile_zoom(viewport);
        let bounds = viewport.bounds();

        let nw = viewport.project(&bounds.north_west(), Some(zoom as f64));
        let se = viewport.project(&bounds.south_east(), Some(zoom as f64));

        let tile_size = TILE_SIZE as f64;
        let min_x = (nw.x / tile_size).floor() as i64;
        let max_x = (se.x / tile_size).floor() as i64;
        let min_y = (nw.y / tile_size).floor() as i64;
        let max_y = (se.y / tile_size).floor() as i64;

        let max_tile = (zoom <= MAX_TILE_ZOOM)
            .then(|| 1_i64.checked_shl(u32::from(zoom)))
            .flatten();
        let Some(max_tile) = max_tile else {
            log::warn!("tile zoom {} is out of range, skipping tiles", zoom);
            return Vec::new();
        };

        let mut tiles = Vec::new();
        for x in min_x.max(0)..=max_x.min(max_tile - 1) {
            for y in min_y.max(0)..=max_y.min(max_tile - 1) {
                tiles.push(TileCoord::new(x as u32, y as u32, zoom));
            }
        }
        tiles
    }
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(TileLayer, properties);

    fn options(&self) -> serde_json::Value {
        layer_options_json!(self.properties, {
            "url_template": self.options.url_template,
            "max_zoom": self.options.max_zoom,
            "attribution": self.options.attribution,
        })
    }

    fn set_options(&mut self, options: serde_json::Value) -> Result<()> {
        if let Some(template) = options.get("url_template").and_then(|v| v.as_str()) {
            self.options.url_template = template.to_string();
            self.source = UrlTemplateSource::new(
                self.options.url_template.clone(),
                self.options.subdomains.clone(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::{LatLng, Point};

    #[test]
    fn test_visible_tiles_cover_viewport() {
        let layer = TileLayer::new("tiles".into(), TileLayerOptions::default());
        let viewport = Viewport::new(LatLng::new(6.9271, 79.8425), 13.0, Point::new(800.0, 600.0));

        let tiles = layer.visible_tiles(&viewport);
        // 800x600 spans 4-5 columns and 3-4 rows of 256px tiles
        assert!(tiles.len() >= 12 && tiles.len() <= 20, "got {}", tiles.len());
        assert!(tiles.iter().all(|t| t.z == 13 && t.is_valid()));
        assert!(tiles.contains(&TileCoord::from_lat_lng(&viewport.center, 13)));
    }

    #[test]
    fn test_tile_zoom_is_clamped() {
        let options = TileLayerOptions {
            max_zoom: 10,
            ..TileLayerOptions::default()
        };
        let layer = TileLayer::new("tiles".into(), options);
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 16.0, Point::new(256.0, 256.0));
        assert_eq!(layer.tile_zoom(&viewport), 10);
    }

    #[test]
    fn test_zoom_beyond_tile_range_yields_no_tiles() {
        let options = TileLayerOptions {
            max_zoom: 70,
            ..TileLayerOptions::default()
        };
        let layer = TileLayer::new("tiles".into(), options);
        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0), 0.0, Point::new(256.0, 256.0));
        viewport.set_zoom_limits(0.0, 70.0);
        viewport.set_zoom(64.0);

        assert_eq!(layer.tile_zoom(&viewport), 64);
        assert!(layer.visible_tiles(&viewport).is_empty());
    }

    #[test]
    fn test_world_at_zoom_zero_is_one_tile() {
        let layer = TileLayer::new("tiles".into(), TileLayerOptions::default());
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 0.0, Point::new(256.0, 256.0));
        assert_eq!(layer.visible_tiles(&viewport), vec![TileCoord::new(0, 0, 0)]);
    }
}
