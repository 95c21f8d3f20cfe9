use crate::{
    core::{
        geo::{LatLng, LatLngBounds, Point},
        viewport::{FitBoundsOptions, Viewport},
    },
    layers::{base::LayerTrait, manager::LayerManager, marker::MarkerLayer},
    ui::controls::ControlManager,
    MapError, Result,
};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_MAP_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one map instance, used by containers to reference it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapId(u64);

impl MapId {
    fn next() -> Self {
        Self(NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MapId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "map-{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct MapOptions {
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            min_zoom: 0.0,
            max_zoom: 19.0,
        }
    }
}

/// Map event types the host can react to
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Map view has changed (center or zoom)
    ViewChanged { center: LatLng, zoom: f64 },
    /// Layer was added to the map
    LayerAdd { layer_id: String },
    /// Layer was removed from the map
    LayerRemove { layer_id: String },
    /// A marker popup was opened
    PopupOpen { layer_id: String },
    /// The open popup was closed
    PopupClose { layer_id: String },
}

/// One map instance: viewport, layers, controls and popup state
pub struct Map {
    id: MapId,
    pub viewport: Viewport,
    layer_manager: LayerManager,
    controls: ControlManager,
    open_popup: Option<String>,
    events: Vec<MapEvent>,
}

impl Map {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Result<Self> {
        Self::with_options(center, zoom, size, MapOptions::default())
    }

    pub fn with_options(
        center: LatLng,
        zoom: f64,
        size: Point,
        options: MapOptions,
    ) -> Result<Self> {
        if !size.has_area() {
            return Err(MapError::Initialization(format!(
                "container has no area ({}x{})",
                size.x, size.y
            )));
        }
        if !center.lat.is_finite() || !center.lng.is_finite() {
            return Err(MapError::Initialization(format!("invalid center {:?}", center)));
        }

        if options.min_zoom > options.max_zoom {
            return Err(MapError::Initialization(format!(
                "min zoom {} exceeds max zoom {}",
                options.min_zoom, options.max_zoom
            )));
        }

        let mut viewport = Viewport::new(center, zoom, size);
        viewport.set_zoom_limits(options.min_zoom, options.max_zoom);
        viewport.set_view(center, zoom);

        let id = MapId::next();
        log::debug!("created {} at {:?} zoom {}", id, center, zoom);

        Ok(Self {
            id,
            viewport,
            layer_manager: LayerManager::new(),
            controls: ControlManager::new(),
            open_popup: None,
            events: Vec::new(),
        })
    }

    pub fn id(&self) -> MapId {
        self.id
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        let old_center = self.viewport.center;
        let old_zoom = self.viewport.zoom;

        self.viewport.set_view(center, zoom);

        if self.viewport.center != old_center || self.viewport.zoom != old_zoom {
            self.emit_view_changed();
        }
    }

    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, options: FitBoundsOptions) {
        self.viewport.fit_bounds(bounds, options);
        self.emit_view_changed();
    }

    fn emit_view_changed(&mut self) {
        self.events.push(MapEvent::ViewChanged {
            center: self.viewport.center,
            zoom: self.viewport.zoom,
        });
    }

    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        self.layer_manager.add_layer(layer)?;
        self.events.push(MapEvent::LayerAdd { layer_id });
        Ok(())
    }

    pub fn remove_layer(&mut self, layer_id: &str) -> bool {
        if self.open_popup.as_deref() == Some(layer_id) {
            self.close_popup();
        }
        let removed = self.layer_manager.remove_layer(layer_id).is_some();
        if removed {
            self.events.push(MapEvent::LayerRemove {
                layer_id: layer_id.to_string(),
            });
        }
        removed
    }

    pub fn has_layer(&self, layer_id: &str) -> bool {
        self.layer_manager.contains(layer_id)
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layer_manager
    }

    pub fn layers_mut(&mut self) -> &mut LayerManager {
        &mut self.layer_manager
    }

    pub fn controls(&self) -> &ControlManager {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut ControlManager {
        &mut self.controls
    }

    /// Opens a marker's popup, closing any other one first
    pub fn open_popup(&mut self, layer_id: &str) -> bool {
        if self.layer_manager.get_as::<MarkerLayer>(layer_id).is_none() {
            log::debug!("{}: no marker '{}' to open a popup on", self.id, layer_id);
            return false;
        }
        if self.open_popup.as_deref() == Some(layer_id) {
            return true;
        }
        self.close_popup();

        if let Some(marker) = self.layer_manager.get_as_mut::<MarkerLayer>(layer_id) {
            marker.popup_mut().show();
        }
        self.open_popup = Some(layer_id.to_string());
        self.events.push(MapEvent::PopupOpen {
            layer_id: layer_id.to_string(),
        });
        true
    }

    pub fn close_popup(&mut self) {
        if let Some(layer_id) = self.open_popup.take() {
            if let Some(marker) = self.layer_manager.get_as_mut::<MarkerLayer>(&layer_id) {
                marker.popup_mut().hide();
            }
            self.events.push(MapEvent::PopupClose { layer_id });
        }
    }

    pub fn open_popup_id(&self) -> Option<&str> {
        self.open_popup.as_deref()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Takes the events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.events)
    }

    /// Detaches every layer and control; the instance is unusable afterwards
    pub fn remove(mut self) {
        self.close_popup();
        let layer_count = self.layer_manager.len();
        self.layer_manager.clear();
        self.controls.clear();
        self.events.clear();
        log::debug!("removed {} ({} layers released)", self.id, layer_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::marker::MarkerLayer;

    fn map() -> Map {
        Map::new(LatLng::new(6.9271, 79.8425), 13.0, Point::new(800.0, 600.0)).unwrap()
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(map().id(), map().id());
    }

    #[test]
    fn test_zero_sized_container_is_rejected() {
        let result = Map::new(LatLng::new(0.0, 0.0), 3.0, Point::new(0.0, 400.0));
        assert!(matches!(result, Err(MapError::Initialization(_))));
    }

    #[test]
    fn test_inverted_zoom_limits_are_rejected() {
        let options = MapOptions {
            min_zoom: 10.0,
            max_zoom: 5.0,
        };
        let size = Point::new(400.0, 400.0);
        let result = Map::with_options(LatLng::new(0.0, 0.0), 7.0, size, options);
        assert!(matches!(result, Err(MapError::Initialization(_))));
    }

    #[test]
    fn test_set_view_emits_once_per_change() {
        let mut map = map();
        map.set_view(LatLng::new(6.9271, 79.8425), 13.0);
        assert!(map.drain_events().is_empty());

        map.set_view(LatLng::new(6.9146, 79.8611), 16.0);
        assert_eq!(
            map.drain_events(),
            vec![MapEvent::ViewChanged {
                center: LatLng::new(6.9146, 79.8611),
                zoom: 16.0
            }]
        );
    }

    #[test]
    fn test_single_open_popup() {
        let mut map = map();
        for id in ["a", "b"] {
            map.add_layer(Box::new(MarkerLayer::new(id.into(), LatLng::new(6.9, 79.8), id.into())))
                .unwrap();
        }

        assert!(map.open_popup("a"));
        assert!(map.open_popup("b"));
        assert_eq!(map.open_popup_id(), Some("b"));
        assert!(!map.layers().get_as::<MarkerLayer>("a").unwrap().popup().visible);
        assert!(map.layers().get_as::<MarkerLayer>("b").unwrap().popup().visible);
        assert!(!map.open_popup("missing"));

        assert!(map.remove_layer("b"));
        assert_eq!(map.open_popup_id(), None);
    }
}
