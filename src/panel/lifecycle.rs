//! Map lifecycle: one instance per mounted container, kept in sync with the
//! caller's view state and marker list.

use crate::{
    core::{
        config::PanelConfig,
        constants::USER_LOCATION_TITLE,
        geo::LatLng,
        map::{Map, MapOptions},
    },
    layers::{marker::MarkerLayer, tile::TileLayer},
    panel::container::MapContainer,
    runtime::{AsyncHandle, AsyncSpawner},
    tiles::TileLoader,
    ui::{
        controls::Attribution,
        popup::{PopupAction, PopupContent},
    },
    Result,
};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const TILE_LAYER_ID: &str = "base-tiles";

/// Caller-owned view state the map reconciles to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapViewState {
    pub center: LatLng,
    pub zoom: u8,
}

impl MapViewState {
    pub fn new(center: LatLng, zoom: u8) -> Self {
        Self { center, zoom }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKind {
    Place,
    /// The traveller's own position; used as a route origin
    UserLocation,
}

/// A point of interest as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub position: LatLng,
    pub title: String,
    pub popup_html: Option<String>,
    pub kind: MarkerKind,
}

impl MarkerSpec {
    /// A marker titled "Your Location" is typed as the user's location here,
    /// so nothing downstream compares titles.
    pub fn new(position: LatLng, title: impl Into<String>) -> Self {
        let title = title.into();
        let kind = if title == USER_LOCATION_TITLE {
            MarkerKind::UserLocation
        } else {
            MarkerKind::Place
        };
        Self {
            position,
            title,
            popup_html: None,
            kind,
        }
    }

    pub fn user_location(position: LatLng) -> Self {
        Self {
            kind: MarkerKind::UserLocation,
            ..Self::new(position, USER_LOCATION_TITLE)
        }
    }

    pub fn with_popup(mut self, html: impl Into<String>) -> Self {
        self.popup_html = Some(html.into());
        self
    }

    pub fn with_kind(mut self, kind: MarkerKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn is_user_location(&self) -> bool {
        self.kind == MarkerKind::UserLocation
    }
}

/// Owns the map instance bound to a container
pub struct MapLifecycle {
    config: PanelConfig,
    map: Option<Map>,
    marker_ids: Vec<String>,
    marker_actions: Vec<PopupAction>,
    tile_loader: Option<TileLoader>,
    spawner: Option<Arc<dyn AsyncSpawner>>,
    tile_tasks: Vec<Box<dyn AsyncHandle>>,
}

impl MapLifecycle {
    pub fn new(config: PanelConfig) -> Self {
        Self {
            config,
            map: None,
            marker_ids: Vec::new(),
            marker_actions: Vec::new(),
            tile_loader: None,
            spawner: None,
            tile_tasks: Vec::new(),
        }
    }

    /// Enables tile fetching; without it the background stays blank
    pub fn with_tiles(mut self, loader: TileLoader, spawner: Arc<dyn AsyncSpawner>) -> Self {
        self.tile_loader = Some(loader);
        self.spawner = Some(spawner);
        self
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn is_mounted(&self) -> bool {
        self.map.is_some()
    }

    pub fn map(&self) -> Option<&Map> {
        self.map.as_ref()
    }

    pub fn map_mut(&mut self) -> Option<&mut Map> {
        self.map.as_mut()
    }

    /// Creates the map instance if the container is ready.
    ///
    /// Returns `Ok(false)` when the container is not ready yet; the caller
    /// retries on its next render pass.
    pub fn mount(
        &mut self,
        container: &mut dyn MapContainer,
        view: &MapViewState,
        markers: &[MarkerSpec],
    ) -> Result<bool> {
        if self.map.is_some() {
            return Ok(true);
        }
        if !container.is_ready() {
            log::debug!("container not ready, deferring map creation");
            return Ok(false);
        }

        let tiles = &self.config.tiles;
        let options = MapOptions {
            min_zoom: tiles.min_zoom as f64,
            max_zoom: tiles.max_zoom as f64,
        };
        let mut map = Map::with_options(view.center, view.zoom as f64, container.size(), options)?;

        map.add_layer(Box::new(TileLayer::new(TILE_LAYER_ID.to_string(), tiles.clone())))?;
        map.controls_mut()
            .set_attribution(tiles.attribution.clone().map(Attribution::new));

        container.bind(map.id())?;
        log::info!("mounted {} ({} markers)", map.id(), markers.len());

        self.map = Some(map);
        self.replace_markers(markers)?;
        self.request_tiles();
        Ok(true)
    }

    /// Resets the viewport to `view` and fully replaces the markers.
    ///
    /// Calling it twice with the same arguments leaves the same scene.
    /// Returns false when nothing is mounted.
    pub fn apply_view_state(
        &mut self,
        view: &MapViewState,
        markers: &[MarkerSpec],
    ) -> Result<bool> {
        let Some(map) = self.map.as_mut() else {
            return Ok(false);
        };
        map.set_view(view.center, view.zoom as f64);
        self.replace_markers(markers)?;
        self.request_tiles();
        Ok(true)
    }

    /// Follows the container's size; a zero-area container keeps the last size
    pub fn sync_size(&mut self, container: &dyn MapContainer) -> bool {
        let size = container.size();
        let Some(map) = self.map.as_mut() else {
            return false;
        };
        if !size.has_area() || map.viewport.size == size {
            return false;
        }
        log::debug!("{}: resized to {}x{}", map.id(), size.x, size.y);
        map.viewport.set_size(size);
        self.request_tiles();
        true
    }

    fn replace_markers(&mut self, markers: &[MarkerSpec]) -> Result<()> {
        let Some(map) = self.map.as_mut() else {
            return Ok(());
        };

        for id in self.marker_ids.drain(..) {
            map.remove_layer(&id);
        }

        for (index, spec) in markers.iter().enumerate() {
            let id = format!("marker-{index}");
            let mut layer = MarkerLayer::new(id.clone(), spec.position, spec.title.clone())
                .with_icon(self.config.marker_icon.clone())
                .with_popup(PopupContent::for_marker(&spec.title, spec.popup_html.as_deref()));
            for action in &self.marker_actions {
                layer.popup_mut().add_action(*action);
            }
            map.add_layer(Box::new(layer))?;
            self.marker_ids.push(id);
        }
        Ok(())
    }

    /// Attaches or detaches a popup action on every current and future marker
    pub fn set_marker_action(&mut self, action: PopupAction, enabled: bool) {
        if enabled {
            if !self.marker_actions.contains(&action) {
                self.marker_actions.push(action);
            }
        } else {
            self.marker_actions.retain(|a| *a != action);
        }

        if let Some(map) = self.map.as_mut() {
            for id in &self.marker_ids {
                if let Some(marker) = map.layers_mut().get_as_mut::<MarkerLayer>(id) {
                    if enabled {
                        marker.popup_mut().add_action(action);
                    } else {
                        marker.popup_mut().remove_action(action);
                    }
                }
            }
        }
    }

    pub fn marker_count(&self) -> usize {
        self.marker_ids.len()
    }

    /// Layer id of the marker built from `markers[index]`
    pub fn marker_id(&self, index: usize) -> Option<&str> {
        self.marker_ids.get(index).map(String::as_str)
    }

    pub fn marker(&self, index: usize) -> Option<&MarkerLayer> {
        let id = self.marker_ids.get(index)?;
        self.map.as_ref()?.layers().get_as::<MarkerLayer>(id)
    }

    /// Schedules a fetch of the tiles covering the current viewport
    pub fn request_tiles(&mut self) {
        self.tile_tasks.retain(|task| !task.is_finished());

        let (Some(map), Some(loader), Some(spawner)) =
            (self.map.as_ref(), self.tile_loader.as_ref(), self.spawner.as_ref())
        else {
            return;
        };
        let Some(tile_layer) = map.layers().get_as::<TileLayer>(TILE_LAYER_ID) else {
            return;
        };

        let requests: Vec<_> = tile_layer
            .visible_tiles(&map.viewport)
            .into_iter()
            .map(|coord| (coord, tile_layer.tile_url(coord)))
            .collect();
        if requests.is_empty() {
            return;
        }

        let map_id = map.id();
        let batch = loader.load_batch(requests).map(move |report| {
            if report.failed > 0 {
                log::warn!(
                    "{}: {} of {} tiles failed to load",
                    map_id,
                    report.failed,
                    report.requested
                );
            } else {
                log::debug!("{}: tiles ready {:?}", map_id, report);
            }
        });
        self.tile_tasks.push(spawner.spawn_boxed(batch.boxed()));
    }

    pub fn pending_tile_tasks(&self) -> usize {
        self.tile_tasks.iter().filter(|task| !task.is_finished()).count()
    }

    /// Releases the instance and everything attached to it.
    ///
    /// Unmounting twice is a no-op.
    pub fn unmount(&mut self, container: &mut dyn MapContainer) -> bool {
        for task in self.tile_tasks.drain(..) {
            task.cancel();
        }
        self.marker_ids.clear();

        let Some(map) = self.map.take() else {
            return false;
        };
        let id = map.id();
        if container.bound_instance() == Some(id) {
            container.release();
        }
        map.remove();
        log::info!("unmounted {}", id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::base::LayerType;
    use crate::panel::container::HeadlessContainer;

    fn view() -> MapViewState {
        MapViewState::new(LatLng::new(6.9271, 79.8425), 13)
    }

    fn places() -> Vec<MarkerSpec> {
        vec![
            MarkerSpec::new(LatLng::new(6.9102, 79.8652), "Colombo National Museum"),
            MarkerSpec::new(LatLng::new(6.9146, 79.8611), "Viharamahadevi Park")
                .with_popup("<b>Viharamahadevi Park</b>"),
        ]
    }

    #[test]
    fn test_title_sentinel_becomes_kind() {
        assert!(MarkerSpec::new(LatLng::new(0.0, 0.0), "Your Location").is_user_location());
        assert!(!MarkerSpec::new(LatLng::new(0.0, 0.0), "your location").is_user_location());
        assert_eq!(MarkerSpec::user_location(LatLng::new(1.0, 1.0)).title, "Your Location");
    }

    #[test]
    fn test_mount_deferred_until_ready() {
        let mut lifecycle = MapLifecycle::new(PanelConfig::default());
        let mut container = HeadlessContainer::detached(800.0, 600.0);

        assert!(!lifecycle.mount(&mut container, &view(), &places()).unwrap());
        assert!(!lifecycle.is_mounted());
        assert!(container.bound_instance().is_none());

        container.attach();
        assert!(lifecycle.mount(&mut container, &view(), &places()).unwrap());
        let id = lifecycle.map().unwrap().id();
        assert_eq!(container.bound_instance(), Some(id));

        // a second mount keeps the same instance
        assert!(lifecycle.mount(&mut container, &view(), &places()).unwrap());
        assert_eq!(lifecycle.map().unwrap().id(), id);
    }

    #[test]
    fn test_mount_builds_scene() {
        let mut lifecycle = MapLifecycle::new(PanelConfig::default());
        let mut container = HeadlessContainer::new(800.0, 600.0);
        lifecycle.mount(&mut container, &view(), &places()).unwrap();

        let map = lifecycle.map().unwrap();
        assert_eq!(map.layers().count_of_type(LayerType::Tile), 1);
        assert_eq!(map.layers().count_of_type(LayerType::Marker), 2);
        assert_eq!(
            map.controls().attribution().unwrap().text,
            "© OpenStreetMap contributors"
        );
        assert_eq!(map.viewport.zoom, 13.0);

        let museum = lifecycle.marker(0).unwrap();
        assert_eq!(museum.popup().content, PopupContent::Text("Colombo National Museum".into()));
        let park = lifecycle.marker(1).unwrap();
        assert_eq!(park.popup().content, PopupContent::Html("<b>Viharamahadevi Park</b>".into()));
    }

    #[test]
    fn test_apply_view_state_is_idempotent() {
        let mut lifecycle = MapLifecycle::new(PanelConfig::default());
        let mut container = HeadlessContainer::new(800.0, 600.0);
        lifecycle.mount(&mut container, &view(), &places()).unwrap();

        let next = MapViewState::new(LatLng::new(6.9146, 79.8611), 16);
        lifecycle.apply_view_state(&next, &places()).unwrap();
        lifecycle.apply_view_state(&next, &places()).unwrap();

        let map = lifecycle.map().unwrap();
        assert_eq!(map.viewport.center, next.center);
        assert_eq!(map.viewport.zoom, 16.0);
        assert_eq!(map.layers().count_of_type(LayerType::Marker), 2);
    }

    #[test]
    fn test_marker_actions_follow_replacements() {
        let mut lifecycle = MapLifecycle::new(PanelConfig::default());
        let mut container = HeadlessContainer::new(800.0, 600.0);
        lifecycle.mount(&mut container, &view(), &places()).unwrap();

        lifecycle.set_marker_action(PopupAction::OpenPanorama, true);
        assert!(lifecycle.marker(0).unwrap().has_action(PopupAction::OpenPanorama));

        lifecycle.apply_view_state(&view(), &places()[..1]).unwrap();
        assert!(lifecycle.marker(0).unwrap().has_action(PopupAction::OpenPanorama));

        lifecycle.set_marker_action(PopupAction::OpenPanorama, false);
        assert!(!lifecycle.marker(0).unwrap().has_action(PopupAction::OpenPanorama));
    }

    #[test]
    fn test_unmount_releases_container_once() {
        let mut lifecycle = MapLifecycle::new(PanelConfig::default());
        let mut container = HeadlessContainer::new(800.0, 600.0);
        lifecycle.mount(&mut container, &view(), &places()).unwrap();

        assert!(lifecycle.unmount(&mut container));
        assert!(container.bound_instance().is_none());
        assert!(lifecycle.map().is_none());
        assert_eq!(lifecycle.marker_count(), 0);
        assert!(!lifecycle.unmount(&mut container));
    }

    #[test]
    fn test_viewport_follows_container_size() {
        let mut lifecycle = MapLifecycle::new(PanelConfig::default());
        let mut container = HeadlessContainer::new(800.0, 600.0);
        lifecycle.mount(&mut container, &view(), &places()).unwrap();

        container.resize(800.0, 600.0);
        assert!(!lifecycle.sync_size(&container));
        container.resize(1024.0, 400.0);
        assert!(lifecycle.sync_size(&container));
        assert_eq!(lifecycle.map().unwrap().viewport.size.x, 1024.0);

        container.resize(0.0, 0.0);
        assert!(!lifecycle.sync_size(&container));
    }

    #[test]
    fn test_apply_before_mount_is_noop() {
        let mut lifecycle = MapLifecycle::new(PanelConfig::default());
        assert!(!lifecycle.apply_view_state(&view(), &places()).unwrap());
    }
}
