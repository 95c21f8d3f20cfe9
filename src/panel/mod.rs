//! The interactive map panel
//!
//! [`MapPanel`] composes the lifecycle manager, the route renderer and the
//! panorama controller behind a props-driven `render` entry point. Hosts
//! call `render` whenever the caller's props change, drive the futures it
//! hands back and feed their results in again.

pub mod container;
pub mod lifecycle;
pub mod panorama;
pub mod path;
pub mod provider;

use crate::{
    core::{config::PanelConfig, geo::LatLng, map::MapId},
    runtime::AsyncSpawner,
    tiles::TileLoader,
    ui::{
        controls::{ControlKind, PanoramaControl},
        popup::PopupAction,
    },
};
use container::MapContainer;
use lifecycle::{MapLifecycle, MapViewState, MarkerSpec};
use panorama::{
    AvailabilityCheck, LoadCompletion, OverlaySession, PanoramaController, PendingAvailability,
    PendingLoad,
};
use path::{DrawnPath, PathRenderer, PathRequest, TransportMode};
use provider::PanoramaProvider;
use std::sync::Arc;

pub const DEFAULT_CLASS_NAME: &str = "h-[400px]";

/// Inputs supplied by the page hosting the panel
#[derive(Debug, Clone, PartialEq)]
pub struct PanelProps {
    pub view: MapViewState,
    pub markers: Vec<MarkerSpec>,
    pub path_request: Option<PathRequest>,
    pub panorama_enabled: bool,
    /// Size class applied to the container
    pub class_name: String,
}

impl PanelProps {
    pub fn new(view: MapViewState) -> Self {
        Self {
            view,
            markers: Vec::new(),
            path_request: None,
            panorama_enabled: false,
            class_name: DEFAULT_CLASS_NAME.to_string(),
        }
    }

    pub fn with_markers(mut self, markers: Vec<MarkerSpec>) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_path(mut self, request: Option<PathRequest>) -> Self {
        self.path_request = request;
        self
    }

    pub fn with_panorama(mut self, enabled: bool) -> Self {
        self.panorama_enabled = enabled;
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }
}

/// Things the panel did, in order, for host diagnostics
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    Mounted(MapId),
    MountDeferred,
    MountFailed(String),
    ViewReconciled { markers: usize },
    PathDrawn { mode: TransportMode },
    PathCleared,
    PanoramaLoading,
    PanoramaReady,
    PanoramaUnavailable,
    PanoramaDisabled,
    OverlayOpened { target: LatLng },
    OverlayUpdated,
    OverlayClosed,
    Unmounted(MapId),
}

/// What a render pass left for the host to drive
#[derive(Default)]
pub struct RenderOutcome {
    pub mounted: bool,
    /// Provider load started by this pass; feed it to [`MapPanel::finish_load`]
    pub panorama_load: Option<PendingLoad>,
}

pub struct MapPanel {
    lifecycle: MapLifecycle,
    paths: PathRenderer,
    panorama: PanoramaController,
    applied: Option<PanelProps>,
    events: Vec<PanelEvent>,
}

impl MapPanel {
    pub fn new(config: PanelConfig, provider: Box<dyn PanoramaProvider>) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("panel config is invalid, mounting will fail: {}", e);
        }
        let paths = PathRenderer::new(config.path);
        let panorama = PanoramaController::new(config.panorama.clone(), provider);
        Self {
            lifecycle: MapLifecycle::new(config),
            paths,
            panorama,
            applied: None,
            events: Vec::new(),
        }
    }

    pub fn with_tiles(mut self, loader: TileLoader, spawner: Arc<dyn AsyncSpawner>) -> Self {
        self.lifecycle = self.lifecycle.with_tiles(loader, spawner);
        self
    }

    pub fn lifecycle(&self) -> &MapLifecycle {
        &self.lifecycle
    }

    pub fn map(&self) -> Option<&crate::core::map::Map> {
        self.lifecycle.map()
    }

    pub fn path(&self) -> Option<&DrawnPath> {
        self.paths.current()
    }

    pub fn panorama(&self) -> &PanoramaController {
        &self.panorama
    }

    pub fn overlay(&self) -> Option<&OverlaySession> {
        self.panorama.session()
    }

    pub fn drain_events(&mut self) -> Vec<PanelEvent> {
        std::mem::take(&mut self.events)
    }

    /// Reconciles the panel with `props`.
    ///
    /// Mounts on the first pass the container is ready for; later passes only
    /// touch what changed since the last applied props.
    pub fn render(
        &mut self,
        container: &mut dyn MapContainer,
        props: &PanelProps,
    ) -> RenderOutcome {
        container.apply_class(&props.class_name);

        let fresh = !self.lifecycle.is_mounted();
        if fresh {
            match self.lifecycle.mount(container, &props.view, &props.markers) {
                Ok(true) => {
                    if let Some(map) = self.lifecycle.map() {
                        self.events.push(PanelEvent::Mounted(map.id()));
                    }
                }
                Ok(false) => {
                    self.events.push(PanelEvent::MountDeferred);
                    return RenderOutcome::default();
                }
                Err(e) => {
                    log::warn!("map initialization failed, retrying on next render: {}", e);
                    self.events.push(PanelEvent::MountFailed(e.to_string()));
                    return RenderOutcome::default();
                }
            }
        }

        if !fresh {
            self.lifecycle.sync_size(container);
        }

        let previous = if fresh { None } else { self.applied.take() };

        let view_changed = previous
            .as_ref()
            .map_or(false, |p| p.view != props.view || p.markers != props.markers);
        if view_changed {
            match self.lifecycle.apply_view_state(&props.view, &props.markers) {
                Ok(_) => self.events.push(PanelEvent::ViewReconciled {
                    markers: props.markers.len(),
                }),
                Err(e) => log::warn!("view reconciliation failed: {}", e),
            }
        }

        let path_changed = previous
            .as_ref()
            .map_or(true, |p| p.path_request != props.path_request);
        self.sync_path(props, path_changed);

        let panorama_changed = previous
            .as_ref()
            .map_or(true, |p| p.panorama_enabled != props.panorama_enabled);
        let panorama_load = if panorama_changed {
            self.sync_panorama(props.panorama_enabled)
        } else {
            None
        };

        self.applied = Some(props.clone());
        self.flush_map_events();
        RenderOutcome {
            mounted: true,
            panorama_load,
        }
    }

    /// Map-level events are only diagnostics for the panel; the panel events
    /// cover what hosts act on
    fn flush_map_events(&mut self) {
        if let Some(map) = self.lifecycle.map_mut() {
            for event in map.drain_events() {
                log::trace!("{}: {:?}", map.id(), event);
            }
        }
    }

    /// Draws or clears the route when the request or its resolved origin changed
    fn sync_path(&mut self, props: &PanelProps, request_changed: bool) {
        let Some(map) = self.lifecycle.map_mut() else {
            return;
        };

        match &props.path_request {
            Some(request) => {
                let origin = request.resolve_origin(&props.markers, props.view.center);
                let origin_moved = self.paths.current().map_or(true, |p| p.origin != origin);
                if !request_changed && !origin_moved {
                    return;
                }
                match self.paths.draw(map, request, &props.markers, props.view.center) {
                    Ok(_) => self.events.push(PanelEvent::PathDrawn {
                        mode: request.mode.clone(),
                    }),
                    Err(e) => log::warn!("could not draw route: {}", e),
                }
            }
            None => {
                if self.paths.clear(map) {
                    self.events.push(PanelEvent::PathCleared);
                }
            }
        }
    }

    fn sync_panorama(&mut self, enabled: bool) -> Option<PendingLoad> {
        self.lifecycle.set_marker_action(PopupAction::OpenPanorama, enabled);

        if enabled {
            if let Some(map) = self.lifecycle.map_mut() {
                map.controls_mut().add_panorama_control(PanoramaControl::default());
            }
            let load = self.panorama.enable();
            if load.is_some() {
                self.events.push(PanelEvent::PanoramaLoading);
            }
            load
        } else {
            if let Some(map) = self.lifecycle.map_mut() {
                map.controls_mut().remove_panorama_control();
            }
            if self.panorama.disable() {
                self.events.push(PanelEvent::PanoramaDisabled);
            }
            None
        }
    }

    pub fn finish_load(&mut self, completion: LoadCompletion) -> bool {
        let ok = completion.is_ok();
        let applied = self.panorama.finish_load(completion);
        if applied {
            self.events.push(PanelEvent::PanoramaReady);
        } else if !ok && self.panorama.is_enabled() && !self.panorama.is_loading() {
            self.events.push(PanelEvent::PanoramaUnavailable);
        }
        applied
    }

    /// Opens the marker's popup; the popup lists the actions it offers
    pub fn open_marker_popup(&mut self, marker_index: usize) -> bool {
        let Some(id) = self.lifecycle.marker_id(marker_index).map(str::to_string) else {
            return false;
        };
        let opened = self
            .lifecycle
            .map_mut()
            .map_or(false, |map| map.open_popup(&id));
        self.flush_map_events();
        opened
    }

    /// Handles a click on an action inside marker `marker_index`'s popup
    pub fn click_popup_action(
        &mut self,
        marker_index: usize,
        action: PopupAction,
    ) -> Option<PendingAvailability> {
        let Some(marker) = self.lifecycle.marker(marker_index) else {
            log::debug!("popup action on unknown marker {}", marker_index);
            return None;
        };
        if !marker.has_action(action) {
            log::debug!("marker {} does not offer {:?}", marker_index, action);
            return None;
        }

        match action {
            PopupAction::OpenPanorama => {
                let target = marker.position();
                self.open_overlay(target)
            }
        }
    }

    /// Handles a click on one of the map controls
    pub fn click_control(&mut self, kind: ControlKind) -> Option<PendingAvailability> {
        match kind {
            ControlKind::Panorama => {
                let map = self.lifecycle.map()?;
                let Some(control) = map.controls().panorama_control() else {
                    log::debug!("panorama control clicked but not registered");
                    return None;
                };
                let target = control.target(&map.viewport);
                self.open_overlay(target)
            }
            ControlKind::Attribution => None,
        }
    }

    fn open_overlay(&mut self, target: LatLng) -> Option<PendingAvailability> {
        let check = self.panorama.open(target)?;
        self.events.push(PanelEvent::OverlayOpened { target });
        Some(check)
    }

    pub fn apply_availability(&mut self, check: AvailabilityCheck) -> bool {
        let applied = self.panorama.apply_availability(check);
        if applied {
            self.events.push(PanelEvent::OverlayUpdated);
        }
        applied
    }

    /// The close button rendered inside the overlay
    pub fn close_overlay(&mut self) -> bool {
        let closed = self.panorama.close();
        if closed {
            self.events.push(PanelEvent::OverlayClosed);
        }
        closed
    }

    /// Releases the map, the route and the panorama resources
    pub fn unmount(&mut self, container: &mut dyn MapContainer) -> bool {
        if self.panorama.disable() {
            self.events.push(PanelEvent::PanoramaDisabled);
        }
        match self.lifecycle.map_mut() {
            Some(map) => {
                self.paths.clear(map);
            }
            None => self.paths.reset(),
        }

        let id = self.lifecycle.map().map(|m| m.id());
        self.applied = None;
        let released = self.lifecycle.unmount(container);
        if let (true, Some(id)) = (released, id) {
            self.events.push(PanelEvent::Unmounted(id));
        }
        released
    }
}
