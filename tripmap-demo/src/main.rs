use anyhow::Context;
use std::{sync::Arc, time::Duration};
use tripmap::prelude::*;

const USER_LOCATION: LatLng = LatLng {
    lat: 6.9165,
    lng: 79.8610,
};

/// Headless walkthrough: mount, route, panorama, teardown
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tripmap::init_logging("info");

    let config = match std::env::args().nth(1) {
        Some(path) => PanelConfig::from_file(&path).with_context(|| format!("loading {path}"))?,
        None => PanelConfig::default(),
    };

    let places = StaticPlaces::colombo().list_places();
    let markers = markers_for(&places, Some(USER_LOCATION));

    let host = InMemoryScriptHost::new();
    let provider = ScriptTagProvider::new(host.clone(), config.panorama.clone());
    let loader = TileLoader::new(
        Arc::new(HttpTileFetcher::new()),
        TileCache::new(config.tiles.cache_size),
    );
    let mut panel =
        MapPanel::new(config, Box::new(provider)).with_tiles(loader, Arc::new(TokioSpawner));
    let mut container = HeadlessContainer::new(1200.0, 600.0);

    let view = MapViewState::new(LatLng::new(6.9271, 79.8425), 13);
    let mut props = PanelProps::new(view)
        .with_markers(markers)
        .with_class("h-[600px]");
    panel.render(&mut container, &props);

    let destination = places
        .iter()
        .find(|p| p.name == "Dutch Hospital Shopping Precinct")
        .context("sample places are missing the Dutch Hospital")?;
    props.path_request = Some(PathRequest::new(destination.coordinates, "driving"));
    panel.render(&mut container, &props);

    if let (Some(path), Some(map)) = (panel.path(), panel.map()) {
        log::info!(
            "{} route from {:?} to {:?}, {} points, viewport zoom {}",
            path.mode,
            path.origin,
            path.destination,
            path.points.len(),
            map.viewport.zoom
        );
    }

    props.panorama_enabled = true;
    if let Some(load) = panel.render(&mut container, &props).panorama_load {
        host.complete_latest(Arc::new(StaticPanoramaService::new(vec![PanoramaInfo {
            pano_id: "galle-face-green".to_string(),
            position: LatLng::new(6.9271, 79.8425),
            description: Some("Galle Face Green promenade".to_string()),
        }])));
        panel.finish_load(load.await);
    }

    // the route fit moved the viewport, so the control targets the route center
    if let Some(check) = panel.click_control(ControlKind::Panorama) {
        panel.apply_availability(check.await);
    }
    if let Some(overlay) = panel.overlay() {
        log::info!("overlay at {:?}: {:?}", overlay.target, overlay.content);
    }

    if let Some(check) = panel.click_popup_action(4, PopupAction::OpenPanorama) {
        panel.apply_availability(check.await);
    }
    if let Some(overlay) = panel.overlay() {
        log::info!("overlay at {:?}: {:?}", overlay.target, overlay.content);
    }
    panel.close_overlay();

    // give the tile batches a moment before tearing down
    tokio::time::sleep(Duration::from_millis(500)).await;

    panel.unmount(&mut container);
    for event in panel.drain_events() {
        log::debug!("{:?}", event);
    }
    log::info!(
        "scripts injected {}, removed {}, container bound: {}",
        host.injected_total(),
        host.removed_total(),
        container.bound_instance().is_some()
    );

    Ok(())
}
