//! Panorama provider seam
//!
//! A provider loads the third-party client library once per enable cycle and
//! hands back a [`PanoramaService`] through a future. The script based
//! provider injects a tag through a [`ScriptHost`]; the host resolves the
//! tag's one-shot channel when the library reports ready.

use crate::{
    core::{config::PanoramaConfig, geo::LatLng},
    MapError, Result,
};
use async_trait::async_trait;
use futures::{
    channel::oneshot,
    future::{self, BoxFuture, FutureExt},
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Imagery found near a requested coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanoramaInfo {
    pub pano_id: String,
    pub position: LatLng,
    pub description: Option<String>,
}

/// A loaded panorama client
#[async_trait]
pub trait PanoramaService: Send + Sync {
    /// Looks for imagery within `radius_m` of `target`; `Ok(None)` when there is none
    async fn find_panorama(&self, target: LatLng, radius_m: f64) -> Result<Option<PanoramaInfo>>;
}

pub type ServiceLoad = BoxFuture<'static, Result<Arc<dyn PanoramaService>>>;

/// Loads and tears down the panorama client library
pub trait PanoramaProvider: Send {
    /// Starts loading; the future resolves once
    fn load(&mut self) -> ServiceLoad;

    /// Releases whatever `load` installed; a no-op when nothing is loaded
    fn unload(&mut self);

    fn is_installed(&self) -> bool;
}

/// Panorama service over a fixed set of capture points
#[derive(Debug, Clone, Default)]
pub struct StaticPanoramaService {
    panoramas: Vec<PanoramaInfo>,
}

impl StaticPanoramaService {
    pub fn new(panoramas: Vec<PanoramaInfo>) -> Self {
        Self { panoramas }
    }
}

#[async_trait]
impl PanoramaService for StaticPanoramaService {
    async fn find_panorama(&self, target: LatLng, radius_m: f64) -> Result<Option<PanoramaInfo>> {
        let nearest = self
            .panoramas
            .iter()
            .map(|p| (p.position.distance_to(&target), p))
            .filter(|(distance, _)| *distance <= radius_m)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p.clone());
        Ok(nearest)
    }
}

/// Reports whether a script load succeeded
pub type ScriptCallback = oneshot::Sender<Result<Arc<dyn PanoramaService>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub id: String,
    pub src: String,
}

/// The page (or a stand-in) that script tags are injected into
pub trait ScriptHost: Send {
    fn inject(&mut self, tag: ScriptTag, on_load: ScriptCallback) -> Result<()>;

    /// Removes the tag and drops its pending callback
    fn remove(&mut self, id: &str) -> bool;
}

/// Provider that loads the client library through a script tag
pub struct ScriptTagProvider<H: ScriptHost> {
    host: H,
    config: PanoramaConfig,
    installed: Option<String>,
    loads: u64,
}

impl<H: ScriptHost> ScriptTagProvider<H> {
    pub fn new(host: H, config: PanoramaConfig) -> Self {
        Self {
            host,
            config,
            installed: None,
            loads: 0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: ScriptHost> PanoramaProvider for ScriptTagProvider<H> {
    fn load(&mut self) -> ServiceLoad {
        if let Some(id) = &self.installed {
            let err = MapError::Panorama(format!("script {id} is already installed"));
            return future::ready(Err(err)).boxed();
        }

        self.loads += 1;
        let tag = ScriptTag {
            id: format!("panorama-script-{}", self.loads),
            src: self.config.resolved_script_url(),
        };
        let (tx, rx) = oneshot::channel();

        let id = tag.id.clone();
        if let Err(e) = self.host.inject(tag, tx) {
            log::warn!("could not inject panorama script: {}", e);
            return future::ready(Err(e)).boxed();
        }
        log::debug!("injected {}", id);
        self.installed = Some(id.clone());

        async move {
            match rx.await {
                Ok(result) => result,
                Err(_) => Err(MapError::Panorama(format!("{id} was removed before it loaded"))),
            }
        }
        .boxed()
    }

    fn unload(&mut self) {
        if let Some(id) = self.installed.take() {
            self.host.remove(&id);
            log::debug!("removed {}", id);
        }
    }

    fn is_installed(&self) -> bool {
        self.installed.is_some()
    }
}

#[derive(Default)]
struct InjectedScripts {
    tags: Vec<(ScriptTag, Option<ScriptCallback>)>,
    injected_total: usize,
    removed_total: usize,
}

/// Script host without a page; the owner decides when scripts finish loading.
///
/// Clones share the same state.
#[derive(Clone, Default)]
pub struct InMemoryScriptHost {
    state: Arc<Mutex<InjectedScripts>>,
}

impl InMemoryScriptHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.tags.iter().map(|(tag, _)| tag.id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn scripts(&self) -> Vec<ScriptTag> {
        self.state
            .lock()
            .map(|s| s.tags.iter().map(|(tag, _)| tag.clone()).collect())
            .unwrap_or_default()
    }

    /// Callbacks still waiting for their script
    pub fn pending_callbacks(&self) -> usize {
        self.state
            .lock()
            .map(|s| s.tags.iter().filter(|(_, cb)| cb.is_some()).count())
            .unwrap_or(0)
    }

    pub fn injected_total(&self) -> usize {
        self.state.lock().map(|s| s.injected_total).unwrap_or(0)
    }

    pub fn removed_total(&self) -> usize {
        self.state.lock().map(|s| s.removed_total).unwrap_or(0)
    }

    /// Fires the load callback of the most recent pending script
    pub fn complete_latest(&self, service: Arc<dyn PanoramaService>) -> bool {
        self.resolve_latest(Ok(service))
    }

    pub fn fail_latest(&self, reason: &str) -> bool {
        self.resolve_latest(Err(MapError::Panorama(reason.to_string())))
    }

    fn resolve_latest(&self, result: Result<Arc<dyn PanoramaService>>) -> bool {
        let callback = self.state.lock().ok().and_then(|mut s| {
            s.tags.iter_mut().rev().find_map(|(_, cb)| cb.take())
        });
        match callback {
            Some(cb) => cb.send(result).is_ok(),
            None => false,
        }
    }
}

impl ScriptHost for InMemoryScriptHost {
    fn inject(&mut self, tag: ScriptTag, on_load: ScriptCallback) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| MapError::Panorama("script host state poisoned".to_string()))?;
        if state.tags.iter().any(|(t, _)| t.id == tag.id) {
            return Err(MapError::Panorama(format!("duplicate script id {}", tag.id)));
        }
        state.tags.push((tag, Some(on_load)));
        state.injected_total += 1;
        Ok(())
    }

    fn remove(&mut self, id: &str) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        let before = state.tags.len();
        state.tags.retain(|(tag, _)| tag.id != id);
        let removed = state.tags.len() < before;
        if removed {
            state.removed_total += 1;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn gallery() -> Arc<dyn PanoramaService> {
        Arc::new(StaticPanoramaService::new(vec![PanoramaInfo {
            pano_id: "galle-face".into(),
            position: LatLng::new(6.9271, 79.8425),
            description: Some("Galle Face Green".into()),
        }]))
    }

    #[test]
    fn test_static_service_respects_radius() {
        let service = gallery();
        let near = block_on(service.find_panorama(LatLng::new(6.92712, 79.84252), 50.0)).unwrap();
        assert_eq!(near.unwrap().pano_id, "galle-face");

        let far = block_on(service.find_panorama(LatLng::new(6.9344, 79.8428), 50.0)).unwrap();
        assert!(far.is_none());
    }

    #[test]
    fn test_script_load_resolves_once() {
        let host = InMemoryScriptHost::new();
        let mut provider = ScriptTagProvider::new(host.clone(), PanoramaConfig::default());

        let load = provider.load();
        assert_eq!(host.script_ids(), vec!["panorama-script-1".to_string()]);
        assert!(host.scripts()[0].src.ends_with("key=YOUR_API_KEY"));

        assert!(host.complete_latest(gallery()));
        assert!(!host.complete_latest(gallery()));
        assert!(block_on(load).is_ok());
    }

    #[test]
    fn test_second_load_while_installed_fails() {
        let host = InMemoryScriptHost::new();
        let mut provider = ScriptTagProvider::new(host.clone(), PanoramaConfig::default());
        let _first = provider.load();
        assert!(block_on(provider.load()).is_err());
        assert_eq!(host.injected_total(), 1);
    }

    #[test]
    fn test_unload_drops_pending_callback() {
        let host = InMemoryScriptHost::new();
        let mut provider = ScriptTagProvider::new(host.clone(), PanoramaConfig::default());

        let load = provider.load();
        assert_eq!(host.pending_callbacks(), 1);
        provider.unload();

        assert_eq!(host.pending_callbacks(), 0);
        assert!(host.script_ids().is_empty());
        assert!(!provider.is_installed());
        assert!(matches!(block_on(load), Err(MapError::Panorama(_))));

        provider.unload();
        assert_eq!(host.removed_total(), 1);
    }
}
