//! Panorama overlay controller
//!
//! `Disabled -> Closed -> Open` with two asynchronous edges: loading the
//! provider library on enable and checking imagery availability on open.
//! Both hand a future back to the host; the result is applied only if the
//! controller is still in the cycle (or session) that issued it.

use crate::{
    core::{config::PanoramaConfig, geo::LatLng},
    panel::provider::{PanoramaInfo, PanoramaProvider, PanoramaService},
    MapError, Result,
};
use futures::future::{AbortHandle, Abortable, BoxFuture, FutureExt};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanoramaState {
    Disabled,
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "overlay-{}", self.0)
    }
}

/// What the overlay is showing
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayContent {
    /// Waiting on the availability check
    Checking,
    Panorama(PanoramaInfo),
    /// No imagery at the target; the message is shown inside the overlay
    Unavailable(String),
}

/// The single open overlay
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySession {
    pub id: SessionId,
    pub target: LatLng,
    pub content: OverlayContent,
}

/// Result of a provider load, tagged with the enable cycle that started it
pub struct LoadCompletion {
    generation: u64,
    outcome: Result<Arc<dyn PanoramaService>>,
}

impl LoadCompletion {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Result of an availability check, tagged with the session that asked
pub struct AvailabilityCheck {
    session: SessionId,
    outcome: Result<Option<PanoramaInfo>>,
}

impl AvailabilityCheck {
    pub fn session(&self) -> SessionId {
        self.session
    }
}

pub type PendingLoad = BoxFuture<'static, LoadCompletion>;
pub type PendingAvailability = BoxFuture<'static, AvailabilityCheck>;

pub struct PanoramaController {
    config: PanoramaConfig,
    provider: Box<dyn PanoramaProvider>,
    enabled: bool,
    generation: u64,
    loading: Option<AbortHandle>,
    service: Option<Arc<dyn PanoramaService>>,
    session: Option<OverlaySession>,
    next_session: u64,
}

impl PanoramaController {
    pub fn new(config: PanoramaConfig, provider: Box<dyn PanoramaProvider>) -> Self {
        Self {
            config,
            provider,
            enabled: false,
            generation: 0,
            loading: None,
            service: None,
            session: None,
            next_session: 1,
        }
    }

    pub fn state(&self) -> PanoramaState {
        match (self.enabled, &self.session) {
            (false, _) => PanoramaState::Disabled,
            (true, None) => PanoramaState::Closed,
            (true, Some(_)) => PanoramaState::Open,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_loaded(&self) -> bool {
        self.service.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn session(&self) -> Option<&OverlaySession> {
        self.session.as_ref()
    }

    pub fn provider(&self) -> &dyn PanoramaProvider {
        self.provider.as_ref()
    }

    /// Starts the one provider load of this enable cycle.
    ///
    /// Returns `None` when already enabled.
    pub fn enable(&mut self) -> Option<PendingLoad> {
        if self.enabled {
            return None;
        }
        self.enabled = true;
        self.generation += 1;
        let generation = self.generation;

        let (abort, registration) = AbortHandle::new_pair();
        self.loading = Some(abort);
        log::info!("panorama enabled, loading provider (cycle {})", generation);

        let load = Abortable::new(self.provider.load(), registration);
        Some(
            load.map(move |result| LoadCompletion {
                generation,
                outcome: result.unwrap_or_else(|_| {
                    Err(MapError::Panorama("provider load aborted".to_string()))
                }),
            })
            .boxed(),
        )
    }

    /// Applies a finished load; returns true if the service is now ready
    pub fn finish_load(&mut self, completion: LoadCompletion) -> bool {
        if !self.enabled || completion.generation != self.generation || self.service.is_some() {
            log::debug!("ignoring stale panorama load (cycle {})", completion.generation);
            return false;
        }
        self.loading = None;

        match completion.outcome {
            Ok(service) => {
                self.service = Some(service);
                log::info!("panorama provider ready");
                true
            }
            Err(e) => {
                log::warn!("panorama provider failed to load: {}", e);
                false
            }
        }
    }

    /// Opens the overlay at `target`, or retargets the open one.
    ///
    /// A no-op until the provider has loaded.
    pub fn open(&mut self, target: LatLng) -> Option<PendingAvailability> {
        if !self.enabled {
            log::debug!("panorama open at {:?} ignored: feature disabled", target);
            return None;
        }
        let Some(service) = self.service.clone() else {
            log::debug!("panorama open at {:?} ignored: provider not loaded", target);
            return None;
        };

        let id = SessionId(self.next_session);
        self.next_session += 1;

        match self.session.as_mut() {
            Some(session) => {
                log::debug!("retargeting {} -> {} at {:?}", session.id, id, target);
                session.id = id;
                session.target = target;
                session.content = OverlayContent::Checking;
            }
            None => {
                log::debug!("opening {} at {:?}", id, target);
                self.session = Some(OverlaySession {
                    id,
                    target,
                    content: OverlayContent::Checking,
                });
            }
        }

        let radius = self.config.search_radius_m;
        Some(
            async move {
                AvailabilityCheck {
                    session: id,
                    outcome: service.find_panorama(target, radius).await,
                }
            }
            .boxed(),
        )
    }

    /// Applies an availability result to the session that asked for it
    pub fn apply_availability(&mut self, check: AvailabilityCheck) -> bool {
        let Some(session) = self.session.as_mut().filter(|s| s.id == check.session) else {
            log::debug!("dropping availability result for stale {}", check.session);
            return false;
        };

        session.content = match check.outcome {
            Ok(Some(info)) => OverlayContent::Panorama(info),
            Ok(None) => OverlayContent::Unavailable(self.config.unavailable_message.clone()),
            Err(e) => {
                log::warn!("panorama lookup at {:?} failed: {}", session.target, e);
                OverlayContent::Unavailable(self.config.unavailable_message.clone())
            }
        };
        true
    }

    pub fn close(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                log::debug!("closed {}", session.id);
                true
            }
            None => false,
        }
    }

    /// Aborts any load in flight and tears down the provider resources
    pub fn disable(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.enabled = false;
        self.generation += 1;
        if let Some(abort) = self.loading.take() {
            abort.abort();
        }
        self.session = None;
        self.service = None;
        self.provider.unload();
        log::info!("panorama disabled");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::provider::{InMemoryScriptHost, ScriptTagProvider, StaticPanoramaService};
    use futures::executor::block_on;

    const GALLE_FACE: LatLng = LatLng {
        lat: 6.9271,
        lng: 79.8425,
    };
    const MUSEUM: LatLng = LatLng {
        lat: 6.9102,
        lng: 79.8652,
    };

    fn service() -> Arc<dyn PanoramaService> {
        Arc::new(StaticPanoramaService::new(vec![PanoramaInfo {
            pano_id: "galle-face".into(),
            position: GALLE_FACE,
            description: None,
        }]))
    }

    fn controller() -> (PanoramaController, InMemoryScriptHost) {
        let host = InMemoryScriptHost::new();
        let provider = ScriptTagProvider::new(host.clone(), PanoramaConfig::default());
        (
            PanoramaController::new(PanoramaConfig::default(), Box::new(provider)),
            host,
        )
    }

    fn loaded() -> (PanoramaController, InMemoryScriptHost) {
        let (mut c, host) = controller();
        let load = c.enable().unwrap();
        host.complete_latest(service());
        assert!(c.finish_load(block_on(load)));
        (c, host)
    }

    #[test]
    fn test_enable_loads_once() {
        let (mut c, host) = controller();
        assert_eq!(c.state(), PanoramaState::Disabled);

        let _load = c.enable().unwrap();
        assert!(c.enable().is_none());
        assert_eq!(c.state(), PanoramaState::Closed);
        assert_eq!(host.injected_total(), 1);
        assert!(c.is_loading());
    }

    #[test]
    fn test_open_before_load_is_noop() {
        let (mut c, _host) = controller();
        assert!(c.open(GALLE_FACE).is_none());
        let _load = c.enable();
        assert!(c.open(GALLE_FACE).is_none());
        assert_eq!(c.state(), PanoramaState::Closed);
    }

    #[test]
    fn test_unavailable_imagery_keeps_overlay_open() {
        let (mut c, _host) = loaded();
        let check = c.open(MUSEUM).unwrap();
        assert_eq!(c.session().unwrap().content, OverlayContent::Checking);

        assert!(c.apply_availability(block_on(check)));
        assert_eq!(c.state(), PanoramaState::Open);
        assert_eq!(
            c.session().unwrap().content,
            OverlayContent::Unavailable("Street View not available for this location".into())
        );
    }

    #[test]
    fn test_retarget_replaces_in_place() {
        let (mut c, _host) = loaded();
        let first = c.open(MUSEUM).unwrap();
        let second = c.open(GALLE_FACE).unwrap();

        // the older answer arrives after the retarget and is ignored
        assert!(!c.apply_availability(block_on(first)));
        assert!(c.apply_availability(block_on(second)));

        let session = c.session().unwrap();
        assert_eq!(session.target, GALLE_FACE);
        assert!(matches!(
            session.content,
            OverlayContent::Panorama(ref info) if info.pano_id == "galle-face"
        ));
    }

    #[test]
    fn test_result_after_close_is_dropped() {
        let (mut c, _host) = loaded();
        let check = c.open(GALLE_FACE).unwrap();
        assert!(c.close());
        assert!(!c.apply_availability(block_on(check)));
        assert_eq!(c.state(), PanoramaState::Closed);
        assert!(!c.close());
    }

    #[test]
    fn test_load_after_disable_is_stale() {
        let (mut c, host) = controller();
        let load = c.enable().unwrap();
        host.complete_latest(service());
        assert!(c.disable());

        let completion = block_on(load);
        assert!(!c.finish_load(completion));
        assert!(!c.is_loaded());
        assert_eq!(host.pending_callbacks(), 0);
        assert!(host.script_ids().is_empty());
    }

    #[test]
    fn test_load_from_previous_cycle_is_stale() {
        let (mut c, host) = controller();
        let old = c.enable().unwrap();
        c.disable();
        let fresh = c.enable().unwrap();

        host.complete_latest(service());
        assert!(!c.finish_load(block_on(old)));
        assert!(c.finish_load(block_on(fresh)));
        assert_eq!(host.injected_total(), 2);
        assert_eq!(host.removed_total(), 1);
    }

    #[test]
    fn test_failed_load_stays_enabled_without_service() {
        let (mut c, host) = controller();
        let load = c.enable().unwrap();
        host.fail_latest("blocked by the network");

        assert!(!c.finish_load(block_on(load)));
        assert_eq!(c.state(), PanoramaState::Closed);
        assert!(!c.is_loaded());
        assert!(c.open(GALLE_FACE).is_none());
    }
}
