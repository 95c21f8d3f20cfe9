use crate::core::viewport::Viewport;
use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// Corner a control is docked to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Identifies a control when the host reports a click on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    Attribution,
    Panorama,
}

/// Tile attribution text in the bottom-right corner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub text: String,
    pub position: ControlPosition,
}

impl Attribution {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position: ControlPosition::BottomRight,
        }
    }
}

/// Button that opens the panorama overlay at the viewport center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanoramaControl {
    pub title: String,
    pub position: ControlPosition,
}

impl PanoramaControl {
    /// The coordinate a click on this control targets
    pub fn target(&self, viewport: &Viewport) -> LatLng {
        viewport.center
    }
}

impl Default for PanoramaControl {
    fn default() -> Self {
        Self {
            title: "Street View".to_string(),
            position: ControlPosition::TopRight,
        }
    }
}

/// Controls registered on one map instance
#[derive(Debug, Default)]
pub struct ControlManager {
    attribution: Option<Attribution>,
    panorama: Option<PanoramaControl>,
}

impl ControlManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_attribution(&mut self, attribution: Option<Attribution>) {
        self.attribution = attribution;
    }

    pub fn attribution(&self) -> Option<&Attribution> {
        self.attribution.as_ref()
    }

    /// Adds the panorama button; returns false if it was already present
    pub fn add_panorama_control(&mut self, control: PanoramaControl) -> bool {
        if self.panorama.is_some() {
            return false;
        }
        self.panorama = Some(control);
        true
    }

    pub fn remove_panorama_control(&mut self) -> Option<PanoramaControl> {
        self.panorama.take()
    }

    pub fn panorama_control(&self) -> Option<&PanoramaControl> {
        self.panorama.as_ref()
    }

    pub fn has(&self, kind: ControlKind) -> bool {
        match kind {
            ControlKind::Attribution => self.attribution.is_some(),
            ControlKind::Panorama => self.panorama.is_some(),
        }
    }

    pub fn len(&self) -> usize {
        usize::from(self.attribution.is_some()) + usize::from(self.panorama.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.attribution = None;
        self.panorama = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;

    #[test]
    fn test_panorama_control_added_once() {
        let mut controls = ControlManager::new();
        assert!(controls.add_panorama_control(PanoramaControl::default()));
        assert!(!controls.add_panorama_control(PanoramaControl::default()));
        assert_eq!(controls.len(), 1);

        assert!(controls.remove_panorama_control().is_some());
        assert!(!controls.has(ControlKind::Panorama));
    }

    #[test]
    fn test_panorama_control_targets_center() {
        let viewport = Viewport::new(LatLng::new(6.9271, 79.8425), 13.0, Point::new(400.0, 400.0));
        assert_eq!(PanoramaControl::default().target(&viewport), viewport.center);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut controls = ControlManager::new();
        controls.set_attribution(Some(Attribution::new("© OpenStreetMap contributors")));
        controls.add_panorama_control(PanoramaControl::default());
        controls.clear();
        assert!(controls.is_empty());
    }
}
