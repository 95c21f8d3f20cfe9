use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// Actions a popup can offer besides its content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PopupAction {
    /// Open the panorama overlay at the popup's position
    OpenPanorama,
}

impl PopupAction {
    pub fn label(&self) -> &'static str {
        match self {
            PopupAction::OpenPanorama => "Open panorama",
        }
    }
}

/// What a popup shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PopupContent {
    /// Host-supplied markup, shown as-is
    Html(String),
    /// Plain text, escaped by the host
    Text(String),
}

impl PopupContent {
    /// Markup takes precedence over the plain title
    pub fn for_marker(title: &str, popup_html: Option<&str>) -> Self {
        match popup_html {
            Some(html) => PopupContent::Html(html.to_string()),
            None => PopupContent::Text(title.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PopupContent::Html(s) | PopupContent::Text(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popup {
    pub position: LatLng,
    pub content: PopupContent,
    pub actions: Vec<PopupAction>,
    pub visible: bool,
}

impl Popup {
    pub fn new(position: LatLng, content: PopupContent) -> Self {
        Self {
            position,
            content,
            actions: Vec::new(),
            visible: false,
        }
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn add_action(&mut self, action: PopupAction) {
        if !self.actions.contains(&action) {
            self.actions.push(action);
        }
    }

    pub fn remove_action(&mut self, action: PopupAction) {
        self.actions.retain(|a| *a != action);
    }

    pub fn has_action(&self, action: PopupAction) -> bool {
        self.actions.contains(&action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_wins_over_title() {
        let content = PopupContent::for_marker("Galle Face Green", Some("<b>Galle Face Green</b>"));
        assert_eq!(content, PopupContent::Html("<b>Galle Face Green</b>".to_string()));

        let content = PopupContent::for_marker("Galle Face Green", None);
        assert_eq!(content.as_str(), "Galle Face Green");
    }

    #[test]
    fn test_actions_are_unique() {
        let mut popup = Popup::new(LatLng::new(6.9271, 79.8425), PopupContent::Text("x".into()));
        popup.add_action(PopupAction::OpenPanorama);
        popup.add_action(PopupAction::OpenPanorama);
        assert_eq!(popup.actions.len(), 1);

        popup.remove_action(PopupAction::OpenPanorama);
        assert!(!popup.has_action(PopupAction::OpenPanorama));
    }
}
