use crate::{
    core::{config::MarkerIcon, geo::LatLng, geo::LatLngBounds},
    layers::base::{LayerProperties, LayerTrait, LayerType},
    layer_options_json,
    ui::popup::{Popup, PopupAction, PopupContent},
    Result,
};

/// A visual marker with its bound popup
pub struct MarkerLayer {
    properties: LayerProperties,
    position: LatLng,
    title: String,
    icon: MarkerIcon,
    popup: Popup,
}

impl MarkerLayer {
    pub fn new(id: String, position: LatLng, title: String) -> Self {
        let properties = LayerProperties::new(id, title.clone(), LayerType::Marker);
        let popup = Popup::new(position, PopupContent::Text(title.clone()));
        Self {
            properties,
            position,
            title,
            icon: MarkerIcon::default(),
            popup,
        }
    }

    pub fn with_popup(mut self, content: PopupContent) -> Self {
        self.popup.content = content;
        self
    }

    pub fn with_icon(mut self, icon: MarkerIcon) -> Self {
        self.icon = icon;
        self
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn popup(&self) -> &Popup {
        &self.popup
    }

    pub fn popup_mut(&mut self) -> &mut Popup {
        &mut self.popup
    }

    pub fn has_action(&self, action: PopupAction) -> bool {
        self.popup.has_action(action)
    }
}

impl LayerTrait for MarkerLayer {
    crate::impl_layer_trait!(MarkerLayer, properties);

    fn options(&self) -> serde_json::Value {
        layer_options_json!(self.properties, {
            "position": self.position,
            "title": self.title,
            "icon": self.icon,
            "popup": self.popup,
        })
    }

    fn set_options(&mut self, options: serde_json::Value) -> Result<()> {
        if let Some(title) = options.get("title").and_then(|v| v.as_str()) {
            self.title = title.to_string();
            self.properties.name = title.to_string();
        }
        if let Some(position) = options.get("position") {
            self.position = serde_json::from_value(position.clone())?;
            self.popup.position = self.position;
        }
        Ok(())
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        Some(LatLngBounds::new(self.position, self.position))
    }
}
