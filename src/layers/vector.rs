use crate::{
    core::geo::{LatLng, LatLngBounds},
    layers::base::{LayerProperties, LayerTrait, LayerType},
    layer_options_json, MapError, Result,
};
use serde::{Deserialize, Serialize};

/// Serializable RGB color, written as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(MapError::Layer(format!("invalid color '{hex}'")));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| MapError::Layer(format!("invalid color '{hex}'")))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Style for line features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    /// Line color
    pub color: Color,
    /// Stroke weight in pixels
    pub weight: f32,
    /// Opacity (0.0 to 1.0)
    pub opacity: f32,
    /// SVG-style dash array, `None` for a solid line
    pub dash_array: Option<String>,
}

impl LineStyle {
    pub fn is_dashed(&self) -> bool {
        self.dash_array.is_some()
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::rgb(0x33, 0x88, 0xFF),
            weight: 3.0,
            opacity: 1.0,
            dash_array: None,
        }
    }
}

/// A polyline drawn over the tiles
pub struct PolylineLayer {
    properties: LayerProperties,
    points: Vec<LatLng>,
    style: LineStyle,
}

impl PolylineLayer {
    pub fn new(id: String, points: Vec<LatLng>, style: LineStyle) -> Self {
        let properties = LayerProperties::new(id, "Polyline".to_string(), LayerType::Vector)
            .with_opacity(style.opacity);
        Self {
            properties,
            points,
            style,
        }
    }

    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    pub fn style(&self) -> &LineStyle {
        &self.style
    }
}

impl LayerTrait for PolylineLayer {
    crate::impl_layer_trait!(PolylineLayer, properties);

    fn options(&self) -> serde_json::Value {
        layer_options_json!(self.properties, {
            "points": self.points,
            "color": self.style.color.to_hex(),
            "weight": self.style.weight,
            "dash_array": self.style.dash_array,
        })
    }

    fn set_options(&mut self, options: serde_json::Value) -> Result<()> {
        if let Some(color) = options.get("color").and_then(|v| v.as_str()) {
            self.style.color = Color::from_hex(color)?;
        }
        if let Some(weight) = options.get("weight").and_then(|v| v.as_f64()) {
            self.style.weight = weight as f32;
        }
        if let Some(dash) = options.get("dash_array") {
            self.style.dash_array = dash.as_str().map(str::to_string);
        }
        Ok(())
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(&self.points)
    }
}
