// LayerTrait is the shared layer contract from `traits`
pub use crate::traits::LayerOperations as LayerTrait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Tile,
    Vector,
    Marker,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Tile => write!(f, "tile"),
            LayerType::Vector => write!(f, "vector"),
            LayerType::Marker => write!(f, "marker"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayerProperties {
    pub id: String,
    pub name: String,
    pub layer_type: LayerType,
    pub z_index: i32,
    pub opacity: f32,
    pub visible: bool,
}

impl LayerProperties {
    pub fn new(id: String, name: String, layer_type: LayerType) -> Self {
        let z_index = match layer_type {
            LayerType::Tile => 0,
            LayerType::Vector => 400,
            LayerType::Marker => 600,
        };
        Self {
            id,
            name,
            layer_type,
            z_index,
            opacity: 1.0,
            visible: true,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_properties() {
        let props = LayerProperties::new(
            "route".to_string(),
            "Route".to_string(),
            LayerType::Vector,
        );

        assert_eq!(props.id, "route");
        assert_eq!(props.name, "Route");
        assert_eq!(props.layer_type, LayerType::Vector);
        assert_eq!(props.opacity, 1.0);
        assert!(props.visible);
    }

    #[test]
    fn test_panes_stack_tiles_below_markers() {
        let tile = LayerProperties::new("t".into(), "T".into(), LayerType::Tile);
        let line = LayerProperties::new("l".into(), "L".into(), LayerType::Vector);
        let marker = LayerProperties::new("m".into(), "M".into(), LayerType::Marker);

        assert!(tile.z_index < line.z_index);
        assert!(line.z_index < marker.z_index);
        assert_eq!(line.with_opacity(1.5).opacity, 1.0);
    }

    #[test]
    fn test_layer_type_display() {
        assert_eq!(LayerType::Tile.to_string(), "tile");
        assert_eq!(LayerType::Vector.to_string(), "vector");
        assert_eq!(LayerType::Marker.to_string(), "marker");
    }
}
