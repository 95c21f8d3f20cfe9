use crate::{
    layers::base::{LayerTrait, LayerType},
    MapError, Result,
};

use crate::prelude::HashMap;

/// Manages layers for the map, handling ordering and lookup
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Ordered list of layer IDs for drawing (sorted by z-index)
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Adds a layer to the manager
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        if self.layers.contains_key(&layer_id) {
            return Err(MapError::Layer(format!("layer '{layer_id}' already exists")));
        }
        let z_index = layer.z_index();

        self.layers.insert(layer_id.clone(), layer);

        // Insert in sorted order by z-index
        let insert_pos = self
            .render_order
            .iter()
            .position(|id| {
                self.layers
                    .get(id)
                    .map(|l| l.z_index() > z_index)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, layer_id);
        Ok(())
    }

    /// Removes a layer from the manager
    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        self.render_order.retain(|id| id != layer_id);
        self.layers.remove(layer_id)
    }

    /// Removes every layer of the given type, returning how many went away
    pub fn remove_layers_of_type(&mut self, layer_type: LayerType) -> usize {
        let doomed: Vec<String> = self
            .layers
            .iter()
            .filter(|(_, layer)| layer.layer_type() == layer_type)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &doomed {
            self.remove_layer(id);
        }
        doomed.len()
    }

    /// Downcasts a layer to its concrete type
    pub fn get_as<T: 'static>(&self, layer_id: &str) -> Option<&T> {
        self.layers
            .get(layer_id)
            .and_then(|l| l.as_any().downcast_ref::<T>())
    }

    /// Mutable variant of [`LayerManager::get_as`]
    pub fn get_as_mut<T: 'static>(&mut self, layer_id: &str) -> Option<&mut T> {
        self.layers
            .get_mut(layer_id)
            .and_then(|l| l.as_any_mut().downcast_mut::<T>())
    }

    pub fn contains(&self, layer_id: &str) -> bool {
        self.layers.contains_key(layer_id)
    }

    /// Gets all layers in render order
    pub fn layers(&self) -> Vec<&dyn LayerTrait> {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|l| l.as_ref()))
            .collect()
    }

    /// Counts layers of one type
    pub fn count_of_type(&self, layer_type: LayerType) -> usize {
        self.layers
            .values()
            .filter(|l| l.layer_type() == layer_type)
            .count()
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the manager is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.render_order.clear();
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;
    use crate::layers::{marker::MarkerLayer, vector::{LineStyle, PolylineLayer}};

    fn marker(id: &str) -> Box<dyn LayerTrait> {
        Box::new(MarkerLayer::new(id.to_string(), LatLng::new(6.9, 79.8), id.to_string()))
    }

    #[test]
    fn test_render_order_follows_z_index() {
        let mut manager = LayerManager::new();
        manager.add_layer(marker("m1")).unwrap();
        manager
            .add_layer(Box::new(PolylineLayer::new(
                "line".into(),
                vec![LatLng::new(0.0, 0.0)],
                LineStyle::default(),
            )))
            .unwrap();

        let ids: Vec<&str> = manager.layers().iter().map(|l| l.id()).collect();
        assert_eq!(ids, vec!["line", "m1"]);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut manager = LayerManager::new();
        manager.add_layer(marker("m1")).unwrap();
        assert!(manager.add_layer(marker("m1")).is_err());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_remove_layers_of_type() {
        let mut manager = LayerManager::new();
        manager.add_layer(marker("a")).unwrap();
        manager.add_layer(marker("b")).unwrap();

        assert_eq!(manager.remove_layers_of_type(LayerType::Marker), 2);
        assert!(manager.is_empty());
        assert!(manager.layers().is_empty());
    }

    #[test]
    fn test_downcast() {
        let mut manager = LayerManager::new();
        manager.add_layer(marker("a")).unwrap();

        assert_eq!(manager.get_as::<MarkerLayer>("a").unwrap().title(), "a");
        assert!(manager.get_as::<PolylineLayer>("a").is_none());
    }
}
