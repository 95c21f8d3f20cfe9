//! Shared trait abstractions for the map scene
//!
//! Layers are described, not painted: the host reads a layer's options and
//! draws it with whatever toolkit it owns.

use crate::core::geo::LatLngBounds;
use crate::Result;

/// Operations every layer placed on a [`crate::core::map::Map`] supports
pub trait LayerOperations: Send + Sync {
    /// Get layer ID
    fn id(&self) -> &str;

    /// Get layer name
    fn name(&self) -> &str;

    /// Get layer type
    fn layer_type(&self) -> crate::layers::base::LayerType;

    /// Check if layer is visible
    fn is_visible(&self) -> bool;

    /// Set layer visibility
    fn set_visible(&mut self, visible: bool);

    /// Get layer opacity (0.0 to 1.0)
    fn opacity(&self) -> f32;

    /// Set layer opacity
    fn set_opacity(&mut self, opacity: f32);

    /// Get layer z-index for ordering
    fn z_index(&self) -> i32;

    /// Set layer z-index
    fn set_z_index(&mut self, z_index: i32);

    /// Get layer bounds if applicable
    fn bounds(&self) -> Option<LatLngBounds> {
        None
    }

    /// Check if layer intersects with given bounds
    fn intersects_bounds(&self, bounds: &LatLngBounds) -> bool {
        self.bounds().map_or(true, |own| own.intersects(bounds))
    }

    /// Host-facing description of the layer
    fn options(&self) -> serde_json::Value;

    /// Update the layer from a host-supplied description
    fn set_options(&mut self, options: serde_json::Value) -> Result<()>;

    fn as_any(&self) -> &dyn std::any::Any;

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
