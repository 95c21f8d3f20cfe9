//! The host element a map instance is bound to

use crate::core::{geo::Point, map::MapId};
use crate::{MapError, Result};

/// A host surface that can carry at most one map instance.
///
/// In a browser this wraps a DOM element; headless hosts use
/// [`HeadlessContainer`].
pub trait MapContainer {
    /// Whether the surface exists and has been laid out
    fn is_ready(&self) -> bool;

    /// Current size in pixels
    fn size(&self) -> Point;

    /// The instance currently bound to this container, if any
    fn bound_instance(&self) -> Option<MapId>;

    /// Binds an instance; fails if another instance is already bound
    fn bind(&mut self, id: MapId) -> Result<()>;

    /// Drops the instance reference, returning it
    fn release(&mut self) -> Option<MapId>;

    /// Applies the caller's size class (e.g. `h-[400px]`)
    fn apply_class(&mut self, class_name: &str);
}

/// In-memory container for headless hosts and tests
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessContainer {
    ready: bool,
    size: Point,
    instance: Option<MapId>,
    class_name: String,
}

impl HeadlessContainer {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            ready: true,
            size: Point::new(width, height),
            instance: None,
            class_name: String::new(),
        }
    }

    /// A container that has not been attached to the page yet
    pub fn detached(width: f64, height: f64) -> Self {
        Self {
            ready: false,
            ..Self::new(width, height)
        }
    }

    pub fn attach(&mut self) {
        self.ready = true;
    }

    pub fn detach(&mut self) {
        self.ready = false;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.size = Point::new(width, height);
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }
}

impl MapContainer for HeadlessContainer {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn size(&self) -> Point {
        self.size
    }

    fn bound_instance(&self) -> Option<MapId> {
        self.instance
    }

    fn bind(&mut self, id: MapId) -> Result<()> {
        match self.instance {
            Some(existing) if existing != id => Err(MapError::Initialization(format!(
                "container already holds {existing}"
            ))),
            _ => {
                self.instance = Some(id);
                Ok(())
            }
        }
    }

    fn release(&mut self) -> Option<MapId> {
        self.instance.take()
    }

    fn apply_class(&mut self, class_name: &str) {
        if self.class_name != class_name {
            self.class_name = class_name.to_string();
        }
    }
}
