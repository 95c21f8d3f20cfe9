pub mod controls;
pub mod popup;

pub use controls::{Attribution, ControlKind, ControlManager, ControlPosition, PanoramaControl};
pub use popup::{Popup, PopupAction, PopupContent};
