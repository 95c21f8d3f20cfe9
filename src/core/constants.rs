//! Core constants derived from Leaflet defaults and the travel app's map styling.
//! Keeping them in a single place makes it easier to tweak panel-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Highest zoom level the base tile layer serves.
pub const DEFAULT_MAX_ZOOM: u8 = 19;

/// Deepest zoom level a tile layer may be configured for.
pub const MAX_TILE_ZOOM: u8 = 30;

/// Marker icon default size (regular PNG).
pub const MARKER_ICON_SIZE: (u32, u32) = (25, 41);

/// Anchor inside the icon (hot-spot) in pixel coords.
pub const MARKER_ICON_ANCHOR: (u32, u32) = (12, 41);

/// Popup offset relative to the icon anchor.
pub const MARKER_POPUP_ANCHOR: (i32, i32) = (1, -34);

/// Title that identifies the traveller's own position in a marker list.
pub const USER_LOCATION_TITLE: &str = "Your Location";

/// Number of samples taken along a route curve, endpoints included.
pub const CURVE_SAMPLES: usize = 11;

/// Fraction of the endpoint delta used to push the control point off the chord.
pub const CURVE_OFFSET_FACTOR: f64 = 0.05;

/// Route line stroke weight in pixels.
pub const PATH_WEIGHT: f32 = 5.0;

/// Route line opacity.
pub const PATH_OPACITY: f32 = 0.7;

/// Dash pattern for dashed route lines.
pub const PATH_DASH_ARRAY: &str = "10, 10";

/// Padding kept around a route when the viewport is fit to it.
pub const PATH_FIT_PADDING: f64 = 30.0;

/// Zoom cap applied when fitting the viewport to a route.
pub const PATH_FIT_MAX_ZOOM: f64 = 16.0;

/// Radius in meters searched for panorama imagery around a target.
pub const PANORAMA_SEARCH_RADIUS_M: f64 = 50.0;
