//! Decorative route line between two points
//!
//! The route is not a routing result: it is a quadratic Bézier whose control
//! point sits slightly off the straight midpoint, styled by transport mode.

use crate::{
    core::{
        config::PathFitOptions,
        constants::{
            CURVE_OFFSET_FACTOR, CURVE_SAMPLES, PATH_DASH_ARRAY, PATH_OPACITY, PATH_WEIGHT,
        },
        geo::{LatLng, LatLngBounds},
        map::Map,
    },
    layers::vector::{Color, LineStyle, PolylineLayer},
    panel::lifecycle::MarkerSpec,
    Result,
};
use serde::{Deserialize, Serialize};

pub const PATH_LAYER_ID: &str = "route-path";

const WALKING_COLOR: Color = Color::rgb(0x4C, 0xAF, 0x50);
const PUBLIC_COLOR: Color = Color::rgb(0x21, 0x96, 0xF3);
const DRIVING_COLOR: Color = Color::rgb(0xFF, 0x98, 0x00);
const FALLBACK_COLOR: Color = Color::rgb(0x75, 0x75, 0x75);

/// How the traveller gets there; only affects styling
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransportMode {
    Walking,
    Public,
    Driving,
    /// Any tag the panel does not know; drawn in the fallback style
    Other(String),
}

impl TransportMode {
    /// Never fails; unknown tags are kept as [`TransportMode::Other`]
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "walking" => TransportMode::Walking,
            "public" => TransportMode::Public,
            "driving" => TransportMode::Driving,
            _ => TransportMode::Other(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TransportMode::Walking => "walking",
            TransportMode::Public => "public",
            TransportMode::Driving => "driving",
            TransportMode::Other(tag) => tag,
        }
    }
}

impl From<&str> for TransportMode {
    fn from(tag: &str) -> Self {
        Self::parse(tag)
    }
}

impl From<String> for TransportMode {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<TransportMode> for String {
    fn from(mode: TransportMode) -> Self {
        mode.as_str().to_string()
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A route the caller wants drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRequest {
    /// Explicit start; falls back to the user's location marker, then the view center
    pub origin: Option<LatLng>,
    pub destination: LatLng,
    pub mode: TransportMode,
}

impl PathRequest {
    pub fn new(destination: LatLng, mode: impl Into<TransportMode>) -> Self {
        Self {
            origin: None,
            destination,
            mode: mode.into(),
        }
    }

    pub fn from_origin(mut self, origin: LatLng) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn resolve_origin(&self, markers: &[MarkerSpec], view_center: LatLng) -> LatLng {
        self.origin
            .or_else(|| {
                markers
                    .iter()
                    .rev()
                    .find(|m| m.is_user_location())
                    .map(|m| m.position)
            })
            .unwrap_or(view_center)
    }
}

/// Control point pushed off the chord midpoint by 5% of the endpoint deltas
pub fn control_point(origin: LatLng, destination: LatLng) -> LatLng {
    let mid_lat = (origin.lat + destination.lat) / 2.0;
    let mid_lng = (origin.lng + destination.lng) / 2.0;
    let offset_lng = (destination.lng - origin.lng) * CURVE_OFFSET_FACTOR;
    let offset_lat = (origin.lat - destination.lat) * CURVE_OFFSET_FACTOR;
    LatLng::new(mid_lat + offset_lat, mid_lng + offset_lng)
}

/// Samples the route at `t = 0, 0.1, ..., 1`; endpoints are exact
pub fn curved_path(origin: LatLng, destination: LatLng) -> Vec<LatLng> {
    let control = control_point(origin, destination);
    let last = CURVE_SAMPLES - 1;

    (0..CURVE_SAMPLES)
        .map(|i| {
            if i == 0 {
                return origin;
            }
            if i == last {
                return destination;
            }
            let t = i as f64 / last as f64;
            let u = 1.0 - t;
            let (a, b, c) = (u * u, 2.0 * u * t, t * t);
            LatLng::new(
                a * origin.lat + b * control.lat + c * destination.lat,
                a * origin.lng + b * control.lng + c * destination.lng,
            )
        })
        .collect()
}

pub fn style_for(mode: &TransportMode) -> LineStyle {
    let (color, dash_array) = match mode {
        TransportMode::Walking => (WALKING_COLOR, None),
        TransportMode::Public => (PUBLIC_COLOR, Some(PATH_DASH_ARRAY.to_string())),
        TransportMode::Driving => (DRIVING_COLOR, None),
        TransportMode::Other(_) => (FALLBACK_COLOR, None),
    };
    LineStyle {
        color,
        weight: PATH_WEIGHT,
        opacity: PATH_OPACITY,
        dash_array,
    }
}

/// What is currently on the map
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnPath {
    pub origin: LatLng,
    pub destination: LatLng,
    pub mode: TransportMode,
    pub points: Vec<LatLng>,
    pub bounds: LatLngBounds,
}

/// Keeps at most one route layer on a map
#[derive(Debug, Default)]
pub struct PathRenderer {
    fit: PathFitOptions,
    drawn: Option<DrawnPath>,
}

impl PathRenderer {
    pub fn new(fit: PathFitOptions) -> Self {
        Self { fit, drawn: None }
    }

    pub fn current(&self) -> Option<&DrawnPath> {
        self.drawn.as_ref()
    }

    pub fn is_drawn(&self) -> bool {
        self.drawn.is_some()
    }

    /// Replaces any previous route with `request` and fits the viewport to it
    pub fn draw(
        &mut self,
        map: &mut Map,
        request: &PathRequest,
        markers: &[MarkerSpec],
        view_center: LatLng,
    ) -> Result<&DrawnPath> {
        self.clear(map);

        let origin = request.resolve_origin(markers, view_center);
        let points = curved_path(origin, request.destination);
        let bounds = LatLngBounds::from_points(&points)
            .unwrap_or_else(|| LatLngBounds::new(origin, origin));

        let style = style_for(&request.mode);
        let layer = PolylineLayer::new(PATH_LAYER_ID.to_string(), points.clone(), style);
        map.add_layer(Box::new(layer))?;
        map.fit_bounds(&bounds, self.fit.into());

        log::debug!(
            "{}: drew {} route {:?} -> {:?}",
            map.id(),
            request.mode,
            origin,
            request.destination
        );

        Ok(self.drawn.insert(DrawnPath {
            origin,
            destination: request.destination,
            mode: request.mode.clone(),
            points,
            bounds,
        }))
    }

    /// Removes the route; returns false when there was none
    pub fn clear(&mut self, map: &mut Map) -> bool {
        let had_path = self.drawn.take().is_some();
        let removed = map.remove_layer(PATH_LAYER_ID);
        if removed {
            log::debug!("{}: cleared route", map.id());
        }
        had_path || removed
    }

    /// Forgets the route without touching a map, used when the map is gone
    pub fn reset(&mut self) {
        self.drawn = None;
    }
}
