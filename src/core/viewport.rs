use crate::core::geo::{LatLng, LatLngBounds, Point};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS: f64 = 6378137.0;

/// Options for [`Viewport::fit_bounds`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitBoundsOptions {
    /// Padding in pixels kept free on every side of the container
    pub padding: f64,
    /// Upper zoom cap for the fit, on top of the viewport's own limit
    pub max_zoom: Option<f64>,
}

impl Default for FitBoundsOptions {
    fn default() -> Self {
        Self {
            padding: 20.0,
            max_zoom: None,
        }
    }
}

/// Manages the current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(0.0, 19.0),
            size,
            min_zoom: 0.0,
            max_zoom: 19.0,
        }
    }

    /// Sets the center of the viewport, clamped to the world
    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(
            LatLng::clamp_lat(center.lat),
            center.lng.clamp(-180.0, 180.0),
        );
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.min(self.max_zoom).max(self.min_zoom);
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.set_center(center);
        self.set_zoom(zoom);
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Sets the zoom limits
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.min(max_zoom).max(min_zoom);
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level
    /// (Web Mercator, EPSG:3857)
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let z = zoom.unwrap_or(self.zoom);
        let scale = 256.0 * 2_f64.powf(z);
        let half_world = std::f64::consts::PI * EARTH_RADIUS;

        let lat = LatLng::clamp_lat(lat_lng.lat);
        let x = lat_lng.lng.to_radians() * EARTH_RADIUS;
        let y = ((std::f64::consts::PI / 4.0 + lat.to_radians() / 2.0).tan().ln()) * EARTH_RADIUS;

        Point::new(
            (x + half_world) / (2.0 * half_world) * scale,
            (-y + half_world) / (2.0 * half_world) * scale,
        )
    }

    /// Unprojects world pixel coordinates back to LatLng at the given zoom level
    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        let z = zoom.unwrap_or(self.zoom);
        let scale = 256.0 * 2_f64.powf(z);
        let half_world = std::f64::consts::PI * EARTH_RADIUS;

        let x = (pixel.x / scale) * (2.0 * half_world) - half_world;
        let y = half_world - (pixel.y / scale) * (2.0 * half_world);

        let lng = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - std::f64::consts::PI / 2.0).to_degrees();

        LatLng::new(lat, lng)
    }

    /// Converts a geographical coordinate to container pixel coordinates
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        let origin = self.project(&self.center, None);
        let projected = self.project(lat_lng, None);
        Point::new(
            projected.x - origin.x + self.size.x / 2.0,
            projected.y - origin.y + self.size.y / 2.0,
        )
    }

    /// Converts container pixel coordinates back to geographical coordinates
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let origin = self.project(&self.center, None);
        let projected = Point::new(
            pixel.x - self.size.x / 2.0 + origin.x,
            pixel.y - self.size.y / 2.0 + origin.y,
        );
        self.unproject(&projected, None)
    }

    /// Gets the current viewport bounds in geographical coordinates
    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.pixel_to_lat_lng(&Point::new(0.0, 0.0));
        let se = self.pixel_to_lat_lng(&self.size);

        LatLngBounds::new(LatLng::new(se.lat, nw.lng), LatLng::new(nw.lat, se.lng))
    }

    /// Fits the viewport to contain the given bounds.
    ///
    /// Picks the highest integer zoom at which the projected bounds fit in the
    /// padded container, capped by `options.max_zoom` and `self.max_zoom`.
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds, options: FitBoundsOptions) {
        let available = Point::new(
            (self.size.x - 2.0 * options.padding).max(0.0),
            (self.size.y - 2.0 * options.padding).max(0.0),
        );
        let cap = options
            .max_zoom
            .map_or(self.max_zoom, |max| max.min(self.max_zoom));

        let mut best_zoom = self.min_zoom;
        for test_zoom in (self.min_zoom.ceil() as i32)..=(cap.floor() as i32) {
            let zoom = test_zoom as f64;
            let nw = self.project(&bounds.north_west(), Some(zoom));
            let se = self.project(&bounds.south_east(), Some(zoom));

            if (se.x - nw.x).abs() <= available.x && (se.y - nw.y).abs() <= available.y {
                best_zoom = zoom;
            } else {
                break;
            }
        }

        log::debug!(
            "fit_bounds sw={:?} ne={:?} -> zoom {}",
            bounds.south_west,
            bounds.north_east,
            best_zoom
        );

        self.set_center(bounds.center());
        self.set_zoom(best_zoom);
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_creation() {
        let viewport = Viewport::new(LatLng::new(6.9271, 79.8425), 13.0, Point::new(800.0, 600.0));

        assert_eq!(viewport.zoom, 13.0);
        assert_eq!(viewport.center.lat, 6.9271);
        assert_eq!(viewport.size.x, 800.0);
    }

    #[test]
    fn test_coordinate_conversion() {
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 1.0, Point::new(512.0, 512.0));

        let center = viewport.pixel_to_lat_lng(&Point::new(256.0, 256.0));
        assert!(center.lat.abs() < 0.01);
        assert!(center.lng.abs() < 0.01);

        let back = viewport.lat_lng_to_pixel(&LatLng::new(10.0, 20.0));
        let round_trip = viewport.pixel_to_lat_lng(&back);
        assert!((round_trip.lat - 10.0).abs() < 1e-9);
        assert!((round_trip.lng - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = Viewport::default();
        viewport.set_zoom_limits(2.0, 15.0);

        viewport.set_zoom(1.0);
        assert_eq!(viewport.zoom, 2.0);

        viewport.set_zoom(20.0);
        assert_eq!(viewport.zoom, 15.0);
    }

    #[test]
    fn test_fit_bounds_respects_cap() {
        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0), 3.0, Point::new(800.0, 600.0));
        let point = LatLng::new(6.9271, 79.8425);
        let bounds = LatLngBounds::new(point, point);

        viewport.fit_bounds(
            &bounds,
            FitBoundsOptions {
                padding: 30.0,
                max_zoom: Some(16.0),
            },
        );

        assert_eq!(viewport.zoom, 16.0);
        assert_eq!(viewport.center, point);
    }

    #[test]
    fn test_fit_bounds_contains_whole_box() {
        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0), 3.0, Point::new(800.0, 600.0));
        let bounds = LatLngBounds::from_coords(5.9, 79.6, 9.8, 81.9);

        viewport.fit_bounds(&bounds, FitBoundsOptions::default());

        let visible = viewport.bounds();
        assert!(visible.contains(&bounds.south_west));
        assert!(visible.contains(&bounds.north_east));
        assert!(viewport.zoom < 16.0);
    }
}
