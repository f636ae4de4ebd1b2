use crate::core::constants::{MAX_ZOOM, MIN_ZOOM};
use crate::core::geo::{LatLng, Point};
use crate::core::projection::pixel_delta_to_geo;
use serde::{Deserialize, Serialize};

/// The map camera: geographic center plus a continuous zoom level.
///
/// Every write goes through the clamping setters so the zoom stays inside
/// `[MIN_ZOOM, MAX_ZOOM]`, latitude stays inside the Mercator range and
/// longitude is wrapped into `(-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub center: LatLng,
    pub zoom: f64,
}

impl Camera {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        let mut camera = Self { center, zoom };
        camera.normalize();
        camera
    }

    pub fn set_center(&mut self, center: LatLng) {
        self.center = center;
        self.normalize();
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
        self.normalize();
    }

    /// Adds a zoom delta, clamped
    pub fn zoom_by(&mut self, delta: f64) {
        self.set_zoom(self.zoom + delta);
    }

    /// Moves the camera so the content follows a screen-pixel drag of `delta`
    pub fn pan_by_pixels(&mut self, delta: Point) {
        let (dlat, dlng) = pixel_delta_to_geo(delta, self.zoom);
        self.set_center(LatLng::new(self.center.lat + dlat, self.center.lng - dlng));
    }

    fn normalize(&mut self) {
        if self.zoom.is_finite() {
            self.zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        } else {
            self.zoom = MIN_ZOOM;
        }
        self.center.lat = LatLng::clamp_lat(self.center.lat);
        self.center.lng = LatLng::wrap_lng(self.center.lng);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(LatLng::new(32.7157, -117.1611), 13.0)
    }
}

/// Destination of an eased camera transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraTarget {
    pub center: LatLng,
    /// Keeps the current zoom when `None`
    pub zoom: Option<f64>,
}

impl CameraTarget {
    pub fn new(center: LatLng, zoom: Option<f64>) -> Self {
        Self { center, zoom }
    }

    pub fn center(center: LatLng) -> Self {
        Self { center, zoom: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::WHEEL_ZOOM_STEP;

    #[test]
    fn test_zoom_clamped() {
        let mut camera = Camera::new(LatLng::new(0.0, 0.0), 25.0);
        assert_eq!(camera.zoom, MAX_ZOOM);
        camera.set_zoom(3.0);
        assert_eq!(camera.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_repeated_wheel_steps_stay_in_range() {
        for start in [10.0, 10.3, 13.0, 17.9, 18.0] {
            let mut camera = Camera::new(LatLng::default(), start);
            for i in 0..40 {
                let delta = if (i / 7) % 2 == 0 { WHEEL_ZOOM_STEP } else { -WHEEL_ZOOM_STEP };
                camera.zoom_by(delta);
                assert!((MIN_ZOOM..=MAX_ZOOM).contains(&camera.zoom));
            }
        }
    }

    #[test]
    fn test_pan_moves_against_drag() {
        let mut camera = Camera::new(LatLng::new(10.0, 10.0), 10.0);
        camera.pan_by_pixels(Point::new(100.0, 50.0));
        assert!(camera.center.lng < 10.0);
        assert!(camera.center.lat > 10.0);
    }

    #[test]
    fn test_pan_wraps_longitude() {
        let mut camera = Camera::new(LatLng::new(0.0, 179.99), 10.0);
        camera.pan_by_pixels(Point::new(-2000.0, 0.0));
        assert!(camera.center.lng < 0.0);
        assert!(camera.center.lng > -180.0);
    }
}
