use crate::core::camera::Camera;
use crate::core::geo::{LatLng, Point};

/// Interpolation trait for values that can be smoothly transitioned
pub trait Interpolatable {
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

/// Easing curves available to camera transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EasingFunction {
    Linear,
    #[default]
    EaseInOutQuad,
    EaseOutCubic,
}

impl EasingFunction {
    /// Apply the easing function to a normalized time value (0.0 to 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t).powi(2)
                }
            }
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Linear interpolation between two f64 values
pub fn linear(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

impl Interpolatable for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        linear(*self, *other, t)
    }
}

/// Plain lat/lng space interpolation; no great-circle correction
impl Interpolatable for LatLng {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        LatLng::new(linear(self.lat, other.lat, t), linear(self.lng, other.lng, t))
    }
}

impl Interpolatable for Point {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Point::new(linear(self.x, other.x, t), linear(self.y, other.y, t))
    }
}

impl Interpolatable for Camera {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Camera::new(self.center.lerp(&other.center, t), self.zoom.lerp(&other.zoom, t))
    }
}
