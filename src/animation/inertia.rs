use crate::core::config::InteractionConfig;
use crate::core::constants::FRAME_MS;
use crate::core::geo::Point;

/// Post-drag momentum, decaying geometrically once per frame.
///
/// Velocity is kept in pixels per frame. Each step applies friction first and
/// stops as soon as the speed falls below the stop threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Inertia {
    velocity: Point,
    friction: f64,
    stop_speed: f64,
    active: bool,
}

impl Inertia {
    pub fn new(velocity_px_per_frame: Point, friction: f64, stop_speed: f64) -> Self {
        Self {
            velocity: velocity_px_per_frame,
            friction,
            stop_speed,
            active: true,
        }
    }

    /// Starts inertia for a release velocity in px/ms, if fast enough
    pub fn from_release(velocity_px_per_ms: Point, config: &InteractionConfig) -> Option<Self> {
        if !(velocity_px_per_ms.length() > config.inertia_min_velocity) {
            return None;
        }
        Some(Self::new(
            velocity_px_per_ms.multiply(FRAME_MS),
            config.friction,
            config.inertia_stop_speed,
        ))
    }

    /// Pixel delta to pan by this frame, `None` once at rest
    pub fn step(&mut self) -> Option<Point> {
        if !self.active {
            return None;
        }
        self.velocity = self.velocity.multiply(self.friction);
        if self.velocity.length() < self.stop_speed || !self.velocity.length().is_finite() {
            self.active = false;
            return None;
        }
        Some(self.velocity)
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current velocity in px/frame
    pub fn velocity(&self) -> Point {
        self.velocity
    }

    /// Frames that produce motion before an initial `speed` decays below `stop_speed`
    pub fn frames_until_rest(speed: f64, friction: f64, stop_speed: f64) -> usize {
        if !(friction > 0.0 && friction < 1.0) || stop_speed <= 0.0 || !speed.is_finite() {
            return 0;
        }
        let mut frames = 0;
        let mut v = speed.abs() * friction;
        while v >= stop_speed {
            frames += 1;
            v *= friction;
        }
        frames
    }
}
