use crate::core::geo::Point;
use instant::Instant;

pub type PointerId = u64;

/// Input events forwarded by the host surface.
///
/// Positions are in viewport pixels with the origin at the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        pointer_id: PointerId,
        position: Point,
        time: Instant,
    },
    PointerMove {
        pointer_id: PointerId,
        position: Point,
        time: Instant,
    },
    PointerUp {
        pointer_id: PointerId,
        position: Point,
        time: Instant,
    },
    PointerCancel {
        pointer_id: PointerId,
        position: Point,
        time: Instant,
    },
    /// Pointer left the surface
    PointerLeave {
        pointer_id: PointerId,
        position: Point,
        time: Instant,
    },
    /// Single click/tap
    Click { position: Point },
    /// Scroll wheel; negative `delta_y` scrolls up and zooms in
    Wheel { delta_y: f64, position: Point },
    /// Viewport/window resize
    Resize { width: f64, height: f64 },
}

/// Whether an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    /// Consumed; the host should suppress its default behavior
    Handled,
    NotHandled,
}

/// Pointer capture request for the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerCapture {
    Acquire(PointerId),
    Release(PointerId),
}

/// What the host should do with an event after the controller saw it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputResponse {
    pub handled: EventHandled,
    pub capture: Option<PointerCapture>,
}

impl InputResponse {
    pub fn handled() -> Self {
        Self {
            handled: EventHandled::Handled,
            capture: None,
        }
    }

    pub fn not_handled() -> Self {
        Self {
            handled: EventHandled::NotHandled,
            capture: None,
        }
    }

    pub fn with_capture(mut self, capture: PointerCapture) -> Self {
        self.capture = Some(capture);
        self
    }

    pub fn is_handled(&self) -> bool {
        self.handled == EventHandled::Handled
    }
}
