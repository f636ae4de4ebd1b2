use crate::animation::interpolation::{EasingFunction, Interpolatable};
use crate::core::camera::{Camera, CameraTarget};
use instant::Instant;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cancellation flag shared by a transition and whoever may supersede it
#[derive(Debug, Clone, Default)]
pub struct AnimationToken {
    cancelled: Arc<AtomicBool>,
}

impl AnimationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// State of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    NotStarted,
    Running,
    Completed,
    Cancelled,
}

/// An eased camera move from the camera at creation time to a target.
///
/// Advanced by [`Transition::step`] once per frame. The clock starts at the
/// first step, so a transition created between frames does not skip ahead.
#[derive(Debug, Clone)]
pub struct Transition {
    start: Camera,
    target: Camera,
    duration: Duration,
    easing: EasingFunction,
    state: TransitionState,
    start_time: Option<Instant>,
    token: AnimationToken,
}

impl Transition {
    /// Target zoom defaults to the current zoom when unspecified
    pub fn new(from: Camera, target: CameraTarget, duration: Duration) -> Self {
        let target = Camera::new(target.center, target.zoom.unwrap_or(from.zoom));
        Self {
            start: from,
            target,
            duration,
            easing: EasingFunction::EaseInOutQuad,
            state: TransitionState::NotStarted,
            start_time: None,
            token: AnimationToken::new(),
        }
    }

    /// Set the easing function
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// Handle that cancels this transition from elsewhere
    pub fn token(&self) -> AnimationToken {
        self.token.clone()
    }

    /// Stop the transition; later steps write nothing
    pub fn cancel(&mut self) {
        self.token.cancel();
        self.state = TransitionState::Cancelled;
    }

    /// Advance to `now`, returning the camera value to write this frame.
    ///
    /// Returns `None` once cancelled or finished.
    pub fn step(&mut self, now: Instant) -> Option<Camera> {
        if self.token.is_cancelled() {
            self.state = TransitionState::Cancelled;
        }

        match self.state {
            TransitionState::NotStarted => {
                self.start_time = Some(now);
                self.state = TransitionState::Running;
            }
            TransitionState::Running => {}
            TransitionState::Completed | TransitionState::Cancelled => return None,
        }

        let progress = self.progress(now);
        if progress >= 1.0 {
            self.state = TransitionState::Completed;
            return Some(self.target);
        }
        Some(self.start.lerp(&self.target, self.easing.apply(progress)))
    }

    /// Linear progress in `[0, 1]` at `now`
    pub fn progress(&self, now: Instant) -> f64 {
        let Some(start_time) = self.start_time else {
            return 0.0;
        };
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(start_time);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Check if the transition is finished
    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            TransitionState::Completed | TransitionState::Cancelled
        ) || self.token.is_cancelled()
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn start(&self) -> Camera {
        self.start
    }

    pub fn target(&self) -> Camera {
        self.target
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}
