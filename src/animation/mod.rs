pub mod inertia;
pub mod interpolation;
pub mod transitions;

// Re-export commonly used types and functions for convenience
pub use inertia::Inertia;
pub use interpolation::{EasingFunction, Interpolatable};
pub use transitions::{AnimationToken, Transition, TransitionState};
