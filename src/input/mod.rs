pub mod drag;
pub mod events;
pub mod handler;

// Re-export the essential types
pub use drag::DragSession;
pub use events::{EventHandled, InputEvent, InputResponse, PointerCapture, PointerId};
pub use handler::{hit_test, Action, InputContext, InputController};
