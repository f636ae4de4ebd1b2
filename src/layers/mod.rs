pub mod marker;

pub use marker::{markers_nearby, markers_with_availability, AvailabilityTier, Marker, MarkerId};
