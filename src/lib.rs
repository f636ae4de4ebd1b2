//! # Shelter Map
//!
//! A slippy-map rendering and navigation engine for the shelter locator.
//!
//! The engine owns a camera, a bounded-concurrency LRU tile loader, eased
//! transitions with drag inertia, and a render pass that composes tiles,
//! shelter markers and the user location onto any [`rendering::Canvas`].
//! Hosts drive it by forwarding input events and calling
//! [`MapEngine::tick`] once per display frame.

pub mod animation;
pub mod core;
pub mod data;
pub mod geolocation;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod tiles;
#[cfg(feature = "egui")]
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    camera::{Camera, CameraTarget},
    config::EngineConfig,
    geo::{LatLng, Point, Size, TileKey},
    map::{FrameStatus, MapEngine},
};

pub use animation::{inertia::Inertia, transitions::Transition};

pub use data::shelters::{Shelter, ShelterList};

pub use geolocation::{Geolocation, GeolocationError, StaticGeolocation};

pub use input::{events::InputEvent, handler::InputController};

pub use layers::marker::{AvailabilityTier, Marker};

pub use rendering::{context::Canvas, pass::Renderer, raster::RasterCanvas};

pub use tiles::{HttpTileFetcher, TileCache, TileFetcher, TileLoader};

#[cfg(feature = "egui")]
pub use ui::widget::MapWidget;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Tile {key} returned HTTP {status}")]
    TileStatus { key: TileKey, status: u16 },

    #[error("Tile {0} timed out")]
    TileTimeout(TileKey),

    #[error("Geolocation error: {0}")]
    Geolocation(#[from] GeolocationError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger`, honouring `RUST_LOG`. Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
