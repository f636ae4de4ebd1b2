//! Prelude module for common shelter-map types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use shelter_map::prelude::*;`

pub use crate::core::{
    camera::{Camera, CameraTarget},
    config::{EngineConfig, GeolocationConfig, InteractionConfig, MapStyle, TileLoadingConfig},
    geo::{LatLng, Point, Size, TileKey},
    map::{FrameStatus, MapEngine},
    projection::{visible_tiles, TilePlacement},
};

pub use crate::animation::{AnimationToken, EasingFunction, Inertia, Transition};

pub use crate::data::shelters::{markers_from_json, sample_markers, Shelter, ShelterList};

pub use crate::geolocation::{Geolocation, GeolocationError, StaticGeolocation, WatchHandle};

pub use crate::input::{
    events::{EventHandled, InputEvent, InputResponse},
    handler::{Action, InputController},
};

pub use crate::layers::marker::{AvailabilityTier, Marker, MarkerId};

pub use crate::rendering::{Canvas, DrawCommand, RasterCanvas, RecordingCanvas, Renderer};

pub use crate::runtime::{spawn, AsyncHandle, AsyncSpawner};

pub use crate::tiles::{
    HttpTileFetcher, TileCache, TileFetcher, TileImage, TileLoader, TileRequest, TileSource,
    UrlTemplateSource,
};

#[cfg(feature = "egui")]
pub use crate::ui::{MapWidget, UiMapExt};

pub use crate::{Error as MapError, Result};

pub use instant::Instant;
pub use std::{collections::VecDeque, sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
