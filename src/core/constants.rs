//! Core constants for the slippy map engine.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Tile size as a float, for projection math.
pub const TILE_SIZE_F64: f64 = TILE_SIZE as f64;

/// Maximum latitude representable in Web Mercator.
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Camera zoom limits.
pub const MIN_ZOOM: f64 = 10.0;
pub const MAX_ZOOM: f64 = 18.0;

/// Number of decoded tiles kept in memory.
pub const MAX_TILE_CACHE: usize = 300;

/// Maximum number of tile fetches running at once.
pub const TILE_CONCURRENCY: usize = 6;

/// Zoom change per wheel tick.
pub const WHEEL_ZOOM_STEP: f64 = 0.8;

/// Pixel radius used when hit-testing markers.
pub const HIT_RADIUS_PX: f64 = 20.0;

/// Minimum zoom the camera moves to when a marker is selected.
pub const SELECT_ZOOM: f64 = 15.0;

/// Number of pointer samples kept while dragging.
pub const DRAG_SAMPLE_CAPACITY: usize = 8;

/// Per-frame velocity multiplier applied during inertial panning.
pub const INERTIA_FRICTION: f64 = 0.92;

/// Release speed (px/ms) above which inertia starts.
pub const INERTIA_MIN_VELOCITY: f64 = 0.05;

/// Speed (px/frame) below which inertia stops.
pub const INERTIA_STOP_SPEED: f64 = 0.5;

/// Minimum sample spacing used for release velocity estimation.
pub const VELOCITY_WINDOW_MS: f64 = 40.0;

/// Nominal display frame duration used to convert px/ms into px/frame.
pub const FRAME_MS: f64 = 16.0;

/// Transition duration used by follow mode.
pub const FOLLOW_DURATION_MS: u64 = 300;

/// Geolocation request timeout handed to the collaborator.
pub const GEOLOCATION_TIMEOUT_MS: u64 = 10_000;

/// Bed counts above this are high availability.
pub const HIGH_AVAILABILITY_BEDS: u32 = 10;
