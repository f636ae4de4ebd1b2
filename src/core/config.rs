//! Configuration for the map engine
//!
//! All sections deserialize from JSON with every field optional, so a host can
//! ship a partial document and inherit the defaults for the rest.

use crate::core::camera::Camera;
use crate::core::constants::*;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// RGBA color as stored in configuration files
pub type ColorRgba = [u8; 4];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Camera restored by `reset_to_initial`
    pub initial_camera: Camera,
    pub tiles: TileLoadingConfig,
    pub interaction: InteractionConfig,
    pub geolocation: GeolocationConfig,
    pub style: MapStyle,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tiles.cache_size == 0 {
            return Err(MapError::InvalidConfig("tiles.cache_size must be positive".into()));
        }
        if self.tiles.max_concurrent == 0 {
            return Err(MapError::InvalidConfig("tiles.max_concurrent must be positive".into()));
        }
        if self.tiles.subdomains.is_empty() && self.tiles.url_template.contains("{s}") {
            return Err(MapError::InvalidConfig(
                "tiles.url_template uses {s} but no subdomains are configured".into(),
            ));
        }
        self.interaction.validate()?;
        if !self.initial_camera.center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "initial camera center {}",
                self.initial_camera.center
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileLoadingConfig {
    pub cache_size: usize,
    pub max_concurrent: usize,
    /// Template with `{s}`, `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
    pub subdomains: Vec<String>,
    /// `None` lets a hung fetch hold its slot forever
    pub fetch_timeout_ms: Option<u64>,
    pub user_agent: String,
}

impl TileLoadingConfig {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    pub fn low_resource() -> Self {
        Self {
            cache_size: 100,
            max_concurrent: 2,
            ..Self::default()
        }
    }

    /// No fetch timeout, so fetches can be driven by any executor
    pub fn for_testing() -> Self {
        Self {
            fetch_timeout_ms: None,
            ..Self::default()
        }
    }
}

impl Default for TileLoadingConfig {
    fn default() -> Self {
        Self {
            cache_size: MAX_TILE_CACHE,
            max_concurrent: TILE_CONCURRENCY,
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            subdomains: vec!["a".into(), "b".into(), "c".into()],
            fetch_timeout_ms: Some(10_000),
            user_agent: concat!("shelter-map/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub wheel_zoom_step: f64,
    pub hit_radius_px: f64,
    pub select_zoom: f64,
    pub select_duration_ms: u64,
    pub follow_duration_ms: u64,
    pub locate_duration_ms: u64,
    pub friction: f64,
    /// px/ms
    pub inertia_min_velocity: f64,
    /// px/frame
    pub inertia_stop_speed: f64,
    pub velocity_window_ms: f64,
    pub tap_slop_px: f64,
}

impl InteractionConfig {
    /// Rejects values that would stall inertia or make gestures meaningless
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(MapError::InvalidConfig(msg.into()));
        if !(self.friction > 0.0 && self.friction < 1.0) {
            return invalid("interaction.friction must be in (0, 1)");
        }
        if !(self.inertia_stop_speed > 0.0 && self.inertia_stop_speed.is_finite()) {
            return invalid("interaction.inertia_stop_speed must be positive");
        }
        if !(self.inertia_min_velocity >= 0.0 && self.inertia_min_velocity.is_finite()) {
            return invalid("interaction.inertia_min_velocity must not be negative");
        }
        if !(self.wheel_zoom_step > 0.0 && self.wheel_zoom_step.is_finite()) {
            return invalid("interaction.wheel_zoom_step must be positive");
        }
        if !(self.hit_radius_px >= 0.0 && self.hit_radius_px.is_finite()) {
            return invalid("interaction.hit_radius_px must not be negative");
        }
        Ok(())
    }

    pub fn select_duration(&self) -> Duration {
        Duration::from_millis(self.select_duration_ms)
    }

    pub fn follow_duration(&self) -> Duration {
        Duration::from_millis(self.follow_duration_ms)
    }

    pub fn locate_duration(&self) -> Duration {
        Duration::from_millis(self.locate_duration_ms)
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            wheel_zoom_step: WHEEL_ZOOM_STEP,
            hit_radius_px: HIT_RADIUS_PX,
            select_zoom: SELECT_ZOOM,
            select_duration_ms: 500,
            follow_duration_ms: FOLLOW_DURATION_MS,
            locate_duration_ms: 500,
            friction: INERTIA_FRICTION,
            inertia_min_velocity: INERTIA_MIN_VELOCITY,
            inertia_stop_speed: INERTIA_STOP_SPEED,
            velocity_window_ms: VELOCITY_WINDOW_MS,
            tap_slop_px: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: GEOLOCATION_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapStyle {
    pub background: ColorRgba,
    pub high_availability: ColorRgba,
    pub medium_availability: ColorRgba,
    pub no_availability: ColorRgba,
    pub user_location: ColorRgba,
    pub marker_radius: f64,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            background: [229, 227, 223, 255],
            high_availability: [34, 197, 94, 255],
            medium_availability: [245, 158, 11, 255],
            no_availability: [239, 68, 68, 255],
            user_location: [59, 130, 246, 255],
            marker_radius: 8.0,
        }
    }
}
