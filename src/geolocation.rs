//! Device position collaborator.
//!
//! Implementations report through a [`PositionSink`], which forwards onto a
//! channel the engine drains each frame. Callbacks may fire from any thread.

use crate::core::config::GeolocationConfig;
use crate::core::geo::LatLng;
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location request timed out")]
    Timeout,
    #[error("position unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

impl From<&GeolocationConfig> for PositionOptions {
    fn from(config: &GeolocationConfig) -> Self {
        Self {
            high_accuracy: config.high_accuracy,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(pub u64);

/// Which request a position report answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    OneShot,
    Watch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    pub source: PositionSource,
    pub result: Result<LatLng, GeolocationError>,
}

/// Success and error callbacks handed to a [`Geolocation`] implementation
#[derive(Debug, Clone)]
pub struct PositionSink {
    source: PositionSource,
    tx: Sender<PositionReport>,
}

impl PositionSink {
    pub fn new(source: PositionSource, tx: Sender<PositionReport>) -> Self {
        Self { source, tx }
    }

    pub fn success(&self, position: LatLng) {
        self.send(Ok(position));
    }

    pub fn error(&self, error: GeolocationError) {
        self.send(Err(error));
    }

    fn send(&self, result: Result<LatLng, GeolocationError>) {
        // The engine may be gone; nothing left to notify then
        let _ = self.tx.send(PositionReport {
            source: self.source,
            result,
        });
    }
}

pub trait Geolocation: Send + Sync {
    /// Report the current position once
    fn get_current_position(&self, sink: PositionSink, options: PositionOptions);

    /// Report the position now and on every change until cleared
    fn watch_position(&self, sink: PositionSink, options: PositionOptions) -> WatchHandle;

    fn clear_watch(&self, handle: WatchHandle);
}

/// Fixed position source, or one that always fails.
///
/// `move_to` pushes a new position to every live watch, which makes it handy
/// for simulating movement in tests and demos.
pub struct StaticGeolocation {
    position: Mutex<Result<LatLng, GeolocationError>>,
    watches: Mutex<Vec<(WatchHandle, PositionSink)>>,
    next_id: AtomicU64,
}

impl StaticGeolocation {
    pub fn new(position: LatLng) -> Self {
        Self::with_result(Ok(position))
    }

    pub fn failing(error: GeolocationError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(result: Result<LatLng, GeolocationError>) -> Self {
        Self {
            position: Mutex::new(result),
            watches: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn current(&self) -> Result<LatLng, GeolocationError> {
        match self.position.lock() {
            Ok(position) => position.clone(),
            Err(_) => Err(GeolocationError::Unavailable("position lock poisoned".into())),
        }
    }

    /// Updates the position and notifies every live watch
    pub fn move_to(&self, position: LatLng) {
        if let Ok(mut current) = self.position.lock() {
            *current = Ok(position);
        }
        if let Ok(watches) = self.watches.lock() {
            for (_, sink) in watches.iter() {
                sink.success(position);
            }
        }
    }

    pub fn active_watches(&self) -> usize {
        self.watches.lock().map(|w| w.len()).unwrap_or(0)
    }
}

impl Geolocation for StaticGeolocation {
    fn get_current_position(&self, sink: PositionSink, _options: PositionOptions) {
        match self.current() {
            Ok(position) => sink.success(position),
            Err(e) => sink.error(e),
        }
    }

    fn watch_position(&self, sink: PositionSink, options: PositionOptions) -> WatchHandle {
        let handle = WatchHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.get_current_position(sink.clone(), options);
        if let Ok(mut watches) = self.watches.lock() {
            watches.push((handle, sink));
        }
        handle
    }

    fn clear_watch(&self, handle: WatchHandle) {
        if let Ok(mut watches) = self.watches.lock() {
            watches.retain(|(h, _)| *h != handle);
        }
    }
}
