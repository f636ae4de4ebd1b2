//! The map engine: single owner of camera, tiles, motion and overlay state.
//!
//! Hosts forward input through [`MapEngine::handle_input`] and call
//! [`MapEngine::tick`] once per display frame. All mutation happens on the
//! calling thread; tile fetches and position reports come back over channels
//! and are drained inside `tick`.

use crate::animation::{AnimationToken, Inertia, Transition};
use crate::core::camera::{Camera, CameraTarget};
use crate::core::config::EngineConfig;
use crate::core::geo::{LatLng, Point, Size};
use crate::geolocation::{
    Geolocation, GeolocationError, PositionOptions, PositionReport, PositionSink, PositionSource,
    WatchHandle,
};
use crate::input::{hit_test, Action, InputContext, InputController, InputEvent, InputResponse};
use crate::layers::marker::{Marker, MarkerId};
use crate::rendering::{Canvas, RenderScene, Renderer};
use crate::runtime::AsyncSpawner;
use crate::tiles::{TileFetcher, TileLoader};
use crate::{MapError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use instant::Instant;
use std::sync::Arc;
use std::time::Duration;

/// What happened during one [`MapEngine::tick`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStatus {
    pub camera: Camera,
    /// Generation of the current render pass
    pub generation: u64,
    /// A new render pass started this frame
    pub rendered: bool,
    /// A transition, inertia or drag is in progress
    pub animating: bool,
    /// Tiles of the current pass still loading
    pub tiles_pending: usize,
}

impl FrameStatus {
    /// Whether the host should schedule another frame soon
    pub fn needs_repaint(&self) -> bool {
        self.animating || self.tiles_pending > 0
    }
}

pub struct MapEngine {
    config: EngineConfig,
    camera: Camera,
    viewport: Size,
    loader: TileLoader,
    renderer: Renderer,
    input: InputController,
    markers: Vec<Marker>,
    selected: Option<MarkerId>,
    user_location: Option<LatLng>,
    follow_mode: bool,
    transition: Option<Transition>,
    inertia: Option<Inertia>,
    geolocation: Option<Arc<dyn Geolocation>>,
    watch: Option<WatchHandle>,
    position_tx: Sender<PositionReport>,
    position_rx: Receiver<PositionReport>,
    /// Something the render pass draws from changed since the last pass
    dirty: bool,
}

impl MapEngine {
    pub fn new(
        config: EngineConfig,
        fetcher: Arc<dyn TileFetcher>,
        spawner: Arc<dyn AsyncSpawner>,
    ) -> Result<Self> {
        config.validate()?;
        let (position_tx, position_rx) = unbounded();

        Ok(Self {
            camera: config.initial_camera,
            viewport: Size::default(),
            loader: TileLoader::new(&config.tiles, fetcher, spawner),
            renderer: Renderer::new(config.style.clone()),
            input: InputController::new(config.interaction.clone()),
            markers: Vec::new(),
            selected: None,
            user_location: None,
            follow_mode: false,
            transition: None,
            inertia: None,
            geolocation: None,
            watch: None,
            position_tx,
            position_rx,
            dirty: true,
            config,
        })
    }

    /// Engine fetching OpenStreetMap-style tiles over HTTP on the current Tokio runtime
    #[cfg(feature = "tokio-runtime")]
    pub fn with_http(config: EngineConfig) -> Result<Self> {
        let fetcher = Arc::new(crate::tiles::HttpTileFetcher::from_config(&config.tiles)?);
        Self::new(config, fetcher, crate::runtime::default_spawner())
    }

    pub fn with_markers(mut self, markers: Vec<Marker>) -> Self {
        self.set_markers(markers);
        self
    }

    /// Replaces the points of interest; a selection that no longer exists is cleared
    pub fn set_markers(&mut self, markers: Vec<Marker>) {
        self.markers = markers;
        if let Some(id) = self.selected {
            if !self.markers.iter().any(|m| m.id == id) {
                self.selected = None;
            }
        }
        self.dirty = true;
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport
    }

    /// New viewport size; camera and tile cache are kept
    pub fn resize(&mut self, size: Size) {
        if size != self.viewport {
            log::debug!("viewport resized to {}x{}", size.width, size.height);
            self.viewport = size;
            self.dirty = true;
        }
    }

    /// Starts an eased move, superseding any running transition and stopping inertia
    pub fn animate_to(&mut self, target: CameraTarget, duration: Duration) -> AnimationToken {
        if let Some(mut previous) = self.transition.take() {
            previous.cancel();
        }
        self.stop_inertia();

        let transition = Transition::new(self.camera, target, duration);
        let token = transition.token();
        self.transition = Some(transition);
        token
    }

    /// Direct pan by a screen-pixel drag delta
    pub fn pan_by(&mut self, delta: Point) {
        self.cancel_transition();
        self.camera.pan_by_pixels(delta);
        self.dirty = true;
    }

    /// Direct zoom change, clamped
    pub fn zoom_by(&mut self, delta: f64) {
        self.cancel_transition();
        self.camera.zoom_by(delta);
        self.dirty = true;
    }

    /// Restores the configured camera and turns follow mode off
    pub fn reset_to_initial(&mut self) {
        self.cancel_transition();
        self.stop_inertia();
        self.camera = self.config.initial_camera;
        self.follow_mode = false;
        self.dirty = true;
    }

    /// Sets or clears the selection. Unknown ids are ignored.
    pub fn select(&mut self, id: Option<MarkerId>) {
        match id {
            Some(id) if !self.markers.iter().any(|m| m.id == id) => {
                log::debug!("ignoring selection of unknown marker {}", id);
            }
            _ => {
                if self.selected != id {
                    self.selected = id;
                    self.dirty = true;
                }
            }
        }
    }

    /// Selects a marker and eases the camera onto it at the selection zoom or closer
    pub fn focus_marker(&mut self, id: MarkerId) -> bool {
        let Some(position) = self.markers.iter().find(|m| m.id == id).map(|m| m.position) else {
            return false;
        };
        self.select(Some(id));
        let zoom = self.camera.zoom.max(self.config.interaction.select_zoom);
        self.animate_to(
            CameraTarget::new(position, Some(zoom)),
            self.config.interaction.select_duration(),
        );
        true
    }

    pub fn selected_marker_id(&self) -> Option<MarkerId> {
        self.selected
    }

    pub fn selected_marker(&self) -> Option<&Marker> {
        self.selected
            .and_then(|id| self.markers.iter().find(|m| m.id == id))
    }

    /// Marker under a viewport position, first in list order within the hit radius
    pub fn hit_test(&self, position: Point) -> Option<&Marker> {
        hit_test(
            &self.markers,
            &self.camera,
            self.viewport,
            position,
            self.config.interaction.hit_radius_px,
        )
    }

    /// Replaces the position source; a watch on the old one is cleared
    pub fn attach_geolocation(&mut self, geolocation: Arc<dyn Geolocation>) {
        self.clear_watch();
        self.geolocation = Some(geolocation);
        if self.follow_mode {
            self.ensure_watch();
        }
    }

    /// One-shot position request; success recenters on the user
    pub fn locate_user(&mut self) -> Result<()> {
        let Some(geolocation) = &self.geolocation else {
            return Err(MapError::Geolocation(GeolocationError::Unavailable(
                "no geolocation source attached".into(),
            )));
        };
        geolocation.get_current_position(
            PositionSink::new(PositionSource::OneShot, self.position_tx.clone()),
            PositionOptions::from(&self.config.geolocation),
        );
        Ok(())
    }

    /// While on, every watched position recenters the camera.
    ///
    /// Turning it off keeps the watch so the location dot stays current.
    pub fn set_follow_mode(&mut self, enabled: bool) {
        self.follow_mode = enabled;
        if enabled {
            self.ensure_watch();
        }
    }

    pub fn follow_mode(&self) -> bool {
        self.follow_mode
    }

    pub fn user_location(&self) -> Option<LatLng> {
        self.user_location
    }

    /// Feeds one host input event through the controller and applies the result
    pub fn handle_input(&mut self, event: InputEvent) -> InputResponse {
        let ctx = InputContext {
            camera: &self.camera,
            viewport: self.viewport,
            markers: &self.markers,
        };
        let (response, actions) = self.input.handle(event, ctx);

        for action in actions {
            match action {
                Action::BeginDrag => {
                    self.follow_mode = false;
                    self.stop_inertia();
                }
                Action::EndDrag { velocity } => {
                    self.inertia = Inertia::from_release(velocity, &self.config.interaction);
                    if self.inertia.is_some() {
                        log::trace!("inertia from {:.3}, {:.3} px/ms", velocity.x, velocity.y);
                    }
                }
                Action::ZoomBy(delta) => self.zoom_by(delta),
                Action::SelectMarker { id, .. } => {
                    self.focus_marker(id);
                }
                Action::Resize(size) => self.resize(size),
            }
        }
        response
    }

    /// Advances one display frame and draws onto `canvas`
    pub fn tick(&mut self, now: Instant, canvas: &mut dyn Canvas) -> FrameStatus {
        self.drain_positions();

        if let Some(pan) = self.input.take_pending_pan() {
            self.pan_by(pan);
        }

        if let Some(inertia) = self.inertia.as_mut() {
            match inertia.step() {
                Some(delta) => {
                    self.cancel_transition();
                    self.camera.pan_by_pixels(delta);
                    self.dirty = true;
                }
                None => self.inertia = None,
            }
        }

        if let Some(transition) = self.transition.as_mut() {
            if let Some(camera) = transition.step(now) {
                self.camera = camera;
                self.dirty = true;
            }
            if transition.is_finished() {
                self.transition = None;
            }
        }

        let rendered = self.dirty && !self.viewport.is_empty();
        if rendered {
            let scene = RenderScene {
                camera: self.camera,
                viewport: self.viewport,
                user_location: self.user_location,
                selected: self.selected,
            };
            self.renderer
                .begin_pass(scene, &mut self.loader, canvas, &self.markers);
            self.dirty = false;
        }

        for completion in self.loader.poll_completions() {
            self.renderer
                .tile_completed(&completion, canvas, &self.markers);
        }

        FrameStatus {
            camera: self.camera,
            generation: self.renderer.generation(),
            rendered,
            animating: self.is_animating(),
            tiles_pending: self.renderer.outstanding(),
        }
    }

    /// A transition, inertia or drag is moving the camera
    pub fn is_animating(&self) -> bool {
        self.transition.is_some() || self.inertia.is_some() || self.input.is_dragging()
    }

    pub fn generation(&self) -> u64 {
        self.renderer.generation()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn loader(&self) -> &TileLoader {
        &self.loader
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn drain_positions(&mut self) {
        while let Ok(report) = self.position_rx.try_recv() {
            match report.result {
                Ok(position) => {
                    self.user_location = Some(position);
                    self.dirty = true;
                    match report.source {
                        PositionSource::OneShot => {
                            let zoom = self.camera.zoom.max(self.config.interaction.select_zoom);
                            self.animate_to(
                                CameraTarget::new(position, Some(zoom)),
                                self.config.interaction.locate_duration(),
                            );
                        }
                        PositionSource::Watch if self.follow_mode => {
                            self.animate_to(
                                CameraTarget::center(position),
                                self.config.interaction.follow_duration(),
                            );
                        }
                        PositionSource::Watch => {}
                    }
                }
                // A watch that times out keeps following; it may still report later
                Err(GeolocationError::Timeout) => {
                    log::warn!("geolocation timed out, keeping last known position");
                }
                Err(e) => {
                    log::warn!("geolocation failed: {}", e);
                    self.follow_mode = false;
                }
            }
        }
    }

    fn ensure_watch(&mut self) {
        if self.watch.is_some() {
            return;
        }
        if let Some(geolocation) = &self.geolocation {
            let handle = geolocation.watch_position(
                PositionSink::new(PositionSource::Watch, self.position_tx.clone()),
                PositionOptions::from(&self.config.geolocation),
            );
            log::debug!("started position watch {:?}", handle);
            self.watch = Some(handle);
        }
    }

    fn clear_watch(&mut self) {
        if let (Some(geolocation), Some(handle)) = (&self.geolocation, self.watch.take()) {
            geolocation.clear_watch(handle);
        }
    }

    fn cancel_transition(&mut self) {
        if let Some(mut transition) = self.transition.take() {
            transition.cancel();
        }
    }

    fn stop_inertia(&mut self) {
        self.inertia = None;
    }
}

impl Drop for MapEngine {
    fn drop(&mut self) {
        self.clear_watch();
    }
}
