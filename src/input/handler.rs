use crate::core::camera::Camera;
use crate::core::config::InteractionConfig;
use crate::core::geo::{LatLng, Point, Size};
use crate::core::projection::geo_to_pixel;
use crate::input::drag::DragSession;
use crate::input::events::{InputEvent, InputResponse, PointerCapture};
use crate::layers::marker::{Marker, MarkerId};

/// Map actions produced from input, applied by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A drag started: auto-follow is over and any momentum stops
    BeginDrag,
    /// Drag released with this velocity in px/ms
    EndDrag { velocity: Point },
    /// Wheel zoom by a signed delta
    ZoomBy(f64),
    /// A tap landed on a marker
    SelectMarker { id: MarkerId, position: LatLng },
    Resize(Size),
}

/// Camera and overlay state the controller needs to interpret an event
#[derive(Debug, Clone, Copy)]
pub struct InputContext<'a> {
    pub camera: &'a Camera,
    pub viewport: Size,
    pub markers: &'a [Marker],
}

/// Turns pointer, wheel and resize events into [`Action`]s.
///
/// Drag deltas are not applied per event. They accumulate and the engine
/// consumes them once per frame through [`InputController::take_pending_pan`].
pub struct InputController {
    pub enabled: bool,
    config: InteractionConfig,
    drag: Option<DragSession>,
    pending_pan: Point,
    /// Set when the last gesture was a real drag so its trailing click is ignored
    suppress_click: bool,
}

impl InputController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            enabled: true,
            config,
            drag: None,
            pending_pan: Point::default(),
            suppress_click: false,
        }
    }

    /// Handle one input event
    pub fn handle(&mut self, event: InputEvent, ctx: InputContext<'_>) -> (InputResponse, Vec<Action>) {
        if !self.enabled {
            return (InputResponse::not_handled(), vec![]);
        }

        let mut actions = vec![];

        let response = match event {
            InputEvent::PointerDown {
                pointer_id,
                position,
                time,
            } => {
                if self.drag.is_some() {
                    // Second finger; single-pointer panning only
                    return (InputResponse::not_handled(), actions);
                }
                self.drag = Some(DragSession::new(pointer_id, position, time));
                self.suppress_click = false;
                actions.push(Action::BeginDrag);
                InputResponse::handled().with_capture(PointerCapture::Acquire(pointer_id))
            }
            InputEvent::PointerMove {
                pointer_id,
                position,
                time,
            } => match self.drag.as_mut() {
                Some(drag) if drag.pointer_id() == pointer_id => {
                    let delta = drag.record(position, time);
                    self.pending_pan = self.pending_pan.add(&delta);
                    InputResponse::handled()
                }
                _ => InputResponse::not_handled(),
            },
            InputEvent::PointerUp {
                pointer_id,
                position,
                time,
            }
            | InputEvent::PointerCancel {
                pointer_id,
                position,
                time,
            }
            | InputEvent::PointerLeave {
                pointer_id,
                position,
                time,
            } => {
                let owns_drag = self
                    .drag
                    .as_ref()
                    .is_some_and(|drag| drag.pointer_id() == pointer_id);
                match self.drag.take() {
                    Some(mut drag) if owns_drag => {
                        // Sampled even when unmoved, so a pointer held still before release has no fling
                        let delta = drag.record(position, time);
                        self.pending_pan = self.pending_pan.add(&delta);
                        self.suppress_click = drag.moved_beyond(self.config.tap_slop_px);
                        actions.push(Action::EndDrag {
                            velocity: drag.release_velocity(self.config.velocity_window_ms),
                        });
                        InputResponse::handled().with_capture(PointerCapture::Release(pointer_id))
                    }
                    other => {
                        self.drag = other;
                        InputResponse::not_handled()
                    }
                }
            }
            InputEvent::Click { position } => {
                if std::mem::take(&mut self.suppress_click) {
                    log::trace!("click at ({:.1}, {:.1}) ended a drag, not a tap", position.x, position.y);
                    InputResponse::handled()
                } else if let Some(marker) = hit_test(
                    ctx.markers,
                    ctx.camera,
                    ctx.viewport,
                    position,
                    self.config.hit_radius_px,
                ) {
                    actions.push(Action::SelectMarker {
                        id: marker.id,
                        position: marker.position,
                    });
                    InputResponse::handled()
                } else {
                    InputResponse::not_handled()
                }
            }
            InputEvent::Wheel { delta_y, .. } => {
                if delta_y < 0.0 {
                    actions.push(Action::ZoomBy(self.config.wheel_zoom_step));
                } else if delta_y > 0.0 {
                    actions.push(Action::ZoomBy(-self.config.wheel_zoom_step));
                }
                // Always consumed so the host never scrolls underneath the map
                InputResponse::handled()
            }
            InputEvent::Resize { width, height } => {
                actions.push(Action::Resize(Size::new(width, height)));
                InputResponse::handled()
            }
        };

        (response, actions)
    }

    /// Pan accumulated since the last frame, if any
    pub fn take_pending_pan(&mut self) -> Option<Point> {
        let pan = std::mem::take(&mut self.pending_pan);
        (!pan.is_zero()).then_some(pan)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }
}

/// First marker in list order within `radius` pixels of `position`.
///
/// Overlapping markers resolve by list order, not by which is drawn on top.
pub fn hit_test<'a>(
    markers: &'a [Marker],
    camera: &Camera,
    viewport: Size,
    position: Point,
    radius: f64,
) -> Option<&'a Marker> {
    markers.iter().find(|marker| {
        let pixel = geo_to_pixel(
            marker.position.lat,
            marker.position.lng,
            camera.zoom,
            camera.center,
            viewport,
        );
        pixel.distance_to(&position) <= radius
    })
}
