//! egui host for the map engine.
//!
//! egui repaints everything each frame, so the widget keeps the engine's
//! output in a [`RecordingCanvas`] display list and replays it with one
//! texture per cached tile.

use crate::core::config::ColorRgba;
use crate::core::geo::{Point, Size, TileKey};
use crate::core::map::{FrameStatus, MapEngine};
use crate::input::InputEvent;
use crate::prelude::HashMap;
use crate::rendering::{DrawCommand, RecordingCanvas};
use egui::{Color32, ColorImage, Pos2, Rect, Response, Sense, Stroke, TextureHandle, Ui, Vec2};
use instant::Instant;

const POINTER_ID: u64 = 0;
const USER_LOCATION_RADIUS: f32 = 7.0;

pub struct MapWidget {
    engine: MapEngine,
    canvas: RecordingCanvas,
    textures: HashMap<TileKey, TextureHandle>,
    last_pointer: Option<Point>,
    last_status: Option<FrameStatus>,
}

impl MapWidget {
    pub fn new(engine: MapEngine) -> Self {
        Self {
            engine,
            canvas: RecordingCanvas::default(),
            textures: HashMap::default(),
            last_pointer: None,
            last_status: None,
        }
    }

    pub fn engine(&self) -> &MapEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MapEngine {
        &mut self.engine
    }

    /// Status of the most recent frame
    pub fn last_status(&self) -> Option<FrameStatus> {
        self.last_status
    }

    /// Lays the map out over all available space, runs one engine frame and paints it
    pub fn show(&mut self, ui: &mut Ui) -> Response {
        let desired_size = ui.available_size();
        let (rect, response) = ui.allocate_exact_size(desired_size, Sense::click_and_drag());
        let now = Instant::now();

        let size = Size::new(rect.width() as f64, rect.height() as f64);
        self.canvas.resize(size);
        self.engine.handle_input(InputEvent::Resize {
            width: size.width,
            height: size.height,
        });

        self.forward_input(ui, &response, rect, now);

        let status = self.engine.tick(now, &mut self.canvas);
        self.paint(ui, rect);
        self.last_status = Some(status);

        if status.needs_repaint() {
            ui.ctx().request_repaint();
        }
        response
    }

    fn forward_input(&mut self, ui: &Ui, response: &Response, rect: Rect, now: Instant) {
        let local = |pos: Pos2| Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);

        if response.drag_started() {
            let origin = ui
                .input(|i| i.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos());
            if let Some(origin) = origin {
                self.engine.handle_input(InputEvent::PointerDown {
                    pointer_id: POINTER_ID,
                    position: local(origin),
                    time: now,
                });
            }
        }

        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                let position = local(pos);
                self.last_pointer = Some(position);
                self.engine.handle_input(InputEvent::PointerMove {
                    pointer_id: POINTER_ID,
                    position,
                    time: now,
                });
            }
        }

        if response.drag_released() {
            let position = response
                .interact_pointer_pos()
                .map(local)
                .or(self.last_pointer)
                .unwrap_or_default();
            self.engine.handle_input(InputEvent::PointerUp {
                pointer_id: POINTER_ID,
                position,
                time: now,
            });
            self.last_pointer = None;
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.engine.handle_input(InputEvent::Click {
                    position: local(pos),
                });
            }
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let position = response
                    .hover_pos()
                    .map(local)
                    .unwrap_or_default();
                // egui reports scrolling up as positive
                self.engine.handle_input(InputEvent::Wheel {
                    delta_y: -scroll as f64,
                    position,
                });
            }
        }
    }

    fn paint(&mut self, ui: &Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        let to_screen = |p: Point| rect.min + Vec2::new(p.x as f32, p.y as f32);

        for command in self.canvas.commands() {
            match command {
                DrawCommand::Clear(color) => {
                    painter.rect_filled(rect, 0.0, to_color32(*color));
                }
                DrawCommand::Tile { tile, placement } => {
                    let texture = self.textures.entry(tile.key).or_insert_with(|| {
                        let image = ColorImage::from_rgba_unmultiplied(
                            [tile.width() as usize, tile.height() as usize],
                            tile.pixels.as_raw(),
                        );
                        ui.ctx()
                            .load_texture(format!("tile-{}", tile.key), image, egui::TextureOptions::LINEAR)
                    });
                    let tile_rect = Rect::from_min_size(
                        to_screen(placement.origin),
                        Vec2::splat(placement.size as f32),
                    );
                    painter.image(
                        texture.id(),
                        tile_rect,
                        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }
                DrawCommand::Marker {
                    position, style, ..
                } => {
                    let scale = if style.selected { 1.5 } else { 1.0 };
                    let radius = (style.radius * scale) as f32;
                    painter.circle(
                        to_screen(*position),
                        radius,
                        to_color32(style.fill),
                        Stroke::new(2.0, Color32::WHITE),
                    );
                }
                DrawCommand::UserLocation { position, color } => {
                    let center = to_screen(*position);
                    let halo = Color32::from_rgba_unmultiplied(color[0], color[1], color[2], 64);
                    painter.circle_filled(center, USER_LOCATION_RADIUS * 2.5, halo);
                    painter.circle(
                        center,
                        USER_LOCATION_RADIUS,
                        to_color32(*color),
                        Stroke::new(2.0, Color32::WHITE),
                    );
                }
            }
        }

        // Textures follow the tile cache; evicted tiles release their GPU memory
        let cache = self.engine.loader().cache();
        self.textures.retain(|key, _| cache.contains(key));
    }
}

pub fn to_color32(color: ColorRgba) -> Color32 {
    Color32::from_rgba_unmultiplied(color[0], color[1], color[2], color[3])
}
