use crate::core::config::ColorRgba;
use crate::core::geo::{Point, Size, TileKey};
use crate::core::projection::TilePlacement;
use crate::layers::marker::MarkerId;
use crate::tiles::TileImage;
use std::sync::Arc;

/// How a single marker pin is painted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub fill: ColorRgba,
    pub radius: f64,
    pub selected: bool,
}

/// Pixel surface the render pass draws onto.
///
/// Implementations only paint; ordering and staleness are the render
/// pass's business.
pub trait Canvas {
    fn size(&self) -> Size;

    fn clear(&mut self, color: ColorRgba);

    /// Draw `tile` stretched to `placement`
    fn draw_tile(&mut self, tile: &Arc<TileImage>, placement: &TilePlacement);

    fn draw_marker(&mut self, id: MarkerId, position: Point, style: &MarkerStyle);

    fn draw_user_location(&mut self, position: Point, color: ColorRgba);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(ColorRgba),
    Tile {
        tile: Arc<TileImage>,
        placement: TilePlacement,
    },
    Marker {
        id: MarkerId,
        position: Point,
        style: MarkerStyle,
    },
    UserLocation {
        position: Point,
        color: ColorRgba,
    },
}

/// Canvas that keeps a display list instead of pixels.
///
/// Used by tests to assert draw order, and by immediate-mode hosts that
/// replay the list every frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    size: Size,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drains the display list
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn tile_keys(&self) -> Vec<TileKey> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Tile { tile, .. } => Some(tile.key),
                _ => None,
            })
            .collect()
    }

    pub fn marker_ids(&self) -> Vec<MarkerId> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Marker { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self, color: ColorRgba) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_tile(&mut self, tile: &Arc<TileImage>, placement: &TilePlacement) {
        self.commands.push(DrawCommand::Tile {
            tile: Arc::clone(tile),
            placement: *placement,
        });
    }

    fn draw_marker(&mut self, id: MarkerId, position: Point, style: &MarkerStyle) {
        self.commands.push(DrawCommand::Marker {
            id,
            position,
            style: *style,
        });
    }

    fn draw_user_location(&mut self, position: Point, color: ColorRgba) {
        self.commands
            .push(DrawCommand::UserLocation { position, color });
    }
}
