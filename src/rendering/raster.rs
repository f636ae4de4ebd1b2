use crate::core::config::ColorRgba;
use crate::core::geo::{Point, Size};
use crate::core::projection::TilePlacement;
use crate::layers::marker::MarkerId;
use crate::rendering::context::{Canvas, MarkerStyle};
use crate::tiles::TileImage;
use crate::Result;
use image::imageops::{self, FilterType};
use image::{Pixel, Rgba, RgbaImage};
use std::path::Path;
use std::sync::Arc;

const OUTLINE: ColorRgba = [255, 255, 255, 255];
const USER_LOCATION_RADIUS: f64 = 7.0;

/// Software canvas composing into an in-memory RGBA image
pub struct RasterCanvas {
    image: RgbaImage,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Encodes the current frame, format chosen from the extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }

    /// Alpha-blended filled circle, clipped to the image
    fn fill_disc(&mut self, center: Point, radius: f64, color: ColorRgba) {
        if radius <= 0.0 {
            return;
        }
        let (w, h) = self.image.dimensions();
        let x0 = (center.x - radius).floor().max(0.0) as i64;
        let y0 = (center.y - radius).floor().max(0.0) as i64;
        let x1 = ((center.x + radius).ceil() as i64).min(w as i64 - 1);
        let y1 = ((center.y + radius).ceil() as i64).min(h as i64 - 1);
        let color = Rgba(color);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                if dx * dx + dy * dy <= radius * radius {
                    self.image.get_pixel_mut(x as u32, y as u32).blend(&color);
                }
            }
        }
    }
}

impl Canvas for RasterCanvas {
    fn size(&self) -> Size {
        Size::new(self.image.width() as f64, self.image.height() as f64)
    }

    fn clear(&mut self, color: ColorRgba) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba(color);
        }
    }

    fn draw_tile(&mut self, tile: &Arc<TileImage>, placement: &TilePlacement) {
        // Snap both edges outward so neighbouring tiles never leave a seam
        let left = placement.origin.x.floor();
        let top = placement.origin.y.floor();
        let width = ((placement.origin.x + placement.size).ceil() - left).max(1.0) as u32;
        let height = ((placement.origin.y + placement.size).ceil() - top).max(1.0) as u32;

        if width == tile.width() && height == tile.height() {
            imageops::overlay(&mut self.image, &tile.pixels, left as i64, top as i64);
        } else {
            let scaled = imageops::resize(&tile.pixels, width, height, FilterType::Triangle);
            imageops::overlay(&mut self.image, &scaled, left as i64, top as i64);
        }
    }

    fn draw_marker(&mut self, _id: MarkerId, position: Point, style: &MarkerStyle) {
        let radius = if style.selected {
            style.radius * 1.5
        } else {
            style.radius
        };
        self.fill_disc(position, radius + 2.0, OUTLINE);
        self.fill_disc(position, radius, style.fill);
    }

    fn draw_user_location(&mut self, position: Point, color: ColorRgba) {
        let mut halo = color;
        halo[3] = 64;
        self.fill_disc(position, USER_LOCATION_RADIUS * 2.5, halo);
        self.fill_disc(position, USER_LOCATION_RADIUS + 2.0, OUTLINE);
        self.fill_disc(position, USER_LOCATION_RADIUS, color);
    }
}
