pub mod cache;
pub mod fetcher;
pub mod loader;
pub mod source;

use crate::core::geo::TileKey;
use image::{Rgba, RgbaImage};

// Re-exports for convenience
pub use cache::TileCache;
pub use fetcher::{HttpTileFetcher, TileFetcher};
pub use loader::{TileCompletion, TileLoader, TileRequest};
pub use source::{TileSource, UrlTemplateSource};

/// A decoded raster tile, immutable once cached
#[derive(Debug, Clone, PartialEq)]
pub struct TileImage {
    pub key: TileKey,
    pub pixels: RgbaImage,
}

impl TileImage {
    pub fn new(key: TileKey, pixels: RgbaImage) -> Self {
        Self { key, pixels }
    }

    /// Single-color tile, mostly useful for tests and placeholder sources
    pub fn solid(key: TileKey, size: u32, color: [u8; 4]) -> Self {
        Self::new(key, RgbaImage::from_pixel(size, size, Rgba(color)))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}
