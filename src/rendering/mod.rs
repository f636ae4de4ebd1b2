pub mod context;
pub mod pass;
pub mod raster;

// Re-export main types
pub use context::{Canvas, DrawCommand, MarkerStyle, RecordingCanvas};
pub use pass::{RenderScene, Renderer};
pub use raster::RasterCanvas;
