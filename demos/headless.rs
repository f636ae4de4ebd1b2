//! Renders the sample shelters over OpenStreetMap into a PNG.
//!
//! Usage: `cargo run --example headless -- [out.png] [zoom]`

use shelter_map::{
    data::sample_markers, CameraTarget, EngineConfig, LatLng, MapEngine, RasterCanvas, Size,
};
use std::time::Duration;

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 768;
const MAX_FRAMES: usize = 60 * 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shelter_map::init_logging();

    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "shelters.png".to_string());
    let zoom: f64 = match args.next() {
        Some(z) => z.parse()?,
        None => 13.0,
    };

    let mut engine = MapEngine::with_http(EngineConfig::default())?.with_markers(sample_markers());
    engine.resize(Size::new(WIDTH as f64, HEIGHT as f64));
    engine.animate_to(
        CameraTarget::new(LatLng::new(32.7157, -117.1611), Some(zoom)),
        Duration::ZERO,
    );

    let mut canvas = RasterCanvas::new(WIDTH, HEIGHT);
    let mut settled = false;
    for _ in 0..MAX_FRAMES {
        let status = engine.tick(instant::Instant::now(), &mut canvas);
        if !status.needs_repaint() && engine.renderer().is_settled() {
            settled = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(16)).await;
    }

    if !settled {
        log::warn!("tiles still loading after {} frames, saving what we have", MAX_FRAMES);
    }
    canvas.save(&output)?;
    log::info!(
        "wrote {} ({} tiles cached, {} stale discards)",
        output,
        engine.loader().cache().len(),
        engine.renderer().stale_discards()
    );
    Ok(())
}
