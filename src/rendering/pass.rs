//! Generation-tagged render passes.
//!
//! Every pass bumps the generation. Tiles not yet cached leave a waiter
//! tagged with that generation; when the tile lands, only waiters of the
//! current generation draw. Overlays follow once every tile of the pass has
//! settled, so pins are never covered by a late tile.

use crate::core::camera::Camera;
use crate::core::config::MapStyle;
use crate::core::geo::{LatLng, Size, TileKey};
use crate::core::projection::{geo_to_pixel, visible_tiles, TilePlacement};
use crate::layers::marker::{AvailabilityTier, Marker, MarkerId};
use crate::prelude::HashMap;
use crate::rendering::context::{Canvas, MarkerStyle};
use crate::tiles::{TileCompletion, TileLoader, TileRequest};

/// Everything a pass draws from, captured when it starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderScene {
    pub camera: Camera,
    pub viewport: Size,
    pub user_location: Option<LatLng>,
    pub selected: Option<MarkerId>,
}

#[derive(Debug, Clone, Copy)]
struct Waiter {
    generation: u64,
    placement: TilePlacement,
}

pub struct Renderer {
    style: MapStyle,
    generation: u64,
    scene: Option<RenderScene>,
    waiters: HashMap<TileKey, Vec<Waiter>>,
    /// Tiles of the current pass still loading
    outstanding: usize,
    overlays_drawn: bool,
    stale_discards: u64,
}

impl Renderer {
    pub fn new(style: MapStyle) -> Self {
        Self {
            style,
            generation: 0,
            scene: None,
            waiters: HashMap::default(),
            outstanding: 0,
            overlays_drawn: false,
            stale_discards: 0,
        }
    }

    /// Starts a pass, superseding any earlier one. Returns its generation.
    pub fn begin_pass(
        &mut self,
        scene: RenderScene,
        loader: &mut TileLoader,
        canvas: &mut dyn Canvas,
        markers: &[Marker],
    ) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        self.scene = Some(scene);
        self.outstanding = 0;
        self.overlays_drawn = false;

        canvas.clear(self.style.background);

        let tiles = visible_tiles(scene.camera.zoom, scene.camera.center, scene.viewport);
        for placement in tiles {
            match loader.request(placement.key) {
                TileRequest::Ready(tile) => canvas.draw_tile(&tile, &placement),
                TileRequest::Pending => {
                    let waiters = self.waiters.entry(placement.key).or_default();
                    // Older waiters on this key can never draw again
                    waiters.retain(|w| w.generation == generation);
                    waiters.push(Waiter {
                        generation,
                        placement,
                    });
                    self.outstanding += 1;
                }
            }
        }

        log::debug!(
            "render pass {} at z{:.2}: {} tiles pending, {} queued in loader",
            generation,
            scene.camera.zoom,
            self.outstanding,
            loader.queued_count()
        );

        if self.outstanding == 0 {
            self.draw_overlays(canvas, markers);
        }
        generation
    }

    /// Feeds one finished load into the current pass
    pub fn tile_completed(
        &mut self,
        completion: &TileCompletion,
        canvas: &mut dyn Canvas,
        markers: &[Marker],
    ) {
        let Some(waiters) = self.waiters.remove(&completion.key) else {
            return;
        };

        for waiter in waiters {
            if waiter.generation != self.generation {
                self.stale_discards += 1;
                log::trace!(
                    "discarding tile {} from pass {} (current {})",
                    completion.key,
                    waiter.generation,
                    self.generation
                );
                continue;
            }

            if let Ok(tile) = &completion.result {
                canvas.draw_tile(tile, &waiter.placement);
            }
            self.outstanding = self.outstanding.saturating_sub(1);
        }

        if self.outstanding == 0 && !self.overlays_drawn {
            self.draw_overlays(canvas, markers);
        }
    }

    fn draw_overlays(&mut self, canvas: &mut dyn Canvas, markers: &[Marker]) {
        let Some(scene) = self.scene else {
            return;
        };
        self.overlays_drawn = true;

        for marker in markers {
            let position = geo_to_pixel(
                marker.position.lat,
                marker.position.lng,
                scene.camera.zoom,
                scene.camera.center,
                scene.viewport,
            );
            let style = MarkerStyle {
                fill: self.tier_color(marker.tier()),
                radius: self.style.marker_radius,
                selected: scene.selected == Some(marker.id),
            };
            canvas.draw_marker(marker.id, position, &style);
        }

        if let Some(location) = scene.user_location {
            let position = geo_to_pixel(
                location.lat,
                location.lng,
                scene.camera.zoom,
                scene.camera.center,
                scene.viewport,
            );
            canvas.draw_user_location(position, self.style.user_location);
        }
    }

    fn tier_color(&self, tier: AvailabilityTier) -> [u8; 4] {
        match tier {
            AvailabilityTier::High => self.style.high_availability,
            AvailabilityTier::Medium => self.style.medium_availability,
            AvailabilityTier::None => self.style.no_availability,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Tiles of the current pass still loading
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Whether the current pass has drawn everything, overlays included
    pub fn is_settled(&self) -> bool {
        self.outstanding == 0 && self.overlays_drawn
    }

    /// Tile results thrown away because a newer pass superseded theirs
    pub fn stale_discards(&self) -> u64 {
        self.stale_discards
    }

    pub fn scene(&self) -> Option<&RenderScene> {
        self.scene.as_ref()
    }

    pub fn style(&self) -> &MapStyle {
        &self.style
    }
}
