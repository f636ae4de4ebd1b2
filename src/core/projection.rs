//! Web Mercator projection between geographic coordinates, tile indices and pixels.
//!
//! Every function here is pure: no caching and no shared state, so render passes
//! may call them freely.

use crate::core::constants::TILE_SIZE_F64;
use crate::core::geo::{LatLng, Point, Size, TileKey};
use std::f64::consts::PI;

/// World size in pixels at a (possibly fractional) zoom level
pub fn world_scale(zoom: f64) -> f64 {
    TILE_SIZE_F64 * 2_f64.powf(zoom)
}

/// Normalized Mercator position in `[0, 1]` for both axes
fn mercator_unit(lat: f64, lng: f64) -> (f64, f64) {
    let lat_rad = lat.to_radians();
    let x = (lng + 180.0) / 360.0;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
    (x, y)
}

/// Projects a coordinate into continuous world pixels at `zoom`
pub fn world_pixel(lat: f64, lng: f64, zoom: f64) -> Point {
    let (x, y) = mercator_unit(lat, lng);
    let scale = world_scale(zoom);
    Point::new(x * scale, y * scale)
}

/// Standard slippy-map tile indexing
pub fn geo_to_tile(lat: f64, lng: f64, zoom_level: u8) -> (i64, i64) {
    let (x, y) = mercator_unit(lat, lng);
    let n = 2_f64.powi(zoom_level as i32);
    ((x * n).floor() as i64, (y * n).floor() as i64)
}

/// Screen position of a coordinate for a camera at `center`/`zoom`
pub fn geo_to_pixel(lat: f64, lng: f64, zoom: f64, center: LatLng, viewport: Size) -> Point {
    let point = world_pixel(lat, lng, zoom);
    let origin = world_pixel(center.lat, center.lng, zoom);
    Point::new(
        viewport.width / 2.0 + (point.x - origin.x),
        viewport.height / 2.0 + (point.y - origin.y),
    )
}

/// Integer zoom level tiles are fetched at
pub fn tile_zoom(zoom: f64) -> u8 {
    zoom.floor().max(0.0) as u8
}

/// Stretch applied to tiles drawn at a fractional zoom
pub fn scale_factor(zoom: f64) -> f64 {
    2_f64.powf(zoom - zoom.floor())
}

/// Converts a screen-pixel drag delta into a geographic delta `(dlat, dlng)`.
///
/// Planar approximation, not corrected for latitude; fine at drag granularity.
pub fn pixel_delta_to_geo(delta: Point, zoom: f64) -> (f64, f64) {
    let scale = world_scale(zoom);
    ((delta.y / scale) * 360.0, (delta.x / scale) * 360.0)
}

/// A tile positioned on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub key: TileKey,
    /// Top-left corner in screen pixels
    pub origin: Point,
    /// Drawn edge length in pixels
    pub size: f64,
}

impl TilePlacement {
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.origin.x
            && point.x <= self.origin.x + self.size
            && point.y >= self.origin.y
            && point.y <= self.origin.y + self.size
    }
}

/// Screen placement of a tile for the given camera
pub fn place_tile(key: TileKey, zoom: f64, center: LatLng, viewport: Size) -> TilePlacement {
    let factor = 2_f64.powf(zoom - key.z as f64);
    let origin = world_pixel(center.lat, center.lng, key.z as f64);
    TilePlacement {
        key,
        origin: Point::new(
            viewport.width / 2.0 + (key.x as f64 * TILE_SIZE_F64 - origin.x) * factor,
            viewport.height / 2.0 + (key.y as f64 * TILE_SIZE_F64 - origin.y) * factor,
        ),
        size: TILE_SIZE_F64 * factor,
    }
}

/// Tiles covering the viewport plus a one tile margin, centered on the camera tile.
///
/// Indices outside `[0, 2^z)` are dropped here, before anything is requested.
pub fn visible_tiles(zoom: f64, center: LatLng, viewport: Size) -> Vec<TilePlacement> {
    let z = tile_zoom(zoom);
    let (cx, cy) = geo_to_tile(center.lat, center.lng, z);
    let cols = (viewport.width / TILE_SIZE_F64).ceil().max(0.0) as i64 + 2;
    let rows = (viewport.height / TILE_SIZE_F64).ceil().max(0.0) as i64 + 2;
    let start_x = cx - cols / 2;
    let start_y = cy - rows / 2;

    let mut tiles = Vec::with_capacity((cols * rows) as usize);
    for y in start_y..start_y + rows {
        for x in start_x..start_x + cols {
            if let Some(key) = TileKey::checked(z, x, y) {
                tiles.push(place_tile(key, zoom, center, viewport));
            }
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_to_tile_golden_value() {
        assert_eq!(geo_to_tile(32.7157, -117.1611, 13), (1429, 3307));
    }

    #[test]
    fn test_geo_to_tile_origin() {
        assert_eq!(geo_to_tile(0.0, 0.0, 1), (1, 1));
        assert_eq!(geo_to_tile(85.0, -180.0, 3), (0, 0));
    }

    #[test]
    fn test_center_projects_to_viewport_center() {
        let center = LatLng::new(32.7157, -117.1611);
        let p = geo_to_pixel(
            center.lat,
            center.lng,
            15.0,
            center,
            Size::new(800.0, 600.0),
        );
        assert_eq!(p, Point::new(400.0, 300.0));
    }

    #[test]
    fn test_point_falls_inside_its_tile() {
        let samples = [
            (32.7157, -117.1611, 13.0),
            (32.7157, -117.1611, 13.6),
            (-33.8688, 151.2093, 10.25),
            (51.5074, -0.1278, 17.9),
            (0.0001, 0.0001, 12.0),
            (84.9, 179.9, 11.5),
        ];
        let viewport = Size::new(1024.0, 768.0);
        for (lat, lng, zoom) in samples {
            let center = LatLng::new(lat + 0.01, lng - 0.01);
            let (x, y) = geo_to_tile(lat, lng, tile_zoom(zoom));
            let key = TileKey::checked(tile_zoom(zoom), x, y).expect("tile in range");
            let placement = place_tile(key, zoom, center, viewport);
            let point = geo_to_pixel(lat, lng, zoom, center, viewport);
            assert!(
                placement.contains(&point),
                "{:?} not inside {:?} at zoom {}",
                point,
                placement,
                zoom
            );
        }
    }

    #[test]
    fn test_scale_factor() {
        assert_eq!(scale_factor(13.0), 1.0);
        assert!((scale_factor(13.5) - 2_f64.sqrt()).abs() < 1e-12);
        assert_eq!(tile_zoom(13.99), 13);
    }

    #[test]
    fn test_visible_tiles_window() {
        let center = LatLng::new(32.7157, -117.1611);
        let tiles = visible_tiles(13.0, center, Size::new(800.0, 600.0));
        // ceil(800/256)+2 = 6 columns, ceil(600/256)+2 = 5 rows
        assert_eq!(tiles.len(), 30);
        assert!(tiles.iter().any(|t| t.key == TileKey::new(13, 1429, 3307)));
        assert!(tiles.iter().all(|t| t.size == 256.0));
    }

    #[test]
    fn test_visible_tiles_skip_out_of_range() {
        // Near the antimeridian and the north edge some indices fall outside the grid
        let center = LatLng::new(85.0, 179.99);
        let tiles = visible_tiles(10.0, center, Size::new(800.0, 600.0));
        assert!(!tiles.is_empty());
        assert!(tiles.len() < 30);
        assert!(tiles.iter().all(|t| t.key.is_valid()));
    }

    #[test]
    fn test_pixel_delta_to_geo() {
        let (dlat, dlng) = pixel_delta_to_geo(Point::new(256.0, 0.0), 0.0);
        assert_eq!(dlat, 0.0);
        assert_eq!(dlng, 360.0);
    }
}
