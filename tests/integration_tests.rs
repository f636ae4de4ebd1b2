//! End-to-end behaviour of the engine: input, geolocation, motion and render passes.

use async_trait::async_trait;
use shelter_map::{
    constants::{MAX_ZOOM, MIN_ZOOM},
    core::projection::visible_tiles,
    geolocation::GeolocationError,
    input::InputResponse,
    rendering::RecordingCanvas,
    runtime::default_spawner,
    tiles::TileImage,
    Camera, CameraTarget, EngineConfig, InputEvent, LatLng, MapEngine, MapError, Marker, Point,
    Size, StaticGeolocation, TileFetcher, TileKey,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

const DOWNTOWN: LatLng = LatLng {
    lat: 32.7157,
    lng: -117.1611,
};

struct SolidFetcher;

#[async_trait]
impl TileFetcher for SolidFetcher {
    async fn fetch_tile_image(&self, _subdomain: usize, key: TileKey) -> shelter_map::Result<TileImage> {
        Ok(TileImage::solid(key, 4, [200, 200, 200, 255]))
    }
}

fn engine_at(center: LatLng, zoom: f64) -> MapEngine {
    let config = EngineConfig {
        initial_camera: Camera::new(center, zoom),
        ..EngineConfig::default()
    };
    let mut engine = MapEngine::new(config, Arc::new(SolidFetcher), default_spawner())
        .expect("default config is valid");
    engine.resize(Size::new(800.0, 600.0));
    engine
}

fn assert_near(actual: LatLng, expected: LatLng) {
    assert!(
        (actual.lat - expected.lat).abs() < 1e-9 && (actual.lng - expected.lng).abs() < 1e-9,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

/// Strictly inside the box spanned by `from` and `to`, touching neither end
fn assert_between(actual: LatLng, from: LatLng, to: LatLng) {
    let inside = |v: f64, a: f64, b: f64| v > a.min(b) && v < a.max(b);
    assert!(
        inside(actual.lat, from.lat, to.lat) && inside(actual.lng, from.lng, to.lng),
        "{:?} not strictly between {:?} and {:?}",
        actual,
        from,
        to
    );
}

/// Ticks until every tile of the current pass has landed and the loader is idle
async fn settle_tiles(engine: &mut MapEngine, canvas: &mut RecordingCanvas, now: Instant) {
    for _ in 0..1000 {
        let status = engine.tick(now, canvas);
        if status.tiles_pending == 0 && engine.loader().pending_count() == 0 {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("tiles never settled");
}

#[tokio::test]
async fn test_tap_selects_marker_within_hit_radius() {
    let mut engine = engine_at(DOWNTOWN, 13.0);
    // Exactly at the viewport center (400, 300)
    let center = engine.camera().center;
    engine.set_markers(vec![Marker::new(7, "Downtown Shelter", center, 12)]);

    let response = engine.handle_input(InputEvent::Click {
        position: Point::new(421.0, 300.0),
    });
    assert!(!response.is_handled());
    assert_eq!(engine.selected_marker_id(), None);

    let response = engine.handle_input(InputEvent::Click {
        position: Point::new(420.0, 300.0),
    });
    assert!(response.is_handled());
    assert_eq!(engine.selected_marker_id(), Some(7));

    // Selection eases onto the marker at zoom 15
    let mut canvas = RecordingCanvas::new(engine.viewport_size());
    let t0 = Instant::now();
    engine.tick(t0, &mut canvas);
    engine.tick(t0 + Duration::from_millis(250), &mut canvas);
    let zoom = engine.camera().zoom;
    assert!(zoom > 13.0 && zoom < 15.0, "zoom {} halfway through", zoom);
    engine.tick(t0 + Duration::from_millis(600), &mut canvas);
    assert_eq!(engine.camera().zoom, 15.0);
    assert_near(engine.camera().center, DOWNTOWN);
}

#[tokio::test]
async fn test_click_after_drag_is_not_a_tap() {
    let mut engine = engine_at(DOWNTOWN, 13.0)
        .with_markers(vec![Marker::new(1, "Downtown Shelter", DOWNTOWN, 3)]);
    let t0 = Instant::now();

    engine.handle_input(InputEvent::PointerDown {
        pointer_id: 1,
        position: Point::new(390.0, 300.0),
        time: t0,
    });
    engine.handle_input(InputEvent::PointerMove {
        pointer_id: 1,
        position: Point::new(400.0, 300.0),
        time: t0 + Duration::from_millis(100),
    });
    engine.handle_input(InputEvent::PointerUp {
        pointer_id: 1,
        position: Point::new(400.0, 300.0),
        time: t0 + Duration::from_millis(100),
    });
    engine.handle_input(InputEvent::Click {
        position: Point::new(400.0, 300.0),
    });

    assert_eq!(engine.selected_marker_id(), None);
}

#[tokio::test]
async fn test_follow_mode_recenters_on_each_update() {
    let start = LatLng::new(32.70, -117.15);
    let moved = LatLng::new(32.72, -117.17);
    let mut engine = engine_at(DOWNTOWN, 13.0);
    let geolocation = Arc::new(StaticGeolocation::new(start));
    engine.attach_geolocation(geolocation.clone());
    let mut canvas = RecordingCanvas::new(engine.viewport_size());

    engine.set_follow_mode(true);
    assert_eq!(geolocation.active_watches(), 1);

    let origin = engine.camera().center;
    let t0 = Instant::now();
    engine.tick(t0, &mut canvas);
    engine.tick(t0 + Duration::from_millis(150), &mut canvas);
    assert_between(engine.camera().center, origin, start);
    engine.tick(t0 + Duration::from_millis(290), &mut canvas);
    assert_between(engine.camera().center, origin, start);
    engine.tick(t0 + Duration::from_millis(400), &mut canvas);
    assert_near(engine.camera().center, start);
    assert_eq!(engine.user_location(), Some(start));

    geolocation.move_to(moved);
    engine.tick(t0 + Duration::from_millis(500), &mut canvas);
    engine.tick(t0 + Duration::from_millis(650), &mut canvas);
    assert_between(engine.camera().center, start, moved);
    engine.tick(t0 + Duration::from_millis(900), &mut canvas);
    assert_near(engine.camera().center, moved);
    assert_eq!(engine.camera().zoom, 13.0);
}

#[tokio::test]
async fn test_follow_off_keeps_watch_but_not_camera() {
    let start = LatLng::new(32.70, -117.15);
    let mut engine = engine_at(DOWNTOWN, 13.0);
    let geolocation = Arc::new(StaticGeolocation::new(start));
    engine.attach_geolocation(geolocation.clone());
    let mut canvas = RecordingCanvas::new(engine.viewport_size());

    engine.set_follow_mode(true);
    let t0 = Instant::now();
    engine.tick(t0, &mut canvas);
    engine.tick(t0 + Duration::from_millis(400), &mut canvas);

    engine.set_follow_mode(false);
    let elsewhere = LatLng::new(32.75, -117.20);
    geolocation.move_to(elsewhere);
    engine.tick(t0 + Duration::from_millis(500), &mut canvas);
    engine.tick(t0 + Duration::from_millis(1000), &mut canvas);

    assert_near(engine.camera().center, start);
    assert_eq!(engine.user_location(), Some(elsewhere));
    assert_eq!(geolocation.active_watches(), 1);
}

#[tokio::test]
async fn test_geolocation_error_turns_follow_off() {
    let mut engine = engine_at(DOWNTOWN, 13.0);
    engine.attach_geolocation(Arc::new(StaticGeolocation::failing(
        GeolocationError::PermissionDenied,
    )));
    let mut canvas = RecordingCanvas::new(engine.viewport_size());

    engine.set_follow_mode(true);
    assert!(engine.follow_mode());
    engine.tick(Instant::now(), &mut canvas);

    assert!(!engine.follow_mode());
    assert_eq!(engine.user_location(), None);
    assert_near(engine.camera().center, DOWNTOWN);
}

#[tokio::test]
async fn test_geolocation_timeout_keeps_follow_mode() {
    let mut engine = engine_at(DOWNTOWN, 13.0);
    engine.attach_geolocation(Arc::new(StaticGeolocation::failing(GeolocationError::Timeout)));
    let mut canvas = RecordingCanvas::new(engine.viewport_size());

    engine.set_follow_mode(true);
    engine.tick(Instant::now(), &mut canvas);

    assert!(engine.follow_mode());
    assert_eq!(engine.user_location(), None);
}

#[tokio::test]
async fn test_locate_user_zooms_in_to_street_level() {
    let user = LatLng::new(32.74, -117.13);
    let mut engine = engine_at(DOWNTOWN, 12.0);
    let mut canvas = RecordingCanvas::new(engine.viewport_size());

    let err = engine.locate_user().unwrap_err();
    assert!(matches!(
        err,
        MapError::Geolocation(GeolocationError::Unavailable(_))
    ));

    engine.attach_geolocation(Arc::new(StaticGeolocation::new(user)));
    engine.locate_user().unwrap();
    let origin = engine.camera().center;
    let t0 = Instant::now();
    engine.tick(t0, &mut canvas);
    engine.tick(t0 + Duration::from_millis(250), &mut canvas);
    assert_between(engine.camera().center, origin, user);
    let zoom = engine.camera().zoom;
    assert!(zoom > 12.0 && zoom < 15.0, "zoom {} halfway through", zoom);
    engine.tick(t0 + Duration::from_secs(1), &mut canvas);

    assert_near(engine.camera().center, user);
    assert_eq!(engine.camera().zoom, 15.0);
    assert_eq!(engine.user_location(), Some(user));
}

#[tokio::test]
async fn test_reset_restores_camera_and_disables_follow() {
    let mut engine = engine_at(DOWNTOWN, 13.0);
    engine.attach_geolocation(Arc::new(StaticGeolocation::new(DOWNTOWN)));
    engine.set_follow_mode(true);
    engine.pan_by(Point::new(300.0, -120.0));
    engine.zoom_by(2.0);

    engine.reset_to_initial();

    assert_eq!(engine.camera(), Camera::new(DOWNTOWN, 13.0));
    assert!(!engine.follow_mode());
}

#[tokio::test]
async fn test_direct_pan_and_zoom_cancel_transition() {
    let mut engine = engine_at(DOWNTOWN, 13.0);
    let target = CameraTarget::new(LatLng::new(32.8, -117.0), Some(16.0));

    let token = engine.animate_to(target, Duration::from_millis(500));
    engine.pan_by(Point::new(10.0, 0.0));
    assert!(token.is_cancelled());
    assert!(!engine.is_animating());

    let token = engine.animate_to(target, Duration::from_millis(500));
    engine.handle_input(InputEvent::Wheel {
        delta_y: -1.0,
        position: Point::new(400.0, 300.0),
    });
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn test_transition_stops_inertia() {
    let mut engine = engine_at(DOWNTOWN, 13.0);
    let mut canvas = RecordingCanvas::new(engine.viewport_size());
    let t0 = Instant::now();

    // A fast fling to the left
    engine.handle_input(InputEvent::PointerDown {
        pointer_id: 1,
        position: Point::new(400.0, 300.0),
        time: t0,
    });
    for (i, x) in [380.0, 340.0, 300.0].into_iter().enumerate() {
        engine.handle_input(InputEvent::PointerMove {
            pointer_id: 1,
            position: Point::new(x, 300.0),
            time: t0 + Duration::from_millis(16 * (i as u64 + 1)),
        });
    }
    engine.handle_input(InputEvent::PointerUp {
        pointer_id: 1,
        position: Point::new(300.0, 300.0),
        time: t0 + Duration::from_millis(48),
    });
    engine.tick(t0 + Duration::from_millis(64), &mut canvas);
    assert!(engine.is_animating());

    let target = LatLng::new(32.73, -117.12);
    let token = engine.animate_to(CameraTarget::center(target), Duration::from_millis(100));
    let t1 = t0 + Duration::from_millis(80);
    engine.tick(t1, &mut canvas);
    engine.tick(t1 + Duration::from_millis(200), &mut canvas);

    assert!(!token.is_cancelled());
    assert_near(engine.camera().center, target);
    assert!(!engine.is_animating());
}

#[tokio::test]
async fn test_wheel_zoom_is_clamped_and_always_handled() {
    let mut engine = engine_at(DOWNTOWN, 13.0);
    let wheel = |delta_y: f64| InputEvent::Wheel {
        delta_y,
        position: Point::new(400.0, 300.0),
    };

    let response: InputResponse = engine.handle_input(wheel(0.0));
    assert!(response.is_handled());
    assert_eq!(engine.camera().zoom, 13.0);

    engine.handle_input(wheel(-3.0));
    assert!((engine.camera().zoom - 13.8).abs() < 1e-9);

    for _ in 0..20 {
        assert!(engine.handle_input(wheel(-1.0)).is_handled());
    }
    assert_eq!(engine.camera().zoom, MAX_ZOOM);

    for _ in 0..20 {
        engine.handle_input(wheel(120.0));
    }
    assert_eq!(engine.camera().zoom, MIN_ZOOM);
}

#[tokio::test]
async fn test_superseded_pass_tiles_are_discarded() {
    let mut engine = engine_at(DOWNTOWN, 13.0);
    let mut canvas = RecordingCanvas::new(engine.viewport_size());
    let now = Instant::now();

    let first = engine.tick(now, &mut canvas);
    assert!(first.rendered);
    assert!(first.tiles_pending > 0);

    // Far enough that the second pass shares no tiles with the first
    engine.pan_by(Point::new(5000.0, 0.0));
    let second = engine.tick(now, &mut canvas);
    assert!(second.rendered);
    assert_eq!(second.generation, first.generation + 1);

    settle_tiles(&mut engine, &mut canvas, now).await;

    assert_eq!(engine.renderer().stale_discards(), first.tiles_pending as u64);

    let camera = engine.camera();
    let visible: HashSet<TileKey> = visible_tiles(camera.zoom, camera.center, engine.viewport_size())
        .into_iter()
        .map(|p| p.key)
        .collect();
    let drawn = canvas.tile_keys();
    assert_eq!(drawn.len(), visible.len());
    assert!(drawn.iter().all(|key| visible.contains(key)));
}

#[tokio::test]
async fn test_markers_drawn_after_tiles_settle() {
    let mut engine = engine_at(DOWNTOWN, 13.0)
        .with_markers(vec![Marker::new(3, "Downtown Shelter", DOWNTOWN, 0)]);
    engine.attach_geolocation(Arc::new(StaticGeolocation::new(DOWNTOWN)));
    engine.locate_user().unwrap();
    let mut canvas = RecordingCanvas::new(engine.viewport_size());
    let t0 = Instant::now();

    // First frame starts the move onto the user, the second lands it
    engine.tick(t0, &mut canvas);
    let now = t0 + Duration::from_secs(1);
    let status = engine.tick(now, &mut canvas);
    assert!(status.rendered);
    assert!(status.tiles_pending > 0);
    assert!(canvas.marker_ids().is_empty());

    settle_tiles(&mut engine, &mut canvas, now).await;

    assert_eq!(canvas.marker_ids(), vec![3]);
    let commands = canvas.commands();
    let last_tile = commands
        .iter()
        .rposition(|c| matches!(c, shelter_map::rendering::DrawCommand::Tile { .. }))
        .unwrap();
    let marker = commands
        .iter()
        .position(|c| matches!(c, shelter_map::rendering::DrawCommand::Marker { .. }))
        .unwrap();
    assert!(marker > last_tile);
    assert!(matches!(
        commands.last(),
        Some(shelter_map::rendering::DrawCommand::UserLocation { .. })
    ));
}

#[tokio::test]
async fn test_resize_rerenders_from_cache_without_moving_camera() {
    let mut engine = engine_at(DOWNTOWN, 13.0);
    let mut canvas = RecordingCanvas::new(engine.viewport_size());
    let now = Instant::now();
    settle_tiles(&mut engine, &mut canvas, now).await;

    let camera = engine.camera();
    let generation = engine.generation();
    let cached = engine.loader().cache().len();
    assert!(cached > 0);

    let resized = Size::new(1100.0, 700.0);
    let response = engine.handle_input(InputEvent::Resize {
        width: resized.width,
        height: resized.height,
    });
    assert!(response.is_handled());
    assert_eq!(engine.viewport_size(), resized);
    canvas.resize(resized);

    let window: Vec<TileKey> = visible_tiles(camera.zoom, camera.center, resized)
        .into_iter()
        .map(|p| p.key)
        .collect();
    let already_loaded = window
        .iter()
        .filter(|key| engine.loader().cache().contains(key))
        .count();
    assert!(already_loaded > 0 && already_loaded < window.len());

    let status = engine.tick(now, &mut canvas);
    assert!(status.rendered);
    assert_eq!(status.generation, generation + 1);
    assert_eq!(engine.camera(), camera);
    assert!(engine.loader().cache().len() >= cached);
    // Loaded tiles come straight from the cache; only the new edge is fetched
    assert_eq!(status.tiles_pending, window.len() - already_loaded);
    assert_eq!(canvas.tile_keys().len(), already_loaded);

    settle_tiles(&mut engine, &mut canvas, now).await;
    assert_eq!(engine.camera(), camera);
    assert_eq!(engine.loader().cache().len(), cached + window.len() - already_loaded);
}
