use anyhow::Context;
use shelter_map::{
    core::config::EngineConfig,
    data::{markers_from_file, sample_markers},
    layers::{markers_nearby, AvailabilityTier, Marker},
    runtime::spawners::tokio_impl::TokioSpawner,
    tiles::HttpTileFetcher,
    ui::{to_color32, MapWidget, UiMapExt},
    LatLng, MapEngine, StaticGeolocation,
};
use std::sync::Arc;

/// Radius of the "nearby" list around the map center
const NEARBY_RADIUS_M: f64 = 25_000.0;

/// Standalone shelter locator
///
/// Usage: `shelter-map-app [shelters.json] [config.json]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    shelter_map::init_logging();

    let mut args = std::env::args().skip(1);
    let markers = match args.next() {
        Some(path) => markers_from_file(&path).with_context(|| format!("loading shelters from {}", path))?,
        None => sample_markers(),
    };
    let config = match args.next() {
        Some(path) => EngineConfig::from_json_file(&path).with_context(|| format!("loading config from {}", path))?,
        None => EngineConfig::default(),
    };
    log::info!("starting with {} shelters", markers.len());

    let fetcher = Arc::new(HttpTileFetcher::from_config(&config.tiles)?);
    let spawner = Arc::new(TokioSpawner::with_handle(tokio::runtime::Handle::current()));
    let mut engine = MapEngine::new(config, fetcher, spawner)?.with_markers(markers);
    // Desktop hosts have no positioning hardware; pretend the user is downtown
    engine.attach_geolocation(Arc::new(StaticGeolocation::new(LatLng::new(32.7157, -117.1611))));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Shelter Map"),
        ..Default::default()
    };

    eframe::run_native(
        "shelter-map-app",
        options,
        Box::new(|cc| Box::new(ShelterApp::new(cc, engine))),
    )
    .map_err(|e| anyhow::anyhow!("eframe failed: {}", e))?;

    Ok(())
}

struct ShelterApp {
    map: MapWidget,
    min_beds: u32,
    last_error: Option<String>,
}

impl ShelterApp {
    fn new(_cc: &eframe::CreationContext<'_>, engine: MapEngine) -> Self {
        Self {
            map: MapWidget::new(engine),
            min_beds: 0,
            last_error: None,
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let engine = self.map.engine_mut();
            if ui.button("Reset view").clicked() {
                engine.reset_to_initial();
            }
            if ui.button("Locate me").clicked() {
                if let Err(e) = engine.locate_user() {
                    log::warn!("locate failed: {}", e);
                    self.last_error = Some(e.to_string());
                }
            }
            let mut follow = engine.follow_mode();
            if ui.checkbox(&mut follow, "Follow").changed() {
                engine.set_follow_mode(follow);
            }

            ui.separator();
            ui.add(egui::Slider::new(&mut self.min_beds, 0..=50).text("min beds"));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let camera = self.map.engine().camera();
                ui.label(format!(
                    "Center: {:.4}, {:.4} | Zoom: {:.2}",
                    camera.center.lat, camera.center.lng, camera.zoom
                ));
                if let Some(status) = self.map.last_status() {
                    ui.label(format!("tiles loading: {}", status.tiles_pending));
                }
            });
        });
    }

    fn shelter_list(&mut self, ui: &mut egui::Ui) {
        ui.heading("Nearby shelters");
        ui.separator();

        let engine = self.map.engine();
        let center = engine.camera().center;
        let selected = engine.selected_marker_id();
        let style = engine.config().style.clone();
        let nearby: Vec<(i64, String, u32, AvailabilityTier, f64)> =
            markers_nearby(engine.markers(), center, NEARBY_RADIUS_M)
                .into_iter()
                .filter(|m| m.available_beds >= self.min_beds)
                .map(|m| {
                    (
                        m.id,
                        m.name.clone(),
                        m.available_beds,
                        m.tier(),
                        m.position.distance_to(&center),
                    )
                })
                .collect();

        let mut clicked = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for (id, name, beds, tier, distance) in &nearby {
                let color = match tier {
                    AvailabilityTier::High => style.high_availability,
                    AvailabilityTier::Medium => style.medium_availability,
                    AvailabilityTier::None => style.no_availability,
                };
                ui.horizontal(|ui| {
                    ui.colored_label(to_color32(color), "●");
                    let label = format!("{} ({} beds, {:.1} km)", name, beds, distance / 1000.0);
                    if ui.selectable_label(selected == Some(*id), label).clicked() {
                        clicked = Some(*id);
                    }
                });
            }
            if nearby.is_empty() {
                ui.label("No shelters in range");
            }
        });

        if let Some(id) = clicked {
            self.map.engine_mut().focus_marker(id);
        }
    }

    fn detail_card(ui: &mut egui::Ui, marker: &Marker) {
        ui.heading(&marker.name);
        ui.label(format!("{} beds available", marker.available_beds));
        if let Some(capacity) = marker.capacity {
            ui.label(format!("Capacity: {}", capacity));
        }
        for (label, value) in [
            ("Address", &marker.address),
            ("Hours", &marker.hours),
            ("Phone", &marker.phone),
        ] {
            if let Some(value) = value {
                ui.label(format!("{}: {}", label, value));
            }
        }
        if !marker.services.is_empty() {
            ui.label(format!("Services: {}", marker.services.join(", ")));
        }
        if let Some(description) = &marker.description {
            ui.separator();
            ui.label(description);
        }
    }
}

impl eframe::App for ShelterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.toolbar(ui);
            if let Some(error) = &self.last_error {
                ui.colored_label(egui::Color32::RED, error);
            }
        });

        egui::SidePanel::left("shelter_panel")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.shelter_list(ui));

        if let Some(marker) = self.map.engine().selected_marker().cloned() {
            egui::SidePanel::right("detail_panel")
                .resizable(true)
                .show(ctx, |ui| {
                    Self::detail_card(ui, &marker);
                    if ui.button("Close").clicked() {
                        self.map.engine_mut().select(None);
                    }
                });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                ui.map_widget(&mut self.map);
            });
    }
}
