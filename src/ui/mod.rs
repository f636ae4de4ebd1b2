pub mod widget;

pub use widget::{to_color32, MapWidget};

/// Shows a [`MapWidget`] filling the remaining space of a `Ui`
pub trait UiMapExt {
    fn map_widget(&mut self, widget: &mut MapWidget) -> egui::Response;
}

impl UiMapExt for egui::Ui {
    fn map_widget(&mut self, widget: &mut MapWidget) -> egui::Response {
        widget.show(self)
    }
}
