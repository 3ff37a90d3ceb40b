//! Modal dialogs (screenshot zoom)

use super::App;
use crate::theme;
use eframe::egui;

impl App {
    /// Enlarged view of one screenshot. Closes on Escape, the close button
    /// or a click on the dimmed backdrop.
    pub(crate) fn render_image_zoom(&mut self, ctx: &egui::Context) {
        let Some(url) = self.zoomed_image.clone() else {
            return;
        };
        let mut close = ctx.input(|i| i.key_pressed(egui::Key::Escape));

        // Dim backdrop behind the image - blocks interaction with the cards
        let screen = ctx.screen_rect();
        egui::Area::new(egui::Id::new("zoom_dim"))
            .fixed_pos(screen.min)
            .order(egui::Order::Middle)
            .interactable(true)
            .show(ctx, |ui| {
                let response = ui.allocate_response(screen.size(), egui::Sense::click());
                ui.painter()
                    .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(160));
                if response.clicked() {
                    close = true;
                }
            });

        let max_size = screen.size() * 0.85;
        egui::Window::new("zoom_window")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .frame(theme::modal_frame())
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .max_size(max_size)
            .show(ctx, |ui| {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    if ui.add(theme::button(egui_phosphor::regular::X)).clicked() {
                        close = true;
                    }
                });
                ui.add(
                    egui::Image::new(url.as_str())
                        .max_size(max_size - egui::vec2(0.0, 48.0))
                        .maintain_aspect_ratio(true)
                        .show_loading_spinner(true),
                );
            });

        if close {
            self.zoomed_image = None;
        }
    }
}
