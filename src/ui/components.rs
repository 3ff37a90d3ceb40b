//! Reusable UI components
//!
//! Standalone widgets used by the catalog cards and the bottom bar.

use crate::theme;
use crate::types::StatusKind;
use eframe::egui;

/// Game icon, or a placeholder glyph when the entry has none
pub fn game_icon(ui: &mut egui::Ui, url: Option<&str>) {
    let size = egui::vec2(theme::ICON_SIZE, theme::ICON_SIZE);
    match url {
        Some(url) => {
            ui.add(
                egui::Image::new(url)
                    .fit_to_exact_size(size)
                    .maintain_aspect_ratio(true)
                    .corner_radius(theme::RADIUS_DEFAULT),
            );
        }
        None => {
            let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
            let painter = ui.painter();
            painter.rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_SURFACE);
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                egui_phosphor::regular::GAME_CONTROLLER,
                egui::FontId::proportional(28.0),
                theme::TEXT_DIM,
            );
        }
    }
}

/// Clickable screenshot preview. Returns true when clicked.
pub fn screenshot(ui: &mut egui::Ui, url: &str) -> bool {
    let (w, h) = theme::SCREENSHOT_SIZE;
    let response = ui.add(
        egui::Image::new(url)
            .fit_to_exact_size(egui::vec2(w, h))
            .maintain_aspect_ratio(false)
            .corner_radius(theme::RADIUS_DEFAULT)
            .sense(egui::Sense::click()),
    );
    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }
    response.clicked()
}

/// Small dim caption above a group of widgets
pub fn section_label(ui: &mut egui::Ui, text: &str) {
    ui.add(
        egui::Label::new(
            egui::RichText::new(text)
                .size(theme::FONT_SECTION)
                .color(theme::TEXT_MUTED),
        )
        .selectable(false),
    );
}

/// Status line text colored by kind
pub fn status_line(ui: &mut egui::Ui, text: &str, kind: StatusKind) {
    ui.add(
        egui::Label::new(
            egui::RichText::new(text)
                .size(theme::FONT_SECTION)
                .color(theme::status_color(kind)),
        )
        .wrap(),
    );
}
