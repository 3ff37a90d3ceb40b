//! Catalog rendering (header, cards, bottom status bar)

use super::filters::hover_transition;
use super::App;
use crate::constants::*;
use crate::theme;
use crate::types::GameEntry;
use crate::ui::components;
use eframe::egui;
use tracing::{debug, warn};

/// What the user did on a card during this frame
#[derive(Default)]
struct CardAction {
    download: Option<String>,
    zoom: Option<String>,
}

impl App {
    /// Search field and button
    pub(crate) fn render_search_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let button_width = 90.0;
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.search_query)
                    .hint_text("Поиск по названию или автору")
                    .desired_width(ui.available_width() - button_width),
            );
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let clicked = ui
                .add(theme::button(format!(
                    "{} Поиск",
                    egui_phosphor::regular::MAGNIFYING_GLASS
                )))
                .clicked();
            if response.changed() || submitted || clicked {
                self.apply_search();
            }
        });
    }

    /// Logo and the list of cards
    pub(crate) fn render_catalog(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add(
                        egui::Image::new(MAIN_ICON_URL)
                            .fit_to_exact_size(egui::vec2(theme::LOGO_SIZE, theme::LOGO_SIZE)),
                    );
                });
                ui.add_space(theme::SPACING_MD);

                if self.catalog_loading {
                    ui.vertical_centered(|ui| ui.spinner());
                    return;
                }

                if let Some(message) = &self.catalog_error {
                    ui.colored_label(theme::STATUS_ERROR, message);
                }

                if self.catalog.is_empty() {
                    return;
                }

                let width = ui.available_width().min(theme::CARD_MAX_WIDTH);
                ui.vertical_centered(|ui| {
                    ui.set_max_width(width);
                    ui.spacing_mut().item_spacing.y = theme::SPACING_LG;
                    self.render_cards(ui, ctx);
                });
            });
    }

    fn render_cards(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let catalog = self.catalog.clone();
        let can_download = !self.download_in_progress();
        let mut action = CardAction::default();

        for &idx in &self.visible_indices {
            let Some(entry) = catalog.get(idx) else {
                continue;
            };
            let show_screenshots = self.hovered_card == Some(idx);

            let frame = theme::card_frame(show_screenshots).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.with_layout(egui::Layout::top_down(egui::Align::Min), |ui| {
                    render_card_body(ui, entry, show_screenshots, can_download, &mut action);
                });
            });

            let inside = ui.rect_contains_pointer(frame.response.rect);
            self.hovered_card = hover_transition(self.hovered_card, idx, inside);
        }

        if let Some(url) = action.zoom {
            debug!(url = %url, "Opening screenshot");
            self.zoomed_image = Some(url);
        }
        if let Some(link) = action.download {
            self.start_download(ctx, &link);
        }
    }

    /// Status text, progress indicator and the chosen folder
    pub(crate) fn render_bottom_bar(&mut self, ui: &mut egui::Ui) {
        ui.add_space(theme::SPACING_SM);
        ui.vertical_centered(|ui| {
            if let Some((message, kind)) = &self.status {
                components::status_line(ui, message, *kind);
            }

            if let Some(download) = &self.download {
                ui.add_space(theme::SPACING_XS);
                let target = download.target_label();
                if !target.is_empty() {
                    components::section_label(ui, &target);
                }
                ui.label(
                    egui::RichText::new(&download.text)
                        .size(theme::FONT_SECTION)
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add(
                    egui::ProgressBar::new(download.percent)
                        .desired_width(theme::PROGRESS_BAR_WIDTH)
                        .corner_radius(3.0)
                        .fill(theme::ACCENT_STRONG)
                        .text(download.sizes.as_str()),
                );
            }
        });

        ui.add_space(theme::SPACING_SM);
        ui.horizontal(|ui| {
            components::section_label(ui, "Выбранная папка");
            let open_width = 36.0;
            ui.add(
                egui::TextEdit::singleline(&mut self.selected_dir.as_str())
                    .desired_width(ui.available_width() - open_width),
            );
            let has_dir = !self.selected_dir.is_empty();
            let response = ui
                .add_enabled(has_dir, theme::button(egui_phosphor::regular::FOLDER_OPEN))
                .on_hover_text("Открыть папку");
            if response.clicked() {
                if let Err(e) = open::that(&self.selected_dir) {
                    warn!(error = %e, dir = %self.selected_dir, "Failed to open folder");
                }
            }
        });
        ui.add_space(theme::SPACING_SM);
    }
}

fn render_card_body(
    ui: &mut egui::Ui,
    entry: &GameEntry,
    show_screenshots: bool,
    can_download: bool,
    action: &mut CardAction,
) {
    ui.spacing_mut().item_spacing.y = theme::SPACING_MD;

    // Icon + name/author
    ui.horizontal(|ui| {
        components::game_icon(ui, entry.icon_url.as_deref());
        ui.vertical(|ui| {
            ui.spacing_mut().item_spacing.y = theme::SPACING_XS;
            ui.label(
                egui::RichText::new(&entry.name)
                    .size(theme::FONT_HEADING)
                    .strong()
                    .color(theme::ACCENT),
            );
            ui.label(
                egui::RichText::new(format!("Автор: {}", entry.author))
                    .size(theme::FONT_SECTION)
                    .color(theme::TEXT_MUTED),
            );
        });
    });

    ui.add(
        egui::Label::new(
            egui::RichText::new(&entry.description)
                .size(theme::FONT_LABEL)
                .color(theme::TEXT_PRIMARY),
        )
        .wrap(),
    );

    // Screenshots only while hovered, second one on top
    if show_screenshots && entry.has_screenshots() {
        ui.vertical_centered(|ui| {
            ui.spacing_mut().item_spacing.y = theme::SPACING_SM;
            components::section_label(ui, "Скриншоты:");
            for url in [&entry.screenshot2_url, &entry.screenshot1_url].into_iter().flatten() {
                if components::screenshot(ui, url) {
                    action.zoom = Some(url.clone());
                }
            }
        });
    }

    let label = format!("Скачать {}", egui_phosphor::regular::DOWNLOAD_SIMPLE);
    let enabled = download_enabled(entry, can_download);
    let response = ui
        .add_enabled(enabled, theme::button_accent(label, enabled))
        .on_disabled_hover_text(if entry.download_link.is_none() {
            "Ссылка для скачивания отсутствует."
        } else {
            "Дождитесь окончания текущей загрузки."
        });
    if response.clicked() {
        if let Some(link) = &entry.download_link {
            action.download = Some(link.clone());
        }
    }
}

/// Entries without a link never offer a download
fn download_enabled(entry: &GameEntry, can_download: bool) -> bool {
    can_download && entry.download_link.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::parse_catalog;

    #[test]
    fn download_needs_link_and_idle_runner() {
        let catalog =
            parse_catalog(r#"[{"Name":"Foo","Link":"http://x/f.zip"},{"Name":"Bar","Link":""}]"#)
                .unwrap();
        let with_link = &catalog.entries()[0];
        let without_link = &catalog.entries()[1];

        assert!(download_enabled(with_link, true));
        assert!(!download_enabled(with_link, false));
        assert!(!download_enabled(without_link, true));
    }
}
