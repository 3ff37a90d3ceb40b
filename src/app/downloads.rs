//! Download logic

use super::App;
use crate::download::run_download;
use crate::types::*;
use crate::utils::format_bytes;
use eframe::egui;
use std::path::PathBuf;
use tracing::{debug, info};

/// What the progress indicator shows for the current download
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DownloadView {
    pub id: u64,
    pub file_name: String,
    /// Full target path, known once the download has started
    pub dest: Option<PathBuf>,
    pub percent: f32,
    pub text: String,
    /// "1.2 MB / 4.0 MB", or just the received size when the total is unknown
    pub sizes: String,
    /// Stream ended, indicator waits for its `Cleared` event
    pub finished: bool,
}

impl DownloadView {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            file_name: String::new(),
            dest: None,
            percent: 0.0,
            text: "Загрузка: 0%".to_string(),
            sizes: String::new(),
            finished: false,
        }
    }

    /// Where the file goes, falling back to its bare name
    pub fn target_label(&self) -> String {
        match &self.dest {
            Some(dest) => dest.display().to_string(),
            None => self.file_name.clone(),
        }
    }

    /// Fold one event into the view. Returns a status line update, if any.
    /// Events for other downloads are ignored.
    pub fn apply(&mut self, event: &DownloadEvent) -> Option<(String, StatusKind)> {
        if event.id() != self.id {
            return None;
        }
        match event {
            DownloadEvent::Started { file_name, dest, .. } => {
                debug!(id = self.id, dest = %dest.display(), "Download started");
                self.file_name = file_name.clone();
                self.dest = Some(dest.clone());
                None
            }
            DownloadEvent::Progress { progress, .. } => {
                self.percent = progress.percent;
                self.text = progress.status_message.clone();
                self.sizes = match progress.total_bytes {
                    Some(total) => format!(
                        "{} / {}",
                        format_bytes(progress.bytes_downloaded),
                        format_bytes(total)
                    ),
                    None => format_bytes(progress.bytes_downloaded),
                };
                None
            }
            DownloadEvent::Finished { file_name, bytes, .. } => {
                debug!(id = self.id, bytes, "Download finished");
                self.finished = true;
                self.percent = 1.0;
                Some((
                    format!("Скачивание '{}' завершено.", file_name),
                    StatusKind::Success,
                ))
            }
            DownloadEvent::Failed { message, .. } => {
                self.finished = true;
                self.text = message.clone();
                Some((message.clone(), StatusKind::Error))
            }
            DownloadEvent::Cleared { .. } => None,
        }
    }
}

impl App {
    /// Downloads are one at a time: buttons stay disabled while a stream runs.
    pub(crate) fn download_in_progress(&self) -> bool {
        self.download.as_ref().is_some_and(|d| !d.finished)
    }

    /// Ask for a target directory, then hand the download to the runner.
    pub fn start_download(&mut self, ctx: &egui::Context, link: &str) {
        if self.download_in_progress() {
            debug!("Download already running, ignoring click");
            return;
        }

        self.set_status("Выбор директории для сохранения...", StatusKind::Info);

        let mut dialog = rfd::FileDialog::new().set_title("Выберите папку для сохранения");
        if let Some(dir) = self.settings.download_dir_if_exists() {
            dialog = dialog.set_directory(dir);
        }

        let Some(dir) = dialog.pick_folder() else {
            info!("Directory selection cancelled");
            self.set_status("Выбор директории отменен.", StatusKind::Info);
            self.selected_dir.clear();
            return;
        };

        self.selected_dir = dir.to_string_lossy().to_string();
        self.settings.download_dir = Some(self.selected_dir.clone());
        self.save_settings();
        self.set_status(format!("Выбрана директория: {}", self.selected_dir), StatusKind::Info);

        self.spawn_download(ctx, link.to_string(), dir);
    }

    fn spawn_download(&mut self, ctx: &egui::Context, url: String, dir: PathBuf) {
        let id = self.next_download_id;
        self.next_download_id += 1;
        self.download = Some(DownloadView::new(id));

        self.runtime.spawn(run_download(
            id,
            self.client.clone(),
            url,
            dir,
            self.events_tx.clone(),
            ctx.clone(),
        ));
    }

    pub(crate) fn on_download_event(&mut self, event: DownloadEvent) {
        let Some(view) = self.download.as_mut() else {
            return;
        };
        if event.id() != view.id {
            debug!(event_id = event.id(), current = view.id, "Dropping stale download event");
            return;
        }
        if matches!(event, DownloadEvent::Cleared { .. }) {
            self.download = None;
            return;
        }
        if let Some((message, kind)) = view.apply(&event) {
            self.set_status(message, kind);
        }
    }
}
