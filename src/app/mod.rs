//! App module - contains the main application state and logic

mod downloads;
mod filters;
mod modals;
mod views;

pub(crate) use downloads::DownloadView;

use crate::catalog::fetch_catalog;
use crate::constants::*;
use crate::error::CatalogError;
use crate::settings::Settings;
use crate::theme;
use crate::types::*;
use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    // Catalog snapshot, replaced exactly once when the startup fetch returns
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) catalog_loading: bool,
    pub(crate) catalog_error: Option<String>,
    pub(crate) visible_indices: Vec<usize>,
    pub(crate) search_query: String,
    // Card interaction
    pub(crate) hovered_card: Option<usize>,
    pub(crate) zoomed_image: Option<String>,
    // Status line
    pub(crate) status: Option<(String, StatusKind)>,
    // Download state
    pub(crate) download: Option<DownloadView>,
    pub(crate) next_download_id: u64,
    pub(crate) selected_dir: String,
    // Background work
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) client: reqwest::Client,
    pub(crate) events_tx: UnboundedSender<AppEvent>,
    pub(crate) events_rx: UnboundedReceiver<AppEvent>,
    // Settings
    pub(crate) settings: Settings,
    pub(crate) data_dir: PathBuf,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: tokio::runtime::Runtime,
        settings: Settings,
        data_dir: PathBuf,
    ) -> Self {
        // Force dark theme
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        // Icons, screenshots and the header logo are remote URLs
        egui_extras::install_image_loaders(&cc.egui_ctx);

        // Apply theme from theme.rs
        theme::apply_visuals(&cc.egui_ctx);

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let selected_dir = settings.download_dir.clone().unwrap_or_default();

        let mut app = Self {
            catalog: Arc::new(Catalog::default()),
            catalog_loading: true,
            catalog_error: None,
            visible_indices: Vec::new(),
            search_query: String::new(),
            hovered_card: None,
            zoomed_image: None,
            status: None,
            download: None,
            next_download_id: 1,
            selected_dir,
            runtime,
            client: reqwest::Client::new(),
            events_tx,
            events_rx,
            settings,
            data_dir,
        };

        app.start_catalog_fetch(&cc.egui_ctx);
        app
    }

    pub fn save_settings(&self) {
        self.settings.save(&self.data_dir);
    }

    pub(crate) fn set_status(&mut self, message: impl Into<String>, kind: StatusKind) {
        let message = message.into();
        if message.is_empty() {
            self.status = None;
        } else {
            self.status = Some((message, kind));
        }
    }

    /// Spawn the one-and-only catalog fetch. The result arrives as
    /// `AppEvent::CatalogLoaded` on the next frames.
    fn start_catalog_fetch(&mut self, ctx: &egui::Context) {
        self.set_status("Загрузка данных об играх...", StatusKind::Info);

        let client = self.client.clone();
        let tx = self.events_tx.clone();
        let ctx = ctx.clone();

        self.runtime.spawn(async move {
            let fetch = tokio::spawn(async move { fetch_catalog(&client, CATALOG_URL).await });
            let result = match fetch.await {
                Ok(result) => result,
                Err(e) => Err(CatalogError::Unexpected(e.to_string())),
            };
            let _ = tx.send(AppEvent::CatalogLoaded(result));
            ctx.request_repaint();
        });
    }

    /// Drain everything the background runner sent since the last frame.
    pub(crate) fn poll_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                AppEvent::CatalogLoaded(result) => self.on_catalog_loaded(result),
                AppEvent::Download(event) => self.on_download_event(event),
            }
        }
    }

    fn on_catalog_loaded(&mut self, result: Result<Catalog, CatalogError>) {
        self.catalog_loading = false;
        let outcome = catalog_outcome(result);
        self.catalog = Arc::new(outcome.catalog);
        self.catalog_error = outcome.error;
        match outcome.status {
            Some((message, kind)) => self.set_status(message, kind),
            None => self.set_status("", StatusKind::Info),
        }
        debug!(query = %self.search_query, "Initial render");
        self.apply_search();
    }
}

/// What the catalog area and the status line show after the startup fetch
#[derive(Debug)]
pub(crate) struct CatalogOutcome {
    pub catalog: Catalog,
    /// Red line above the (empty) card list
    pub error: Option<String>,
    pub status: Option<(String, StatusKind)>,
}

/// Map a fetch result to what gets rendered. Failures always leave an empty,
/// renderable catalog behind.
pub(crate) fn catalog_outcome(result: Result<Catalog, CatalogError>) -> CatalogOutcome {
    match result {
        Ok(catalog) => {
            info!(count = catalog.len(), "Rendering catalog");
            CatalogOutcome {
                catalog,
                error: None,
                status: None,
            }
        }
        Err(e) if e.is_soft() => {
            warn!(error = %e, "Catalog is empty");
            CatalogOutcome {
                catalog: Catalog::default(),
                error: None,
                status: Some((e.to_string(), StatusKind::Info)),
            }
        }
        Err(e) => {
            error!(error = %e, format = e.is_format(), "Failed to load catalog");
            CatalogOutcome {
                catalog: Catalog::default(),
                error: Some(e.to_string()),
                status: Some((e.to_string(), StatusKind::Error)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::parse_catalog;

    #[test]
    fn loaded_catalog_clears_status() {
        let outcome = catalog_outcome(parse_catalog(r#"[{"Name":"Foo"}]"#));
        assert_eq!(outcome.catalog.len(), 1);
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.status, None);
    }

    #[test]
    fn non_array_body_is_error_with_empty_catalog() {
        let outcome = catalog_outcome(parse_catalog(r#"{"Name":"Foo"}"#));
        assert!(outcome.catalog.is_empty());
        let (message, kind) = outcome.status.unwrap();
        assert_eq!(kind, StatusKind::Error);
        assert_eq!(outcome.error, Some(message));
    }

    #[test]
    fn empty_list_is_info_not_error() {
        let outcome = catalog_outcome(parse_catalog("[]"));
        assert!(outcome.catalog.is_empty());
        assert_eq!(outcome.error, None);
        assert_eq!(
            outcome.status,
            Some(("Список игр пуст.".to_string(), StatusKind::Info))
        );
    }

    #[test]
    fn unexpected_failure_is_error() {
        let outcome = catalog_outcome(Err(CatalogError::Unexpected("task panicked".into())));
        assert!(outcome.catalog.is_empty());
        assert_eq!(outcome.status.map(|(_, kind)| kind), Some(StatusKind::Error));
    }
}
