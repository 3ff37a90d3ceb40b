//! Common types and data structures

use crate::constants::*;
use crate::error::CatalogError;
use std::path::PathBuf;

/// Catalog record as it appears in the remote JSON
#[derive(Debug, Default, serde::Deserialize)]
pub struct CatalogRecord {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Author")]
    pub author: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Icon")]
    pub icon: Option<String>,
    #[serde(rename = "Photo1")]
    pub photo1: Option<String>,
    #[serde(rename = "Photo2")]
    pub photo2: Option<String>,
    #[serde(rename = "Link")]
    pub link: Option<String>,
}

/// One game in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct GameEntry {
    pub name: String,
    pub author: String,
    pub description: String,
    pub icon_url: Option<String>,
    pub screenshot1_url: Option<String>,
    pub screenshot2_url: Option<String>,
    pub download_link: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl From<CatalogRecord> for GameEntry {
    fn from(record: CatalogRecord) -> Self {
        Self {
            name: record.name.unwrap_or_else(|| DEFAULT_GAME_NAME.to_string()),
            author: record.author.unwrap_or_else(|| DEFAULT_GAME_AUTHOR.to_string()),
            description: record
                .description
                .unwrap_or_else(|| DEFAULT_GAME_DESCRIPTION.to_string()),
            icon_url: non_empty(record.icon),
            screenshot1_url: non_empty(record.photo1),
            screenshot2_url: non_empty(record.photo2),
            download_link: non_empty(record.link),
        }
    }
}

impl GameEntry {
    pub fn has_screenshots(&self) -> bool {
        self.screenshot1_url.is_some() || self.screenshot2_url.is_some()
    }
}

/// Ordered, read-only list of games in the order the server sent them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<GameEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<GameEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[GameEntry] {
        &self.entries
    }

    pub fn get(&self, idx: usize) -> Option<&GameEntry> {
        self.entries.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Snapshot of a single running download
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    pub bytes_downloaded: u64,
    /// Declared content length; `None` when unknown or zero
    pub total_bytes: Option<u64>,
    /// 0.0..=1.0, stays at 0.0 while the total is unknown
    pub percent: f32,
    pub status_message: String,
}

impl DownloadProgress {
    pub fn new(bytes_downloaded: u64, total_bytes: Option<u64>) -> Self {
        let percent = match total_bytes {
            Some(total) if total > 0 => (bytes_downloaded as f64 / total as f64).min(1.0) as f32,
            _ => 0.0,
        };
        let status_message = if total_bytes.is_some() {
            format!("Загрузка: {:.1}%", percent * 100.0)
        } else {
            format!("Загрузка: {}", crate::utils::format_bytes(bytes_downloaded))
        };
        Self {
            bytes_downloaded,
            total_bytes,
            percent,
            status_message,
        }
    }

    pub fn complete(bytes_downloaded: u64) -> Self {
        Self {
            bytes_downloaded,
            total_bytes: Some(bytes_downloaded),
            percent: 1.0,
            status_message: "Загрузка завершена.".to_string(),
        }
    }
}

/// Download lifecycle, tagged with the id of the download it belongs to
#[derive(Debug, Clone)]
pub enum DownloadEvent {
    Started { id: u64, file_name: String, dest: PathBuf },
    Progress { id: u64, progress: DownloadProgress },
    Finished { id: u64, file_name: String, bytes: u64 },
    Failed { id: u64, message: String },
    /// Emitted once the post-download delay has passed, whatever the outcome
    Cleared { id: u64 },
}

impl DownloadEvent {
    pub fn id(&self) -> u64 {
        match self {
            Self::Started { id, .. }
            | Self::Progress { id, .. }
            | Self::Finished { id, .. }
            | Self::Failed { id, .. }
            | Self::Cleared { id } => *id,
        }
    }
}

/// Messages from the background runner to the UI thread
#[derive(Debug)]
pub enum AppEvent {
    CatalogLoaded(Result<Catalog, CatalogError>),
    Download(DownloadEvent),
}

/// Kind of the status line text, decides its color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}
