//! Application constants and configuration

use std::time::Duration;

pub const CATALOG_URL: &str =
    "https://raw.githubusercontent.com/mogd-Kali/bazukagames/refs/heads/main/games.json";
pub const MAIN_ICON_URL: &str =
    "https://i.postimg.cc/x8s5FfgR/photo-2025-05-14-22-03-13-Photoroom-1.png";
pub const APP_NAME: &str = "FTeam";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Upper bound for a single body read while downloading
pub const DOWNLOAD_CHUNK_SIZE: usize = 8192;
/// How long the final download status stays on screen
pub const PROGRESS_CLEAR_DELAY: Duration = Duration::from_secs(3);
pub const FALLBACK_FILE_NAME: &str = "downloaded_file";

// Catalog record fallbacks
pub const DEFAULT_GAME_NAME: &str = "Без названия";
pub const DEFAULT_GAME_AUTHOR: &str = "Неизвестен";
pub const DEFAULT_GAME_DESCRIPTION: &str = "Нет описания.";
