//! Error types for catalog loading and downloads
//!
//! The `Display` text of every variant is the message shown in the status
//! line, so it is written for the user rather than for the log.

/// Errors produced while fetching or parsing the remote catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Ошибка загрузки данных с {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Ошибка парсинга JSON. Проверьте формат файла: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Ошибка: Неверный формат данных. Ожидался список игр.")]
    NotAList,

    #[error("Список игр пуст.")]
    Empty,

    #[error("Произошла непредвиденная ошибка при обработке игр: {0}")]
    Unexpected(String),
}

impl CatalogError {
    /// An empty catalog is informational, everything else is shown as an error.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::NotAList)
    }
}

/// Errors produced while streaming a file to disk.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Connection failure or non-success status
    #[error("Ошибка скачивания: {0}")]
    Http(#[from] reqwest::Error),

    /// Body stream broke off mid-transfer
    #[error("Ошибка скачивания: {0}")]
    Stream(#[source] std::io::Error),

    #[error("Произошла непредвиденная ошибка: {0}")]
    Filesystem(#[source] std::io::Error),

    #[error("Произошла непредвиденная ошибка: {0}")]
    Unexpected(String),
}

impl DownloadError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Stream(_))
    }
}
