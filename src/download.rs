//! Single-file download with progress reporting

use crate::constants::*;
use crate::error::DownloadError;
use crate::types::{AppEvent, DownloadEvent, DownloadProgress};
use eframe::egui;
use futures::TryStreamExt;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::io::StreamReader;
use tracing::{debug, error, info, warn};

/// Target file name: last path segment of the URL without its query string.
pub fn file_name_from_url(url: &str) -> String {
    let segment = url.rsplit('/').next().unwrap_or_default();
    let name = segment.split('?').next().unwrap_or_default();
    if name.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Copy `reader` into `writer` in chunks of at most `DOWNLOAD_CHUNK_SIZE`,
/// reporting after every chunk. Returns the number of bytes written.
///
/// Read failures are network errors, write failures are filesystem errors.
/// Whatever was written before a failure stays written.
pub async fn stream_to_file<R, W>(
    reader: &mut R,
    writer: &mut W,
    total_bytes: Option<u64>,
    mut on_progress: impl FnMut(DownloadProgress),
) -> Result<u64, DownloadError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; DOWNLOAD_CHUNK_SIZE];
    let mut downloaded: u64 = 0;

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                // Keep what already arrived on disk
                let _ = writer.flush().await;
                return Err(DownloadError::Stream(e));
            }
        };
        if n == 0 {
            break;
        }
        writer
            .write_all(&buf[..n])
            .await
            .map_err(DownloadError::Filesystem)?;
        downloaded += n as u64;
        on_progress(DownloadProgress::new(downloaded, total_bytes));
    }

    writer.flush().await.map_err(DownloadError::Filesystem)?;
    Ok(downloaded)
}

/// Download `url` into `dest_dir`, overwriting any file with the same name.
pub async fn download(
    client: &reqwest::Client,
    url: &str,
    dest_dir: &Path,
    on_progress: impl FnMut(DownloadProgress),
) -> Result<PathBuf, DownloadError> {
    let dest = dest_dir.join(file_name_from_url(url));

    let response = client.get(url).send().await?.error_for_status()?;
    let total_bytes = response.content_length().filter(|&len| len > 0);
    debug!(url, total = ?total_bytes, dest = %dest.display(), "Download response received");

    let mut file = tokio::fs::File::create(&dest)
        .await
        .map_err(DownloadError::Filesystem)?;

    let mut body = std::pin::pin!(StreamReader::new(
        response.bytes_stream().map_err(std::io::Error::other)
    ));
    let written = stream_to_file(&mut body, &mut file, total_bytes, on_progress).await?;

    info!(bytes = written, dest = %dest.display(), "Download complete");
    Ok(dest)
}

/// Run one download on the background runtime, reporting through `events`.
///
/// A `Cleared` event always follows `PROGRESS_CLEAR_DELAY` after the final
/// `Finished` or `Failed`, even if the download task panicked.
pub async fn run_download(
    id: u64,
    client: reqwest::Client,
    url: String,
    dest_dir: PathBuf,
    events: UnboundedSender<AppEvent>,
    ctx: egui::Context,
) {
    let file_name = file_name_from_url(&url);
    let send = {
        let events = events.clone();
        let ctx = ctx.clone();
        move |event: DownloadEvent| {
            // UI gone means the app is shutting down
            let _ = events.send(AppEvent::Download(event));
            ctx.request_repaint();
        }
    };

    info!(id, url = %url, dir = %dest_dir.display(), "Starting download");
    send(DownloadEvent::Started {
        id,
        file_name: file_name.clone(),
        dest: dest_dir.join(&file_name),
    });

    let task = {
        let send = send.clone();
        tokio::spawn(async move {
            let mut last_bytes = 0u64;
            let result = download(&client, &url, &dest_dir, |progress| {
                last_bytes = progress.bytes_downloaded;
                send(DownloadEvent::Progress { id, progress });
            })
            .await;
            result.map(|dest| (dest, last_bytes))
        })
    };

    let outcome = match task.await {
        Ok(result) => result,
        Err(join_err) => Err(DownloadError::Unexpected(join_err.to_string())),
    };

    match outcome {
        Ok((dest, bytes)) => {
            send(DownloadEvent::Progress {
                id,
                progress: DownloadProgress::complete(bytes),
            });
            send(DownloadEvent::Finished { id, file_name, bytes });
            debug!(id, dest = %dest.display(), "Download finished");
        }
        Err(e) => {
            if e.is_network() {
                warn!(id, error = %e, "Download failed");
            } else {
                error!(id, error = %e, "Download failed");
            }
            send(DownloadEvent::Failed {
                id,
                message: e.to_string(),
            });
        }
    }

    tokio::time::sleep(PROGRESS_CLEAR_DELAY).await;
    send(DownloadEvent::Cleared { id });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_strips_query() {
        assert_eq!(
            file_name_from_url("https://host/files/archive.zip?token=abc"),
            "archive.zip"
        );
    }

    #[test]
    fn file_name_falls_back_on_trailing_slash() {
        assert_eq!(file_name_from_url("https://host/files/"), FALLBACK_FILE_NAME);
        assert_eq!(file_name_from_url("https://host/?x=1"), FALLBACK_FILE_NAME);
    }

    #[test]
    fn file_name_plain() {
        assert_eq!(file_name_from_url("http://x/f.zip"), "f.zip");
    }

    #[tokio::test]
    async fn small_body_is_one_chunk_at_full_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.zip");
        let body = vec![7u8; 1000];

        let mut reader: &[u8] = &body;
        let mut file = tokio::fs::File::create(&path).await.unwrap();
        let mut reports = Vec::new();
        let written = stream_to_file(&mut reader, &mut file, Some(1000), |p| reports.push(p))
            .await
            .unwrap();
        drop(file);

        assert_eq!(written, 1000);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].percent, 1.0);
        assert_eq!(reports[0].bytes_downloaded, 1000);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 1000);
    }

    #[tokio::test]
    async fn percent_is_monotonic_and_reaches_one() {
        let body = vec![1u8; 20_000];
        let mut reader: &[u8] = &body;
        let mut sink = Vec::new();
        let mut percents = Vec::new();

        stream_to_file(&mut reader, &mut sink, Some(20_000), |p| percents.push(p.percent))
            .await
            .unwrap();

        assert_eq!(percents.len(), 3);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*percents.last().unwrap(), 1.0);
        assert_eq!(sink.len(), 20_000);
    }

    #[tokio::test]
    async fn unknown_length_reports_zero_percent() {
        let body = vec![0u8; 10_000];
        let mut reader: &[u8] = &body;
        let mut sink = Vec::new();
        let mut reports = Vec::new();

        stream_to_file(&mut reader, &mut sink, None, |p| reports.push(p))
            .await
            .unwrap();

        assert!(reports.iter().all(|p| p.percent == 0.0));
        assert_eq!(reports.last().unwrap().bytes_downloaded, 10_000);
    }

    #[tokio::test]
    async fn stream_failure_keeps_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.bin");
        let chunks: Vec<Result<&'static [u8], std::io::Error>> = vec![
            Ok(&[9u8; 300][..]),
            Err(std::io::Error::other("connection reset")),
        ];
        let mut reader = StreamReader::new(futures::stream::iter(chunks));
        let mut file = tokio::fs::File::create(&path).await.unwrap();

        let err = stream_to_file(&mut reader, &mut file, Some(1000), |_| {})
            .await
            .unwrap_err();
        drop(file);

        assert!(err.is_network());
        assert!(err.to_string().starts_with("Ошибка скачивания"));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 300);
    }

    #[tokio::test]
    async fn refused_connection_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();

        let err = download(&client, "http://127.0.0.1:1/game.zip", dir.path(), |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Http(_)));
        assert!(!dir.path().join("game.zip").exists());
    }

    /// Answer exactly one request on a loopback port, return the base URL.
    async fn serve_once(status: &'static str, body: Vec<u8>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}")
    }

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<AppEvent>) -> Vec<DownloadEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Download(event) => events.push(event),
                AppEvent::CatalogLoaded(_) => panic!("unexpected catalog event"),
            }
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn run_download_reports_completion_then_clears() {
        let dir = tempfile::tempdir().unwrap();
        let base = serve_once("200 OK", vec![5u8; 1000]).await;
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        run_download(
            7,
            reqwest::Client::new(),
            format!("{base}/game.zip"),
            dir.path().to_path_buf(),
            tx,
            egui::Context::default(),
        )
        .await;

        let events = drain(&mut rx);
        assert!(events.iter().all(|e| e.id() == 7));
        assert!(matches!(
            &events[0],
            DownloadEvent::Started { file_name, dest, .. }
                if file_name == "game.zip" && *dest == dir.path().join("game.zip")
        ));

        let progress: Vec<&DownloadProgress> = events
            .iter()
            .filter_map(|e| match e {
                DownloadEvent::Progress { progress, .. } => Some(progress),
                _ => None,
            })
            .collect();
        assert!(progress.len() >= 2);
        assert!(progress.windows(2).all(|w| w[0].percent <= w[1].percent));
        let streamed = progress[progress.len() - 2];
        assert_eq!(streamed.percent, 1.0);
        assert_eq!(streamed.status_message, "Загрузка: 100.0%");
        let completed = progress[progress.len() - 1];
        assert_eq!(completed.percent, 1.0);
        assert_eq!(completed.status_message, "Загрузка завершена.");

        let n = events.len();
        assert!(matches!(
            &events[n - 2],
            DownloadEvent::Finished { file_name, bytes: 1000, .. } if file_name == "game.zip"
        ));
        assert!(matches!(events[n - 1], DownloadEvent::Cleared { id: 7 }));
        assert_eq!(std::fs::metadata(dir.path().join("game.zip")).unwrap().len(), 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn run_download_not_found_fails_then_clears() {
        let dir = tempfile::tempdir().unwrap();
        let base = serve_once("404 Not Found", Vec::new()).await;
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        run_download(
            3,
            reqwest::Client::new(),
            format!("{base}/missing.zip"),
            dir.path().to_path_buf(),
            tx,
            egui::Context::default(),
        )
        .await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], DownloadEvent::Started { id: 3, .. }));
        assert!(matches!(
            &events[1],
            DownloadEvent::Failed { message, .. } if message.starts_with("Ошибка скачивания")
        ));
        assert!(matches!(events[2], DownloadEvent::Cleared { id: 3 }));
        assert!(!dir.path().join("missing.zip").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn run_download_clears_only_after_delay() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let started = tokio::time::Instant::now();

        run_download(
            1,
            reqwest::Client::new(),
            "http://127.0.0.1:1/game.zip".to_string(),
            dir.path().to_path_buf(),
            tx,
            egui::Context::default(),
        )
        .await;

        assert!(started.elapsed() >= PROGRESS_CLEAR_DELAY);
        let events = drain(&mut rx);
        assert!(matches!(events[1], DownloadEvent::Failed { .. }));
        assert!(matches!(events.last(), Some(DownloadEvent::Cleared { id: 1 })));
    }

    #[test]
    fn filesystem_error_is_generic() {
        let err = DownloadError::Filesystem(std::io::Error::from(
            std::io::ErrorKind::PermissionDenied,
        ));
        assert!(!err.is_network());
        assert!(err.to_string().starts_with("Произошла непредвиденная ошибка"));
    }
}
