//! Background work for the UI.
//!
//! Requests run on a small tokio runtime owned by the app. Each task resolves
//! to a [`TaskEvent`] that is sent back over a channel, and the UI is asked to
//! repaint so the event gets drained on the next frame.

use super::state::TaskEvent;
use crate::error::{AppError, Result};
use crate::image_processing::{DecodedImage, ImageProcessor};
use crate::pollinations::{PollinationsClient, download_file_name};
use eframe::egui;
use std::fs::{self, OpenOptions};
use std::future::Future;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};

pub(crate) struct TaskRunner {
    runtime: tokio::runtime::Runtime,
    tx: Sender<TaskEvent>,
    rx: Receiver<TaskEvent>,
}

impl TaskRunner {
    pub(crate) fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("imagen-worker")
            .enable_all()
            .build()
            .map_err(|e| AppError::ui(format!("Failed to create async runtime: {}", e)))?;

        let (tx, rx) = channel();
        Ok(Self { runtime, tx, rx })
    }

    pub(crate) fn spawn<F>(&self, ctx: &egui::Context, task: F)
    where
        F: Future<Output = TaskEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let event = task.await;
            // Receiver only goes away when the window closes
            let _ = tx.send(event);
            ctx.request_repaint();
        });
    }

    pub(crate) fn drain(&self) -> Vec<TaskEvent> {
        self.rx.try_iter().collect()
    }
}

/// Loads one generated image and decodes it off the async workers.
pub(crate) async fn fetch_and_decode(
    client: Arc<PollinationsClient>,
    url: String,
) -> Result<DecodedImage> {
    let bytes = client.load_image(&url).await?;
    tokio::task::spawn_blocking(move || ImageProcessor::decode_rgba(&bytes))
        .await
        .map_err(|e| AppError::image(format!("Decode task failed: {}", e)))?
}

/// Re-fetches a generated image and writes it into `dir`.
pub(crate) async fn download_to(
    client: Arc<PollinationsClient>,
    url: String,
    prompt: String,
    dir: PathBuf,
) -> Result<PathBuf> {
    let bytes = client.download_image(&url).await?;
    let file_name = download_file_name(&prompt);

    tokio::task::spawn_blocking(move || save_unique(&dir, &file_name, &bytes))
        .await
        .map_err(|e| AppError::ui(format!("Save task failed: {}", e)))?
}

/// Writes `bytes` to `dir/file_name`, or to `<stem>-1.png`, `<stem>-2.png`, ...
/// when that name is taken. Existing files are never overwritten.
fn save_unique(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let (stem, extension) = file_name.rsplit_once('.').unwrap_or((file_name, "png"));
    let mut attempt = 0u32;
    loop {
        let path = if attempt == 0 {
            dir.join(file_name)
        } else {
            dir.join(format!("{}-{}.{}", stem, attempt, extension))
        };

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(bytes)?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Where downloaded images are saved.
pub(crate) fn download_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
