use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::clean::{clean_bytes, CleanError};
use crate::config::{FailurePolicy, PipelineConfig};
use crate::extract::TextExtractor;
use crate::recognizer::{OcrBackend, OcrError};
use crate::relocate::relocate;

/// Extensions accepted by the directory scan (compared case-insensitively).
pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tiff"];

/// One candidate file picked up by a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub path: PathBuf,
    /// Original filename including extension.
    pub name: String,
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// Outcome of one item, distinguishing a decode skip from a relocation.
#[derive(Debug, PartialEq, Eq)]
enum ItemOutcome {
    Relocated,
    /// Undecodable image left in place; it will be picked up again on the
    /// next poll.
    Skipped,
}

/// Polls the input directory and drains it through clean → extract →
/// relocate. At most one worker instance is assumed; the stop flag is the
/// only state shared with the supervisor.
pub struct QueueWorker<R: OcrBackend> {
    config: PipelineConfig,
    extractor: TextExtractor<R>,
    stop: Arc<AtomicBool>,
}

impl<R: OcrBackend> QueueWorker<R> {
    pub fn new(config: PipelineConfig, extractor: TextExtractor<R>, stop: Arc<AtomicBool>) -> Self {
        Self { config, extractor, stop }
    }

    /// Run until the stop flag is set. Under `FailurePolicy::Halt` any
    /// propagated item error sets the flag and ends the loop permanently.
    /// The flag is checked at iteration boundaries only — an in-flight item
    /// is never interrupted.
    pub async fn run(self) {
        while !self.stop.load(Ordering::Relaxed) {
            if let Err(e) = self.poll_once().await {
                tracing::error!("An error occurred: {e}");
                tracing::error!("Stopping worker");
                self.stop.store(true, Ordering::Relaxed);
                break;
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
        tracing::info!("Worker stopped");
    }

    /// One poll iteration: scan the input directory and process the batch.
    pub async fn poll_once(&self) -> Result<(), WorkerError> {
        for item in self.scan().await? {
            match self.process_item(&item).await {
                Ok(_) => {}
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::Halt => return Err(e),
                    FailurePolicy::Isolate => {
                        tracing::error!("Item {} failed, continuing: {e}", item.name);
                    }
                },
            }
        }
        Ok(())
    }

    /// List the input directory and filter to accepted image extensions.
    /// Batch order is directory order — not sorted, not load-bearing.
    pub async fn scan(&self) -> Result<Vec<WorkItem>, WorkerError> {
        let mut items = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.config.input_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            let accepted = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| ACCEPTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                .unwrap_or(false);
            if accepted {
                let name = entry.file_name().to_string_lossy().into_owned();
                items.push(WorkItem { path, name });
            }
        }
        Ok(items)
    }

    async fn process_item(&self, item: &WorkItem) -> Result<ItemOutcome, WorkerError> {
        let bytes = match tokio::fs::read(&item.path).await {
            Ok(bytes) => bytes,
            // Vanished between scan and read; treat like an unreadable
            // image rather than a fatal error.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Skipping {}, gone before read", item.name);
                return Ok(ItemOutcome::Skipped);
            }
            Err(e) => return Err(e.into()),
        };

        let cleaned = match clean_bytes(&bytes, &self.config.clean) {
            Ok(img) => img,
            Err(CleanError::Decode(e)) => {
                tracing::warn!("Skipping {}, unable to read image: {e}", item.name);
                return Ok(ItemOutcome::Skipped);
            }
        };

        let result = self.extractor.extract(&cleaned)?;
        tracing::info!("Extracted CAPTCHA: {result}");

        relocate(&item.path, &item.name, &result, &self.config.output_dir).await?;
        Ok(ItemOutcome::Relocated)
    }
}
