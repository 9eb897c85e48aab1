use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use capdrain_ocr::{PipelineConfig, QueueWorker, TextExtractor};

const CONFIG_FILE: &str = "capdrain.toml";

fn load_config_from(path: &Path) -> PipelineConfig {
    match std::fs::read_to_string(path) {
        Ok(text) => toml::from_str(&text).expect("Failed to parse capdrain.toml"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => PipelineConfig::default(),
        Err(e) => {
            tracing::warn!("Failed to read {}, using defaults: {e}", path.display());
            PipelineConfig::default()
        }
    }
}

#[cfg(feature = "tesseract")]
fn backend() -> impl capdrain_ocr::OcrBackend {
    capdrain_ocr::recognizer::tesseract_backend::TesseractRecognizer::new(None, "eng")
}

#[cfg(not(feature = "tesseract"))]
fn backend() -> impl capdrain_ocr::OcrBackend {
    // Without the `tesseract` feature every image relocates as "unknown".
    capdrain_ocr::MockRecognizer::empty()
}

/// Foreground heartbeat. Blocks until `interrupt` resolves; a worker that
/// stops on its own is joined here, but the process stays alive until an
/// operator interrupt arrives.
async fn supervise<I>(
    handle: tokio::task::JoinHandle<()>,
    stop: Arc<AtomicBool>,
    interrupt: I,
) where
    I: Future<Output = ()>,
{
    tokio::pin!(interrupt);
    let mut handle = Some(handle);

    loop {
        tokio::select! {
            _ = &mut interrupt => {
                tracing::info!("Stopping OCR processing...");
                stop.store(true, Ordering::Relaxed);
                break;
            }
            _ = tokio::time::sleep(Duration::from_secs(1)) => {
                if stop.load(Ordering::Relaxed) {
                    if let Some(h) = handle.take() {
                        h.await.expect("worker task panicked");
                        tracing::error!("Worker stopped; send an interrupt to exit");
                    }
                }
            }
        }
    }

    if let Some(h) = handle.take() {
        h.await.expect("worker task panicked");
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = load_config_from(Path::new(CONFIG_FILE));
    tracing::info!(
        "Draining {} into {}",
        config.input_dir.display(),
        config.output_dir.display()
    );

    // Shared with the worker; set by whichever side stops first.
    let stop = Arc::new(AtomicBool::new(false));

    let worker = QueueWorker::new(config, TextExtractor::new(backend()), stop.clone());
    let handle = tokio::spawn(worker.run());

    supervise(handle, stop, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await;

    tracing::info!("Worker stopped successfully");
}
