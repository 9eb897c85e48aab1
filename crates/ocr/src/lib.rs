pub mod clean;
pub mod config;
pub mod extract;
pub mod recognizer;
pub mod relocate;
pub mod worker;

pub use clean::{clean, clean_bytes, CleanError};
pub use config::{CleanConfig, DenoisePass, FailurePolicy, PipelineConfig};
pub use extract::{ExtractionResult, TextExtractor};
pub use recognizer::{Candidate, MockRecognizer, OcrBackend, OcrError};
pub use relocate::relocate;
pub use worker::{QueueWorker, WorkItem, WorkerError, ACCEPTED_EXTENSIONS};
