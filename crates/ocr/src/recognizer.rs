use image::GrayImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Failed to encode image for OCR: {0}")]
    ImageEncode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("Tesseract not available — build with `tesseract` feature")]
    NotAvailable,
}

/// One recognition candidate. Backends return candidates ranked best-first.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    /// Confidence in this candidate (0.0–1.0).
    pub confidence: f32,
}

impl Candidate {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self { text: text.into(), confidence: confidence.clamp(0.0, 1.0) }
    }
}

/// Abstraction over an OCR engine.
/// Implementations accept a binarized single-channel raster — the caller
/// guarantees the image is already a single tight text region, so no
/// detection/localization is expected — and return ranked candidates.
/// An empty list means the engine found no text.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image: &GrayImage) -> Result<Vec<Candidate>, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set candidate list — useful for exercising the pipeline
/// without a real OCR engine installed.
pub struct MockRecognizer {
    pub candidates: Vec<Candidate>,
}

impl MockRecognizer {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// A recognizer that always finds the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![Candidate::new(text, 1.0)])
    }

    /// A recognizer that never finds any text.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image: &GrayImage) -> Result<Vec<Candidate>, OcrError> {
        Ok(self.candidates.clone())
    }
}

/// A backend that always fails — used to test the worker's stop semantics.
pub struct FailingRecognizer;

impl OcrBackend for FailingRecognizer {
    fn recognize(&self, _image: &GrayImage) -> Result<Vec<Candidate>, OcrError> {
        Err(OcrError::Engine("simulated engine failure".into()))
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{Candidate, OcrBackend, OcrError};
    use image::{DynamicImage, GrayImage};
    use leptess::LepTess;
    use std::io::Cursor;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image: &GrayImage) -> Result<Vec<Candidate>, OcrError> {
            let mut png = Vec::new();
            DynamicImage::ImageLuma8(image.clone())
                .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
                .map_err(|e| OcrError::ImageEncode(e.to_string()))?;

            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(&png)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            let text = lt
                .get_utf8_text()
                .map_err(|e| OcrError::Engine(e.to_string()))?;

            let text = text.trim();
            if text.is_empty() {
                return Ok(Vec::new());
            }
            let confidence = lt.mean_text_conf() as f32 / 100.0;
            Ok(vec![Candidate::new(text, confidence)])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    fn blank() -> GrayImage {
        ImageBuffer::from_pixel(4, 4, image::Luma([0u8]))
    }

    #[test]
    fn mock_returns_preset_candidates() {
        let r = MockRecognizer::with_text("xY7b");
        let candidates = r.recognize(&blank()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "xY7b");
    }

    #[test]
    fn empty_mock_returns_no_candidates() {
        let r = MockRecognizer::empty();
        assert!(r.recognize(&blank()).unwrap().is_empty());
    }

    #[test]
    fn candidate_clamps_confidence() {
        assert_eq!(Candidate::new("a", 1.5).confidence, 1.0);
        assert_eq!(Candidate::new("a", -0.2).confidence, 0.0);
    }

    #[test]
    fn failing_recognizer_errors() {
        assert!(FailingRecognizer.recognize(&blank()).is_err());
    }
}
