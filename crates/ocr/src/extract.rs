use image::GrayImage;

use crate::recognizer::{OcrBackend, OcrError};

/// Outcome of running OCR over a cleaned image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    /// Recognized text, filtered to alphanumeric characters. Case is
    /// preserved as returned by the engine.
    Text(String),
    /// The engine produced no candidates.
    Unknown,
}

impl std::fmt::Display for ExtractionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionResult::Text(s) => write!(f, "{s}"),
            ExtractionResult::Unknown => write!(f, "unknown"),
        }
    }
}

/// Adapter from an OCR backend to an `ExtractionResult`.
pub struct TextExtractor<R: OcrBackend> {
    backend: R,
}

impl<R: OcrBackend> TextExtractor<R> {
    pub fn new(backend: R) -> Self {
        Self { backend }
    }

    /// Run OCR over a cleaned image and post-process the top candidate:
    /// every character that is not alphanumeric is stripped.
    pub fn extract(&self, image: &GrayImage) -> Result<ExtractionResult, OcrError> {
        let candidates = self.backend.recognize(image)?;
        match candidates.first() {
            Some(top) => {
                let text: String = top.text.chars().filter(|c| c.is_alphanumeric()).collect();
                Ok(ExtractionResult::Text(text))
            }
            None => Ok(ExtractionResult::Unknown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::{Candidate, MockRecognizer};
    use image::ImageBuffer;

    fn blank() -> GrayImage {
        ImageBuffer::from_pixel(4, 4, image::Luma([0u8]))
    }

    #[test]
    fn strips_punctuation_and_whitespace() {
        let e = TextExtractor::new(MockRecognizer::with_text("A-B 12!"));
        assert_eq!(e.extract(&blank()).unwrap(), ExtractionResult::Text("AB12".into()));
    }

    #[test]
    fn preserves_case() {
        let e = TextExtractor::new(MockRecognizer::with_text("xY7b"));
        assert_eq!(e.extract(&blank()).unwrap(), ExtractionResult::Text("xY7b".into()));
    }

    #[test]
    fn empty_candidates_yield_unknown() {
        let e = TextExtractor::new(MockRecognizer::empty());
        assert_eq!(e.extract(&blank()).unwrap(), ExtractionResult::Unknown);
    }

    #[test]
    fn top_candidate_wins() {
        let e = TextExtractor::new(MockRecognizer::new(vec![
            Candidate::new("good1", 0.9),
            Candidate::new("bad2", 0.4),
        ]));
        assert_eq!(e.extract(&blank()).unwrap(), ExtractionResult::Text("good1".into()));
    }

    #[test]
    fn all_symbols_reduce_to_empty_text() {
        // Filtering can legally produce an empty string; that is still a
        // recognized result, not Unknown.
        let e = TextExtractor::new(MockRecognizer::with_text("!@# $%"));
        assert_eq!(e.extract(&blank()).unwrap(), ExtractionResult::Text(String::new()));
    }

    #[test]
    fn display_renders_unknown_sentinel() {
        assert_eq!(ExtractionResult::Unknown.to_string(), "unknown");
        assert_eq!(ExtractionResult::Text("xY7b".into()).to_string(), "xY7b");
    }
}
