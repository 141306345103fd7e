use thiserror::Error;

use crate::config::PageSegMode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    /// The engine cannot be invoked at all. Fatal for an extraction call.
    #[error("OCR engine not available: {0}")]
    NotAvailable(String),
}

/// Abstraction over an OCR backend.
/// Implementations accept PNG image bytes plus a page segmentation mode and
/// return the recognized text.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8], mode: PageSegMode) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image_bytes: &[u8], mode: PageSegMode) -> Result<String, OcrError> {
        (**self).recognize(image_bytes, mode)
    }
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set string regardless of image or mode.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8], _mode: PageSegMode) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

// ── Placeholder for builds without an engine ─────────────────────────────────

pub struct UnavailableRecognizer;

impl OcrBackend for UnavailableRecognizer {
    fn recognize(&self, _image_bytes: &[u8], _mode: PageSegMode) -> Result<String, OcrError> {
        Err(OcrError::NotAvailable("build with the `tesseract` feature".into()))
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use crate::config::PageSegMode;
    use leptess::{LepTess, Variable};

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }

        /// Fail fast when the engine or its language data is missing.
        pub fn probe(&self) -> Result<(), OcrError> {
            LepTess::new(self.data_path.as_deref(), &self.lang)
                .map(|_| ())
                .map_err(|e| OcrError::NotAvailable(e.to_string()))
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8], mode: PageSegMode) -> Result<String, OcrError> {
            // One engine handle per attempt; attempts run concurrently.
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::NotAvailable(e.to_string()))?;
            lt.set_variable(Variable::TesseditPagesegMode, &mode.tesseract_value().to_string())
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_preset_text() {
        let r = MockRecognizer::new("Chicken Biryani - £8.50");
        assert_eq!(
            r.recognize(b"fake image data", PageSegMode::Auto).unwrap(),
            "Chicken Biryani - £8.50"
        );
    }

    #[test]
    fn mock_ignores_image_and_mode() {
        let r = MockRecognizer::new("hello");
        assert_eq!(r.recognize(b"anything", PageSegMode::SparseText).unwrap(), "hello");
        assert_eq!(r.recognize(b"", PageSegMode::UniformBlock).unwrap(), "hello");
    }

    #[test]
    fn unavailable_reports_not_available() {
        let err = UnavailableRecognizer.recognize(b"", PageSegMode::Auto).unwrap_err();
        assert!(matches!(err, OcrError::NotAvailable(_)));
    }

    #[test]
    fn boxed_backend_delegates() {
        let r: Box<dyn OcrBackend> = Box::new(MockRecognizer::new("boxed"));
        assert_eq!(r.recognize(b"", PageSegMode::Auto).unwrap(), "boxed");
    }
}
