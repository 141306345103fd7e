use std::path::Path;

use chrono::NaiveDate;
use image::DynamicImage;
use thiserror::Error;

use crate::config::ExtractionConfig;
use crate::dates;
use crate::extract::MenuLineParser;
use crate::pools::TextRecognizer;
use crate::preprocess::{self, PreprocessError};
use crate::recognizer::{OcrBackend, OcrError};
use crate::types::ExtractionResult;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("Invalid currency pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Orchestrates: regular pool → menu lines; enhanced pool → date → normalize.
pub struct MenuPipeline<R: OcrBackend> {
    recognizer: TextRecognizer<R>,
}

impl<R: OcrBackend + 'static> MenuPipeline<R> {
    pub fn new(backend: R, config: ExtractionConfig) -> Self {
        Self { recognizer: TextRecognizer::new(backend, config) }
    }

    pub fn config(&self) -> &ExtractionConfig {
        self.recognizer.config()
    }

    /// Extract the menu table and menu date from an already-decoded image.
    ///
    /// Fails only when the OCR engine is missing. Unreadable menus produce an
    /// empty table with `success = false`; a missing date becomes today.
    pub async fn extract_menu(
        &self,
        image: &DynamicImage,
        currency: &str,
    ) -> Result<ExtractionResult, PipelineError> {
        self.extract_menu_on(image, currency, dates::today()).await
    }

    pub(crate) async fn extract_menu_on(
        &self,
        image: &DynamicImage,
        currency: &str,
        today: NaiveDate,
    ) -> Result<ExtractionResult, PipelineError> {
        let parser = MenuLineParser::new(currency)?;

        // The two pools are independent; the date is only searched in the enhanced one.
        let (regular, enhanced) = tokio::join!(
            self.recognizer.recognize_regular(image),
            self.recognizer.recognize_enhanced(image),
        );
        let regular = regular?;
        let enhanced = enhanced?;

        let menu = parser.parse(&regular);
        let extracted = dates::extract_date_on(&enhanced, today);
        let date = dates::normalize_date(&extracted, today, self.config().date_display);

        tracing::info!(
            items = menu.len(),
            date = date.display.as_str(),
            "menu extraction finished"
        );

        Ok(ExtractionResult::new(menu, date))
    }

    /// Decode raw bytes (camera capture or upload) and extract.
    pub async fn extract_menu_from_bytes(
        &self,
        data: &[u8],
        currency: &str,
    ) -> Result<ExtractionResult, PipelineError> {
        let image = preprocess::decode_image(data)?;
        self.extract_menu(&image, currency).await
    }

    pub async fn extract_menu_from_file(
        &self,
        path: &Path,
        currency: &str,
    ) -> Result<ExtractionResult, PipelineError> {
        let image = preprocess::open_image(path)?;
        self.extract_menu(&image, currency).await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
