pub mod config;
pub mod dates;
pub mod extract;
pub mod pipeline;
pub mod pools;
pub mod preprocess;
pub mod recognizer;
pub mod types;

pub use config::{DateDisplay, ExtractionConfig, PageSegMode};
pub use dates::{extract_date, normalize_date, DateFormat, DatePattern};
pub use extract::{parse_menu_lines, MenuLineParser};
pub use pipeline::{MenuPipeline, PipelineError};
pub use pools::TextRecognizer;
pub use preprocess::{decode_image, open_image, produce_variants, ImageVariant, PreprocessError, VariantKind};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, UnavailableRecognizer};
pub use types::{DateSource, ExtractedDate, ExtractionResult, MenuDate};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;
