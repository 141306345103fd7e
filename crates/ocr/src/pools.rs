//! Builds the two text pools for one extraction call.
//!
//! The regular pool is a single pass over the unmodified image. The enhanced
//! pool sweeps every preprocessed variant under every configured segmentation
//! mode as a bounded set of blocking tasks, then merges the outputs by index
//! (variant-major, mode-minor) so the result does not depend on completion order.

use std::sync::Arc;

use image::DynamicImage;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::{ExtractionConfig, PageSegMode};
use crate::preprocess::{self, VariantKind};
use crate::recognizer::{OcrBackend, OcrError};

pub struct TextRecognizer<R: OcrBackend> {
    backend: Arc<R>,
    config: ExtractionConfig,
}

struct Attempt {
    index: usize,
    kind: VariantKind,
    mode: PageSegMode,
    outcome: Result<String, OcrError>,
}

impl<R: OcrBackend + 'static> TextRecognizer<R> {
    pub fn new(backend: R, config: ExtractionConfig) -> Self {
        Self { backend: Arc::new(backend), config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// One recognition pass on the raw image with the regular segmentation mode.
    /// Only a missing engine is an error; any other failure yields empty text.
    pub async fn recognize_regular(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let backend = Arc::clone(&self.backend);
        let image = image.clone();
        let mode = self.config.regular_mode;

        let joined = tokio::task::spawn_blocking(move || {
            let bytes = preprocess::encode_png(&image)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            backend.recognize(&bytes, mode)
        })
        .await;

        match joined {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(OcrError::NotAvailable(reason))) => Err(OcrError::NotAvailable(reason)),
            Ok(Err(e)) => {
                tracing::warn!(%mode, "regular recognition failed: {e}");
                Ok(String::new())
            }
            Err(e) => {
                tracing::warn!(%mode, "regular recognition task failed: {e}");
                Ok(String::new())
            }
        }
    }

    /// Every variant under every enhanced mode, joined with newlines.
    /// A failed attempt contributes an empty string; a missing engine aborts.
    pub async fn recognize_enhanced(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let modes = self.config.enhanced_modes.clone();
        let thresholds = self.config.thresholds.clone();
        let source = image.clone();

        // Variant generation and PNG encoding are CPU-bound; keep them off the async workers.
        let encoded = tokio::task::spawn_blocking(move || {
            preprocess::produce_variants(&source, &thresholds)
                .into_iter()
                .map(|v| {
                    let bytes = preprocess::encode_png(&v.image).map(Arc::new);
                    (v.kind, bytes)
                })
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| OcrError::Engine(format!("variant preparation failed: {e}")))?;

        let mut slots = vec![String::new(); encoded.len() * modes.len()];
        let permits = Arc::new(Semaphore::new(self.config.max_parallel.max(1)));
        let mut tasks = JoinSet::new();

        for (v_idx, (kind, bytes)) in encoded.into_iter().enumerate() {
            let bytes = match bytes {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!(%kind, "skipping variant: {e}");
                    continue;
                }
            };
            for (m_idx, &mode) in modes.iter().enumerate() {
                let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                    break;
                };
                // Settle whatever finished while waiting so a missing engine stops the sweep early.
                while let Some(joined) = tasks.try_join_next() {
                    if let Err(e) = settle(joined, &mut slots) {
                        tasks.abort_all();
                        return Err(e);
                    }
                }
                let backend = Arc::clone(&self.backend);
                let bytes = Arc::clone(&bytes);
                let index = v_idx * modes.len() + m_idx;
                tasks.spawn_blocking(move || {
                    let _permit = permit;
                    Attempt { index, kind, mode, outcome: backend.recognize(&bytes, mode) }
                });
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = settle(joined, &mut slots) {
                tasks.abort_all();
                return Err(e);
            }
        }

        Ok(slots.join("\n"))
    }
}

/// Store a finished attempt in its slot. Only a missing engine is an error.
fn settle(
    joined: Result<Attempt, tokio::task::JoinError>,
    slots: &mut [String],
) -> Result<(), OcrError> {
    match joined {
        Ok(Attempt { index, kind, mode, outcome: Ok(text) }) => {
            tracing::debug!(%kind, %mode, chars = text.len(), "recognized");
            slots[index] = text;
        }
        Ok(Attempt { outcome: Err(OcrError::NotAvailable(reason)), .. }) => {
            return Err(OcrError::NotAvailable(reason));
        }
        Ok(Attempt { kind, mode, outcome: Err(e), .. }) => {
            tracing::warn!(%kind, %mode, "recognition attempt failed: {e}");
        }
        Err(e) => {
            tracing::warn!("recognition task failed: {e}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::MockRecognizer;
    use image::{ImageBuffer, Rgb, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// A 256×1 ramp where r = g = b = x.
    fn ramp() -> DynamicImage {
        let img: RgbImage = ImageBuffer::from_fn(256, 1, |x, _| Rgb([x as u8; 3]));
        DynamicImage::ImageRgb8(img)
    }

    /// Describes what it was handed: color type, count of pure-white pixels, mode.
    struct Describing {
        fail_mode: Option<PageSegMode>,
        calls: Mutex<Vec<PageSegMode>>,
    }

    impl Describing {
        fn new(fail_mode: Option<PageSegMode>) -> Self {
            Self { fail_mode, calls: Mutex::new(vec![]) }
        }
    }

    impl OcrBackend for Describing {
        fn recognize(&self, image_bytes: &[u8], mode: PageSegMode) -> Result<String, OcrError> {
            self.calls.lock().unwrap().push(mode);
            if Some(mode) == self.fail_mode {
                return Err(OcrError::Engine("simulated".into()));
            }
            let img = image::load_from_memory(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let white = img.to_luma8().pixels().filter(|p| p[0] == 255).count();
            Ok(format!("{:?}:{white}:{}", img.color(), mode.tesseract_value()))
        }
    }

    fn expected_pool(thresholds: &[u8], modes: &[PageSegMode], fail: Option<PageSegMode>) -> String {
        let mut variants = vec!["Rgb8:1".to_string(), "L8:1".to_string()];
        variants.extend(thresholds.iter().map(|t| format!("L8:{}", 255 - *t as usize)));
        let mut parts = vec![];
        for v in &variants {
            for m in modes {
                if Some(*m) == fail {
                    parts.push(String::new());
                } else {
                    parts.push(format!("{v}:{}", m.tesseract_value()));
                }
            }
        }
        parts.join("\n")
    }

    #[tokio::test]
    async fn enhanced_pool_is_variant_major_mode_minor() {
        let config = ExtractionConfig::default();
        let recognizer = TextRecognizer::new(Describing::new(None), config.clone());

        let pool = recognizer.recognize_enhanced(&ramp()).await.unwrap();

        assert_eq!(pool, expected_pool(&config.thresholds, &config.enhanced_modes, None));
        assert_eq!(recognizer.backend.calls.lock().unwrap().len(), 30);
    }

    #[tokio::test]
    async fn order_is_stable_with_single_worker() {
        let config = ExtractionConfig { max_parallel: 1, ..Default::default() };
        let recognizer = TextRecognizer::new(Describing::new(None), config.clone());
        let pool = recognizer.recognize_enhanced(&ramp()).await.unwrap();
        assert_eq!(pool, expected_pool(&config.thresholds, &config.enhanced_modes, None));
    }

    /// Earlier dispatches sleep longer, so attempts finish in reverse order.
    struct Staggered {
        inner: Describing,
        dispatched: AtomicUsize,
        finished: Mutex<Vec<usize>>,
    }

    impl OcrBackend for Staggered {
        fn recognize(&self, image_bytes: &[u8], mode: PageSegMode) -> Result<String, OcrError> {
            let n = self.dispatched.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(3 * (30 - n.min(30)) as u64));
            let text = self.inner.recognize(image_bytes, mode);
            self.finished.lock().unwrap().push(n);
            text
        }
    }

    #[tokio::test]
    async fn order_survives_out_of_order_completion() {
        let config = ExtractionConfig::default();
        let backend = Staggered {
            inner: Describing::new(None),
            dispatched: AtomicUsize::new(0),
            finished: Mutex::new(vec![]),
        };
        let recognizer = TextRecognizer::new(backend, config.clone());

        let pool = recognizer.recognize_enhanced(&ramp()).await.unwrap();

        let finished = recognizer.backend.finished.lock().unwrap().clone();
        assert_eq!(finished.len(), 30);
        assert!(finished.windows(2).any(|w| w[0] > w[1]), "{finished:?}");
        assert_eq!(pool, expected_pool(&config.thresholds, &config.enhanced_modes, None));
    }

    struct CountingUnavailable(AtomicUsize);

    impl OcrBackend for CountingUnavailable {
        fn recognize(&self, _image_bytes: &[u8], _mode: PageSegMode) -> Result<String, OcrError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(OcrError::NotAvailable("no engine".into()))
        }
    }

    #[tokio::test]
    async fn missing_engine_stops_dispatch_early() {
        let config = ExtractionConfig { max_parallel: 1, ..Default::default() };
        let recognizer = TextRecognizer::new(CountingUnavailable(AtomicUsize::new(0)), config.clone());

        let err = recognizer.recognize_enhanced(&ramp()).await.unwrap_err();

        assert!(matches!(err, OcrError::NotAvailable(_)));
        let calls = recognizer.backend.0.load(Ordering::SeqCst);
        assert!(calls < config.enhanced_attempts(), "{calls} attempts dispatched");
    }

    #[tokio::test]
    async fn failed_attempts_contribute_empty_text() {
        let config = ExtractionConfig::default();
        let fail = Some(PageSegMode::SparseText);
        let recognizer = TextRecognizer::new(Describing::new(fail), config.clone());

        let pool = recognizer.recognize_enhanced(&ramp()).await.unwrap();

        assert_eq!(pool, expected_pool(&config.thresholds, &config.enhanced_modes, fail));
        assert_eq!(pool.lines().count(), 30);
    }

    #[tokio::test]
    async fn missing_engine_aborts_enhanced_pool() {
        let recognizer = TextRecognizer::new(
            crate::recognizer::UnavailableRecognizer,
            ExtractionConfig::default(),
        );
        let err = recognizer.recognize_enhanced(&ramp()).await.unwrap_err();
        assert!(matches!(err, OcrError::NotAvailable(_)));
    }

    #[tokio::test]
    async fn regular_pool_uses_regular_mode_once() {
        let recognizer = TextRecognizer::new(Describing::new(None), ExtractionConfig::default());
        let text = recognizer.recognize_regular(&ramp()).await.unwrap();
        assert_eq!(text, "Rgb8:1:3");
        assert_eq!(*recognizer.backend.calls.lock().unwrap(), vec![PageSegMode::Auto]);
    }

    #[tokio::test]
    async fn regular_pool_degrades_on_engine_error() {
        let recognizer = TextRecognizer::new(
            Describing::new(Some(PageSegMode::Auto)),
            ExtractionConfig::default(),
        );
        assert_eq!(recognizer.recognize_regular(&ramp()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn regular_pool_fails_without_engine() {
        let recognizer = TextRecognizer::new(
            crate::recognizer::UnavailableRecognizer,
            ExtractionConfig::default(),
        );
        assert!(matches!(
            recognizer.recognize_regular(&ramp()).await,
            Err(OcrError::NotAvailable(_))
        ));
    }

    #[tokio::test]
    async fn mock_text_repeats_for_every_attempt() {
        let config = ExtractionConfig {
            thresholds: vec![128],
            enhanced_modes: vec![PageSegMode::UniformBlock],
            ..Default::default()
        };
        let recognizer = TextRecognizer::new(MockRecognizer::new("x"), config);
        assert_eq!(recognizer.recognize_enhanced(&ramp()).await.unwrap(), "x\nx\nx");
    }
}
