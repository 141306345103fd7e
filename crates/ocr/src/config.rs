use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tesseract page segmentation modes used by the extraction sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSegMode {
    /// Fully automatic page segmentation (engine default).
    Auto,
    SingleColumn,
    UniformBlock,
    SparseText,
}

impl PageSegMode {
    /// Numeric value for `tessedit_pageseg_mode`.
    pub fn tesseract_value(self) -> u8 {
        match self {
            PageSegMode::Auto => 3,
            PageSegMode::SingleColumn => 4,
            PageSegMode::UniformBlock => 6,
            PageSegMode::SparseText => 11,
        }
    }
}

impl fmt::Display for PageSegMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "psm {}", self.tesseract_value())
    }
}

/// Canonical display form for the menu date. One form per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateDisplay {
    /// `23-Apr-2025`
    #[default]
    DayMonYear,
    /// `23/04/2025`
    DayMonthYearSlash,
}

impl DateDisplay {
    pub fn format(self, date: NaiveDate) -> String {
        match self {
            DateDisplay::DayMonYear => date.format("%d-%b-%Y").to_string(),
            DateDisplay::DayMonthYearSlash => date.format("%d/%m/%Y").to_string(),
        }
    }
}

pub const DEFAULT_THRESHOLDS: [u8; 8] = [80, 100, 120, 140, 160, 180, 200, 220];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Binarization thresholds, ascending. A pixel above the threshold turns white.
    pub thresholds: Vec<u8>,
    /// Segmentation modes run against every variant for the enhanced pool.
    pub enhanced_modes: Vec<PageSegMode>,
    /// Segmentation mode for the single regular-pool pass.
    pub regular_mode: PageSegMode,
    /// Upper bound on concurrent recognition attempts.
    pub max_parallel: usize,
    pub date_display: DateDisplay,
    pub language: String,
    /// Directory holding `*.traineddata`; engine default when unset.
    pub data_path: Option<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            enhanced_modes: vec![
                PageSegMode::UniformBlock,
                PageSegMode::SparseText,
                PageSegMode::SingleColumn,
            ],
            regular_mode: PageSegMode::Auto,
            max_parallel: 4,
            date_display: DateDisplay::default(),
            language: "eng".to_string(),
            data_path: None,
        }
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.thresholds.is_empty() {
            return Err("extraction.thresholds must not be empty".into());
        }
        if self.thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err("extraction.thresholds must be strictly ascending".into());
        }
        if self.enhanced_modes.is_empty() {
            return Err("extraction.enhanced_modes must not be empty".into());
        }
        if self.max_parallel == 0 {
            return Err("extraction.max_parallel must be at least 1".into());
        }
        Ok(())
    }

    /// Number of variants produced per image: original, grayscale, one per threshold.
    pub fn variant_count(&self) -> usize {
        2 + self.thresholds.len()
    }

    pub fn enhanced_attempts(&self) -> usize {
        self.variant_count() * self.enhanced_modes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_thirty_attempts() {
        let cfg = ExtractionConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.variant_count(), 10);
        assert_eq!(cfg.enhanced_attempts(), 30);
    }

    #[test]
    fn rejects_unsorted_thresholds() {
        let cfg = ExtractionConfig { thresholds: vec![120, 100], ..Default::default() };
        assert!(cfg.validate().is_err());
        let cfg = ExtractionConfig { thresholds: vec![100, 100], ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_parallelism() {
        let cfg = ExtractionConfig { max_parallel: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn deserializes_snake_case_modes() {
        let cfg: ExtractionConfig = toml::from_str(
            r#"
            enhanced_modes = ["sparse_text"]
            date_display = "day_month_year_slash"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.enhanced_modes, vec![PageSegMode::SparseText]);
        assert_eq!(cfg.thresholds, DEFAULT_THRESHOLDS.to_vec());
        assert_eq!(cfg.date_display, DateDisplay::DayMonthYearSlash);
    }

    #[test]
    fn date_display_forms() {
        let d = NaiveDate::from_ymd_opt(2025, 4, 3).unwrap();
        assert_eq!(DateDisplay::DayMonYear.format(d), "03-Apr-2025");
        assert_eq!(DateDisplay::DayMonthYearSlash.format(d), "03/04/2025");
    }

    #[test]
    fn tesseract_mode_values() {
        assert_eq!(PageSegMode::UniformBlock.tesseract_value(), 6);
        assert_eq!(PageSegMode::SparseText.tesseract_value(), 11);
        assert_eq!(PageSegMode::SingleColumn.tesseract_value(), 4);
        assert_eq!(PageSegMode::Auto.tesseract_value(), 3);
    }
}
