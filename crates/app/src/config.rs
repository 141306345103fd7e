use menuform_core::{AdminConfig, ConfigError, MenuOptions, RestaurantConfig};
use menuform_ocr::ExtractionConfig;
use serde::Deserialize;
use std::path::Path;

/// Contents of `menuform.toml`. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub restaurant: RestaurantConfig,
    pub menu: MenuOptions,
    pub admin: AdminConfig,
    pub extraction: ExtractionConfig,
}

impl AppConfig {
    /// A missing file means defaults; an unreadable or invalid one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.restaurant.validate()?;
        self.extraction.validate().map_err(ConfigError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuform_ocr::{DateDisplay, PageSegMode};

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.restaurant.currency, "£");
        assert_eq!(cfg.extraction.variant_count(), 10);
    }

    #[test]
    fn full_file() {
        let cfg = AppConfig::from_toml(
            r#"
            [restaurant]
            name = "Dosa Corner"
            currency = "$"
            base_url = "https://orders.example.com"

            [admin]
            manual_menu_entry = false

            [extraction]
            thresholds = [100, 150, 200]
            enhanced_modes = ["uniform_block", "sparse_text"]
            max_parallel = 2
            date_display = "day_month_year_slash"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.restaurant.currency, "$");
        assert!(!cfg.admin.manual_menu_entry);
        assert!(cfg.admin.enable_image_upload);
        assert_eq!(cfg.extraction.enhanced_attempts(), 10);
        assert_eq!(cfg.extraction.enhanced_modes[1], PageSegMode::SparseText);
        assert_eq!(cfg.extraction.date_display, DateDisplay::DayMonthYearSlash);
        assert_eq!(cfg.menu.max_quantity_per_item, 10);
    }

    #[test]
    fn invalid_extraction_section_rejected() {
        let err = AppConfig::from_toml("[extraction]\nthresholds = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_rejected() {
        assert!(matches!(AppConfig::from_toml("[restaurant"), Err(ConfigError::Parse(_))));
    }
}
