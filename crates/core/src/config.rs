use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestaurantConfig {
    pub name: String,
    pub emoji: String,
    pub currency: String,
    /// Public address of the order form; menu ids are appended as `?menu_id=`.
    pub base_url: String,
}

impl Default for RestaurantConfig {
    fn default() -> Self {
        Self {
            name: "Flavors of Karnataka".to_string(),
            emoji: "🍽️".to_string(),
            currency: "£".to_string(),
            base_url: "http://localhost:8509".to_string(),
        }
    }
}

impl RestaurantConfig {
    /// Heading shown above menus and order summaries, e.g. `🍽️ Flavors of Karnataka`.
    pub fn title(&self) -> String {
        format!("{} {}", self.emoji.trim(), self.name.trim()).trim().to_string()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency.trim().is_empty() {
            return Err(ConfigError::Invalid("restaurant.currency must not be empty".into()));
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("restaurant.base_url must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuOptions {
    pub allow_special_requests: bool,
    pub max_quantity_per_item: u32,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            allow_special_requests: true,
            max_quantity_per_item: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub enable_image_upload: bool,
    pub manual_menu_entry: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enable_image_upload: true,
            manual_menu_entry: true,
        }
    }
}
