use chrono::NaiveDate;
use menuform_core::MenuTable;
use serde::{Deserialize, Serialize};

use crate::dates::DatePattern;

/// Result of scanning the enhanced text pool for a date-shaped substring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractedDate {
    /// First matching line, first matching pattern.
    Matched { pattern: DatePattern, text: String },
    /// Nothing matched; `text` is today's date as `DD/MM/YYYY`.
    Fallback { text: String },
}

impl ExtractedDate {
    pub fn text(&self) -> &str {
        match self {
            ExtractedDate::Matched { text, .. } | ExtractedDate::Fallback { text } => text,
        }
    }

    pub fn pattern(&self) -> Option<DatePattern> {
        match self {
            ExtractedDate::Matched { pattern, .. } => Some(*pattern),
            ExtractedDate::Fallback { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateSource {
    /// Matched on the menu and normalized.
    Extracted { pattern: DatePattern, text: String },
    /// Matched on the menu but no date format accepted it; today's date is used.
    Unparsed { pattern: DatePattern, text: String },
    /// Nothing date-shaped on the menu; today's date is used.
    Fallback,
}

/// The menu date after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuDate {
    pub date: NaiveDate,
    /// Canonical display string for this deployment.
    pub display: String,
    pub source: DateSource,
}

impl MenuDate {
    /// Whether the date should be confirmed by a person before publishing.
    pub fn needs_review(&self) -> bool {
        !matches!(self.source, DateSource::Extracted { .. })
    }
}

/// Everything recovered from one menu photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub menu: MenuTable,
    pub date: MenuDate,
    /// `false` when no menu line was recognized and manual entry is required.
    pub success: bool,
}

impl ExtractionResult {
    pub fn new(menu: MenuTable, date: MenuDate) -> Self {
        let success = !menu.is_empty();
        Self { menu, date, success }
    }
}
