use menuform_core::{MenuRow, MenuTable, Price};
use regex::Regex;

/// Parses `<item> <dash> <currency><price>` lines out of OCR text.
///
/// The dash may be a hyphen, en-dash or em-dash with optional surrounding
/// whitespace; the currency symbol is matched literally. Lines are matched
/// from their start only, so trailing text after the price is tolerated.
#[derive(Debug, Clone)]
pub struct MenuLineParser {
    line: Regex,
}

impl MenuLineParser {
    pub fn new(currency: &str) -> Result<Self, regex::Error> {
        let pattern = format!(
            r"(?i)^(.+?)\s*[-–—]\s*{}\s*([0-9]+(?:\.[0-9]{{1,2}})?)",
            regex::escape(currency.trim())
        );
        Ok(Self { line: Regex::new(&pattern)? })
    }

    /// One row per matching line, in input order. Non-matching lines are noise
    /// (headers, footers) and are skipped.
    pub fn parse(&self, regular_text: &str) -> MenuTable {
        regular_text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .filter_map(|line| self.parse_line(line))
            .collect()
    }

    pub fn parse_line(&self, line: &str) -> Option<MenuRow> {
        let c = self.line.captures(line)?;
        let item = c.get(1)?.as_str();
        let price = match c.get(2)?.as_str().parse::<Price>() {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(line, "skipping menu line: {e}");
                return None;
            }
        };
        MenuRow::new(item, price)
    }
}

pub fn parse_menu_lines(regular_text: &str, currency: &str) -> Result<MenuTable, regex::Error> {
    Ok(MenuLineParser::new(currency)?.parse(regular_text))
}
