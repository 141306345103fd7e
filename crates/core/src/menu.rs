use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::price::Price;

/// One parsed `(item, price)` pair from a menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuRow {
    pub item: String,
    pub price: Price,
}

impl MenuRow {
    /// Returns `None` when the item name is blank after trimming.
    pub fn new(item: impl AsRef<str>, price: Price) -> Option<Self> {
        let item = item.as_ref().trim();
        if item.is_empty() {
            return None;
        }
        Some(Self { item: item.to_string(), price })
    }
}

/// Menu rows in the order they were read. Duplicate item names stay as separate rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuTable {
    rows: Vec<MenuRow>,
}

impl MenuTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: MenuRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[MenuRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row whose item name matches, ignoring case.
    pub fn find(&self, item: &str) -> Option<&MenuRow> {
        let wanted = item.trim();
        self.rows.iter().find(|r| r.item.eq_ignore_ascii_case(wanted))
    }

    /// Format rows back into `"{item} - {currency}{price}"` lines.
    pub fn to_lines(&self, currency: &str) -> String {
        self.rows
            .iter()
            .map(|r| format!("{} - {}", r.item, r.price.display_with(currency)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Vec<MenuRow>> for MenuTable {
    fn from(rows: Vec<MenuRow>) -> Self {
        Self { rows }
    }
}

impl FromIterator<MenuRow> for MenuTable {
    fn from_iter<I: IntoIterator<Item = MenuRow>>(iter: I) -> Self {
        Self { rows: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a MenuTable {
    type Item = &'a MenuRow;
    type IntoIter = std::slice::Iter<'a, MenuRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// ── Identifiers ──────────────────────────────────────────────────────────────

/// `"{DDMMYYYY}_{last six digits of the unix timestamp}"`.
pub fn menu_id<Tz: TimeZone>(menu_date: NaiveDate, now: &DateTime<Tz>) -> String {
    let stamp = now.timestamp().to_string();
    let tail = &stamp[stamp.len().saturating_sub(6)..];
    format!("{}_{tail}", menu_date.format("%d%m%Y"))
}

pub fn order_link(base_url: &str, menu_id: &str) -> String {
    format!("{}?menu_id={menu_id}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(item: &str, pence: i64) -> MenuRow {
        MenuRow::new(item, Price::from_pence(pence).unwrap()).unwrap()
    }

    #[test]
    fn blank_item_rejected() {
        assert!(MenuRow::new("   ", Price::zero()).is_none());
        assert_eq!(row("  Dosa ", 450).item, "Dosa");
    }

    #[test]
    fn duplicates_are_kept() {
        let table: MenuTable = vec![row("Idli", 300), row("Idli", 350)].into();
        assert_eq!(table.len(), 2);
        assert_eq!(table.find("idli").unwrap().price.to_pence(), Some(300));
    }

    #[test]
    fn to_lines_format() {
        let table: MenuTable = vec![row("Chicken Biryani", 850), row("Paneer Tikka", 600)].into();
        assert_eq!(table.to_lines("£"), "Chicken Biryani - £8.50\nPaneer Tikka - £6.00");
    }

    #[test]
    fn menu_id_layout() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 23).unwrap();
        let now = Utc.timestamp_opt(1_745_400_123, 0).unwrap();
        assert_eq!(menu_id(date, &now), "23042025_400123");
    }

    #[test]
    fn order_link_layout() {
        assert_eq!(
            order_link("http://localhost:8509/", "23042025_400123"),
            "http://localhost:8509?menu_id=23042025_400123"
        );
    }
}
