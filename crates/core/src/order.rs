use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MenuOptions;
use crate::menu::MenuTable;
use crate::price::Price;
use crate::validate::{self, ValidationError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Please select at least one item.")]
    Empty,
    #[error("'{0}' is not on this menu")]
    UnknownItem(String),
    #[error("Quantity for '{item}' must be between 1 and {max}")]
    Quantity { item: String, max: u32 },
    #[error("Special requests are not accepted")]
    SpecialRequestsDisabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub wants_invoice: bool,
}

impl CustomerDetails {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::validate_name(&self.name)?;
        validate::validate_phone(&self.phone)?;
        validate::validate_email(&self.email, self.wants_invoice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item: String,
    pub price: Price,
    pub quantity: u32,
}

impl OrderLine {
    pub fn total(&self) -> Price {
        self.price * self.quantity
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub menu_id: String,
    pub placed_at: NaiveDateTime,
    pub customer: CustomerDetails,
    pub lines: Vec<OrderLine>,
    pub special_instructions: String,
}

impl Order {
    /// Validate the customer and the requested `(item, quantity)` pairs against
    /// the published menu. Prices always come from the menu, never the request.
    pub fn build(
        menu_id: &str,
        menu: &MenuTable,
        customer: CustomerDetails,
        requested: &[(String, u32)],
        special_instructions: &str,
        options: &MenuOptions,
        placed_at: NaiveDateTime,
    ) -> Result<Self, OrderError> {
        customer.validate()?;

        if !options.allow_special_requests && !special_instructions.trim().is_empty() {
            return Err(OrderError::SpecialRequestsDisabled);
        }

        let mut lines = Vec::with_capacity(requested.len());
        for (item, quantity) in requested {
            if *quantity == 0 {
                continue;
            }
            let row = menu
                .find(item)
                .ok_or_else(|| OrderError::UnknownItem(item.clone()))?;
            if *quantity > options.max_quantity_per_item {
                return Err(OrderError::Quantity {
                    item: row.item.clone(),
                    max: options.max_quantity_per_item,
                });
            }
            lines.push(OrderLine { item: row.item.clone(), price: row.price, quantity: *quantity });
        }

        if lines.is_empty() {
            return Err(OrderError::Empty);
        }

        Ok(Order {
            order_id: format!("{menu_id}_{}", customer.name.trim()),
            menu_id: menu_id.to_string(),
            placed_at,
            customer,
            lines,
            special_instructions: special_instructions.trim().to_string(),
        })
    }

    pub fn total(&self) -> Price {
        self.lines.iter().map(OrderLine::total).sum()
    }

    pub fn timestamp(&self) -> String {
        self.placed_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuRow;
    use chrono::NaiveDate;

    fn menu() -> MenuTable {
        vec![
            MenuRow::new("Chicken Biryani", Price::from_pence(850).unwrap()).unwrap(),
            MenuRow::new("Garlic Naan", Price::from_pence(200).unwrap()).unwrap(),
        ]
        .into()
    }

    fn customer() -> CustomerDetails {
        CustomerDetails {
            name: "Asha".into(),
            phone: "07123456789".into(),
            email: String::new(),
            wants_invoice: false,
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 23).unwrap().and_hms_opt(12, 30, 5).unwrap()
    }

    #[test]
    fn build_prices_from_menu() {
        let requested = vec![("garlic naan".to_string(), 3), ("Chicken Biryani".to_string(), 1)];
        let order = Order::build("23042025_400123", &menu(), customer(), &requested, "", &MenuOptions::default(), at())
            .unwrap();
        assert_eq!(order.order_id, "23042025_400123_Asha");
        assert_eq!(order.lines[0].item, "Garlic Naan");
        assert_eq!(order.total().to_pence(), Some(1450));
        assert_eq!(order.timestamp(), "2025-04-23 12:30:05");
    }

    #[test]
    fn zero_quantities_mean_empty_order() {
        let requested = vec![("Garlic Naan".to_string(), 0)];
        let err = Order::build("m", &menu(), customer(), &requested, "", &MenuOptions::default(), at()).unwrap_err();
        assert_eq!(err, OrderError::Empty);
    }

    #[test]
    fn unknown_item_and_quantity_cap() {
        let opts = MenuOptions::default();
        let err = Order::build("m", &menu(), customer(), &[("Dosa".to_string(), 1)], "", &opts, at()).unwrap_err();
        assert_eq!(err, OrderError::UnknownItem("Dosa".into()));

        let err = Order::build("m", &menu(), customer(), &[("Garlic Naan".to_string(), 11)], "", &opts, at())
            .unwrap_err();
        assert!(matches!(err, OrderError::Quantity { max: 10, .. }));
    }

    #[test]
    fn invoice_requires_email() {
        let mut c = customer();
        c.wants_invoice = true;
        let err = Order::build("m", &menu(), c, &[("Garlic Naan".to_string(), 1)], "", &MenuOptions::default(), at())
            .unwrap_err();
        assert_eq!(err, OrderError::Invalid(ValidationError::EmailRequired));
    }

    #[test]
    fn special_requests_can_be_disabled() {
        let opts = MenuOptions { allow_special_requests: false, ..MenuOptions::default() };
        let err = Order::build("m", &menu(), customer(), &[("Garlic Naan".to_string(), 1)], "extra spicy", &opts, at())
            .unwrap_err();
        assert_eq!(err, OrderError::SpecialRequestsDisabled);
    }
}
