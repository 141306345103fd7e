pub mod config;
pub mod menu;
pub mod order;
pub mod price;
pub mod profile;
pub mod validate;

pub use config::{AdminConfig, ConfigError, MenuOptions, RestaurantConfig};
pub use menu::{menu_id, order_link, MenuRow, MenuTable};
pub use order::{CustomerDetails, Order, OrderError, OrderLine};
pub use price::Price;
pub use profile::RestaurantProfile;
pub use validate::{validate_email, validate_name, validate_phone, ValidationError};
