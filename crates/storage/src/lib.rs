pub mod db;

pub use db::{
    all_profiles, create_db, load_menu, load_profile, orders_for_menu, save_menu, save_order,
    save_profile, DbPool, OrderRecord, StoredMenu,
};
